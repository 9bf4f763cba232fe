//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_signing(config)?;
    validate_token(config)?;
    validate_lifetimes(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_signing(config: &Config) -> ConfigResult<()> {
    if config.signing.secret.trim().is_empty() {
        return Err(invalid(
            "signing.secret",
            "a signing secret is required; set it in the config file, SIGIL_SECRET or APP_KEY",
        ));
    }
    if config.signing.secret.contains("${") {
        return Err(invalid(
            "signing.secret",
            "unresolved environment reference in signing secret",
        ));
    }
    if config.signing.seed.as_deref().is_some_and(str::is_empty) {
        return Err(invalid("signing.seed", "seed must not be empty when set"));
    }
    Ok(())
}

fn validate_token(config: &Config) -> ConfigResult<()> {
    let t = &config.token;
    if t.key.trim().is_empty() {
        return Err(invalid("token.key", "lookup key must not be empty"));
    }
    if t.prefix.trim().is_empty() {
        return Err(invalid("token.prefix", "header prefix must not be empty"));
    }
    if t.cookie.trim().is_empty() {
        return Err(invalid("token.cookie", "cookie name must not be empty"));
    }
    Ok(())
}

fn validate_lifetimes(config: &Config) -> ConfigResult<()> {
    let l = &config.lifetimes;
    if l.session_secs == 0 {
        return Err(invalid("lifetimes.session_secs", "must be greater than 0"));
    }
    if l.remember_secs < l.session_secs {
        return Err(invalid(
            "lifetimes.remember_secs",
            format!(
                "remember lifetime {}s is shorter than the session lifetime {}s",
                l.remember_secs, l.session_secs
            ),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let format = config.logging.format.as_str();
    if !matches!(format, "pretty" | "compact" | "json" | "full") {
        return Err(invalid(
            "logging.format",
            format!("unsupported format '{format}'; expected one of: pretty, compact, json, full"),
        ));
    }
    if config.logging.level.trim().is_empty() {
        return Err(invalid("logging.level", "level must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.signing.secret = "secret".to_owned();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_secret() {
        let err = validate(&Config::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "signing.secret"
        ));
    }

    #[test]
    fn test_unresolved_secret_reference() {
        let mut config = valid_config();
        config.signing.secret = "${NOPE}".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_token_prefix() {
        let mut config = valid_config();
        config.token.prefix = "  ".to_owned();

        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "token.prefix"
        ));
    }

    #[test]
    fn test_zero_session_lifetime() {
        let mut config = valid_config();
        config.lifetimes.session_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_remember_shorter_than_session() {
        let mut config = valid_config();
        config.lifetimes.session_secs = 100;
        config.lifetimes.remember_secs = 50;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format() {
        let mut config = valid_config();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());
    }
}
