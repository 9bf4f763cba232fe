//! Layered configuration loading.
//!
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file, if one is given and exists
//! 3. Apply env var fallbacks for fields the file did not set
//! 4. Resolve `${VAR}` references
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::types::Config;
use crate::validate;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Config files above 1 MiB are rejected.
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration together with where each field came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// Source layer per dotted field path.
    pub field_sources: FieldSources,
    /// Config files that were merged.
    pub loaded_files: Vec<String>,
}

/// Load the configuration with layered precedence, reading environment
/// variables from `env_vars`.
///
/// A `path` that does not exist is skipped.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is malformed, or if the final
/// merged configuration fails validation.
pub fn load<S: ::std::hash::BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut tree: toml::Value = parse(DEFAULTS_TOML, "<embedded defaults>")?;
    let mut sources = FieldSources::new();
    record_leaves(&tree, "", &ConfigLayer::Defaults, &mut sources);

    let mut loaded_files = Vec::new();
    if let Some(path) = path
        && let Some(overlay) = read_optional(path)?
    {
        let origin = path.display().to_string();
        let overlay: toml::Value = parse(&overlay, &origin)?;
        deep_merge_tracking(&mut tree, &overlay, "", &ConfigLayer::File, &mut sources);
        info!(path = %origin, "Loaded config file");
        loaded_files.push(origin);
    }

    match apply_env_fallbacks(&mut tree, &mut sources, env_vars) {
        0 => {},
        applied => debug!(applied, "Applied environment fallbacks"),
    }
    resolve_env_references(&mut tree, env_vars);

    let config: Config = tree
        .try_into()
        .map_err(|source| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source,
        })?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources: sources,
        loaded_files,
    })
}

/// Load a config from exactly one file. Defaults and the environment do not
/// take part.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing, cannot be read or
/// parsed, or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let config: Config = parse(&read_bounded(path)?, &path.display().to_string())?;
    validate::validate(&config)?;
    Ok(config)
}

fn parse<T: serde::de::DeserializeOwned>(content: &str, origin: &str) -> ConfigResult<T> {
    toml::from_str(content).map_err(|source| ConfigError::ParseError {
        path: origin.to_owned(),
        source,
    })
}

/// Contents of `path`, or `None` if it does not exist.
fn read_optional(path: &Path) -> ConfigResult<Option<String>> {
    match read_bounded(path) {
        Ok(content) => Ok(Some(content)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

/// Read `path`, refusing anything over [`MAX_CONFIG_FILE_SIZE`] bytes.
///
/// At most one byte past the limit is read.
fn read_bounded(path: &Path) -> ConfigResult<String> {
    let read_err = |source| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    };

    let file = std::fs::File::open(path).map_err(read_err)?;
    let mut content = String::new();
    file.take(MAX_CONFIG_FILE_SIZE.saturating_add(1))
        .read_to_string(&mut content)
        .map_err(read_err)?;

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!("config file exceeds the {MAX_CONFIG_FILE_SIZE} byte limit"),
        });
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config.token.prefix, "bearer");
        assert_eq!(config.lifetimes.session_secs, 7200);
        assert_eq!(config.lifetimes.remember_secs, 157_680_000);
        assert!(config.flow.server.is_none());
    }

    #[test]
    fn test_load_without_secret_fails() {
        let err = load(None, &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_load_env_only() {
        let resolved = load(
            None,
            &env(&[("APP_KEY", "app-secret"), ("SIGIL_FLOW_SERVER", "auth.test")]),
        )
        .unwrap();

        assert_eq!(resolved.config.signing.secret, "app-secret");
        assert_eq!(resolved.config.flow.server.as_deref(), Some("auth.test"));
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("token.key"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_file_beats_env() {
        let file = write_config(
            "[signing]\nsecret = \"file-secret\"\n[lifetimes]\nsession_secs = 60\n",
        );
        let resolved = load(
            Some(file.path()),
            &env(&[("SIGIL_SECRET", "env-secret"), ("SIGIL_SESSION_SECS", "30")]),
        )
        .unwrap();

        assert_eq!(resolved.config.signing.secret, "file-secret");
        assert_eq!(resolved.config.lifetimes.session_secs, 60);
        assert_eq!(resolved.loaded_files.len(), 1);
    }

    #[test]
    fn test_file_references_env() {
        let file = write_config("[signing]\nsecret = \"${DEPLOY_SECRET}\"\n");
        let resolved = load(Some(file.path()), &env(&[("DEPLOY_SECRET", "resolved")])).unwrap();

        assert_eq!(resolved.config.signing.secret, "resolved");
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load(
            Some(&dir.path().join("absent.toml")),
            &env(&[("SIGIL_SECRET", "s")]),
        )
        .unwrap();

        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[signing\nsecret = ");
        let err = load(Some(file.path()), &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let padding = "#".repeat(1_048_600);
        let file = write_config(&padding);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
