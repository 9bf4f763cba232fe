#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the sigil token engine.
//!
//! The core crates consume configuration; they never load it. This crate
//! owns the one [`Config`] type and the loading pipeline.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sigil_config::Config;
//!
//! let resolved = Config::load(Some(std::path::Path::new("sigil.toml"))).unwrap();
//! println!("session lifetime: {}s", resolved.config.lifetimes.session_secs);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Config file** passed to [`Config::load`]
//! 2. **Environment variables** (`SIGIL_*`, `APP_KEY`) - fallback only, for
//!    fields the file did not set
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! String values may reference environment variables as `${VAR}`.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Layered configuration merging.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration: defaults, then `path` (if it exists), then
    /// environment fallbacks.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(path, &env::collect_env_vars())
    }

    /// Load configuration from a single file (no layering, no environment).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
