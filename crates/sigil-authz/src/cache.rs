//! Precomputed ability list.
//!
//! The list of abilities every registered route maps to is computed once at
//! build or deploy time and stored as a JSON array. Writers replace the file
//! atomically, so readers see either the old or the new list.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ability::{Ability, RouteMetadata};
use crate::error::{AbilityCacheError, AbilityCacheResult};

/// Ability list artifact at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityCache {
    path: PathBuf,
}

impl AbilityCache {
    /// Cache stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Distinct, sorted, canonical abilities of `routes`. Routes without an
    /// ability are skipped.
    #[must_use]
    pub fn compile(routes: &[RouteMetadata]) -> Vec<String> {
        routes
            .iter()
            .map(RouteMetadata::ability)
            .filter(|ability| !ability.is_empty())
            .map(|ability| Ability::format(&ability))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The cached list, or `None` when no artifact exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read or is not
    /// a JSON list of strings.
    pub fn load(&self) -> AbilityCacheResult<Option<Vec<String>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ability cache");
                return Ok(None);
            },
            Err(source) => {
                return Err(AbilityCacheError::Io {
                    path: self.path.clone(),
                    source,
                });
            },
        };

        let abilities: Vec<String> =
            serde_json::from_str(&content).map_err(|source| AbilityCacheError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(abilities))
    }

    /// Compile `routes` and atomically replace the artifact.
    ///
    /// Returns the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed
    /// into place.
    pub fn store(&self, routes: &[RouteMetadata]) -> AbilityCacheResult<Vec<String>> {
        let abilities = Self::compile(routes);
        let io_err = |source| AbilityCacheError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let json = serde_json::to_vec_pretty(&abilities).map_err(|source| {
            AbilityCacheError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;

        info!(path = %self.path.display(), count = abilities.len(), "ability list cached");
        Ok(abilities)
    }

    /// The cached list when present, otherwise the list compiled from
    /// `routes`. Entries are canonicalized either way.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing artifact cannot be loaded.
    pub fn slot(&self, routes: &[RouteMetadata]) -> AbilityCacheResult<Vec<String>> {
        match self.load()? {
            Some(cached) if !cached.is_empty() => {
                Ok(cached.iter().map(|a| Ability::format(a)).collect())
            },
            _ => Ok(Self::compile(routes)),
        }
    }
}
