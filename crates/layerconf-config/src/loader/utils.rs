//! Path handling for layer discovery.

use crate::ConfigError;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Canonical form of `path`; a path that does not exist yet is kept as given.
pub(super) fn canonical_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.canonicalize() {
        Ok(path) => Ok(path),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(ConfigError::ReadFailed(err)),
    }
}

/// Files already turned into layers, keyed by canonical path.
#[derive(Debug, Default)]
pub(super) struct SeenFiles(HashSet<PathBuf>);

impl SeenFiles {
    /// Record `path`; false when the same file was already recorded.
    pub(super) fn first_visit(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.0.insert(key)
    }
}
