//! Remove virtual environments.
//!
//! Without `force` only a recognized environment (`pyvenv.cfg` + interpreter)
//! is deleted, which keeps a mistyped path from wiping an arbitrary directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use pyenvbuilder_core::config::{env_keys, env_optional};
use pyenvbuilder_core::observability;
use walkdir::WalkDir;

use crate::env::EnvironmentHandle;
use crate::error::CleanupError;

#[derive(Debug, Clone, Default)]
pub struct EnvironmentCleaner {
    /// Environment of the calling shell (`$VIRTUAL_ENV`), never deleted without force.
    active_env: Option<PathBuf>,
}

impl EnvironmentCleaner {
    pub fn new() -> Self {
        Self {
            active_env: env_optional(env_keys::VIRTUAL_ENV, &[]).map(PathBuf::from),
        }
    }

    pub fn with_active_env(mut self, active_env: Option<PathBuf>) -> Self {
        self.active_env = active_env;
        self
    }

    pub fn cleanup(&self, path: &Path, force: bool) -> Result<(), CleanupError> {
        if force {
            return self.force_remove(path);
        }

        let not_env = |reason: String| CleanupError::NotAnEnvironment {
            path: path.to_path_buf(),
            reason,
        };
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(not_env("path traversal detected".to_string()));
        }
        let handle = EnvironmentHandle::probe(path);
        if let Some(reason) = handle.invalid_reason() {
            return Err(not_env(reason));
        }
        if self.is_active(path) {
            return Err(CleanupError::ActiveEnvironment(path.to_path_buf()));
        }

        tracing::info!(path = %path.display(), "Removing virtual environment");
        fs::remove_dir_all(path).map_err(|source| CleanupError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
        observability::audit_environment_removed(path, false);
        Ok(())
    }

    /// Delete whatever is at `path`; a missing path is not an error.
    fn force_remove(&self, path: &Path) -> Result<(), CleanupError> {
        let Ok(meta) = path.symlink_metadata() else {
            tracing::info!(path = %path.display(), "Nothing to remove");
            return Ok(());
        };
        let remove_err = |source| CleanupError::Remove {
            path: path.to_path_buf(),
            source,
        };
        tracing::info!(path = %path.display(), "Force-removing");
        if !meta.is_dir() {
            fs::remove_file(path).map_err(remove_err)?;
        } else if let Err(first) = fs::remove_dir_all(path) {
            tracing::warn!(error = %first, "Removal failed, clearing read-only flags and retrying");
            clear_readonly(path);
            fs::remove_dir_all(path).map_err(remove_err)?;
        }
        observability::audit_environment_removed(path, true);
        Ok(())
    }

    fn is_active(&self, path: &Path) -> bool {
        let Some(active) = &self.active_env else {
            return false;
        };
        match (active.canonicalize(), path.canonicalize()) {
            (Ok(a), Ok(p)) => a == p,
            _ => false,
        }
    }
}

#[allow(clippy::permissions_set_readonly_false)]
fn clear_readonly(root: &Path) {
    for entry in WalkDir::new(root).into_iter().flatten() {
        if let Ok(meta) = entry.path().symlink_metadata() {
            if meta.file_type().is_symlink() {
                continue;
            }
            let mut perms = meta.permissions();
            if perms.readonly() {
                perms.set_readonly(false);
                let _ = fs::set_permissions(entry.path(), perms);
            }
        }
    }
}
