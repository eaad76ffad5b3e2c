//! Command handlers. Each one resolves user paths, calls into
//! `pyenvbuilder-env`, and prints a short ✓/✗ summary to stderr.
//!
//! Anything a build script may want to capture (environment path, Xcode
//! hints) goes to stdout.

pub mod cleanup;
pub mod create;
pub mod xcode;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use pyenvbuilder_core::config::BuilderConfig;
use pyenvbuilder_env::interpreter::locate_python;
use pyenvbuilder_env::{
    EnvironmentBuilder, EnvironmentCleaner, PreflightChecker, ProcessRunner, PythonVersion,
    SystemRunner,
};

use crate::cli::GlobalArgs;

/// Resolved configuration shared by `create` and `xcode`.
pub struct Context {
    pub config: BuilderConfig,
    min_version: PythonVersion,
    python: Option<PathBuf>,
    runner: Arc<dyn ProcessRunner>,
}

impl Context {
    /// Config file and env first, then global CLI flags on top.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let mut config = BuilderConfig::load(global.config.as_deref())?;
        if let Some(python) = &global.python {
            config.python = Some(python.clone());
        }
        if let Some(version) = &global.min_python {
            config.python_version = version.clone();
        }

        let python = locate_python(config.python.as_deref());
        match &python {
            Some(p) => tracing::debug!(python = %p.display(), "Using interpreter"),
            None => tracing::warn!("No Python interpreter found"),
        }
        Self::new(config, python, Arc::new(SystemRunner))
    }

    pub fn new(
        config: BuilderConfig,
        python: Option<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self> {
        let min_version: PythonVersion = config.python_version.parse()?;
        Ok(Self {
            config,
            min_version,
            python,
            runner,
        })
    }

    pub fn builder(&self) -> EnvironmentBuilder {
        let checker = PreflightChecker::new(self.runner.clone(), self.python.clone(), self.min_version);
        EnvironmentBuilder::new(checker, EnvironmentCleaner::new())
            .with_no_cache(self.config.no_cache)
    }
}

/// Absolute form of a user-supplied path.
///
/// The parent is canonicalized so `..` and relative segments resolve, while
/// the last component is kept as given (a symlinked environment is removed as
/// the link, not its target).
pub fn resolve_path(path: &Path) -> PathBuf {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(abs),
        _ => abs.canonicalize().unwrap_or(abs),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use pyenvbuilder_env::fakes::FakeRunner;

    /// Context over a `FakeRunner` with the default config.
    pub(crate) fn context(runner: Arc<FakeRunner>) -> Context {
        Context::new(
            BuilderConfig::default(),
            Some(PathBuf::from("python3")),
            runner,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::exit_code;
    use std::fs;

    #[test]
    fn test_context_rejects_bad_min_version() {
        let config = BuilderConfig {
            python_version: "three".to_string(),
            ..BuilderConfig::default()
        };
        let err = Context::new(config, None, Arc::new(SystemRunner))
            .err()
            .unwrap();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_resolve_path_collapses_parent_segments() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("proj")).unwrap();

        let resolved = resolve_path(&root.join("a").join("..").join("proj"));
        assert_eq!(resolved, root.join("proj"));

        let resolved = resolve_path(&root.join("a").join(".."));
        assert_eq!(resolved, root);
    }

    #[test]
    fn test_resolve_path_keeps_missing_leaf() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        assert_eq!(resolve_path(&root.join("gone")), root.join("gone"));
    }

    #[test]
    fn test_resolve_path_relative_is_absolute() {
        assert!(resolve_path(Path::new("BuildEnv")).is_absolute());
    }
}
