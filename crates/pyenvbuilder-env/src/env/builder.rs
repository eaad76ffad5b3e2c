//! Build an isolated Python virtual environment.
//!
//! Two phases: validate (preflight), then act (venv, pip upgrade, packages).
//! A failed install leaves the environment on disk, reported as incomplete;
//! nothing is rolled back.

use std::ffi::OsStr;
use std::path::Path;

use pyenvbuilder_core::observability;

use crate::env::cleaner::EnvironmentCleaner;
use crate::env::{EnvironmentHandle, EnvironmentSpec};
use crate::error::BuildError;
use crate::preflight::PreflightChecker;
use crate::runner::ProcessOutput;

pub struct EnvironmentBuilder {
    checker: PreflightChecker,
    cleaner: EnvironmentCleaner,
    no_cache: bool,
}

impl EnvironmentBuilder {
    pub fn new(checker: PreflightChecker, cleaner: EnvironmentCleaner) -> Self {
        Self {
            checker,
            cleaner,
            no_cache: true,
        }
    }

    /// Pass `--no-cache-dir` to every `pip install` (default on).
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn checker(&self) -> &PreflightChecker {
        &self.checker
    }

    /// Create the environment at `spec.env_path()`.
    ///
    /// An existing directory fails with `AlreadyExists` and is left untouched
    /// unless `force`, in which case it is removed first and rebuilt.
    pub fn create(
        &self,
        spec: &EnvironmentSpec,
        force: bool,
    ) -> Result<EnvironmentHandle, BuildError> {
        let report = self.checker.run(spec.target_path());
        if !report.passed() {
            return Err(BuildError::Preflight(report));
        }
        let Some(python) = self.checker.python() else {
            return Err(BuildError::Preflight(report));
        };

        let env_path = spec.env_path();
        if EnvironmentHandle::probe(&env_path).exists {
            if !force {
                return Err(BuildError::AlreadyExists(env_path));
            }
            tracing::info!(path = %env_path.display(), "--force: removing existing environment");
            self.cleaner.cleanup(&env_path, true)?;
        }

        tracing::info!(path = %env_path.display(), "Creating virtual environment");
        let out = self.run(python, &[OsStr::new("-m"), OsStr::new("venv"), env_path.as_os_str()])?;
        if !out.success() {
            return Err(BuildError::Venv {
                path: env_path,
                stderr: out.diagnostic(),
            });
        }

        let handle = EnvironmentHandle::probe(&env_path);
        let env_python = handle.python_executable();

        tracing::info!("Upgrading pip...");
        self.pip_install(&handle, &["--upgrade", "pip"], "pip upgrade")?;

        for package in spec.extra_packages() {
            tracing::info!(package = %package, "Installing package");
            let args = package_args(package);
            self.pip_install(&handle, &args, &format!("install of '{}'", package))?;
        }

        observability::audit_environment_created(&env_path, python, spec.extra_packages());
        tracing::info!(
            path = %env_path.display(),
            python = %env_python.display(),
            packages = spec.extra_packages().len(),
            "Virtual environment ready"
        );
        Ok(EnvironmentHandle::probe(env_path))
    }

    fn pip_install(
        &self,
        handle: &EnvironmentHandle,
        args: &[&str],
        step: &str,
    ) -> Result<(), BuildError> {
        let mut argv: Vec<&OsStr> = vec![OsStr::new("-m"), OsStr::new("pip"), OsStr::new("install")];
        if self.no_cache {
            argv.push(OsStr::new("--no-cache-dir"));
        }
        argv.extend(args.iter().map(OsStr::new));

        let out = self.run(&handle.python_executable(), &argv)?;
        if out.success() {
            return Ok(());
        }
        observability::audit_install_failed(&handle.root_path, step);
        Err(BuildError::Install {
            env_path: handle.root_path.clone(),
            step: step.to_string(),
            stderr: out.diagnostic(),
        })
    }

    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<ProcessOutput, BuildError> {
        self.checker
            .runner()
            .run(program, args)
            .map_err(|source| BuildError::Spawn {
                program: program.display().to_string(),
                source,
            })
    }
}

/// pip arguments for one requirement entry: option lines such as
/// `-r other.txt` or `--index-url URL` are split, plain specifiers stay whole.
pub fn package_args(entry: &str) -> Vec<&str> {
    let entry = entry.trim();
    if entry.starts_with('-') {
        entry.split_whitespace().collect()
    } else {
        vec![entry]
    }
}
