//! Errors returned by environment operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::preflight::PreflightReport;

/// Invalid `EnvironmentSpec` input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("Invalid environment name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
}

/// Unparseable Python version string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid Python version '{0}' (expected e.g. 3.9 or 3.9.1)")]
pub struct VersionParseError(pub String);

/// Errors returned by `EnvironmentCleaner::cleanup`.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Not a virtual environment: {path} ({reason}); use --force to delete anyway")]
    NotAnEnvironment { path: PathBuf, reason: String },

    #[error("Refusing to delete the currently active virtual environment: {0}")]
    ActiveEnvironment(PathBuf),

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by `EnvironmentBuilder::create` and `XcodeIntegrator::setup_project`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Preflight checks failed ({} of {}):\n{}", .0.failures().count(), .0.results().len(), .0.failure_summary())]
    Preflight(PreflightReport),

    #[error("Environment already exists: {0} (use --force to rebuild)")]
    AlreadyExists(PathBuf),

    #[error("Failed to create virtual environment at {path}: {stderr}")]
    Venv { path: PathBuf, stderr: String },

    #[error("{step} failed; environment at {env_path} is incomplete: {stderr}")]
    Install {
        env_path: PathBuf,
        step: String,
        stderr: String,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}
