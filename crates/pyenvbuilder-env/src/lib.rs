//! Python virtual environment lifecycle for IDE build pipelines.
//!
//! Callers (the CLI) hand over an `EnvironmentSpec`; this crate runs the
//! preflight checks, builds or removes the environment, and reports typed
//! errors. All subprocess work goes through `runner::ProcessRunner`.

pub mod env;
pub mod error;
pub mod interpreter;
pub mod preflight;
pub mod runner;
pub mod xcode;

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;

pub use env::builder::EnvironmentBuilder;
pub use env::cleaner::EnvironmentCleaner;
pub use env::{EnvironmentHandle, EnvironmentSpec};
pub use error::{BuildError, CleanupError, SpecError};
pub use interpreter::PythonVersion;
pub use preflight::{CheckResult, PreflightChecker, PreflightReport, Toolchain};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use xcode::{XcodeIntegrator, XcodeSetup};
