//! Process exit codes by failure category.
//!
//! Build pipelines branch on these, so the mapping is part of the CLI contract:
//! 0 success, 1 internal, 2 invalid arguments, 3 preflight, 4 build, 5 cleanup.

use pyenvbuilder_core::config::ConfigError;
use pyenvbuilder_env::error::VersionParseError;
use pyenvbuilder_env::{BuildError, CleanupError, SpecError};
use thiserror::Error;

/// Bad command-line input detected by the CLI itself (not by clap).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidArguments(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Internal,
    InvalidArguments,
    Preflight,
    Build,
    Cleanup,
}

impl FailureKind {
    pub fn code(self) -> i32 {
        match self {
            FailureKind::Internal => 1,
            FailureKind::InvalidArguments => 2,
            FailureKind::Preflight => 3,
            FailureKind::Build => 4,
            FailureKind::Cleanup => 5,
        }
    }

    /// First typed error in the chain decides the category.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<BuildError>() {
                return match e {
                    BuildError::Preflight(_) => FailureKind::Preflight,
                    BuildError::Spec(_) | BuildError::Read { .. } => FailureKind::InvalidArguments,
                    _ => FailureKind::Build,
                };
            }
            if cause.downcast_ref::<CleanupError>().is_some() {
                return FailureKind::Cleanup;
            }
            if cause.downcast_ref::<SpecError>().is_some()
                || cause.downcast_ref::<ConfigError>().is_some()
                || cause.downcast_ref::<VersionParseError>().is_some()
                || cause.downcast_ref::<InvalidArguments>().is_some()
            {
                return FailureKind::InvalidArguments;
            }
        }
        FailureKind::Internal
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    FailureKind::classify(err).code()
}
