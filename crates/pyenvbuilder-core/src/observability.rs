//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for PYENVBUILDER_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.
//! Logs go to stderr so stdout stays free for build-phase hints.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call at process startup.
/// When PYENVBUILDER_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "pyenvbuilder=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

/// Audit file from `PYENVBUILDER_AUDIT_LOG`; `None` disables auditing.
fn audit_path() -> Option<PathBuf> {
    crate::config::ObservabilityConfig::from_env()
        .audit_log
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: environment_created
pub fn audit_environment_created(env_path: &Path, python: &Path, packages: &[String]) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "environment_created",
            "env_path": env_path.display().to_string(),
            "python": python.display().to_string(),
            "packages": packages,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: environment_install_failed (environment left in place, incomplete)
pub fn audit_install_failed(env_path: &Path, step: &str) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "environment_install_failed",
            "env_path": env_path.display().to_string(),
            "step": step,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: environment_removed
pub fn audit_environment_removed(env_path: &Path, forced: bool) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": timestamp(),
            "event": "environment_removed",
            "env_path": env_path.display().to_string(),
            "forced": forced,
        });
        append_jsonl(&path, &record);
    }
}
