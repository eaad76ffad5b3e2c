//! ProcessRunner trait: the seam between environment logic and subprocesses.
//!
//! Every external collaborator (interpreter, pip, xcode-select) is invoked
//! through this trait so the build and preflight flows can be exercised
//! without a real Python installation.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Trimmed stderr, falling back to stdout (pip prints some errors there).
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.status_code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a program to completion and captures its output.
///
/// `Err` means the program could not be spawned at all; a non-zero exit is
/// reported through `ProcessOutput::status_code`.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput>;
}

/// `std::process::Command` backed runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput> {
        tracing::debug!(program = %program.display(), ?args, "Running subprocess");
        let out = Command::new(program).args(args).output()?;
        Ok(ProcessOutput {
            status_code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = ProcessOutput {
            status_code: Some(1),
            stdout: "collected\n".into(),
            stderr: "  ERROR: boom \n".into(),
        };
        assert!(!out.success());
        assert_eq!(out.diagnostic(), "ERROR: boom");
    }

    #[test]
    fn test_diagnostic_falls_back_to_status() {
        let out = ProcessOutput {
            status_code: Some(2),
            ..Default::default()
        };
        assert_eq!(out.diagnostic(), "exited with status 2");
        let killed = ProcessOutput::default();
        assert_eq!(killed.diagnostic(), "terminated by signal");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run(Path::new("pyenvbuilder-definitely-missing-binary"), &[])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
