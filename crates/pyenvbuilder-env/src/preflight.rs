//! Pre-flight checks run before an environment is built.
//!
//! Every check is a read-only probe (interpreter query, module import,
//! executable lookup, directory stat). All checks always run so the user sees
//! every problem at once; the phase passes only if all of them pass.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::interpreter::{PythonVersion, VERSION_PROBE};
use crate::runner::ProcessRunner;

pub const INTERPRETER_VERSION: &str = "interpreter version";
pub const VENV_MODULE: &str = "venv module";
pub const PIP_AVAILABILITY: &str = "pip availability";
pub const TOOLCHAIN: &str = "toolchain";
pub const TARGET_DIRECTORY: &str = "target directory";

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(f, "✓ {}: {}", self.name, self.message)
        } else {
            write!(f, "✗ {}: failed ({})", self.name, self.message)
        }
    }
}

/// Aggregated results of one preflight run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    results: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// One indented line per failing check.
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|r| format!("  {}", r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            writeln!(f, "{}", r)?;
        }
        Ok(())
    }
}

/// Platform build toolchain required next to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    /// macOS: Xcode Command Line Tools, located via `xcode-select -p`.
    XcodeCommandLineTools,
    NotRequired,
}

impl Toolchain {
    pub fn for_host() -> Self {
        if cfg!(target_os = "macos") {
            Toolchain::XcodeCommandLineTools
        } else {
            Toolchain::NotRequired
        }
    }
}

/// Runs the preflight checks against one interpreter.
#[derive(Clone)]
pub struct PreflightChecker {
    runner: Arc<dyn ProcessRunner>,
    python: Option<PathBuf>,
    min_version: PythonVersion,
    toolchain: Toolchain,
}

impl PreflightChecker {
    /// `python` is `None` when no interpreter could be located; the
    /// interpreter checks then fail instead of erroring out.
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        python: Option<PathBuf>,
        min_version: PythonVersion,
    ) -> Self {
        Self {
            runner,
            python,
            min_version,
            toolchain: Toolchain::for_host(),
        }
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn python(&self) -> Option<&Path> {
        self.python.as_deref()
    }

    pub fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.runner
    }

    /// Run every check, in a fixed order, without short-circuiting.
    pub fn run_checks(&self, target_directory: &Path) -> Vec<CheckResult> {
        vec![
            self.check_interpreter_version(),
            self.check_venv_module(),
            self.check_pip(),
            self.check_toolchain(),
            check_target_directory(target_directory),
        ]
    }

    /// `run_checks` wrapped into a report; each result is logged.
    pub fn run(&self, target_directory: &Path) -> PreflightReport {
        let report = PreflightReport::new(self.run_checks(target_directory));
        for r in report.results() {
            if r.passed {
                tracing::info!(check = %r.name, "{}", r.message);
            } else {
                tracing::error!(check = %r.name, "{}", r.message);
            }
        }
        report
    }

    fn check_interpreter_version(&self) -> CheckResult {
        let Some(python) = self.python() else {
            return CheckResult::fail(INTERPRETER_VERSION, no_interpreter_message());
        };
        let out = match self
            .runner
            .run(python, &[OsStr::new("-c"), OsStr::new(VERSION_PROBE)])
        {
            Ok(out) if out.success() => out,
            Ok(out) => {
                return CheckResult::fail(
                    INTERPRETER_VERSION,
                    format!("{} could not report its version: {}", python.display(), out.diagnostic()),
                )
            }
            Err(e) => {
                return CheckResult::fail(
                    INTERPRETER_VERSION,
                    format!("cannot run {}: {}", python.display(), e),
                )
            }
        };
        match out.stdout.parse::<PythonVersion>() {
            Ok(found) if found >= self.min_version => CheckResult::pass(
                INTERPRETER_VERSION,
                format!("Python {} meets requirement >= {}", found, self.min_version),
            ),
            Ok(found) => CheckResult::fail(
                INTERPRETER_VERSION,
                format!(
                    "Python {} or higher is required (found {})",
                    self.min_version, found
                ),
            ),
            Err(e) => CheckResult::fail(INTERPRETER_VERSION, e.to_string()),
        }
    }

    fn check_venv_module(&self) -> CheckResult {
        let Some(python) = self.python() else {
            return CheckResult::fail(VENV_MODULE, no_interpreter_message());
        };
        match self
            .runner
            .run(python, &[OsStr::new("-c"), OsStr::new("import venv")])
        {
            Ok(out) if out.success() => CheckResult::pass(VENV_MODULE, "venv module is available"),
            Ok(out) => CheckResult::fail(
                VENV_MODULE,
                format!("venv module is not available: {}", out.diagnostic()),
            ),
            Err(e) => CheckResult::fail(VENV_MODULE, format!("cannot run {}: {}", python.display(), e)),
        }
    }

    fn check_pip(&self) -> CheckResult {
        let Some(python) = self.python() else {
            return CheckResult::fail(PIP_AVAILABILITY, no_interpreter_message());
        };
        match self.runner.run(
            python,
            &[OsStr::new("-m"), OsStr::new("pip"), OsStr::new("--version")],
        ) {
            Ok(out) if out.success() => CheckResult::pass(
                PIP_AVAILABILITY,
                format!("pip is available ({})", out.stdout.trim()),
            ),
            Ok(out) => CheckResult::fail(
                PIP_AVAILABILITY,
                format!("pip is not available or not working: {}", out.diagnostic()),
            ),
            Err(e) => CheckResult::fail(
                PIP_AVAILABILITY,
                format!("cannot run {}: {}", python.display(), e),
            ),
        }
    }

    fn check_toolchain(&self) -> CheckResult {
        match self.toolchain {
            Toolchain::NotRequired => {
                CheckResult::pass(TOOLCHAIN, "no platform toolchain required on this host")
            }
            Toolchain::XcodeCommandLineTools => {
                match self.runner.run(Path::new("xcode-select"), &[OsStr::new("-p")]) {
                    Ok(out) if out.success() => CheckResult::pass(
                        TOOLCHAIN,
                        format!("Xcode Command Line Tools installed at {}", out.stdout.trim()),
                    ),
                    Ok(_) | Err(_) => CheckResult::fail(
                        TOOLCHAIN,
                        "Xcode Command Line Tools are not installed (run `xcode-select --install`)",
                    ),
                }
            }
        }
    }
}

fn no_interpreter_message() -> &'static str {
    "no Python interpreter found (tried python3, python; set --python or PYENVBUILDER_PYTHON)"
}

/// Target must be an existing, writable directory reached without `..`.
pub fn check_target_directory(path: &Path) -> CheckResult {
    if path.components().any(|c| c == Component::ParentDir) {
        return CheckResult::fail(
            TARGET_DIRECTORY,
            format!("path traversal detected in {}", path.display()),
        );
    }
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => {
            return CheckResult::fail(
                TARGET_DIRECTORY,
                format!("directory does not exist: {}", path.display()),
            )
        }
    };
    if !meta.is_dir() {
        return CheckResult::fail(
            TARGET_DIRECTORY,
            format!("not a directory: {}", path.display()),
        );
    }
    if !is_writable_dir(path, &meta) {
        return CheckResult::fail(
            TARGET_DIRECTORY,
            format!("directory is not writable: {}", path.display()),
        );
    }
    CheckResult::pass(
        TARGET_DIRECTORY,
        format!("{} is a writable directory", path.display()),
    )
}

/// Whether the calling user can list and create entries in `path`.
#[cfg(unix)]
fn is_writable_dir(path: &Path, _meta: &std::fs::Metadata) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable_dir(_path: &Path, meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeRunner;

    fn checker(runner: Arc<FakeRunner>) -> PreflightChecker {
        PreflightChecker::new(
            runner,
            Some(PathBuf::from("python3")),
            PythonVersion::new(3, 6, 0),
        )
        .with_toolchain(Toolchain::NotRequired)
    }

    fn names(results: &[CheckResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_all_checks_pass() {
        let tmp = tempfile::tempdir().unwrap();
        let report = checker(Arc::new(FakeRunner::new())).run(tmp.path());
        assert!(report.passed(), "{}", report);
        assert_eq!(
            names(report.results()),
            vec![
                INTERPRETER_VERSION,
                VENV_MODULE,
                PIP_AVAILABILITY,
                TOOLCHAIN,
                TARGET_DIRECTORY
            ]
        );
    }

    #[test]
    fn test_pip_missing_reports_pip_availability_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new().without_module("pip"));
        let report = checker(runner).run(tmp.path());
        assert!(!report.passed());
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, PIP_AVAILABILITY);
        assert!(report.to_string().contains("✗ pip availability: failed"));
    }

    #[test]
    fn test_failures_do_not_short_circuit() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let runner = Arc::new(
            FakeRunner::new()
                .with_python_version("3.5.2")
                .without_module("venv")
                .without_module("pip"),
        );
        let results = checker(runner).run_checks(&missing);
        assert_eq!(results.len(), 5);
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            failed,
            vec![INTERPRETER_VERSION, VENV_MODULE, PIP_AVAILABILITY, TARGET_DIRECTORY]
        );
        assert!(results[0].message.contains("3.6.0 or higher"));
    }

    #[test]
    fn test_no_interpreter_fails_without_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        let checker = PreflightChecker::new(runner.clone(), None, PythonVersion::new(3, 6, 0))
            .with_toolchain(Toolchain::NotRequired);
        let report = checker.run(tmp.path());
        assert_eq!(report.failures().count(), 3);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_spawn_failure_is_a_failed_check() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new().unspawnable());
        let report = checker(runner).run(tmp.path());
        let failed: Vec<&str> = report.failures().map(|r| r.name.as_str()).collect();
        assert_eq!(failed, vec![INTERPRETER_VERSION, VENV_MODULE, PIP_AVAILABILITY]);
        assert!(report.results()[0].message.contains("cannot run"));
    }

    #[test]
    fn test_xcode_toolchain_probe() {
        let tmp = tempfile::tempdir().unwrap();
        let ok = checker(Arc::new(FakeRunner::new()))
            .with_toolchain(Toolchain::XcodeCommandLineTools)
            .run(tmp.path());
        assert!(ok.passed());

        let missing = checker(Arc::new(FakeRunner::new().without_xcode_tools()))
            .with_toolchain(Toolchain::XcodeCommandLineTools)
            .run(tmp.path());
        let failed: Vec<&str> = missing.failures().map(|r| r.name.as_str()).collect();
        assert_eq!(failed, vec![TOOLCHAIN]);
    }

    #[test]
    fn test_target_directory_rules() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(check_target_directory(tmp.path()).passed);

        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(check_target_directory(&file).message.contains("not a directory"));

        let traversal = tmp.path().join("..").join("elsewhere");
        assert!(check_target_directory(&traversal)
            .message
            .contains("path traversal"));
    }

    #[cfg(unix)]
    #[test]
    fn test_target_directory_without_write_permission() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let locked = tmp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // root bypasses mode bits; only assert where the kernel enforces them
        let enforced = std::fs::write(locked.join("touch"), "").is_err();
        let result = check_target_directory(&locked);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert!(!result.passed);
            assert!(result.message.contains("not writable"), "{}", result.message);
        } else {
            assert!(result.passed);
        }
    }

    #[test]
    fn test_report_failure_summary_lists_only_failures() {
        let report = PreflightReport::new(vec![
            CheckResult::pass(VENV_MODULE, "ok"),
            CheckResult::fail(PIP_AVAILABILITY, "missing"),
        ]);
        assert_eq!(report.failure_summary(), "  ✗ pip availability: failed (missing)");
    }
}
