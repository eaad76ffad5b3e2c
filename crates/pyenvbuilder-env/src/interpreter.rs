//! Interpreter lookup, version parsing and the on-disk venv layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::VersionParseError;

/// File written by `python -m venv` at the environment root.
pub const VENV_MARKER: &str = "pyvenv.cfg";

/// Prints `major.minor.micro` of the running interpreter.
pub const VERSION_PROBE: &str = "import sys; print('%d.%d.%d' % sys.version_info[:3])";

/// Interpreter names tried on PATH when none is configured.
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// A `major.minor[.patch]` Python version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PythonVersion {
    type Err = VersionParseError;

    /// Accepts `3.9`, `3.9.1`, `3.12.0rc1` and `Python 3.9.1` (the `--version` output).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let version = raw
            .strip_prefix("Python")
            .map(str::trim)
            .unwrap_or(raw);
        let invalid = || VersionParseError(raw.to_string());

        let mut parts = version.splitn(3, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        // Pre-release suffixes (rc1, b2, +) are ignored for comparison.
        let patch = match parts.next() {
            Some(p) => {
                let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<u32>().map_err(|_| invalid())?
            }
            None => 0,
        };
        Ok(Self::new(major, minor, patch))
    }
}

/// Resolve the interpreter used to create environments.
///
/// An explicit path is used as-is when it exists; a bare name is looked up on
/// PATH. Without a configured interpreter, `python3` then `python` are tried.
pub fn locate_python(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = configured {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        return which::which(p).ok();
    }
    PYTHON_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Interpreter inside a virtual environment rooted at `env_root`.
pub fn venv_python(env_root: &Path) -> PathBuf {
    if cfg!(windows) {
        env_root.join("Scripts").join("python.exe")
    } else {
        env_root.join("bin").join("python")
    }
}
