//! Virtual environment model: what to build (`EnvironmentSpec`) and what is
//! on disk (`EnvironmentHandle`).
//!
//! The filesystem is the source of truth. A handle is a snapshot taken by
//! probing the directory and is never cached across calls.

pub mod builder;
pub mod cleaner;

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::SpecError;
use crate::interpreter::{venv_python, VENV_MARKER};

/// Parameters of one environment build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSpec {
    target_path: PathBuf,
    name: String,
    extra_packages: Vec<String>,
}

impl EnvironmentSpec {
    /// `name` must be a single plain path component; blank package entries are dropped.
    pub fn new(
        target_path: impl Into<PathBuf>,
        name: impl Into<String>,
        extra_packages: Vec<String>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        validate_name(&name)?;
        let extra_packages = extra_packages
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Ok(Self {
            target_path: target_path.into(),
            name,
            extra_packages,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extra_packages(&self) -> &[String] {
        &self.extra_packages
    }

    /// `target_path/name`
    pub fn env_path(&self) -> PathBuf {
        self.target_path.join(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), SpecError> {
    let invalid = |reason| SpecError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == OsStr::new(name) => Ok(()),
        (Some(Component::CurDir | Component::ParentDir), None) => {
            Err(invalid("name must not be '.' or '..'"))
        }
        _ => Err(invalid("name must be a single directory name without separators")),
    }
}

/// Snapshot of an environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentHandle {
    pub root_path: PathBuf,
    pub exists: bool,
}

impl EnvironmentHandle {
    /// Probe `root_path` on disk.
    pub fn probe(root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        let exists = root_path.symlink_metadata().is_ok();
        Self { root_path, exists }
    }

    /// Interpreter inside the environment (may not exist).
    pub fn python_executable(&self) -> PathBuf {
        venv_python(&self.root_path)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root_path.join(VENV_MARKER)
    }

    /// Recognized environment: marker file and interpreter both present.
    pub fn is_environment(&self) -> bool {
        self.root_path.is_dir() && self.marker_path().is_file() && self.python_executable().exists()
    }

    /// Why this is not a recognized environment, or `None` when it is.
    pub fn invalid_reason(&self) -> Option<String> {
        if !self.root_path.exists() {
            Some("path does not exist".to_string())
        } else if !self.root_path.is_dir() {
            Some("path is not a directory".to_string())
        } else if !self.marker_path().is_file() {
            Some(format!("{} not found", VENV_MARKER))
        } else if !self.python_executable().exists() {
            Some(format!(
                "interpreter not found at {}",
                self.python_executable().display()
            ))
        } else {
            None
        }
    }

    /// `home` key of `pyvenv.cfg`: directory of the originating interpreter.
    pub fn base_interpreter_home(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.marker_path()).ok()?;
        content.lines().find_map(|line| {
            let (key, value) = line.split_once('=')?;
            (key.trim() == "home").then(|| value.trim().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_env(root: &Path) {
        let py = venv_python(root);
        fs::create_dir_all(py.parent().unwrap()).unwrap();
        fs::write(&py, "").unwrap();
        fs::write(root.join(VENV_MARKER), "home = /opt/python/bin\nversion = 3.11.4\n").unwrap();
    }

    #[test]
    fn test_spec_env_path_and_package_cleanup() {
        let spec = EnvironmentSpec::new(
            "/tmp/proj",
            "BuildEnv",
            vec!["wheel".into(), "  ".into(), " black ".into()],
        )
        .unwrap();
        assert_eq!(spec.env_path(), PathBuf::from("/tmp/proj/BuildEnv"));
        assert_eq!(spec.extra_packages(), ["wheel", "black"]);
    }

    #[test]
    fn test_spec_rejects_bad_names() {
        for name in ["", "  ", ".", "..", "a/b", "../BuildEnv", "/abs"] {
            let err = EnvironmentSpec::new("/tmp/proj", name, vec![]).unwrap_err();
            assert!(matches!(err, SpecError::InvalidName { .. }), "{name}");
        }
        assert!(EnvironmentSpec::new("/tmp/proj", ".venv", vec![]).is_ok());
    }

    #[test]
    fn test_handle_probe_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = EnvironmentHandle::probe(tmp.path().join("BuildEnv"));
        assert!(!handle.exists);
        assert!(!handle.is_environment());
        assert_eq!(handle.invalid_reason().as_deref(), Some("path does not exist"));
    }

    #[test]
    fn test_handle_recognizes_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("BuildEnv");
        fake_env(&root);
        let handle = EnvironmentHandle::probe(&root);
        assert!(handle.exists);
        assert!(handle.is_environment());
        assert!(handle.invalid_reason().is_none());
        assert_eq!(handle.base_interpreter_home().as_deref(), Some("/opt/python/bin"));
    }

    #[test]
    fn test_handle_plain_directory_is_not_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = EnvironmentHandle::probe(tmp.path());
        assert!(handle.exists);
        assert!(!handle.is_environment());
        assert!(handle.invalid_reason().unwrap().contains("pyvenv.cfg"));
    }
}
