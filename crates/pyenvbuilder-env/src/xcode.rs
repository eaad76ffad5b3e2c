//! Xcode project integration: conventional environment folder, optional
//! `requirements.txt`, and a Run Script build phase helper.
//!
//! No Xcode protocol is involved; this is naming and defaults layered on
//! `EnvironmentBuilder`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::env::builder::EnvironmentBuilder;
use crate::env::{EnvironmentHandle, EnvironmentSpec};
use crate::error::BuildError;

/// Dependency declaration read from the project root when present.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Helper script written next to the project for the Run Script phase.
pub const BUILD_SCRIPT: &str = "setup_python_env.sh";

/// Result of a successful project setup.
#[derive(Debug, Clone)]
pub struct XcodeSetup {
    pub handle: EnvironmentHandle,
    pub script_path: PathBuf,
    pub packages: Vec<String>,
}

impl XcodeSetup {
    /// Lines telling the user how to wire the environment into Xcode.
    pub fn hints(&self) -> Vec<String> {
        vec![
            "Add a \"Run Script\" build phase with:".to_string(),
            format!("    \"${{SRCROOT}}/{}\"", BUILD_SCRIPT),
            "Scripts in later phases can call the environment's interpreter directly:".to_string(),
            format!("    PYTHON=\"{}\"", self.handle.python_executable().display()),
        ]
    }
}

pub struct XcodeIntegrator {
    builder: EnvironmentBuilder,
    env_name: String,
    default_packages: Vec<String>,
}

impl XcodeIntegrator {
    /// `default_packages` are installed when the project has no `requirements.txt`.
    pub fn new(
        builder: EnvironmentBuilder,
        env_name: impl Into<String>,
        default_packages: Vec<String>,
    ) -> Self {
        Self {
            builder,
            env_name: env_name.into(),
            default_packages,
        }
    }

    pub fn setup_project(&self, project_dir: &Path, force: bool) -> Result<XcodeSetup, BuildError> {
        let requirements = project_dir.join(REQUIREMENTS_FILE);
        let packages = if requirements.is_file() {
            let packages = read_requirements(&requirements).map_err(|source| BuildError::Read {
                path: requirements.clone(),
                source,
            })?;
            tracing::info!(
                file = %requirements.display(),
                count = packages.len(),
                "Using project requirements"
            );
            packages
        } else {
            self.default_packages.clone()
        };

        let spec = EnvironmentSpec::new(project_dir, self.env_name.as_str(), packages)?;
        let handle = self.builder.create(&spec, force)?;
        let script_path = write_build_script(project_dir, spec.name())?;
        tracing::info!(script = %script_path.display(), "Created Xcode build script");

        Ok(XcodeSetup {
            handle,
            script_path,
            packages: spec.extra_packages().to_vec(),
        })
    }
}

/// Requirement entries in file order; blank lines and comments are skipped.
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// A `#` starts a comment at line start or after whitespace.
fn strip_comment(line: &str) -> &str {
    let mut after_space = true;
    for (idx, c) in line.char_indices() {
        if c == '#' && after_space {
            return &line[..idx];
        }
        after_space = c.is_whitespace();
    }
    line
}

/// Options whose value is a path pip resolves against its working directory.
const PATH_OPTIONS: &[&str] = &[
    "-r",
    "--requirement",
    "-c",
    "--constraint",
    "-e",
    "--editable",
];

/// Read a requirements file. Relative paths in `-r`, `-c` and `-e` lines are
/// anchored to the file's directory so pip finds them from any working directory.
pub fn read_requirements(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(parse_requirements(&content)
        .iter()
        .map(|entry| anchor_option_paths(entry, base))
        .collect())
}

/// Rewrite relative path values of `PATH_OPTIONS` in one entry against `base`.
/// Plain specifiers, URLs and absolute paths are returned unchanged.
pub fn anchor_option_paths(entry: &str, base: &Path) -> String {
    if !entry.starts_with('-') {
        return entry.to_string();
    }
    let mut out: Vec<String> = Vec::new();
    let mut expects_path = false;
    for token in entry.split_whitespace() {
        if expects_path {
            out.push(anchor(token, base));
            expects_path = false;
        } else if PATH_OPTIONS.contains(&token) {
            out.push(token.to_string());
            expects_path = true;
        } else if let Some((opt, value)) = token.split_once('=') {
            if PATH_OPTIONS.contains(&opt) {
                out.push(format!("{}={}", opt, anchor(value, base)));
            } else {
                out.push(token.to_string());
            }
        } else {
            out.push(token.to_string());
        }
    }
    out.join(" ")
}

fn anchor(value: &str, base: &Path) -> String {
    if value.contains("://") || value.starts_with("git+") || Path::new(value).is_absolute() {
        value.to_string()
    } else {
        base.join(value).display().to_string()
    }
}

fn build_script(env_name: &str) -> String {
    format!(
        r#"#!/bin/bash
# Generated by pyenvbuilder for an Xcode "Run Script" build phase.
set -euo pipefail

SCRIPT_DIR="$( cd "$( dirname "${{BASH_SOURCE[0]}}" )" && pwd )"
ENV_DIR="$SCRIPT_DIR/{env_name}"

if [ ! -d "$ENV_DIR" ]; then
    echo "Creating Python virtual environment..."
    python3 -m venv "$ENV_DIR"
    "$ENV_DIR/bin/python" -m pip install --upgrade pip
fi

source "$ENV_DIR/bin/activate"

if [ -f "$SCRIPT_DIR/{requirements}" ]; then
    echo "Installing requirements..."
    python -m pip install -r "$SCRIPT_DIR/{requirements}"
fi
"#,
        env_name = env_name,
        requirements = REQUIREMENTS_FILE,
    )
}

fn write_build_script(project_dir: &Path, env_name: &str) -> Result<PathBuf, BuildError> {
    let path = project_dir.join(BUILD_SCRIPT);
    let write_err = |source| BuildError::Write {
        path: path.clone(),
        source,
    };
    fs::write(&path, build_script(env_name)).map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(write_err)?;
    }
    Ok(path)
}
