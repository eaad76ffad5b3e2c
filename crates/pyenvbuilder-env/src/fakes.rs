//! In-memory `ProcessRunner` for tests (also built with the `test-util`
//! feature so the CLI crate can drive commands without a real interpreter).
//!
//! Answers interpreter probes, and materialises a minimal venv layout when
//! asked to run `-m venv` so builder and cleaner logic can run on a tempdir.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::interpreter::{venv_python, VENV_MARKER};
use crate::runner::{ProcessOutput, ProcessRunner};

pub struct FakeRunner {
    calls: Mutex<Vec<Vec<String>>>,
    python_version: String,
    missing_modules: HashSet<String>,
    failing_packages: HashSet<String>,
    xcode_tools: bool,
    spawn_fails: bool,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            python_version: "3.9.18".to_string(),
            missing_modules: HashSet::new(),
            failing_packages: HashSet::new(),
            xcode_tools: true,
            spawn_fails: false,
        }
    }

    pub fn with_python_version(mut self, version: &str) -> Self {
        self.python_version = version.to_string();
        self
    }

    pub fn without_module(mut self, module: &str) -> Self {
        self.missing_modules.insert(module.to_string());
        self
    }

    pub fn failing_package(mut self, package: &str) -> Self {
        self.failing_packages.insert(package.to_string());
        self
    }

    pub fn without_xcode_tools(mut self) -> Self {
        self.xcode_tools = false;
        self
    }

    pub fn unspawnable(mut self) -> Self {
        self.spawn_fails = true;
        self
    }

    /// Every invocation as `[program, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Invocations whose args contain `pip install`.
    pub fn pip_installs(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.windows(2).any(|w| w[0] == "pip" && w[1] == "install"))
            .collect()
    }

    fn ok(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            status_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn err(stderr: &str) -> ProcessOutput {
        ProcessOutput {
            status_code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn install(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput> {
        let mut packages: Vec<&String> = Vec::new();
        let mut skip_value = false;
        for arg in args.iter().skip_while(|a| a.as_str() != "install").skip(1) {
            if skip_value {
                skip_value = false;
            } else if arg.starts_with('-') {
                // flags without a value; every other option consumes the next arg
                skip_value = !matches!(arg.as_str(), "--upgrade" | "-U" | "--no-cache-dir")
                    && !arg.contains('=');
            } else {
                packages.push(arg);
            }
        }
        if let Some(bad) = packages.iter().find(|p| self.failing_packages.contains(p.as_str())) {
            return Ok(Self::err(&format!(
                "ERROR: No matching distribution found for {}",
                bad
            )));
        }
        // program is <env>/bin/python; record installs under <env>/lib/site-packages
        if let Some(env_root) = program.parent().and_then(Path::parent) {
            let site = env_root.join("lib").join("site-packages");
            std::fs::create_dir_all(&site)?;
            for p in packages {
                std::fs::write(site.join(p.as_str()), "")?;
            }
        }
        Ok(Self::ok("Successfully installed"))
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        if let Ok(mut calls) = self.calls.lock() {
            let mut call = vec![program.to_string_lossy().into_owned()];
            call.extend(args.iter().cloned());
            calls.push(call);
        }
        if self.spawn_fails {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        }

        if program == Path::new("xcode-select") {
            return Ok(if self.xcode_tools {
                Self::ok("/Library/Developer/CommandLineTools\n")
            } else {
                Self::err("xcode-select: error: unable to get active developer directory")
            });
        }

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        match argv.as_slice() {
            ["-c", script] if script.contains("version_info") => {
                Ok(Self::ok(&format!("{}\n", self.python_version)))
            }
            ["-c", "import venv"] => Ok(if self.missing_modules.contains("venv") {
                Self::err("ModuleNotFoundError: No module named 'venv'")
            } else {
                Self::ok("")
            }),
            ["-m", "pip", "--version"] => Ok(if self.missing_modules.contains("pip") {
                Self::err("No module named pip")
            } else {
                Self::ok("pip 23.0.1 from /usr/lib/python3/dist-packages/pip (python 3.9)\n")
            }),
            ["-m", "venv", target] => {
                let root = PathBuf::from(*target);
                let python = venv_python(&root);
                if let Some(bin) = python.parent() {
                    std::fs::create_dir_all(bin)?;
                }
                std::fs::write(&python, "")?;
                std::fs::write(
                    root.join(VENV_MARKER),
                    format!(
                        "home = /usr/bin\ninclude-system-site-packages = false\nversion = {}\n",
                        self.python_version
                    ),
                )?;
                Ok(Self::ok(""))
            }
            ["-m", "pip", "install", ..] => self.install(program, &args),
            _ => Ok(Self::err("unexpected invocation")),
        }
    }
}
