use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pyenvbuilder - isolated Python environments for Xcode build phases
#[derive(Parser, Debug)]
#[command(name = "pyenvbuilder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// JSON config file (default: $PYENVBUILDER_CONFIG or the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interpreter used to create environments (default: python3 on PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Minimum accepted interpreter version (default: from config or 3.6)
    #[arg(long, global = true, value_name = "VERSION")]
    pub min_python: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a virtual environment inside an existing directory
    Create {
        /// Directory that will contain the environment
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Environment directory name (default: from config or BuildEnv)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Remove and rebuild an existing environment
        #[arg(long, short = 'f')]
        force: bool,

        /// Extra package to install (repeatable)
        #[arg(long = "package", short = 'p', value_name = "PKG")]
        packages: Vec<String>,

        /// Requirements file, installed after config defaults and before --package entries
        #[arg(long, short = 'r', value_name = "FILE")]
        requirements: Option<PathBuf>,
    },

    /// Remove a virtual environment
    Cleanup {
        /// Environment directory to remove
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Delete even if the path is not a recognized environment or is active
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Set up an environment and Run Script helper for an Xcode project
    Xcode {
        /// Xcode project root (where requirements.txt lives)
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Environment directory name (default: from config or BuildEnv)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Remove and rebuild an existing environment
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "pyenvbuilder",
            "create",
            "/tmp/proj",
            "--name",
            "ToolsEnv",
            "--force",
            "-p",
            "wheel",
            "--package",
            "black==24.1.0",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                path,
                name,
                force,
                packages,
                requirements,
            } => {
                assert_eq!(path, PathBuf::from("/tmp/proj"));
                assert_eq!(name.as_deref(), Some("ToolsEnv"));
                assert!(force);
                assert_eq!(packages, vec!["wheel", "black==24.1.0"]);
                assert!(requirements.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_cleanup_defaults() {
        let cli = Cli::try_parse_from(["pyenvbuilder", "cleanup", "BuildEnv"]).unwrap();
        assert!(matches!(cli.command, Commands::Cleanup { force: false, .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pyenvbuilder",
            "xcode",
            ".",
            "--python",
            "/usr/bin/python3",
            "--min-python",
            "3.9",
        ])
        .unwrap();
        assert_eq!(cli.global.python, Some(PathBuf::from("/usr/bin/python3")));
        assert_eq!(cli.global.min_python.as_deref(), Some("3.9"));
        assert!(matches!(cli.command, Commands::Xcode { .. }));
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let err = Cli::try_parse_from(["pyenvbuilder", "create"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = Cli::try_parse_from(["pyenvbuilder", "frobnicate"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
