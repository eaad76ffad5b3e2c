//! `pyenvbuilder xcode`

use std::path::Path;

use anyhow::Result;
use pyenvbuilder_env::XcodeIntegrator;

use super::{resolve_path, Context};

pub fn cmd_xcode(ctx: &Context, project_dir: &Path, name: Option<String>, force: bool) -> Result<()> {
    let project = resolve_path(project_dir);
    let env_name = name.unwrap_or_else(|| ctx.config.env_name.clone());

    eprintln!("🔨 Setting up Python environment for Xcode project {}", project.display());
    let integrator = XcodeIntegrator::new(ctx.builder(), env_name, ctx.config.requirements.clone());
    let setup = integrator.setup_project(&project, force)?;

    eprintln!("✓ Environment ready: {}", setup.handle.root_path.display());
    if !setup.packages.is_empty() {
        eprintln!("   Packages: {}", setup.packages.join(", "));
    }
    eprintln!("✓ Build script: {}", setup.script_path.display());
    eprintln!();
    for line in setup.hints() {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;
    use crate::exit::exit_code;
    use pyenvbuilder_env::fakes::FakeRunner;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn test_xcode_sets_up_project() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "six\n").unwrap();
        let runner = Arc::new(FakeRunner::new());

        cmd_xcode(&context(runner.clone()), tmp.path(), None, false).unwrap();

        assert!(tmp.path().join("BuildEnv").join("pyvenv.cfg").is_file());
        assert!(tmp.path().join("setup_python_env.sh").is_file());
        assert!(runner
            .pip_installs()
            .iter()
            .any(|c| c.last().map(String::as_str) == Some("six")));
    }

    #[test]
    fn test_xcode_missing_project_is_preflight_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let err = cmd_xcode(
            &context(Arc::new(FakeRunner::new())),
            &tmp.path().join("NoSuchApp"),
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }
}
