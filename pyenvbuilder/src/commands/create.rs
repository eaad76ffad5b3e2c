//! `pyenvbuilder create`

use std::path::{Path, PathBuf};

use anyhow::Result;
use pyenvbuilder_env::xcode::read_requirements;
use pyenvbuilder_env::EnvironmentSpec;

use super::{resolve_path, Context};
use crate::exit::InvalidArguments;

pub fn cmd_create(
    ctx: &Context,
    path: &Path,
    name: Option<String>,
    force: bool,
    packages: Vec<String>,
    requirements: Option<PathBuf>,
) -> Result<()> {
    let target = resolve_path(path);
    let name = name.unwrap_or_else(|| ctx.config.env_name.clone());
    let requirements = requirements.map(|r| resolve_path(&r));
    let packages = collect_packages(&ctx.config.requirements, requirements.as_deref(), packages)?;
    let spec = EnvironmentSpec::new(target, name, packages)?;

    eprintln!("🐍 Creating Python environment at {}", spec.env_path().display());
    if !spec.extra_packages().is_empty() {
        eprintln!("   Packages: {}", spec.extra_packages().join(", "));
    }

    let handle = ctx.builder().create(&spec, force)?;

    eprintln!("✓ Environment ready: {}", handle.root_path.display());
    eprintln!("   Interpreter: {}", handle.python_executable().display());
    println!("{}", handle.root_path.display());
    Ok(())
}

/// Config defaults, then the requirements file, then `--package` entries.
fn collect_packages(
    defaults: &[String],
    requirements: Option<&Path>,
    packages: Vec<String>,
) -> Result<Vec<String>> {
    let mut all = defaults.to_vec();
    if let Some(file) = requirements {
        let entries = read_requirements(file).map_err(|e| {
            InvalidArguments(format!(
                "Cannot read requirements file {}: {}",
                file.display(),
                e
            ))
        })?;
        all.extend(entries);
    }
    all.extend(packages);
    Ok(all)
}
