//! `pyenvbuilder cleanup`

use std::path::Path;

use anyhow::Result;
use pyenvbuilder_env::EnvironmentCleaner;

use super::resolve_path;

pub fn cmd_cleanup(path: &Path, force: bool) -> Result<()> {
    let target = resolve_path(path);
    let existed = target.symlink_metadata().is_ok();

    EnvironmentCleaner::new().cleanup(&target, force)?;

    if existed {
        eprintln!("✓ Removed {}", target.display());
    } else {
        eprintln!("Nothing to remove at {}", target.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::exit_code;
    use std::fs;

    #[test]
    fn test_cleanup_plain_directory_needs_force() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Sources");
        fs::create_dir_all(&dir).unwrap();

        let err = cmd_cleanup(&dir, false).unwrap_err();
        assert_eq!(exit_code(&err), 5);
        assert!(dir.exists());

        cmd_cleanup(&dir, true).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_force_cleanup_of_missing_path_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        cmd_cleanup(&tmp.path().join("BuildEnv"), true).unwrap();
    }
}
