//! `netstage init` — scaffold a netstage.toml.

use std::path::Path;

use anyhow::{Context, Result, bail};
use netstage_core::StagingConfig;

pub fn run(path: &Path) -> Result<()> {
    let output = path.join("netstage.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    std::fs::write(&output, StagingConfig::scaffold().to_toml_string()?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();

        let config = StagingConfig::from_file(&dir.path().join("netstage.toml")).unwrap();
        assert_eq!(config, StagingConfig::default());
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
        assert!(run(dir.path()).is_err());
    }
}
