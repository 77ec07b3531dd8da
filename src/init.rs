//! Project initialization.
//!
//! Writes a `notesync.toml` with every default spelled out.

use crate::{config::SyncConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Write the default configuration to `config.config_path`.
pub fn new_config(config: &SyncConfig) -> Result<()> {
    let path = &config.config_path;
    if path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            path.display()
        );
    }

    write_default_config(path)?;
    log!("init"; "wrote {}", path.display());
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(&SyncConfig::default())?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_config_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        let mut config = SyncConfig::default();
        config.config_path = dir.path().join("notesync.toml");

        new_config(&config).unwrap();

        let loaded = SyncConfig::from_path(&config.config_path).unwrap();
        assert_eq!(loaded.convert.roots, config.convert.roots);
        assert_eq!(loaded.vault.source, config.vault.source);
    }

    #[test]
    fn test_new_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut config = SyncConfig::default();
        config.config_path = dir.path().join("notesync.toml");
        fs::write(&config.config_path, "# mine").unwrap();

        assert!(new_config(&config).is_err());
        assert_eq!(fs::read_to_string(&config.config_path).unwrap(), "# mine");
    }
}
