//! Configuration management for `notesync.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                           |
//! |----------------|---------------------------------------------------|
//! | `[vault]`      | Vault and site directories, skip list, cleanup    |
//! | `[convert]`    | Content roots, front matter key groups, languages |
//! | `[[sections]]` | Generated section indexes                         |
//!
//! # Example
//!
//! ```toml
//! [vault]
//! source = "~/Documents/vault"
//! dest = "~/web/site"
//!
//! [convert]
//! roots = ["works", "thought"]
//! languages = ["kr"]
//!
//! [[sections]]
//! path = "works"
//! template = "section/works.html"
//! titles = { en = "works", kr = "작업들" }
//! ```

mod convert;
pub mod defaults;
mod error;
mod paths;
mod section;
mod vault;

pub use convert::ConvertConfig;
pub use error::ConfigError;
pub use paths::PathResolver;
pub use section::SectionConfig;
pub use vault::VaultConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Parsed `notesync.toml`, with paths made absolute once CLI overrides apply.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Where the config was (or will be) read from.
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default = "defaults::sections::all")]
    #[educe(Default = defaults::sections::all())]
    pub sections: Vec<SectionConfig>,
}

impl SyncConfig {
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str::<Self>(content).map_err(ConfigError::Parse)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Project root, `./` until the CLI sets one.
    pub fn get_root(&self) -> &Path {
        self.vault.root.as_deref().unwrap_or(Path::new("./"))
    }

    pub fn set_root(&mut self, path: &Path) {
        self.vault.root = Some(path.to_path_buf());
    }

    pub fn paths(&self) -> PathResolver<'_> {
        PathResolver::new(&self.vault.source, &self.vault.dest)
    }

    /// Apply `--root`, `--vault`, `--dest` and `sync --clean`, then anchor
    /// every directory at the root.
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        if let Some(vault) = &cli.vault {
            self.vault.source.clone_from(vault);
        }
        if let Some(dest) = &cli.dest {
            self.vault.dest.clone_from(dest);
        }
        if let Commands::Sync {
            clean: Some(clean), ..
        } = cli.command
        {
            self.vault.clean = clean;
        }

        let root = absolute(cli.root.as_deref().unwrap_or_else(|| self.get_root()));
        self.config_path = absolute(&root.join(&cli.config));
        self.vault.source = Self::resolve_dir(&root, &self.vault.source);
        self.vault.dest = Self::resolve_dir(&root, &self.vault.dest);
        self.set_root(&root);
    }

    /// `~` expanded, relative paths taken from `root`.
    fn resolve_dir(root: &Path, path: &Path) -> PathBuf {
        let expanded = path
            .to_str()
            .map_or_else(|| path.to_path_buf(), |s| shellexpand::tilde(s).into_owned().into());
        absolute(&root.join(expanded))
    }

    /// Reject configs the converter cannot run with.
    ///
    /// Directory checks only happen for `sync`; `convert` never touches them.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> { bail!(ConfigError::Invalid(reason)) };

        if self.convert.roots.is_empty() {
            return invalid("[convert.roots] must have at least one element".into());
        }
        if let Some(lang) = self
            .convert
            .locales()
            .find(|lang| lang.len() != 2 || !lang.bytes().all(|b| b.is_ascii_alphabetic()))
        {
            return invalid(format!("language `{lang}` must be a two-letter code"));
        }

        if !self.cli.is_some_and(Cli::is_sync) {
            return Ok(());
        }

        let (source, dest) = (&self.vault.source, &self.vault.dest);
        if !source.is_dir() {
            return invalid(format!("[vault.source] `{}` is not a directory", source.display()));
        }
        if dest.starts_with(source) || source.starts_with(dest) {
            return invalid("[vault.source] and [vault.dest] must not contain each other".into());
        }
        Ok(())
    }
}

/// Canonical form of `path` when it exists, else joined onto the working
/// directory.
fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config = SyncConfig::from_str(
            r#"
            [vault]
            source = "vault"
            dest = "site"

            [convert]
            roots = ["works"]
        "#,
        )
        .unwrap();

        assert_eq!(config.vault.source, PathBuf::from("vault"));
        assert_eq!(config.convert.roots, vec!["works".to_string()]);
        // untouched sections keep their defaults
        assert!(config.convert.is_kept("title"));
        assert!(!config.sections.is_empty());
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SyncConfig::from_str("[vault\nsource = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = SyncConfig::from_str("[serve]\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SyncConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SyncConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_roots() {
        let mut config = SyncConfig::default();
        config.convert.roots.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_long_language() {
        let mut config = SyncConfig::default();
        config.convert.languages = vec!["kor".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_dir_relative_to_root() {
        let root = Path::new("/nonexistent-notesync-root");
        assert_eq!(
            SyncConfig::resolve_dir(root, Path::new("site")),
            PathBuf::from("/nonexistent-notesync-root/site")
        );
        assert_eq!(
            SyncConfig::resolve_dir(root, Path::new("/abs/site")),
            PathBuf::from("/abs/site")
        );
    }

    #[test]
    fn test_default_config_serializes_and_reloads() {
        let text = toml::to_string_pretty(&SyncConfig::default()).unwrap();
        let reloaded = SyncConfig::from_str(&text).unwrap();
        assert_eq!(reloaded.convert.roots, SyncConfig::default().convert.roots);
        assert_eq!(reloaded.sections, SyncConfig::default().sections);
    }
}
