//! `[vault]` section configuration.
//!
//! Where notes are read from and where the site tree is written.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[vault]` section in notesync.toml.
///
/// # Example
/// ```toml
/// [vault]
/// source = "~/Documents/my-vault"
/// dest = "~/web/my-site"
/// skip = ["about/index.md"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::vault::root", skip_serializing)]
    #[educe(Default = defaults::vault::root())]
    pub root: Option<PathBuf>,

    /// Obsidian vault directory.
    #[serde(default = "defaults::vault::source")]
    #[educe(Default = defaults::vault::source())]
    pub source: PathBuf,

    /// Zola site directory (`content/` and `static/media/` are written here).
    #[serde(default = "defaults::vault::dest")]
    #[educe(Default = defaults::vault::dest())]
    pub dest: PathBuf,

    /// Vault path suffixes that are never copied (case-insensitive).
    #[serde(default = "defaults::vault::skip")]
    #[educe(Default = defaults::vault::skip())]
    pub skip: Vec<String>,

    /// Remove `content/` and `static/media/` before syncing.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub clean: bool,
}

impl VaultConfig {
    /// Whether a vault document is excluded from the sync.
    ///
    /// Section indexes (`_index*`) are always skipped; they are generated.
    pub fn is_skipped(&self, vault_path: &str) -> bool {
        let lower = vault_path.to_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(&lower);
        file_name.starts_with("_index")
            || self
                .skip
                .iter()
                .any(|suffix| lower.ends_with(&suffix.to_lowercase()))
    }
}
