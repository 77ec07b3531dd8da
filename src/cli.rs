//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Obsidian vault to Zola content synchronizer
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: notesync.toml)
    #[arg(short = 'C', long, default_value = "notesync.toml")]
    pub config: PathBuf,

    /// Vault directory (overrides `[vault.source]`)
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Zola site directory (overrides `[vault.dest]`)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default notesync.toml into the project root
    Init,

    /// Convert every note of the vault into the site's content tree
    Sync {
        /// Remove `content/` and `static/media/` before syncing
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        clean: Option<bool>,

        /// Write a JSON manifest of converted documents to this path
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Convert a single note and print the result to stdout
    Convert {
        /// Note file to convert
        file: PathBuf,

        /// Vault-relative path used to resolve links (default: derived from `file`)
        #[arg(short, long)]
        path: Option<String>,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init)
    }
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync { .. })
    }
}
