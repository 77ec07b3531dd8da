//! notesync - Obsidian vault to Zola content converter.

mod cli;
mod config;
mod convert;
mod init;
mod logger;
mod sections;
mod sync;
mod utils;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::SyncConfig;
use init::new_config;
use std::{
    fs,
    io::{Write, stdout},
    path::Path,
};
use sync::sync_vault;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SyncConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Init => new_config(config),
        Commands::Sync { manifest, .. } => sync_vault(config, manifest.as_deref()).map(|_| ()),
        Commands::Convert { file, path } => convert_file(config, file, path.as_deref()),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SyncConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SyncConfig::from_path(&config_path)?
    } else {
        SyncConfig::default()
    };
    config.update_with_cli(cli);

    // `convert` works without a config file, on the defaults
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) if cli.is_sync() => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

/// Convert one note and print it to stdout.
///
/// The vault path comes from `--path`, else from the file's location inside
/// the vault, else from its file name alone.
fn convert_file(config: &SyncConfig, file: &Path, vault_path: Option<&str>) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let vault_path = match vault_path {
        Some(path) => path.to_owned(),
        None => {
            let absolute = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
            match config.paths().vault_path_of(&absolute) {
                Some(path) => path,
                None => file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_owned)
                    .ok_or_else(|| anyhow!("Invalid file name: {}", file.display()))?,
            }
        }
    };

    let conversion = convert::convert(&text, &vault_path, &config.convert);
    let mut out = stdout().lock();
    out.write_all(conversion.text.as_bytes())?;
    out.flush()?;
    Ok(())
}
