use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::assets::{AssetError, AssetTarget, load_asset_table, verify_checksum};
use crate::config::load_config_or_default;
use crate::error::CliError;

#[derive(Debug, Error)]
pub enum VerifyCommandError {
    #[error(transparent)]
    Config(#[from] CliError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub archive: Option<PathBuf>,
    pub target: Option<String>,
    pub config_path: PathBuf,
}

/// Verifies a downloaded release archive for the selected platform and
/// returns the name of the verified asset. Without `--archive`, the archive
/// is looked up in the configured install directory.
pub fn run_verify(options: &VerifyOptions) -> Result<String, VerifyCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let table = load_asset_table(Path::new(&config.assets_path))?;
    let target = match &options.target {
        Some(triple) => AssetTarget::from_triple(triple)?,
        None => AssetTarget::current()?,
    };
    let file = target.file_name(&table.version);
    let expected = table.checksum(&file)?;
    let archive = options
        .archive
        .clone()
        .unwrap_or_else(|| Path::new(&config.install_dir).join(&file));
    info!(asset = %file, url = %table.url(&file), "verifying release archive");
    verify_checksum(&archive, expected)?;
    Ok(file)
}
