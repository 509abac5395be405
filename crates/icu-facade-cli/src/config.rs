use std::fs;
use std::path::Path;

use icu_facade_core::Locale;
use serde::Deserialize;

use crate::command_locale::parse_locale_input;
use crate::error::CliError;

pub const DEFAULT_CONFIG_PATH: &str = "icu-facade.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub default_locale: String,
    pub install_dir: String,
    pub assets_path: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        let install_dir = if cfg!(windows) { "C:/icu" } else { "/tmp/icu" };
        Self {
            default_locale: "en".to_string(),
            install_dir: install_dir.to_string(),
            assets_path: "icu-assets.toml".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<CliConfig, CliError> {
    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_config_or_default(path: &Path) -> Result<CliConfig, CliError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(CliConfig::default())
    }
}

/// The `--locale` argument when given, else the configured default.
pub fn resolve_locale(locale: Option<&str>, config_path: &Path) -> Result<Locale, CliError> {
    match locale {
        Some(input) => parse_locale_input(input),
        None => parse_locale_input(&load_config_or_default(config_path)?.default_locale),
    }
}
