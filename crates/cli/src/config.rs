//! `fleetsync.toml` discovery and loading.
//!
//! Lookup order: `--config`, `./fleetsync.toml`, the user config dir
//! (`fleetsync/config.toml`), then built-in defaults. Every table is optional.

use std::path::{Path, PathBuf};

use fleetsync_client::ApiConfig;
use fleetsync_io::ExportConfig;
use fleetsync_recon::ReconConfig;

use crate::CliError;

pub const LOCAL_CONFIG: &str = "fleetsync.toml";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub recon: ReconConfig,
    pub api: ApiConfig,
    pub export: ExportConfig,
    /// Where the settings came from; `None` means built-in defaults.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        match discover(explicit) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("cannot read config {}: {e}", path.display())))?;
        let mut config = Self::from_toml(&text)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e.message)))?;
        config.source = Some(path.to_path_buf());
        log::info!("config: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, CliError> {
        Ok(Self {
            recon: ReconConfig::from_toml(text).map_err(|e| CliError::config(e.to_string()))?,
            api: ApiConfig::from_toml(text).map_err(|e| CliError::config(e.to_string()))?,
            export: ExportConfig::from_toml(text).map_err(CliError::config)?,
            source: None,
        })
    }

    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".into())
    }
}

/// First existing candidate. An explicit path is returned even when missing
/// so that reading it reports the error.
fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("fleetsync").join("config.toml"))
        .filter(|path| path.is_file())
}

/// `fleetsync validate`
pub fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = AppConfig::load(config_path.as_deref())?;
    let merge = &config.recon.merge;
    let pipeline = &config.recon.pipeline;

    eprintln!("config ok: {}", config.source_label());
    eprintln!(
        "  merge:    key '{}', similarity >= {}, conflict separator '{}'",
        merge.key_field, merge.similarity_threshold, merge.conflict_separator
    );
    eprintln!(
        "  pipeline: require '{}', labels from '{}' into '{}'",
        pipeline.required_field, pipeline.label_field, pipeline.color_field
    );
    eprintln!("  api:      {}", config.api.vehicles_url());
    eprintln!("  export:   {}", config.export.columns.join(", "));
    Ok(())
}
