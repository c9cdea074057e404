//! Settings file utilities

use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("webform"))
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .context("Could not determine data directory")
        .map(|p| p.join("webform"))
}

pub fn log_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .context("Could not determine local data directory")
        .map(|p| p.join("webform").join("logs"))
}

/// Default location for saved form documents
pub fn forms_dir() -> Result<PathBuf> {
    data_dir().map(|p| p.join("forms"))
}

pub fn ensure_directories() -> Result<()> {
    let dirs = [config_dir()?, data_dir()?, forms_dir()?, log_dir()?];
    for dir in dirs {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        }
    }
    Ok(())
}
