//! Webform builder settings
//!
//! Provides persisted settings, including:
//! - Export defaults (generator name, default form name, placeholder prefix,
//!   default codelist items)
//! - Platform directories for settings, saved forms and logs
//! - Logging setup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use webform_interchange::ExportOptions;

mod forms;
pub mod logging;
mod settings_file;

pub use forms::*;
pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebformSettings {
    pub export: ExportSettings,
}

impl WebformSettings {
    /// Load from the platform settings file; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|p| p.join("settings.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub generated_by: String,
    pub default_webform_name: String,
    pub placeholder_prefix: String,
    pub default_codelist_items: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            generated_by: options.generated_by,
            default_webform_name: options.default_webform_name,
            placeholder_prefix: options.placeholder_prefix,
            default_codelist_items: options.default_codelist_items,
        }
    }
}

impl ExportSettings {
    pub fn to_export_options(&self) -> ExportOptions {
        ExportOptions {
            generated_by: self.generated_by.clone(),
            default_webform_name: self.default_webform_name.clone(),
            placeholder_prefix: self.placeholder_prefix.clone(),
            default_codelist_items: self.default_codelist_items.clone(),
        }
    }
}
