//! Form document files

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use webform_interchange::{FormDocument, FormExporter, suggested_file_name};

/// Write `document` into `dir` under the name derived from its form name.
///
/// Returns the written path. An existing file of that name is replaced.
pub fn save_form(document: &FormDocument, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;

    let path = dir.join(suggested_file_name(&document.webform_name));
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    FormExporter::write_json(document, BufWriter::new(file))
        .with_context(|| format!("Failed to write form to {:?}", path))?;

    tracing::info!(path = %path.display(), "saved form");
    Ok(path)
}

/// Read a saved form as text, for [`webform_interchange::import_into`]
pub fn read_form(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read form from {:?}", path))
}

/// Saved forms in `dir`, sorted by file name
pub fn list_forms(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut forms = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            forms.push(path);
        }
    }
    forms.sort();
    Ok(forms)
}
