//! Form document structure
//!
//! The JSON document exchanged with the forms runtime. One document describes
//! one form: a summary `overview` of the root table, one entry per table that
//! has placed fields, and aggregate metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use webform_layout::Dependency;

use crate::importer::ImportError;

/// Top-level form document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    /// Document format version
    pub version: String,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub webform_name: String,
    #[serde(default)]
    pub overview: Vec<OverviewEntry>,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    #[serde(default)]
    pub hide_tabular_data: bool,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Extracts the version before full deserialization
#[derive(Deserialize)]
struct VersionProbe {
    version: Option<String>,
}

impl FormDocument {
    /// Current document format version
    pub const CURRENT_VERSION: &'static str = "2.0";

    /// Serialize with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a complete document, rejecting versions newer than
    /// `CURRENT_VERSION`.
    ///
    /// This is the strict entry point for documents this crate wrote itself.
    /// Hand-edited or partial documents go through [`crate::FormImporter`],
    /// which only requires a `tables` array.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ImportError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ImportError::Structure(format!("failed to read document: {e}")))?;

        let probe: VersionProbe = serde_json::from_slice(&bytes)?;
        if let Some(version) = probe.version.as_deref() {
            check_version(version)?;
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Fails when `version` has a higher major component than `CURRENT_VERSION`
pub(crate) fn check_version(version: &str) -> Result<(), ImportError> {
    let major = |v: &str| v.split('.').next().and_then(|m| m.trim().parse::<u32>().ok());
    match (major(version), major(FormDocument::CURRENT_VERSION)) {
        (Some(found), Some(supported)) if found > supported => Err(ImportError::UnsupportedVersion {
            document_version: version.to_string(),
            max_supported: FormDocument::CURRENT_VERSION.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Entry of the `overview` section.
///
/// A `Block` only ever wraps `Field` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OverviewEntry {
    Field(OverviewField),
    Block { elements: Vec<OverviewEntry> },
    /// Reference to a child table of the root
    Table { field: String, header: String },
}

/// A field as listed in the overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewField {
    /// Schema field name
    pub field: String,
    pub field_type: String,
    /// Display title
    pub header: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// One table with placed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEntry {
    /// Schema table name; imports resolve tables by this
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub multiple_records: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_root_table: Option<bool>,
    #[serde(default)]
    pub elements: Vec<TableElement>,
}

impl TableEntry {
    pub fn is_root(&self) -> bool {
        self.is_root_table.unwrap_or(false)
    }

    /// Field elements with block wrappers unwrapped, in document order
    pub fn fields(&self) -> impl Iterator<Item = &FieldElement> {
        self.elements.iter().flat_map(TableElement::fields)
    }
}

fn default_true() -> bool {
    true
}

/// Element of a table entry: a single field, or a block of fields sharing
/// one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TableElement {
    Field(FieldElement),
    Block {
        #[serde(default)]
        elements: Vec<TableElement>,
    },
}

impl TableElement {
    pub fn fields(&self) -> Box<dyn Iterator<Item = &FieldElement> + '_> {
        match self {
            TableElement::Field(field) => Box::new(std::iter::once(field)),
            TableElement::Block { elements } => Box::new(elements.iter().flat_map(TableElement::fields)),
        }
    }
}

/// A placed field as written to a table entry.
///
/// The exporter always writes the display attributes; type-specific ones
/// (`placeholder`, `level`, `autoIncrement`, `codelistItems`) only for
/// types they apply to. Every attribute is optional on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldElement {
    /// Schema field name; imports resolve fields by this
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_required_character: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist_items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_parent_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_parent_table: Option<String>,
}

/// Aggregate statistics over the placed fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub total_fields: usize,
    /// Distinct tables with at least one placed field
    pub total_tables: usize,
    /// Distinct field types in first-use order
    pub field_types: Vec<String>,
    pub has_advanced_fields: bool,
}

/// File name to save a form under.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`.
pub fn suggested_file_name(webform_name: &str) -> String {
    if webform_name.is_empty() {
        return "form-config.json".to_string();
    }
    let stem: String = webform_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{stem}.json")
}
