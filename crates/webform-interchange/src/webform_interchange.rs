//! Form document interchange
//!
//! Serializes a form layout into the versioned JSON document consumed by the
//! forms runtime, and restores placed fields from such a document against
//! whatever dataset schema is currently loaded.
//!
//! # Architecture
//!
//! ```text
//! TableTree + BlockLayout → FormExporter → FormDocument (JSON)
//!                                              ↓
//!                  placed fields ← FormImporter ← SchemaCatalog lookups by name
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let document = export_form(&builder, &ExportOptions::default());
//! let json = document.to_json_pretty()?;
//!
//! let outcome = import_into(&mut other_builder, &json)?;
//! println!("{}", outcome.summary());
//! ```

mod document;
mod exporter;
mod importer;

pub use document::*;
pub use exporter::{ExportError, ExportOptions, FormExporter, export_form};
pub use importer::{
    FormImporter, ImportError, ImportOutcome, ImportedTable, import_into, import_into_with,
};
