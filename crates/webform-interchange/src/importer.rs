//! Form import
//!
//! Restores placed fields from a form document. Tables and fields are
//! resolved by name against the active dataset; anything that does not
//! resolve is skipped, so a document can be loaded against a schema that has
//! drifted since it was written.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use webform_core::{Dataset, Field, SchemaCatalog, Table};
use webform_layout::{BlockId, FieldOverrides, FormBuilder, FormField};

use crate::document::{FieldElement, TableElement, check_version};
use crate::exporter::ExportOptions;

/// Errors during import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid form document: {0}")]
    Structure(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Form document version '{document_version}' is newer than the supported version '{max_supported}'"
    )]
    UnsupportedVersion {
        document_version: String,
        max_supported: String,
    },
}

/// A document table that resolved against the active dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTable {
    pub table_id: String,
    pub label: String,
    pub title: String,
    pub is_root: bool,
}

/// Result of an import
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Restored placements with fresh form ids
    pub fields: Vec<FormField>,
    /// Tables that received at least one field, in document order
    pub tables: Vec<ImportedTable>,
    pub webform_name: Option<String>,
    /// Table of the first restored field
    pub first_table_id: Option<String>,
    /// Field elements that were malformed or did not resolve
    pub skipped: usize,
}

impl ImportOutcome {
    pub fn restored(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One-line message for the user
    pub fn summary(&self) -> String {
        let mut summary = match self.fields.len() {
            0 => "No fields matched the current dataset".to_string(),
            1 => "Restored 1 field".to_string(),
            n => format!("Restored {n} fields"),
        };
        if self.skipped > 0 {
            summary.push_str(&format!(" ({} skipped)", self.skipped));
        }
        summary
    }
}

/// Restores placed fields against one dataset
pub struct FormImporter<'a> {
    catalog: &'a dyn SchemaCatalog,
    options: ExportOptions,
}

impl<'a> FormImporter<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog) -> Self {
        Self {
            catalog,
            options: ExportOptions::default(),
        }
    }

    /// Use the defaults a document was exported with, so generated values
    /// are not mistaken for overrides
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn import_str(&self, json: &str) -> Result<ImportOutcome, ImportError> {
        let document: Value = serde_json::from_str(json)?;
        self.import_value(&document)
    }

    /// Import from an already parsed document.
    ///
    /// Only a missing or non-array `tables` fails; every other problem is
    /// counted in [`ImportOutcome::skipped`].
    pub fn import_value(&self, document: &Value) -> Result<ImportOutcome, ImportError> {
        let tables = document
            .get("tables")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ImportError::Structure(
                    "expected a form configuration with a tables array".to_string(),
                )
            })?;

        if let Some(version) = document.get("version").and_then(Value::as_str) {
            if let Err(e) = check_version(version) {
                tracing::warn!(error = %e, "importing best-effort");
            }
        }

        let mut outcome = ImportOutcome {
            webform_name: document
                .get("webformName")
                .and_then(Value::as_str)
                .map(str::to_string),
            ..ImportOutcome::default()
        };
        let mut next_block: HashMap<String, BlockId> = HashMap::new();

        for (index, table) in tables.iter().enumerate() {
            self.import_table(index, table, &mut next_block, &mut outcome);
        }

        tracing::info!(
            restored = outcome.fields.len(),
            skipped = outcome.skipped,
            "imported form"
        );
        Ok(outcome)
    }

    fn import_table(
        &self,
        index: usize,
        table: &Value,
        next_block: &mut HashMap<String, BlockId>,
        outcome: &mut ImportOutcome,
    ) {
        let Some(raw_elements) = table.get("elements").and_then(Value::as_array) else {
            tracing::debug!(index, "table entry without elements");
            return;
        };

        let elements: Vec<TableElement> = raw_elements
            .iter()
            .enumerate()
            .filter_map(|(position, raw)| match serde_json::from_value(raw.clone()) {
                Ok(element) => Some(element),
                Err(e) => {
                    tracing::warn!(table = index, position, error = %e, "skipping malformed element");
                    outcome.skipped += 1;
                    None
                }
            })
            .collect();

        let name = table.get("name").and_then(Value::as_str).unwrap_or_default();
        let Some(schema_table) = self.catalog.table_by_name(name) else {
            let missed: usize = elements.iter().map(|e| e.fields().count()).sum();
            tracing::debug!(table = name, missed, "table not in dataset");
            outcome.skipped += missed;
            return;
        };

        let restored_before = outcome.fields.len();
        for element in &elements {
            self.import_group(schema_table, element.fields(), next_block, outcome);
        }

        if outcome.fields.len() > restored_before
            && !outcome.tables.iter().any(|t| t.table_id == schema_table.id)
        {
            let text = |key: &str| {
                table
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            outcome.tables.push(ImportedTable {
                table_id: schema_table.id.clone(),
                label: text("label"),
                title: text("title"),
                is_root: table
                    .get("isRootTable")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            });
        }
    }

    /// Place a group of elements into one fresh block of `table`
    fn import_group<'e>(
        &self,
        table: &Table,
        group: impl Iterator<Item = &'e FieldElement>,
        next_block: &mut HashMap<String, BlockId>,
        outcome: &mut ImportOutcome,
    ) {
        let mut block_id = None;
        for element in group {
            let Some(field) = table.field_by_name(&element.name) else {
                tracing::debug!(table = %table.name, field = %element.name, "field not in dataset");
                outcome.skipped += 1;
                continue;
            };
            if outcome
                .fields
                .iter()
                .any(|f| f.table_id == table.id && f.field_id() == field.id)
            {
                tracing::debug!(table = %table.name, field = %element.name, "field listed twice");
                outcome.skipped += 1;
                continue;
            }

            let block_id = *block_id.get_or_insert_with(|| {
                let next = next_block.entry(table.id.clone()).or_insert(0);
                *next += 1;
                *next
            });
            outcome.fields.push(self.restore(&table.id, field, element, block_id));
            outcome
                .first_table_id
                .get_or_insert_with(|| table.id.clone());
        }
    }

    /// Build a placement from a schema field and the attributes the document
    /// carries for it. Values equal to what the exporter would derive on its
    /// own are not kept as overrides.
    fn restore(&self, table_id: &str, field: &Field, element: &FieldElement, block_id: BlockId) -> FormField {
        let mut schema = field.clone();
        if let Some(field_type) = element.field_type.as_deref().filter(|t| !t.is_empty()) {
            schema.field_type = field_type.to_string();
        }

        let codelist_default = schema
            .codelist_items
            .clone()
            .unwrap_or_else(|| self.options.default_codelist_items.clone());
        let overrides = FieldOverrides {
            title: differs(non_empty(&element.title), schema.name.clone()),
            tooltip: differs(
                non_empty(&element.tooltip),
                schema.description.clone().unwrap_or_default(),
            ),
            placeholder: differs(
                non_empty(&element.placeholder),
                self.options.default_placeholder(&schema.name),
            ),
            required: differs(element.show_required_character, schema.required),
            read_only: differs(element.read_only, schema.read_only.unwrap_or(false)),
            auto_increment: differs(element.auto_increment, schema.auto_increment.unwrap_or(false)),
            is_visible: differs(element.is_visible, schema.visible_by_default()),
            level: differs(element.level, schema.level.unwrap_or(1)),
            codelist_items: differs(element.codelist_items.clone(), codelist_default),
        };

        let mut restored = FormField::new(schema, table_id, block_id);
        restored.overrides = overrides;
        restored.is_primary = element.is_primary.unwrap_or(false);
        restored.dependency = element.dependency.clone();
        restored.reference_parent_field = element.reference_parent_field.clone();
        restored.reference_parent_table = element.reference_parent_table.clone();
        restored
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn differs<T: PartialEq>(value: Option<T>, default: T) -> Option<T> {
    value.filter(|v| *v != default)
}

/// Import a document into a builder, against its active dataset.
///
/// The builder is only touched once the document parsed and has a `tables`
/// array. Its placed fields are then replaced, tables that received fields
/// and are missing from the tree are added, and the first restored table is
/// selected.
pub fn import_into(builder: &mut FormBuilder, json: &str) -> Result<ImportOutcome, ImportError> {
    import_into_with(builder, json, &ExportOptions::default())
}

/// [`import_into`] for documents exported with non-default options
pub fn import_into_with(
    builder: &mut FormBuilder,
    json: &str,
    options: &ExportOptions,
) -> Result<ImportOutcome, ImportError> {
    let outcome = {
        let empty = Dataset::default();
        let dataset = builder.dataset().unwrap_or(&empty);
        FormImporter::new(dataset)
            .with_options(options.clone())
            .import_str(json)?
    };

    // Roots first: adding a root discards tables added before it.
    let (roots, children): (Vec<_>, Vec<_>) = outcome.tables.iter().partition(|t| t.is_root);
    for table in roots.into_iter().chain(children) {
        let added = if table.is_root && !builder.tree().has_root() {
            builder.add_root_table(&table.table_id, &table.label, &table.title)
        } else {
            builder.add_child_table(&table.table_id, &table.label, &table.title)
        };
        if let Err(e) = added {
            tracing::warn!(table_id = %table.table_id, error = %e, "could not restore table node");
        }
    }

    builder.replace_fields(
        outcome.fields.clone(),
        outcome.webform_name.clone(),
        outcome.first_table_id.as_deref(),
    );
    Ok(outcome)
}
