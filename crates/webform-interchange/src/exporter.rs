//! Form export
//!
//! Turns a table tree and a block layout into a [`FormDocument`]. Export is a
//! pure function of its inputs apart from the capture timestamp, which
//! [`FormExporter::export_at`] takes explicitly.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use std::io::Write;
use thiserror::Error;
use webform_core::{Dataset, FieldKind, SchemaCatalog};
use webform_layout::{Block, BlockLayout, FormBuilder, FormField, TableTree, TreeNode};

use crate::document::{
    DocumentMetadata, FieldElement, FormDocument, OverviewEntry, OverviewField, TableElement,
    TableEntry,
};

/// Errors during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Values the exporter fills in when neither an override nor the schema
/// provides one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Written to `generatedBy`
    pub generated_by: String,
    /// Used when the form has no name
    pub default_webform_name: String,
    /// Default placeholder is `"<prefix> <field name in lowercase>"`
    pub placeholder_prefix: String,
    /// Codelist items for choice fields without any
    pub default_codelist_items: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            generated_by: "R3 WebForm Builder Enhanced".to_string(),
            default_webform_name: "Untitled Webform".to_string(),
            placeholder_prefix: "Enter".to_string(),
            default_codelist_items: vec![
                "Option 1".to_string(),
                "Option 2".to_string(),
                "Option 3".to_string(),
            ],
        }
    }
}

impl ExportOptions {
    pub fn with_generated_by(mut self, generated_by: impl Into<String>) -> Self {
        self.generated_by = generated_by.into();
        self
    }

    pub fn with_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }

    /// Placeholder written for a text-like field without a custom one
    pub fn default_placeholder(&self, field_name: &str) -> String {
        format!("{} {}", self.placeholder_prefix, field_name.to_lowercase())
    }
}

/// Builds form documents
#[derive(Debug, Clone, Default)]
pub struct FormExporter {
    options: ExportOptions,
}

impl FormExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export with the current time as `generatedAt`
    pub fn export(
        &self,
        tree: &TableTree,
        layout: &BlockLayout,
        webform_name: &str,
        catalog: &dyn SchemaCatalog,
    ) -> FormDocument {
        self.export_at(tree, layout, webform_name, catalog, Utc::now())
    }

    pub fn export_at(
        &self,
        tree: &TableTree,
        layout: &BlockLayout,
        webform_name: &str,
        catalog: &dyn SchemaCatalog,
        generated_at: DateTime<Utc>,
    ) -> FormDocument {
        let tables = self.tables(tree, layout, catalog);
        let metadata = metadata(layout);

        tracing::info!(
            fields = metadata.total_fields,
            tables = tables.len(),
            "exported form"
        );

        FormDocument {
            version: FormDocument::CURRENT_VERSION.to_string(),
            generated_by: self.options.generated_by.clone(),
            generated_at,
            webform_name: if webform_name.is_empty() {
                self.options.default_webform_name.clone()
            } else {
                webform_name.to_string()
            },
            overview: overview(tree, layout),
            tables,
            hide_tabular_data: false,
            metadata,
        }
    }

    /// Serialize a document as pretty-printed JSON
    pub fn to_json(document: &FormDocument) -> Result<String, ExportError> {
        Ok(document.to_json_pretty()?)
    }

    /// Write a document as pretty-printed JSON
    pub fn write_json<W: Write>(document: &FormDocument, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;
        Ok(())
    }

    /// One entry per tree node with placed fields, depth-first
    fn tables(&self, tree: &TableTree, layout: &BlockLayout, catalog: &dyn SchemaCatalog) -> Vec<TableEntry> {
        let mut tables = Vec::new();
        let mut seen = IndexSet::new();
        for (index, node) in tree.nodes().iter().enumerate() {
            let is_root = tree.has_root() && index == 0;
            self.collect_tables(node, is_root, layout, catalog, &mut seen, &mut tables);
        }
        tables
    }

    fn collect_tables(
        &self,
        node: &TreeNode,
        is_root: bool,
        layout: &BlockLayout,
        catalog: &dyn SchemaCatalog,
        seen: &mut IndexSet<String>,
        out: &mut Vec<TableEntry>,
    ) {
        if seen.insert(node.table_id.clone()) {
            let blocks = layout.blocks_for_table(&node.table_id);
            if !blocks.is_empty() {
                let name = catalog
                    .table_by_id(&node.table_id)
                    .map_or_else(|| node.table_id.clone(), |t| t.name.clone());
                out.push(TableEntry {
                    name,
                    label: node.label.clone(),
                    title: node.title.clone(),
                    multiple_records: false,
                    is_visible: !is_root,
                    is_root_table: is_root.then_some(true),
                    elements: blocks.iter().map(|b| self.table_element(b)).collect(),
                });
            }
        }
        for child in &node.children {
            self.collect_tables(child, false, layout, catalog, seen, out);
        }
    }

    fn table_element(&self, block: &Block<'_>) -> TableElement {
        match block.fields.as_slice() {
            [single] => TableElement::Field(self.field_element(single)),
            fields => TableElement::Block {
                elements: fields
                    .iter()
                    .map(|f| TableElement::Field(self.field_element(f)))
                    .collect(),
            },
        }
    }

    fn field_element(&self, field: &FormField) -> FieldElement {
        let kind = FieldKind::of(field.field_type());
        let overrides = &field.overrides;

        FieldElement {
            name: field.name().to_string(),
            field_type: Some(field.field_type().to_string()),
            title: Some(field.title().to_string()),
            tooltip: Some(field.tooltip().to_string()),
            is_primary: Some(field.is_primary),
            show_required_character: Some(field.is_required()),
            is_visible: Some(field.is_visible()),
            read_only: Some(field.is_read_only()),
            placeholder: kind.text_like.then(|| {
                overrides
                    .placeholder
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| self.options.default_placeholder(field.name()))
            }),
            level: kind.label.then(|| field.level()),
            auto_increment: kind.numeric.then(|| field.is_auto_increment()),
            codelist_items: kind.choice.then(|| {
                field
                    .codelist_items()
                    .map(<[String]>::to_vec)
                    .unwrap_or_else(|| self.options.default_codelist_items.clone())
            }),
            dependency: field.dependency.clone(),
            reference_parent_field: field.reference_parent_field.clone(),
            reference_parent_table: field.reference_parent_table.clone(),
        }
    }
}

/// Root table fields grouped by block, then one `TABLE` entry per root
/// child. Without a root, the fields of the selected table in placement
/// order.
fn overview(tree: &TableTree, layout: &BlockLayout) -> Vec<OverviewEntry> {
    let Some(root) = tree.root() else {
        return tree
            .selected()
            .map(|table_id| {
                layout
                    .fields_for_table(table_id)
                    .into_iter()
                    .map(overview_field)
                    .collect()
            })
            .unwrap_or_default();
    };

    let mut entries: Vec<OverviewEntry> = layout
        .blocks_for_table(&root.table_id)
        .iter()
        .map(|block| match block.fields.as_slice() {
            [single] => overview_field(single),
            fields => OverviewEntry::Block {
                elements: fields.iter().copied().map(overview_field).collect(),
            },
        })
        .collect();

    entries.extend(root.children.iter().map(|child| OverviewEntry::Table {
        field: child.label.clone(),
        header: child.title.clone(),
    }));
    entries
}

fn overview_field(field: &FormField) -> OverviewEntry {
    OverviewEntry::Field(OverviewField {
        field: field.name().to_string(),
        field_type: field.field_type().to_string(),
        header: field.title().to_string(),
        is_primary: field.is_primary,
    })
}

fn metadata(layout: &BlockLayout) -> DocumentMetadata {
    let fields = layout.fields();
    let tables: IndexSet<&str> = fields.iter().map(|f| f.table_id.as_str()).collect();
    let field_types: IndexSet<&str> = fields.iter().map(FormField::field_type).collect();

    DocumentMetadata {
        total_fields: fields.len(),
        total_tables: tables.len(),
        field_types: field_types.into_iter().map(str::to_string).collect(),
        has_advanced_fields: fields
            .iter()
            .any(|f| FieldKind::of(f.field_type()).advanced || f.has_advanced_attributes()),
    }
}

/// Export the builder's current form against its active dataset
pub fn export_form(builder: &FormBuilder, options: &ExportOptions) -> FormDocument {
    let empty = Dataset::default();
    let dataset = builder.dataset().unwrap_or(&empty);
    FormExporter::new(options.clone()).export(builder.tree(), builder.layout(), builder.webform_name(), dataset)
}
