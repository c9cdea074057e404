//! Schema catalog types and lookup trait

use serde::{Deserialize, Serialize};

/// Lookup interface over the tables of one dataset.
///
/// The layout engine and the codec never mutate catalog data; they only
/// resolve tables by the id stored in tree nodes and placements, or by the
/// name stored in exported documents.
pub trait SchemaCatalog {
    /// Find a table by its schema id
    fn table_by_id(&self, table_id: &str) -> Option<&Table>;

    /// Find a table by its display name
    fn table_by_name(&self, name: &str) -> Option<&Table>;
}

/// A field of a schema table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist_items: Option<Vec<String>>,
    /// Heading level for label fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    /// Primary key flag as reported by the schema service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<bool>,
}

impl Field {
    /// Create a field with the given id, name and type
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type: field_type.into(),
            required: false,
            description: None,
            codelist_items: None,
            level: None,
            read_only: None,
            auto_increment: None,
            is_visible: None,
            pk: None,
        }
    }

    /// Builder: mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Builder: set description (used as the default tooltip)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set codelist items
    pub fn with_codelist(mut self, items: Vec<String>) -> Self {
        self.codelist_items = Some(items);
        self
    }

    /// Builder: set heading level
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Builder: set as read only
    pub fn read_only(mut self) -> Self {
        self.read_only = Some(true);
        self
    }

    /// Builder: set as auto increment
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    /// Builder: set as hidden
    pub fn hidden(mut self) -> Self {
        self.is_visible = Some(false);
        self
    }

    /// Whether the schema marks the field visible. Absent means visible.
    pub fn visible_by_default(&self) -> bool {
        self.is_visible != Some(false)
    }
}

/// A table of a dataset schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Table {
    /// Create an empty table
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder: add a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field by schema id
    pub fn field_by_id(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Find a field by name
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A dataset and its tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Builder: add a table
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

impl SchemaCatalog for Dataset {
    fn table_by_id(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// The datasets available to the builder, in the order the service listed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    datasets: Vec<Dataset>,
}

impl Catalog {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    /// All datasets
    pub fn list_datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Find a dataset by id
    pub fn dataset(&self, dataset_id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == dataset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> Table {
        Table::new("t1", "Orders")
            .with_field(Field::new("f1", "CustomerName", "text").required())
            .with_field(Field::new("f2", "Amount", "number"))
    }

    #[test]
    fn test_dataset_lookup_by_id_and_name() {
        let dataset = Dataset::new("d1", "Reporting").with_table(orders());

        assert_eq!(dataset.table_by_id("t1").map(|t| t.name.as_str()), Some("Orders"));
        assert_eq!(dataset.table_by_name("Orders").map(|t| t.id.as_str()), Some("t1"));
        assert!(dataset.table_by_id("missing").is_none());
        assert!(dataset.table_by_name("orders").is_none(), "name lookup is case sensitive");
    }

    #[test]
    fn test_field_lookup() {
        let table = orders();
        assert_eq!(table.field_by_name("Amount").map(|f| f.id.as_str()), Some("f2"));
        assert!(table.field_by_id("f1").is_some_and(|f| f.required));
        assert!(table.field_by_name("Missing").is_none());
    }

    #[test]
    fn test_field_deserializes_with_type_key() {
        let json = r#"{"id":"f9","name":"Email","type":"email","required":true,"readOnly":true}"#;
        let field: Field = serde_json::from_str(json).expect("deserialize");

        assert_eq!(field.field_type, "email");
        assert!(field.required);
        assert_eq!(field.read_only, Some(true));
        assert!(field.visible_by_default());
    }

    #[test]
    fn test_catalog_finds_dataset() {
        let catalog = Catalog::new(vec![
            Dataset::new("d1", "First"),
            Dataset::new("d2", "Second"),
        ]);

        assert_eq!(catalog.list_datasets().len(), 2);
        assert_eq!(catalog.dataset("d2").map(|d| d.name.as_str()), Some("Second"));
        assert!(catalog.dataset("d3").is_none());
    }
}
