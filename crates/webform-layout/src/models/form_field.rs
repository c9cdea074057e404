//! Placed field model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webform_core::Field;

use super::BlockId;

/// Visibility dependency on another field's value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the field this one depends on
    pub field: String,
    /// Values of that field that make this one apply. `None` means any value.
    pub value: Option<Vec<String>>,
}

/// Per-placement overrides of schema attributes.
///
/// `None` means "use the schema default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    pub title: Option<String>,
    pub tooltip: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub read_only: Option<bool>,
    pub auto_increment: Option<bool>,
    pub is_visible: Option<bool>,
    pub level: Option<u8>,
    pub codelist_items: Option<Vec<String>>,
}

/// One editable property of a placed field.
///
/// Setting an override property to `None` clears it. An empty title, tooltip
/// or placeholder clears it as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProperty {
    Title(Option<String>),
    Tooltip(Option<String>),
    Placeholder(Option<String>),
    Required(Option<bool>),
    ReadOnly(Option<bool>),
    AutoIncrement(Option<bool>),
    Visibility(Option<bool>),
    Level(Option<u8>),
    CodelistItems(Option<Vec<String>>),
    Primary(bool),
    Dependency(Option<Dependency>),
    ReferenceParentField(Option<String>),
    ReferenceParentTable(Option<String>),
}

/// A schema field placed on the form for a specific table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Placement identity, unique for the lifetime of the placement
    pub form_id: Uuid,
    /// Schema table the placement belongs to
    pub table_id: String,
    /// Block the field is grouped into
    pub block_id: BlockId,
    /// The underlying schema field
    pub field: Field,
    pub overrides: FieldOverrides,
    pub is_primary: bool,
    pub dependency: Option<Dependency>,
    pub reference_parent_field: Option<String>,
    pub reference_parent_table: Option<String>,
}

impl FormField {
    /// Place a schema field with a fresh placement id
    pub fn new(field: Field, table_id: impl Into<String>, block_id: BlockId) -> Self {
        Self {
            form_id: Uuid::new_v4(),
            table_id: table_id.into(),
            block_id,
            field,
            overrides: FieldOverrides::default(),
            is_primary: false,
            dependency: None,
            reference_parent_field: None,
            reference_parent_table: None,
        }
    }

    /// Schema field id
    pub fn field_id(&self) -> &str {
        &self.field.id
    }

    /// Schema field name
    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn field_type(&self) -> &str {
        &self.field.field_type
    }

    /// Apply one property edit
    pub fn apply(&mut self, property: FieldProperty) {
        let o = &mut self.overrides;
        match property {
            FieldProperty::Title(v) => o.title = non_blank(v),
            FieldProperty::Tooltip(v) => o.tooltip = non_blank(v),
            FieldProperty::Placeholder(v) => o.placeholder = non_blank(v),
            FieldProperty::Required(v) => o.required = v,
            FieldProperty::ReadOnly(v) => o.read_only = v,
            FieldProperty::AutoIncrement(v) => o.auto_increment = v,
            FieldProperty::Visibility(v) => o.is_visible = v,
            FieldProperty::Level(v) => o.level = v,
            FieldProperty::CodelistItems(v) => o.codelist_items = v,
            FieldProperty::Primary(v) => self.is_primary = v,
            FieldProperty::Dependency(v) => self.dependency = v,
            FieldProperty::ReferenceParentField(v) => self.reference_parent_field = v,
            FieldProperty::ReferenceParentTable(v) => self.reference_parent_table = v,
        }
    }

    // Resolved values: the override when set, the schema attribute otherwise.

    pub fn title(&self) -> &str {
        self.overrides
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.field.name)
    }

    pub fn tooltip(&self) -> &str {
        self.overrides
            .tooltip
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.field.description.as_deref())
            .unwrap_or("")
    }

    pub fn is_required(&self) -> bool {
        self.overrides.required.unwrap_or(self.field.required)
    }

    pub fn is_read_only(&self) -> bool {
        self.overrides
            .read_only
            .unwrap_or(self.field.read_only.unwrap_or(false))
    }

    pub fn is_visible(&self) -> bool {
        self.overrides
            .is_visible
            .unwrap_or_else(|| self.field.visible_by_default())
    }

    pub fn is_auto_increment(&self) -> bool {
        self.overrides
            .auto_increment
            .unwrap_or(self.field.auto_increment.unwrap_or(false))
    }

    /// Heading level, defaulting to 1
    pub fn level(&self) -> u8 {
        self.overrides.level.or(self.field.level).unwrap_or(1)
    }

    pub fn codelist_items(&self) -> Option<&[String]> {
        self.overrides
            .codelist_items
            .as_deref()
            .or(self.field.codelist_items.as_deref())
    }

    /// Whether the placement is primary, read-only or auto-incremented,
    /// after resolving overrides against the schema
    pub fn has_advanced_attributes(&self) -> bool {
        self.is_primary || self.is_read_only() || self.is_auto_increment()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount() -> FormField {
        let field = Field::new("f2", "Amount", "number").with_description("Total amount");
        FormField::new(field, "t1", 1)
    }

    #[test]
    fn test_resolved_values_fall_back_to_schema() {
        let ff = amount();
        assert_eq!(ff.title(), "Amount");
        assert_eq!(ff.tooltip(), "Total amount");
        assert!(!ff.is_required());
        assert!(!ff.is_read_only());
        assert!(ff.is_visible());
        assert_eq!(ff.level(), 1);
        assert!(ff.codelist_items().is_none());
    }

    #[test]
    fn test_override_and_clear() {
        let mut ff = amount();
        ff.apply(FieldProperty::Title(Some("Total".into())));
        ff.apply(FieldProperty::Required(Some(true)));
        ff.apply(FieldProperty::Visibility(Some(false)));
        assert_eq!(ff.title(), "Total");
        assert!(ff.is_required());
        assert!(!ff.is_visible());

        ff.apply(FieldProperty::Title(None));
        assert_eq!(ff.title(), "Amount");
    }

    #[test]
    fn test_empty_text_override_falls_back_to_schema() {
        let mut ff = amount();
        ff.apply(FieldProperty::Title(Some(String::new())));
        ff.apply(FieldProperty::Tooltip(Some(String::new())));
        ff.apply(FieldProperty::Placeholder(Some(String::new())));

        assert_eq!(ff.overrides, FieldOverrides::default());
        assert_eq!(ff.title(), "Amount");
        assert_eq!(ff.tooltip(), "Total amount");

        ff.overrides.title = Some(String::new());
        assert_eq!(ff.title(), "Amount");
    }

    #[test]
    fn test_advanced_attributes() {
        let mut ff = amount();
        assert!(!ff.has_advanced_attributes());
        ff.apply(FieldProperty::AutoIncrement(Some(true)));
        assert!(ff.has_advanced_attributes());
        ff.apply(FieldProperty::AutoIncrement(None));
        ff.apply(FieldProperty::Primary(true));
        assert!(ff.has_advanced_attributes());
    }

    #[test]
    fn test_read_only_schema_field_is_advanced_without_override() {
        let field = Field::new("f9", "Created", "date").read_only();
        let mut ff = FormField::new(field, "t1", 1);
        assert!(ff.has_advanced_attributes());

        ff.apply(FieldProperty::ReadOnly(Some(true)));
        assert!(ff.has_advanced_attributes());
        ff.apply(FieldProperty::ReadOnly(Some(false)));
        assert!(!ff.has_advanced_attributes());
    }

    #[test]
    fn test_placements_get_distinct_ids() {
        assert_ne!(amount().form_id, amount().form_id);
    }
}
