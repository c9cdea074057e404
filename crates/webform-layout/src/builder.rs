//! Form builder session
//!
//! Ties the table tree, the block layout and the reorder machine to a schema
//! catalog and an active dataset. This is the state a form editor works on.

use uuid::Uuid;
use webform_core::{Catalog, Dataset, Field, Result, SchemaCatalog, Table, WebformError};

use crate::events::LayoutEvent;
use crate::models::{BlockLayout, FieldProperty, FormField, TableTree};
use crate::reorder::{DragPayload, DropTarget, ReorderMachine};

/// Editing session for one form
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    catalog: Catalog,
    dataset_id: Option<String>,
    tree: TableTree,
    layout: BlockLayout,
    webform_name: String,
    drag: ReorderMachine,
}

impl FormBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace the catalog, e.g. after the schema was fetched again.
    ///
    /// The active dataset is kept if it still exists.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        if let Some(id) = &self.dataset_id {
            if self.catalog.dataset(id).is_none() {
                self.dataset_id = None;
                self.reset_form();
            }
        }
    }

    /// Switch the active dataset. The form is cleared.
    pub fn select_dataset(&mut self, dataset_id: &str) -> Result<()> {
        if self.catalog.dataset(dataset_id).is_none() {
            return Err(WebformError::DatasetNotFound(dataset_id.to_string()));
        }
        tracing::debug!(dataset_id, "selected dataset");
        self.dataset_id = Some(dataset_id.to_string());
        self.reset_form();
        Ok(())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset_id.as_deref().and_then(|id| self.catalog.dataset(id))
    }

    pub fn tree(&self) -> &TableTree {
        &self.tree
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn webform_name(&self) -> &str {
        &self.webform_name
    }

    pub fn set_webform_name(&mut self, name: impl Into<String>) {
        self.webform_name = name.into();
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.tree.selected()
    }

    /// Tables of the active dataset not yet in the tree
    pub fn available_tables(&self) -> Vec<&Table> {
        let placed = self.tree.table_ids();
        self.dataset()
            .map(|d| d.tables.iter().filter(|t| !placed.contains(&t.id)).collect())
            .unwrap_or_default()
    }

    /// Fields of the selected table not yet placed in it
    pub fn available_fields(&self) -> Vec<&Field> {
        let Some(table_id) = self.tree.selected() else {
            return Vec::new();
        };
        let Some(table) = self.dataset().and_then(|d| d.table_by_id(table_id)) else {
            return Vec::new();
        };
        table
            .fields
            .iter()
            .filter(|f| !self.layout.is_placed(table_id, &f.id))
            .collect()
    }

    /// Add a table of the active dataset as the root table.
    ///
    /// Returns `Ok(None)` when a root already exists or the table is already
    /// in the tree. Tables added before the root are discarded along with
    /// their placed fields.
    pub fn add_root_table(&mut self, table_id: &str, label: &str, title: &str) -> Result<Option<Uuid>> {
        self.require_table(table_id)?;
        if self.tree.has_root() || self.tree.contains_table(table_id) {
            return Ok(None);
        }
        let discarded = self.tree.table_ids();
        let id = self.tree.add_root(table_id, label, title);
        for discarded_id in &discarded {
            self.layout.remove_table(discarded_id);
        }
        Ok(id)
    }

    /// Add a table of the active dataset as a child table.
    ///
    /// Returns `Ok(None)` when the table is already in the tree.
    pub fn add_child_table(&mut self, table_id: &str, label: &str, title: &str) -> Result<Option<Uuid>> {
        self.require_table(table_id)?;
        if self.tree.contains_table(table_id) {
            return Ok(None);
        }
        Ok(Some(self.tree.add_child(table_id, label, title)))
    }

    pub fn rename_table(&mut self, table_id: &str, label: &str, title: &str) -> bool {
        self.tree.rename(table_id, label, title)
    }

    /// Remove a tree node, its subtree, and every field placed in the removed tables
    pub fn remove_table(&mut self, node_id: Uuid) -> bool {
        let Some(table_ids) = self.tree.remove(node_id) else {
            return false;
        };
        for table_id in &table_ids {
            self.layout.remove_table(table_id);
        }
        true
    }

    pub fn reorder_child_tables(&mut self, old_index: usize, new_index: usize) -> bool {
        self.tree.reorder_children(old_index, new_index)
    }

    pub fn select_table(&mut self, table_id: &str) -> bool {
        self.tree.select(table_id)
    }

    pub fn update_field(&mut self, form_id: Uuid, property: FieldProperty) -> bool {
        self.layout.update(form_id, property)
    }

    pub fn remove_field(&mut self, form_id: Uuid) -> Option<FormField> {
        self.layout.remove(form_id)
    }

    /// Remove every field of the selected table
    pub fn clear_table(&mut self) -> usize {
        match self.tree.selected() {
            Some(table_id) => {
                let table_id = table_id.to_string();
                self.layout.remove_table(&table_id)
            }
            None => 0,
        }
    }

    /// Remove every placed field; the tree stays
    pub fn clear_form(&mut self) {
        self.layout.clear();
    }

    pub fn begin_drag(&mut self, payload: DragPayload) {
        self.drag.begin(payload);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Resolve the drag in progress against the selected table
    pub fn drop_on(&mut self, target: DropTarget) -> LayoutEvent {
        let selected = self.tree.selected().map(str::to_string);
        self.drag.drop_on(target, &mut self.layout, selected.as_deref())
    }

    /// Discard every placed field and take over `fields`.
    ///
    /// A non-empty `webform_name` replaces the current one; `first_table` is
    /// selected when it is in the tree.
    pub fn replace_fields(
        &mut self,
        fields: Vec<FormField>,
        webform_name: Option<String>,
        first_table: Option<&str>,
    ) {
        if let Some(name) = webform_name.filter(|n| !n.is_empty()) {
            self.webform_name = name;
        }
        self.drag.cancel();
        self.layout.replace(fields);
        if let Some(table_id) = first_table {
            self.tree.select(table_id);
        }
    }

    fn require_table(&self, table_id: &str) -> Result<()> {
        let dataset = self
            .dataset()
            .ok_or(WebformError::NoDatasetSelected)?;
        dataset
            .table_by_id(table_id)
            .map(|_| ())
            .ok_or_else(|| WebformError::TableNotFound(table_id.to_string()))
    }

    fn reset_form(&mut self) {
        self.tree.clear();
        self.layout.clear();
        self.drag.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let orders = Table::new("t1", "Orders")
            .with_field(Field::new("f1", "CustomerName", "text").required())
            .with_field(Field::new("f2", "Amount", "number"));
        let lines = Table::new("t2", "Lines").with_field(Field::new("f3", "Sku", "text"));
        let notes = Table::new("t3", "Notes");
        Catalog::new(vec![
            Dataset::new("d1", "Reporting")
                .with_table(orders)
                .with_table(lines)
                .with_table(notes),
            Dataset::new("d2", "Other"),
        ])
    }

    fn builder() -> FormBuilder {
        let mut builder = FormBuilder::new(catalog());
        builder.select_dataset("d1").expect("dataset");
        builder
    }

    fn place(builder: &mut FormBuilder, field_id: &str) -> LayoutEvent {
        let field = builder
            .available_fields()
            .into_iter()
            .find(|f| f.id == field_id)
            .cloned()
            .expect("available");
        builder.begin_drag(DragPayload::UnplacedField(field));
        builder.drop_on(DropTarget::TableSurface)
    }

    #[test]
    fn test_unknown_dataset_or_table() {
        let mut builder = FormBuilder::new(catalog());
        assert!(matches!(
            builder.add_root_table("t1", "ord", "Order Info"),
            Err(WebformError::NoDatasetSelected)
        ));
        assert!(matches!(
            builder.select_dataset("nope"),
            Err(WebformError::DatasetNotFound(_))
        ));

        builder.select_dataset("d1").expect("dataset");
        assert!(matches!(
            builder.add_child_table("t9", "x", "X"),
            Err(WebformError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_available_tables_exclude_placed() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");
        builder.add_child_table("t2", "lin", "Lines").expect("ok");

        let names: Vec<_> = builder.available_tables().iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Notes"]);

        assert_eq!(builder.add_child_table("t1", "again", "Again").expect("ok"), None);
    }

    #[test]
    fn test_palette_shrinks_as_fields_are_placed() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");
        assert!(builder.available_fields().is_empty(), "nothing selected yet");

        builder.select_table("t1");
        assert_eq!(builder.available_fields().len(), 2);

        assert!(place(&mut builder, "f1").is_change());
        let remaining: Vec<_> = builder.available_fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(remaining, vec!["f2"]);
    }

    #[test]
    fn test_remove_table_drops_its_fields() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");
        let lines = builder.add_child_table("t2", "lin", "Lines").expect("ok").expect("node");
        builder.select_table("t1");
        place(&mut builder, "f1");
        builder.select_table("t2");
        place(&mut builder, "f3");

        assert!(builder.remove_table(lines));

        assert_eq!(builder.layout().len(), 1);
        assert!(builder.layout().fields_for_table("t2").is_empty());
        assert!(builder.selected_table().is_none());
    }

    #[test]
    fn test_late_root_discards_detached_tables_and_their_fields() {
        let mut builder = builder();
        builder.add_child_table("t2", "lin", "Lines").expect("ok");
        builder.select_table("t2");
        place(&mut builder, "f3");

        assert!(builder.add_root_table("t1", "ord", "Order Info").expect("ok").is_some());

        assert_eq!(builder.tree().table_ids(), vec!["t1".to_string()]);
        assert!(builder.layout().is_empty());
        assert!(builder.selected_table().is_none());
        assert_eq!(builder.add_root_table("t3", "not", "Notes").expect("ok"), None);
    }

    #[test]
    fn test_clear_table_and_form() {
        let mut builder = builder();
        builder.add_child_table("t1", "ord", "Orders").expect("ok");
        builder.add_child_table("t2", "lin", "Lines").expect("ok");
        builder.select_table("t1");
        place(&mut builder, "f1");
        place(&mut builder, "f2");
        builder.select_table("t2");
        place(&mut builder, "f3");

        assert_eq!(builder.clear_table(), 1);
        assert_eq!(builder.layout().len(), 2);

        builder.clear_form();
        assert!(builder.layout().is_empty());
        assert_eq!(builder.tree().nodes().len(), 2, "tree survives clearing");
    }

    #[test]
    fn test_switching_dataset_resets_form() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");
        builder.select_table("t1");
        place(&mut builder, "f1");

        builder.select_dataset("d2").expect("dataset");

        assert!(builder.tree().is_empty());
        assert!(builder.layout().is_empty());
        assert!(builder.available_tables().is_empty());
    }

    #[test]
    fn test_replace_fields_selects_first_table() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");
        builder.set_webform_name("Old");

        let restored = FormField::new(Field::new("f2", "Amount", "number"), "t1", 1);
        builder.replace_fields(vec![restored], Some("New".into()), Some("t1"));

        assert_eq!(builder.webform_name(), "New");
        assert_eq!(builder.selected_table(), Some("t1"));
        assert_eq!(builder.layout().len(), 1);

        builder.replace_fields(Vec::new(), Some(String::new()), None);
        assert_eq!(builder.webform_name(), "New");
        assert!(builder.layout().is_empty());
    }

    #[test]
    fn test_refreshed_catalog_keeps_or_drops_dataset() {
        let mut builder = builder();
        builder.add_root_table("t1", "ord", "Order Info").expect("ok");

        builder.set_catalog(catalog());
        assert_eq!(builder.dataset().map(|d| d.id.as_str()), Some("d1"));
        assert!(!builder.tree().is_empty());

        builder.set_catalog(Catalog::new(vec![Dataset::new("d2", "Other")]));
        assert!(builder.dataset().is_none());
        assert!(builder.tree().is_empty());
    }
}
