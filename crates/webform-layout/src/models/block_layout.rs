//! Block layout model
//!
//! Placed fields live in one flat list in placement order. Within a table they
//! are grouped by `block_id`; the display order of those blocks is kept per
//! table in a separate order map so a block can be dragged to a new position
//! without renumbering anything.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;
use webform_core::Field;

use super::{BlockId, FieldProperty, FormField};

/// A block of fields as displayed: one horizontal row
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub id: BlockId,
    pub fields: Vec<&'a FormField>,
}

/// Placed fields of every table plus the per-table block display order.
///
/// Invariant: for every table, the ids in its block order are exactly the
/// distinct `block_id` values among its fields.
#[derive(Debug, Clone, Default)]
pub struct BlockLayout {
    fields: Vec<FormField>,
    block_order: HashMap<String, Vec<BlockId>>,
}

impl BlockLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// All placed fields, in placement order
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, form_id: Uuid) -> Option<&FormField> {
        self.fields.iter().find(|f| f.form_id == form_id)
    }

    /// Fields placed in a table, in placement order
    pub fn fields_for_table(&self, table_id: &str) -> Vec<&FormField> {
        self.fields.iter().filter(|f| f.table_id == table_id).collect()
    }

    /// Whether a schema field is already placed in a table
    pub fn is_placed(&self, table_id: &str, field_id: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.table_id == table_id && f.field.id == field_id)
    }

    /// Distinct block ids of a table, ascending
    fn block_ids(&self, table_id: &str) -> BTreeSet<BlockId> {
        self.fields
            .iter()
            .filter(|f| f.table_id == table_id)
            .map(|f| f.block_id)
            .collect()
    }

    /// Display order of a table's blocks
    pub fn block_order(&self, table_id: &str) -> Vec<BlockId> {
        match self.block_order.get(table_id) {
            Some(order) => order.clone(),
            None => self.block_ids(table_id).into_iter().collect(),
        }
    }

    /// A table's fields grouped into blocks, in display order
    pub fn blocks_for_table(&self, table_id: &str) -> Vec<Block<'_>> {
        let fields = self.fields_for_table(table_id);
        self.block_order(table_id)
            .into_iter()
            .map(|id| Block {
                id,
                fields: fields.iter().copied().filter(|f| f.block_id == id).collect(),
            })
            .filter(|block| !block.fields.is_empty())
            .collect()
    }

    /// Block id a field dropped on the table surface would get
    pub fn next_block_id(&self, table_id: &str) -> BlockId {
        self.block_ids(table_id).last().map_or(1, |max| max + 1)
    }

    /// Place a schema field in a table.
    ///
    /// Without a target block the field opens a new block. Returns `None` when
    /// the field is already placed in that table or the target is block 0.
    pub fn place(&mut self, table_id: &str, field: &Field, target: Option<BlockId>) -> Option<Uuid> {
        if self.is_placed(table_id, &field.id) || target == Some(0) {
            return None;
        }

        let block_id = target.unwrap_or_else(|| self.next_block_id(table_id));
        let placed = FormField::new(field.clone(), table_id, block_id);
        let form_id = placed.form_id;

        tracing::debug!(table_id, field = %field.name, block_id, "placed field");
        self.fields.push(placed);
        self.sync_block_order(table_id);
        Some(form_id)
    }

    /// Reassign a field to another block of its table
    pub fn move_to_block(&mut self, form_id: Uuid, target: BlockId) -> bool {
        if target == 0 {
            return false;
        }
        let Some(field) = self.fields.iter_mut().find(|f| f.form_id == form_id) else {
            return false;
        };
        if field.block_id == target {
            return false;
        }

        tracing::debug!(form_id = %form_id, from = field.block_id, to = target, "moved field to block");
        field.block_id = target;
        let table_id = field.table_id.clone();
        self.sync_block_order(&table_id);
        true
    }

    /// Move field `a` to the position of field `b` within their shared block.
    ///
    /// No-op when the fields are in different blocks or tables.
    pub fn reorder_within_block(&mut self, a: Uuid, b: Uuid) -> bool {
        if a == b {
            return false;
        }
        let (Some(fa), Some(fb)) = (self.get(a), self.get(b)) else {
            return false;
        };
        if fa.table_id != fb.table_id || fa.block_id != fb.block_id {
            return false;
        }
        let (table_id, block_id) = (fa.table_id.clone(), fa.block_id);

        // Slots of this block in the flat list; the block's fields are permuted
        // among these slots only so every other field keeps its position.
        let slots: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.table_id == table_id && f.block_id == block_id)
            .map(|(i, _)| i)
            .collect();
        let mut members: Vec<FormField> = slots.iter().map(|&i| self.fields[i].clone()).collect();

        let (Some(from), Some(to)) = (
            members.iter().position(|f| f.form_id == a),
            members.iter().position(|f| f.form_id == b),
        ) else {
            return false;
        };
        let moved = members.remove(from);
        members.insert(to, moved);

        for (slot, member) in slots.into_iter().zip(members) {
            self.fields[slot] = member;
        }
        tracing::debug!(table_id = %table_id, block_id, from, to, "reordered fields within block");
        true
    }

    /// Move block `a` to the display position currently held by block `b`
    pub fn reorder_blocks(&mut self, table_id: &str, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return false;
        }
        let mut order = self.block_order(table_id);
        let (Some(from), Some(to)) = (
            order.iter().position(|&id| id == a),
            order.iter().position(|&id| id == b),
        ) else {
            return false;
        };
        let moved = order.remove(from);
        order.insert(to, moved);

        tracing::debug!(table_id, ?order, "reordered blocks");
        self.block_order.insert(table_id.to_string(), order);
        true
    }

    /// Edit one property of a placed field
    pub fn update(&mut self, form_id: Uuid, property: FieldProperty) -> bool {
        match self.fields.iter_mut().find(|f| f.form_id == form_id) {
            Some(field) => {
                field.apply(property);
                true
            }
            None => false,
        }
    }

    /// Remove a placement
    pub fn remove(&mut self, form_id: Uuid) -> Option<FormField> {
        let pos = self.fields.iter().position(|f| f.form_id == form_id)?;
        let removed = self.fields.remove(pos);
        tracing::debug!(form_id = %form_id, field = %removed.field.name, "removed field");
        self.sync_block_order(&removed.table_id);
        Some(removed)
    }

    /// Remove every placement of a table, returning how many were removed
    pub fn remove_table(&mut self, table_id: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| f.table_id != table_id);
        self.block_order.remove(table_id);
        before - self.fields.len()
    }

    /// Remove every placement
    pub fn clear(&mut self) {
        self.fields.clear();
        self.block_order.clear();
    }

    /// Discard every placement and take over `fields`.
    ///
    /// Fields with block id 0 are moved to block 1.
    pub fn replace(&mut self, fields: Vec<FormField>) {
        self.clear();
        self.fields = fields
            .into_iter()
            .map(|mut f| {
                if f.block_id == 0 {
                    f.block_id = 1;
                }
                f
            })
            .collect();

        let mut tables: Vec<String> = self.fields.iter().map(|f| f.table_id.clone()).collect();
        tables.dedup();
        for table_id in tables {
            self.sync_block_order(&table_id);
        }
    }

    /// Bring a table's block order in line with its fields: new ids are
    /// appended ascending, stale ids dropped, the rest keep their order.
    fn sync_block_order(&mut self, table_id: &str) {
        let actual = self.block_ids(table_id);
        if actual.is_empty() {
            self.block_order.remove(table_id);
            return;
        }

        let order = self.block_order.entry(table_id.to_string()).or_default();
        order.retain(|id| actual.contains(id));
        let missing: Vec<BlockId> = actual.into_iter().filter(|id| !order.contains(id)).collect();
        order.extend(missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(id: &str) -> Field {
        Field::new(id, id.to_uppercase(), "text")
    }

    fn ids(block: &Block<'_>) -> Vec<String> {
        block.fields.iter().map(|f| f.field.id.clone()).collect()
    }

    /// Every table's block order must match the distinct block ids of its fields
    fn assert_order_in_sync(layout: &BlockLayout, table_id: &str) {
        let mut order = layout.block_order(table_id);
        order.sort_unstable();
        let actual: Vec<BlockId> = layout.block_ids(table_id).into_iter().collect();
        assert_eq!(order, actual);
    }

    #[test]
    fn test_place_assigns_next_block_ids() {
        let mut layout = BlockLayout::new();
        let a = layout.place("t1", &field("a"), None).expect("placed");
        let b = layout.place("t1", &field("b"), None).expect("placed");
        let c = layout.place("t1", &field("c"), Some(1)).expect("placed");

        assert_eq!(layout.get(a).map(|f| f.block_id), Some(1));
        assert_eq!(layout.get(b).map(|f| f.block_id), Some(2));
        assert_eq!(layout.get(c).map(|f| f.block_id), Some(1));

        let blocks = layout.blocks_for_table("t1");
        assert_eq!(blocks.len(), 2);
        assert_eq!(ids(&blocks[0]), vec!["a", "c"]);
        assert_eq!(ids(&blocks[1]), vec!["b"]);
    }

    #[test]
    fn test_block_ids_are_per_table() {
        let mut layout = BlockLayout::new();
        layout.place("t1", &field("a"), None);
        layout.place("t1", &field("b"), None);
        layout.place("t2", &field("a"), None);

        assert_eq!(layout.next_block_id("t1"), 3);
        assert_eq!(layout.next_block_id("t2"), 2);
        assert_eq!(layout.next_block_id("t3"), 1);
    }

    #[test]
    fn test_same_field_once_per_table() {
        let mut layout = BlockLayout::new();
        assert!(layout.place("t1", &field("a"), None).is_some());
        assert!(layout.place("t1", &field("a"), None).is_none());
        assert!(layout.place("t2", &field("a"), None).is_some());
        assert!(layout.place("t1", &field("b"), Some(0)).is_none());
    }

    #[test]
    fn test_move_to_block() {
        let mut layout = BlockLayout::new();
        let a = layout.place("t1", &field("a"), None).expect("placed");
        layout.place("t1", &field("b"), None);

        assert!(layout.move_to_block(a, 2));
        assert!(!layout.move_to_block(a, 2), "already in block 2");

        assert_eq!(layout.block_order("t1"), vec![2]);
        assert_order_in_sync(&layout, "t1");
        assert_eq!(ids(&layout.blocks_for_table("t1")[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_reorder_within_block() {
        let mut layout = BlockLayout::new();
        let a = layout.place("t1", &field("a"), Some(1)).expect("placed");
        let other = layout.place("t1", &field("x"), Some(2)).expect("placed");
        layout.place("t1", &field("b"), Some(1));
        let c = layout.place("t1", &field("c"), Some(1)).expect("placed");

        assert!(layout.reorder_within_block(c, a));
        assert_eq!(ids(&layout.blocks_for_table("t1")[0]), vec!["c", "a", "b"]);

        // Different blocks: nothing happens
        assert!(!layout.reorder_within_block(a, other));
        assert!(!layout.reorder_within_block(a, a));
        assert_eq!(layout.fields()[1].field.id, "x", "other fields keep their slots");
    }

    #[test]
    fn test_reorder_blocks() {
        let mut layout = BlockLayout::new();
        for id in ["a", "b", "c"] {
            layout.place("t1", &field(id), None);
        }
        layout.place("t2", &field("z"), None);
        layout.place("t2", &field("y"), None);

        assert!(layout.reorder_blocks("t1", 2, 1));
        assert_eq!(layout.block_order("t1"), vec![2, 1, 3]);

        assert!(layout.reorder_blocks("t1", 2, 3));
        assert_eq!(layout.block_order("t1"), vec![1, 3, 2]);

        assert!(!layout.reorder_blocks("t1", 3, 3));
        assert!(!layout.reorder_blocks("t1", 9, 1));
        assert_eq!(layout.block_order("t2"), vec![1, 2], "other tables untouched");
    }

    #[test]
    fn test_block_order_survives_new_and_removed_blocks() {
        let mut layout = BlockLayout::new();
        let a = layout.place("t1", &field("a"), None).expect("placed");
        layout.place("t1", &field("b"), None);
        layout.place("t1", &field("c"), None);
        layout.reorder_blocks("t1", 3, 1);
        assert_eq!(layout.block_order("t1"), vec![3, 1, 2]);

        layout.place("t1", &field("d"), None);
        assert_eq!(layout.block_order("t1"), vec![3, 1, 2, 4]);

        layout.remove(a);
        assert_eq!(layout.block_order("t1"), vec![3, 2, 4]);
        assert_order_in_sync(&layout, "t1");

        let blocks: Vec<BlockId> = layout.blocks_for_table("t1").iter().map(|b| b.id).collect();
        assert_eq!(blocks, vec![3, 2, 4]);
    }

    #[test]
    fn test_block_order_in_sync_after_every_step() {
        let mut layout = BlockLayout::new();
        let check = |layout: &BlockLayout| {
            for table_id in ["t1", "t2"] {
                assert_order_in_sync(layout, table_id);
                let shown: Vec<BlockId> =
                    layout.blocks_for_table(table_id).iter().map(|b| b.id).collect();
                assert_eq!(shown, layout.block_order(table_id));
            }
        };

        let a = layout.place("t1", &field("a"), None).expect("placed");
        check(&layout);
        let b = layout.place("t1", &field("b"), None).expect("placed");
        check(&layout);
        let z = layout.place("t2", &field("z"), None).expect("placed");
        check(&layout);
        let c = layout.place("t1", &field("c"), Some(2)).expect("placed");
        check(&layout);
        layout.place("t2", &field("y"), Some(1));
        check(&layout);
        layout.place("t1", &field("d"), None);
        check(&layout);

        assert!(layout.reorder_blocks("t1", 3, 1));
        check(&layout);
        assert!(layout.move_to_block(a, 3));
        check(&layout);
        assert!(layout.move_to_block(z, 7));
        check(&layout);
        assert!(layout.reorder_within_block(c, b));
        check(&layout);
        layout.remove(b);
        check(&layout);
        layout.remove(c);
        check(&layout);
        layout.place("t1", &field("e"), None);
        check(&layout);
        assert_eq!(layout.remove_table("t2"), 2);
        check(&layout);

        assert_eq!(layout.block_order("t1"), vec![3, 4]);
        assert!(layout.block_order("t2").is_empty());
    }

    #[test]
    fn test_update_and_remove() {
        let mut layout = BlockLayout::new();
        let a = layout.place("t1", &field("a"), None).expect("placed");

        assert!(layout.update(a, FieldProperty::Title(Some("Alpha".into()))));
        assert_eq!(layout.get(a).map(|f| f.title()), Some("Alpha"));
        assert!(!layout.update(Uuid::new_v4(), FieldProperty::Primary(true)));

        let removed = layout.remove(a).expect("removed");
        assert_eq!(removed.field.id, "a");
        assert!(layout.is_empty());
        assert!(layout.block_order("t1").is_empty());
        assert!(layout.remove(a).is_none());
    }

    #[test]
    fn test_remove_table_and_replace() {
        let mut layout = BlockLayout::new();
        layout.place("t1", &field("a"), None);
        layout.place("t2", &field("b"), None);

        assert_eq!(layout.remove_table("t1"), 1);
        assert_eq!(layout.len(), 1);

        let restored = FormField::new(field("c"), "t3", 0);
        layout.replace(vec![restored, FormField::new(field("d"), "t3", 4)]);

        assert_eq!(layout.len(), 2);
        assert!(layout.fields_for_table("t2").is_empty());
        assert_eq!(layout.block_order("t3"), vec![1, 4]);
    }
}
