//! Table hierarchy model

use uuid::Uuid;

/// A table placed in the form hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Node identity, distinct from the schema table it refers to
    pub id: Uuid,
    /// Schema table reference
    pub table_id: String,
    pub label: String,
    pub title: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(
        table_id: impl Into<String>,
        label: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            table_id: table_id.into(),
            label: label.into(),
            title: title.into(),
            children: Vec::new(),
        }
    }

    fn collect_table_ids(&self, out: &mut Vec<String>) {
        out.push(self.table_id.clone());
        for child in &self.children {
            child.collect_table_ids(out);
        }
    }
}

/// The form's table hierarchy.
///
/// Either there is a root (`has_root()` and exactly one top-level node whose
/// children are the form's child tables), or the top level is a flat list of
/// detached tables.
#[derive(Debug, Clone, Default)]
pub struct TableTree {
    nodes: Vec<TreeNode>,
    has_root: bool,
    root_tables: Vec<String>,
    tabs: Vec<String>,
    selected: Option<String>,
}

impl TableTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root table with no children.
    ///
    /// No-op returning `None` when a root already exists. The root replaces
    /// the whole top level: tables that were added before it are discarded
    /// together with their `tabs` membership, and a selection pointing at
    /// one of them is cleared.
    pub fn add_root(
        &mut self,
        table_id: impl Into<String>,
        label: impl Into<String>,
        title: impl Into<String>,
    ) -> Option<Uuid> {
        if self.has_root {
            return None;
        }

        let discarded = self.table_ids();
        self.tabs.retain(|id| !discarded.contains(id));
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| discarded.contains(selected))
        {
            self.selected = None;
        }

        let root = TreeNode::new(table_id, label, title);
        let id = root.id;

        tracing::debug!(table_id = %root.table_id, discarded = ?discarded, "added root table");
        self.root_tables.push(root.table_id.clone());
        self.nodes = vec![root];
        self.has_root = true;
        Some(id)
    }

    /// Add a child table under the root, or a detached top-level table when
    /// there is no root
    pub fn add_child(
        &mut self,
        table_id: impl Into<String>,
        label: impl Into<String>,
        title: impl Into<String>,
    ) -> Uuid {
        let node = TreeNode::new(table_id, label, title);
        let id = node.id;
        self.tabs.push(node.table_id.clone());

        tracing::debug!(table_id = %node.table_id, under_root = self.has_root, "added child table");
        match self.root_mut() {
            Some(root) => root.children.push(node),
            None => self.nodes.push(node),
        }
        id
    }

    /// Update label and title of the node referring to `table_id`
    pub fn rename(&mut self, table_id: &str, label: impl Into<String>, title: impl Into<String>) -> bool {
        match find_mut(&mut self.nodes, table_id) {
            Some(node) => {
                node.label = label.into();
                node.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Remove a node together with its subtree.
    ///
    /// Returns the table ids of every removed node, or `None` if no node has
    /// that id. Removing the root removes the whole tree.
    pub fn remove(&mut self, node_id: Uuid) -> Option<Vec<String>> {
        let removed = take_node(&mut self.nodes, node_id)?;

        let mut table_ids = Vec::new();
        removed.collect_table_ids(&mut table_ids);

        if self.has_root && self.nodes.is_empty() {
            self.has_root = false;
        }
        self.root_tables.retain(|id| !table_ids.contains(id));
        self.tabs.retain(|id| !table_ids.contains(id));
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| table_ids.contains(selected))
        {
            self.selected = None;
        }

        tracing::debug!(node_id = %node_id, tables = ?table_ids, "removed table node");
        Some(table_ids)
    }

    /// Move a root child from `old_index` to `new_index`
    pub fn reorder_children(&mut self, old_index: usize, new_index: usize) -> bool {
        let Some(root) = self.root_mut() else {
            return false;
        };
        let len = root.children.len();
        if old_index >= len || new_index >= len {
            return false;
        }
        let moved = root.children.remove(old_index);
        root.children.insert(new_index, moved);
        true
    }

    /// Point the selection cursor at a table present in the tree
    pub fn select(&mut self, table_id: &str) -> bool {
        if !self.contains_table(table_id) {
            return false;
        }
        self.selected = Some(table_id.to_string());
        true
    }

    /// Drop every node and reset all membership sets
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn has_root(&self) -> bool {
        self.has_root
    }

    pub fn root(&self) -> Option<&TreeNode> {
        if self.has_root { self.nodes.first() } else { None }
    }

    fn root_mut(&mut self) -> Option<&mut TreeNode> {
        if self.has_root { self.nodes.first_mut() } else { None }
    }

    /// Top-level nodes: the root alone, or the detached tables
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn root_tables(&self) -> &[String] {
        &self.root_tables
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first search by schema table id
    pub fn find_by_table(&self, table_id: &str) -> Option<&TreeNode> {
        find(&self.nodes, table_id)
    }

    pub fn contains_table(&self, table_id: &str) -> bool {
        self.find_by_table(table_id).is_some()
    }

    /// Every table id in the tree, depth-first
    pub fn table_ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_table_ids(&mut out);
        }
        out
    }
}

fn find<'a>(nodes: &'a [TreeNode], table_id: &str) -> Option<&'a TreeNode> {
    nodes.iter().find_map(|node| {
        if node.table_id == table_id {
            Some(node)
        } else {
            find(&node.children, table_id)
        }
    })
}

fn find_mut<'a>(nodes: &'a mut [TreeNode], table_id: &str) -> Option<&'a mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.table_id == table_id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, table_id) {
            return Some(found);
        }
    }
    None
}

fn take_node(nodes: &mut Vec<TreeNode>, node_id: Uuid) -> Option<TreeNode> {
    if let Some(pos) = nodes.iter().position(|n| n.id == node_id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|node| take_node(&mut node.children, node_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_root_then_children() {
        let mut tree = TableTree::new();
        tree.add_root("orders", "ord", "Order Info").expect("first root");
        tree.add_child("lines", "lin", "Lines");
        tree.add_child("notes", "not", "Notes");

        assert!(tree.has_root());
        assert_eq!(tree.nodes().len(), 1);
        let root = tree.root().expect("root");
        assert_eq!(root.table_id, "orders");
        let children: Vec<_> = root.children.iter().map(|c| c.table_id.as_str()).collect();
        assert_eq!(children, vec!["lines", "notes"]);
        assert_eq!(tree.root_tables(), ["orders".to_string()]);
        assert_eq!(tree.tabs(), ["lines".to_string(), "notes".to_string()]);
    }

    #[test]
    fn test_second_root_is_noop() {
        let mut tree = TableTree::new();
        tree.add_root("orders", "ord", "Order Info");
        assert!(tree.add_root("customers", "cus", "Customers").is_none());
        assert_eq!(tree.root().map(|r| r.table_id.as_str()), Some("orders"));
        assert_eq!(tree.root_tables().len(), 1);
    }

    #[test]
    fn test_children_without_root_are_detached() {
        let mut tree = TableTree::new();
        tree.add_child("lines", "lin", "Lines");
        tree.add_child("notes", "not", "Notes");

        assert!(!tree.has_root());
        assert!(tree.root().is_none());
        assert_eq!(tree.nodes().len(), 2);
    }

    #[test]
    fn test_root_replaces_detached_tables() {
        let mut tree = TableTree::new();
        tree.add_child("lines", "lin", "Lines");
        tree.add_child("notes", "not", "Notes");
        tree.select("lines");

        tree.add_root("orders", "ord", "Order Info").expect("root");

        assert_eq!(tree.nodes().len(), 1);
        let root = tree.root().expect("root");
        assert_eq!(root.table_id, "orders");
        assert!(root.children.is_empty());
        assert!(tree.tabs().is_empty());
        assert!(tree.selected().is_none());
        assert_eq!(tree.table_ids(), vec!["orders".to_string()]);

        tree.add_child("lines", "lin", "Lines");
        assert_eq!(tree.tabs(), ["lines".to_string()]);
    }

    #[test]
    fn test_rename_nested_node() {
        let mut tree = TableTree::new();
        tree.add_root("orders", "ord", "Order Info");
        tree.add_child("lines", "lin", "Lines");

        assert!(tree.rename("lines", "items", "Items"));
        let node = tree.find_by_table("lines").expect("node");
        assert_eq!((node.label.as_str(), node.title.as_str()), ("items", "Items"));
        assert!(!tree.rename("missing", "x", "y"));
    }

    #[test]
    fn test_remove_child_clears_membership_and_selection() {
        let mut tree = TableTree::new();
        tree.add_root("orders", "ord", "Order Info");
        let lines = tree.add_child("lines", "lin", "Lines");
        assert!(tree.select("lines"));

        let removed = tree.remove(lines).expect("removed");

        assert_eq!(removed, vec!["lines".to_string()]);
        assert!(tree.has_root());
        assert!(tree.tabs().is_empty());
        assert!(tree.selected().is_none());
    }

    #[test]
    fn test_remove_root_cascades() {
        let mut tree = TableTree::new();
        let root = tree.add_root("orders", "ord", "Order Info").expect("root");
        tree.add_child("lines", "lin", "Lines");
        tree.select("orders");

        let removed = tree.remove(root).expect("removed");

        assert_eq!(removed, vec!["orders".to_string(), "lines".to_string()]);
        assert!(!tree.has_root());
        assert!(tree.is_empty());
        assert!(tree.root_tables().is_empty());
        assert!(tree.tabs().is_empty());
        assert!(tree.selected().is_none());

        // The table can be added again once its node is gone
        assert!(tree.add_root("orders", "ord", "Order Info").is_some());
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut tree = TableTree::new();
        tree.add_child("lines", "lin", "Lines");
        assert!(tree.remove(Uuid::new_v4()).is_none());
        assert_eq!(tree.nodes().len(), 1);
    }

    #[test]
    fn test_reorder_children() {
        let mut tree = TableTree::new();
        assert!(!tree.reorder_children(0, 1), "no root");

        tree.add_root("orders", "ord", "Order Info");
        tree.add_child("a", "a", "A");
        tree.add_child("b", "b", "B");
        tree.add_child("c", "c", "C");

        assert!(tree.reorder_children(2, 0));
        let order: Vec<_> = tree
            .root()
            .map(|r| r.children.iter().map(|c| c.table_id.clone()).collect())
            .unwrap_or_default();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert!(!tree.reorder_children(0, 3));
    }

    #[test]
    fn test_select_requires_table_in_tree() {
        let mut tree = TableTree::new();
        tree.add_child("lines", "lin", "Lines");
        assert!(!tree.select("orders"));
        assert!(tree.select("lines"));
        assert_eq!(tree.selected(), Some("lines"));
    }

    #[test]
    fn test_table_ids_depth_first() {
        let mut tree = TableTree::new();
        tree.add_root("orders", "ord", "Order Info");
        tree.add_child("lines", "lin", "Lines");
        assert_eq!(tree.table_ids(), vec!["orders".to_string(), "lines".to_string()]);
    }
}
