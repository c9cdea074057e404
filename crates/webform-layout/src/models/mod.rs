//! Models for form layout
//!
//! Core data structures for the table hierarchy, placed fields and their
//! grouping into blocks.

mod block_layout;
mod form_field;
mod table_tree;

pub use block_layout::{Block, BlockLayout};
pub use form_field::{Dependency, FieldOverrides, FieldProperty, FormField};
pub use table_tree::{TableTree, TreeNode};

/// Grouping key of a horizontal block of fields within one table.
///
/// Always positive. The numeric value says nothing about display position;
/// see `BlockLayout::block_order`.
pub type BlockId = u32;
