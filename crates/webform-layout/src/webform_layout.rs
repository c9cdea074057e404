//! Form layout engine
//!
//! Owns everything the user arranges while composing a form:
//!
//! - a hierarchy of tables (one optional root table plus child tables)
//! - per table, the placed fields grouped into horizontal blocks
//! - the drag-and-drop state machine that reorders both
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webform_layout::{DragPayload, DropTarget, FormBuilder};
//!
//! let mut builder = FormBuilder::new(catalog);
//! builder.select_dataset("d1")?;
//! builder.add_root_table("t1", "ord", "Order Info")?;
//! builder.select_table("t1");
//!
//! let field = builder.available_fields()[0].clone();
//! builder.begin_drag(DragPayload::UnplacedField(field));
//! builder.drop_on(DropTarget::TableSurface);
//! ```

pub mod builder;
pub mod events;
pub mod models;
pub mod reorder;

// Re-exports for convenience
pub use builder::FormBuilder;
pub use events::LayoutEvent;
pub use models::{
    Block, BlockId, BlockLayout, Dependency, FieldOverrides, FieldProperty, FormField, TableTree,
    TreeNode,
};
pub use reorder::{DragPayload, DragState, DropTarget, ReorderMachine};
