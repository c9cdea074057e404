//! Events produced when a drag resolves

use uuid::Uuid;

use crate::models::BlockId;

/// What a drop did to the layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    /// A palette field was placed.
    Placed {
        form_id: Uuid,
        table_id: String,
        block_id: BlockId,
    },

    /// A placed field moved into another block.
    MovedToBlock {
        form_id: Uuid,
        from: BlockId,
        to: BlockId,
    },

    /// Fields of one block changed order.
    ReorderedWithinBlock { table_id: String, block_id: BlockId },

    /// Blocks of a table changed display order.
    ReorderedBlocks {
        table_id: String,
        /// The new display order
        order: Vec<BlockId>,
    },

    /// The drag ended without a valid target; nothing changed.
    Discarded,
}

impl LayoutEvent {
    /// Whether the drop mutated the layout
    pub fn is_change(&self) -> bool {
        !matches!(self, LayoutEvent::Discarded)
    }
}
