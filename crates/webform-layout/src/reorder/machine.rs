//! Reorder state machine

use uuid::Uuid;
use webform_core::Field;

use crate::events::LayoutEvent;
use crate::models::{BlockId, BlockLayout};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A schema field from the palette, not yet on the form
    UnplacedField(Field),
    /// A field already on the form
    PlacedField(Uuid),
    /// A whole block, by its header
    Block { table_id: String, block_id: BlockId },
}

/// Where a drag was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The header of a block; blocks are reordered here
    BlockHeader { table_id: String, block_id: BlockId },
    /// The body of a block; fields are placed or moved here
    BlockBody { table_id: String, block_id: BlockId },
    /// A placed field; fields of one block are reordered here
    FieldSlot(Uuid),
    /// The form surface of the selected table outside any block
    TableSurface,
    /// Nothing
    None,
}

/// Drag state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragPayload),
}

/// Turns drag start / drag end pairs into layout mutations.
///
/// Holds nothing but the payload of the drag in progress. Every drop returns
/// the machine to `Idle`; an unrecognised or mismatched payload/target pair is
/// discarded without touching the layout.
#[derive(Debug, Clone, Default)]
pub struct ReorderMachine {
    state: DragState,
}

impl ReorderMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start a drag. A drag already in progress is abandoned.
    pub fn begin(&mut self, payload: DragPayload) {
        self.state = DragState::Dragging(payload);
    }

    /// Abandon the drag in progress
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Resolve the drag in progress against `target`.
    ///
    /// `selected_table` is the table currently shown on the form surface;
    /// drops aimed at any other table are discarded.
    pub fn drop_on(
        &mut self,
        target: DropTarget,
        layout: &mut BlockLayout,
        selected_table: Option<&str>,
    ) -> LayoutEvent {
        let DragState::Dragging(payload) = std::mem::take(&mut self.state) else {
            return LayoutEvent::Discarded;
        };
        let Some(selected) = selected_table else {
            tracing::debug!("drop discarded: no table selected");
            return LayoutEvent::Discarded;
        };

        let event = resolve(payload, target, layout, selected);
        if !event.is_change() {
            tracing::debug!("drop discarded");
        }
        event
    }
}

fn resolve(
    payload: DragPayload,
    target: DropTarget,
    layout: &mut BlockLayout,
    selected: &str,
) -> LayoutEvent {
    match (payload, target) {
        // Block onto another block's header: reorder blocks
        (
            DragPayload::Block { table_id, block_id },
            DropTarget::BlockHeader {
                table_id: target_table,
                block_id: target_block,
            },
        ) => {
            if table_id != target_table || table_id != selected {
                return LayoutEvent::Discarded;
            }
            if layout.reorder_blocks(&table_id, block_id, target_block) {
                let order = layout.block_order(&table_id);
                LayoutEvent::ReorderedBlocks { table_id, order }
            } else {
                LayoutEvent::Discarded
            }
        }

        // Palette field onto a block body: join that block
        (
            DragPayload::UnplacedField(field),
            DropTarget::BlockBody { table_id, block_id },
        ) => {
            if table_id != selected {
                return LayoutEvent::Discarded;
            }
            place(layout, selected, &field, Some(block_id))
        }

        // Palette field onto the surface: open a new block
        (DragPayload::UnplacedField(field), DropTarget::TableSurface) => {
            place(layout, selected, &field, None)
        }

        // Placed field onto another block's body: move it there
        (DragPayload::PlacedField(form_id), DropTarget::BlockBody { table_id, block_id }) => {
            let Some(from) = layout
                .get(form_id)
                .filter(|f| f.table_id == table_id && table_id == selected)
                .map(|f| f.block_id)
            else {
                return LayoutEvent::Discarded;
            };
            if layout.move_to_block(form_id, block_id) {
                LayoutEvent::MovedToBlock {
                    form_id,
                    from,
                    to: block_id,
                }
            } else {
                LayoutEvent::Discarded
            }
        }

        // Placed field onto a sibling: reorder within the block
        (DragPayload::PlacedField(form_id), DropTarget::FieldSlot(over)) => {
            let Some((table_id, block_id)) = layout
                .get(form_id)
                .filter(|f| f.table_id == selected)
                .map(|f| (f.table_id.clone(), f.block_id))
            else {
                return LayoutEvent::Discarded;
            };
            if layout.reorder_within_block(form_id, over) {
                LayoutEvent::ReorderedWithinBlock { table_id, block_id }
            } else {
                LayoutEvent::Discarded
            }
        }

        _ => LayoutEvent::Discarded,
    }
}

fn place(layout: &mut BlockLayout, table_id: &str, field: &Field, block_id: Option<BlockId>) -> LayoutEvent {
    match layout.place(table_id, field, block_id) {
        Some(form_id) => LayoutEvent::Placed {
            form_id,
            table_id: table_id.to_string(),
            block_id: layout.get(form_id).map_or(0, |f| f.block_id),
        },
        None => LayoutEvent::Discarded,
    }
}
