//! Drag-and-drop reordering
//!
//! Pointer capture happens elsewhere; this module only sees a drag start with
//! a typed payload and a drag end over a typed target, and resolves the pair
//! against the layout in one synchronous step.

mod machine;


pub use machine::*;
