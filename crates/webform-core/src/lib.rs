//! Webform Core - schema catalog abstractions for the webform builder
//!
//! This crate provides the read-only view of a remote dataset schema that the
//! layout engine and the form codec build on. It defines:
//!
//! - `Dataset`, `Table`, `Field` - the catalog data as delivered by the schema service
//! - `SchemaCatalog` - lookup of tables by id or by name within one dataset
//! - `FieldKind` - classification of field type strings into the groups the codec cares about
//! - Schema payload parsing for raw `tableSchemas` responses
//! - `WebformError` - the shared error type

mod error;
mod field_kind;
mod schema;
mod schema_payload;

pub use error::*;
pub use field_kind::*;
pub use schema::*;
pub use schema_payload::*;
