//! protoxs-descriptor
//!
//! The read-only descriptor model consumed by the protoxs code generator:
//! schema files, message and enum declarations, and field specifications,
//! exactly as emitted by the upstream schema compiler.  The types
//! round-trip through serde so a descriptor set can be carried as a JSON
//! document between tools.

pub mod types;

pub use types::{
    simple_name, EnumSpec, EnumValue, FieldSpec, MessageSpec, ScalarKind, SchemaFile, SchemaSet,
};
