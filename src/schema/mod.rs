//! Schema inference
//!
//! Infers a queryable structural schema from one sample value. Numbers are
//! modeled as strings and lists take the type of their first element.

pub mod types;
pub mod builder;
pub mod sdl;

pub use types::{ArgumentDef, FieldDef, ObjectType, ScalarType, Schema, SchemaType};
pub use builder::{infer_schema, normalize_name, SchemaBuilder, ROOT_FIELD};
