//! Schema inference from a single sample value
//!
//! The rule is purely structural: booleans are `Boolean`, non-empty arrays
//! are lists of their first element's type, non-empty objects are object
//! types, and everything else (strings, numbers, null, empty containers)
//! is `String`.

use crate::config::QueryConfig;
use crate::error::ShapeError;
use crate::schema::types::{ArgumentDef, FieldDef, ObjectType, ScalarType, Schema, SchemaType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Name of the synthetic field that wraps the queried value
pub const ROOT_FIELD: &str = "root";

static NAME_SANITIZE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[() ]").unwrap());

static NUMERIC_KEY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Replace parentheses and spaces with underscores
pub fn normalize_name(name: &str) -> String {
    NAME_SANITIZE_REGEX.replace_all(name, "_").into_owned()
}

/// Records which value path first produced each object type name
#[derive(Debug, Default)]
struct TypeNames {
    origins: HashMap<String, String>,
}

impl TypeNames {
    fn intern(&mut self, name: &str, origin: &str) -> Option<ShapeError> {
        match self.origins.get(name) {
            Some(first) if first != origin => Some(ShapeError::SchemaNameCollision {
                name: name.to_string(),
                first: first.clone(),
                second: origin.to_string(),
            }),
            Some(_) => None,
            None => {
                self.origins.insert(name.to_string(), origin.to_string());
                None
            }
        }
    }
}

/// Builds object types for one schema-construction pass.
pub struct SchemaBuilder {
    config: QueryConfig,
    names: TypeNames,
    collisions: Vec<ShapeError>,
}

impl SchemaBuilder {
    pub fn new(config: QueryConfig) -> Self {
        SchemaBuilder {
            config,
            names: TypeNames::default(),
            collisions: Vec::new(),
        }
    }

    /// Infer the type of `val`; `name` seeds object type names and `origin`
    /// is the value path reported on collisions.
    pub fn type_from_value(&mut self, name: &str, val: &Value, origin: &str) -> SchemaType {
        match val {
            Value::Bool(_) => SchemaType::Scalar(ScalarType::Boolean),
            Value::Array(arr) if !arr.is_empty() => {
                let child = self.type_from_value(
                    &format!("{name}_child"),
                    &arr[0],
                    &format!("{origin}[]"),
                );
                SchemaType::List(Box::new(child))
            }
            Value::Object(obj) if !obj.is_empty() => {
                SchemaType::Object(self.object_type(name, obj, origin))
            }
            _ => SchemaType::Scalar(ScalarType::String),
        }
    }

    /// Build an object type, attaching filter arguments to list-of-object
    /// fields when filtering is enabled.
    pub fn object_type(&mut self, name: &str, obj: &Map<String, Value>, origin: &str) -> ObjectType {
        let name = normalize_name(name);
        if let Some(collision) = self.names.intern(&name, origin) {
            warn!(%collision, "object type name reused");
            self.collisions.push(collision);
        }

        let mut fields = Vec::with_capacity(obj.len());
        for (key, value) in obj.iter() {
            if !self.config.enable_filtering && NUMERIC_KEY_REGEX.is_match(key) {
                continue;
            }

            let ty = self.type_from_value(
                &format!("{name}_{key}"),
                value,
                &format!("{origin}.{key}"),
            );
            let args = if self.config.enable_filtering {
                filter_arguments(&ty)
            } else {
                Vec::new()
            };

            fields.push(FieldDef {
                name: key.clone(),
                ty,
                args,
            });
        }

        ObjectType { name, fields }
    }

    /// Build the query root for `value`, wrapped under the synthetic root
    /// field so arrays and scalars are queryable like objects.
    pub fn build(mut self, value: &Value) -> Schema {
        let mut wrapper = Map::new();
        wrapper.insert(ROOT_FIELD.to_string(), value.clone());
        let query = self.object_type(ROOT_FIELD, &wrapper, "$");
        debug!(
            types = self.names.origins.len(),
            collisions = self.collisions.len(),
            "inferred schema"
        );
        Schema {
            query,
            collisions: self.collisions,
        }
    }
}

/// One argument per scalar field of a `List(Object)` element type.
fn filter_arguments(ty: &SchemaType) -> Vec<ArgumentDef> {
    match ty {
        SchemaType::List(inner) => match inner.as_ref() {
            SchemaType::Object(element) => element
                .fields
                .iter()
                .filter_map(|field| match field.ty {
                    SchemaType::Scalar(scalar) => Some(ArgumentDef {
                        name: field.name.clone(),
                        ty: scalar,
                    }),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Infer the wrapped query schema for `value`
pub fn infer_schema(value: &Value, config: &QueryConfig) -> Schema {
    SchemaBuilder::new(config.clone()).build(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn infer(name: &str, val: Value) -> SchemaType {
        SchemaBuilder::new(QueryConfig::default()).type_from_value(name, &val, "$")
    }

    fn root_type(schema: &Schema) -> &SchemaType {
        &schema.query.field(ROOT_FIELD).unwrap().ty
    }

    #[test]
    fn test_scalar_rules() {
        assert_eq!(infer("x", json!(true)), SchemaType::Scalar(ScalarType::Boolean));
        assert_eq!(infer("x", json!("s")), SchemaType::Scalar(ScalarType::String));
        assert_eq!(infer("x", json!(3.5)), SchemaType::Scalar(ScalarType::String));
        assert_eq!(infer("x", json!(null)), SchemaType::Scalar(ScalarType::String));
        assert_eq!(infer("x", json!([])), SchemaType::Scalar(ScalarType::String));
        assert_eq!(infer("x", json!({})), SchemaType::Scalar(ScalarType::String));
    }

    #[test]
    fn test_list_uses_first_element_only() {
        assert_eq!(
            infer("x", json!([true, "no", 3])),
            SchemaType::List(Box::new(SchemaType::Scalar(ScalarType::Boolean)))
        );
    }

    #[test]
    fn test_object_names_are_sanitized() {
        let ty = infer("my (thing)", json!({"inner value": {"a": 1}}));
        let obj = ty.named_object().unwrap();
        assert_eq!(obj.name, "my__thing_");
        let inner = obj.field("inner value").unwrap().ty.named_object().unwrap();
        assert_eq!(inner.name, "my__thing__inner_value");
    }

    #[test]
    fn test_list_element_names() {
        let schema = infer_schema(&json!([{"id": 1}]), &QueryConfig::default());
        let element = root_type(&schema).named_object().unwrap();
        assert_eq!(element.name, "root_root_child");
        assert_eq!(schema.query.name, "root");
    }

    #[test]
    fn test_filter_arguments_for_list_of_objects() {
        let schema = infer_schema(
            &json!({"posts": [{"id": 1, "title": "A", "draft": false, "tags": ["x"]}], "name": "n"}),
            &QueryConfig::default(),
        );
        let data = root_type(&schema).named_object().unwrap();
        let posts = data.field("posts").unwrap();
        let names: Vec<(&str, ScalarType)> =
            posts.args.iter().map(|a| (a.name.as_str(), a.ty)).collect();
        assert_eq!(
            names,
            vec![
                ("id", ScalarType::String),
                ("title", ScalarType::String),
                ("draft", ScalarType::Boolean),
            ]
        );
        assert!(data.field("name").unwrap().args.is_empty());
    }

    #[test]
    fn test_filtering_disabled_drops_numeric_keys() {
        let config = QueryConfig {
            enable_filtering: false,
            ..QueryConfig::default()
        };
        let schema = infer_schema(&json!({"2021": 5, "a1": 1, "posts": [{"id": 1}]}), &config);
        let data = root_type(&schema).named_object().unwrap();
        let names: Vec<&str> = data.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "posts"]);
        assert!(data.field("posts").unwrap().args.is_empty());
    }

    #[test]
    fn test_name_collision_is_recorded() {
        let schema = infer_schema(
            &json!({"a b": {"x": 1}, "a_b": {"y": 2}}),
            &QueryConfig::default(),
        );
        assert_eq!(schema.collisions.len(), 1);
        match &schema.collisions[0] {
            ShapeError::SchemaNameCollision { name, first, second } => {
                assert_eq!(name, "root_root_a_b");
                assert_eq!(first, "$.root.a b");
                assert_eq!(second, "$.root.a_b");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_numbers_are_strings() {
        let schema = infer_schema(&json!(42), &QueryConfig::default());
        assert_eq!(root_type(&schema), &SchemaType::Scalar(ScalarType::String));
    }
}
