//! Query execution against an inferred schema
//!
//! The queried value is wrapped under the synthetic `root` field, so the
//! caller's text is spliced in as that field's selection: `{root <query>}`.
//! Validation failures return no data. Execution failures (values that
//! cannot be serialized as their declared scalar type) null the offending
//! field and are returned next to the partial data.

use crate::config::QueryConfig;
use crate::error::ShapeError;
use crate::melt::number_text;
use crate::query::parser::{parse_query, Selection};
use crate::schema::{infer_schema, FieldDef, ObjectType, ScalarType, Schema, SchemaType, ROOT_FIELD};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const TYPENAME_FIELD: &str = "__typename";

/// Data selected by a query plus every error met along the way
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub data: Option<Value>,
    pub errors: Vec<ShapeError>,
}

impl QueryResult {
    fn failed(errors: Vec<ShapeError>) -> Self {
        QueryResult { data: None, errors }
    }
}

/// Infer a schema from `value` and run `query` against it.
pub fn run_query(query: &str, value: &Value, config: &QueryConfig) -> QueryResult {
    let schema = infer_schema(value, config);
    execute(&schema, query, value, config)
}

/// Run `query` against `value` using a previously inferred `schema`.
pub fn execute(schema: &Schema, query: &str, value: &Value, config: &QueryConfig) -> QueryResult {
    let mut errors = Vec::new();
    if config.strict {
        errors.extend(schema.collisions.iter().cloned());
    }

    let document = format!("{{{ROOT_FIELD} {query} }}");
    let selections = match parse_query(&document) {
        Ok(selections) => selections,
        Err(err) => {
            errors.push(err);
            return QueryResult::failed(errors);
        }
    };

    let before = errors.len();
    validate_selections(&schema.query, &selections, &mut errors);
    if errors.len() > before {
        return QueryResult::failed(errors);
    }

    let mut wrapper = Map::new();
    wrapper.insert(ROOT_FIELD.to_string(), value.clone());

    let mut executor = Executor {
        config,
        errors: &mut errors,
    };
    let mut path = Vec::new();
    let mut data = executor.complete_object(&schema.query, &wrapper, &selections, &mut path);
    debug!(errors = errors.len(), "executed query");

    QueryResult {
        data: data.remove(ROOT_FIELD),
        errors,
    }
}

fn validate_selections(parent: &ObjectType, selections: &[Selection], errors: &mut Vec<ShapeError>) {
    for selection in selections {
        if selection.name == TYPENAME_FIELD {
            if !selection.arguments.is_empty() || !selection.selections.is_empty() {
                errors.push(ShapeError::query(format!(
                    "Field \"{TYPENAME_FIELD}\" takes no arguments or selections."
                )));
            }
            continue;
        }

        let Some(field) = parent.field(&selection.name) else {
            errors.push(ShapeError::query(format!(
                "Cannot query field \"{}\" on type \"{}\".",
                selection.name, parent.name
            )));
            continue;
        };

        for (name, _) in &selection.arguments {
            if field.argument(name).is_none() {
                errors.push(ShapeError::query(format!(
                    "Unknown argument \"{name}\" on field \"{}.{}\".",
                    parent.name, field.name
                )));
            }
        }

        match field.ty.named_object() {
            Some(_) if selection.selections.is_empty() => {
                errors.push(ShapeError::query(format!(
                    "Field \"{}\" of type \"{}\" must have a selection of subfields. Did you mean \"{} {{ ... }}\"?",
                    field.name, field.ty, field.name
                )));
            }
            Some(child) => validate_selections(child, &selection.selections, errors),
            None if !selection.selections.is_empty() => {
                errors.push(ShapeError::query(format!(
                    "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                    field.name, field.ty
                )));
            }
            None => {}
        }
    }
}

struct Executor<'a> {
    config: &'a QueryConfig,
    errors: &'a mut Vec<ShapeError>,
}

impl Executor<'_> {
    fn complete_object(
        &mut self,
        ty: &ObjectType,
        source: &Map<String, Value>,
        selections: &[Selection],
        path: &mut Vec<String>,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for selection in selections {
            let key = selection.response_key().to_string();
            if selection.name == TYPENAME_FIELD {
                out.insert(key, Value::String(ty.name.clone()));
                continue;
            }
            // Validation guarantees the field exists
            let Some(field) = ty.field(&selection.name) else {
                continue;
            };

            path.push(key.clone());
            let resolved = self.resolve(field, source, selection, path);
            let completed = self.complete(&field.ty, &resolved, &selection.selections, path);
            path.pop();

            out.insert(key, completed);
        }
        out
    }

    /// Read the field from its parent, applying the first filter argument
    /// to list-of-object fields.
    fn resolve(&mut self, field: &FieldDef, source: &Map<String, Value>, selection: &Selection, path: &[String]) -> Value {
        let data = source.get(&field.name).cloned().unwrap_or(Value::Null);
        let Some((name, wanted)) = selection.arguments.first() else {
            return data;
        };

        if selection.arguments.len() > 1 {
            let overflow = ShapeError::FilterArgumentOverflow {
                field: path.join("."),
                supplied: selection.arguments.len(),
                honored: name.clone(),
            };
            warn!(%overflow, "ignoring extra filter arguments");
            if self.config.strict {
                self.errors.push(overflow);
            }
        }

        let matches: Vec<Value> = match &data {
            Value::Array(items) => items
                .iter()
                .filter(|item| {
                    item.as_object()
                        .and_then(|obj| obj.get(name))
                        .is_some_and(|found| filter_matches(found, wanted))
                })
                .cloned()
                .collect(),
            _ => Vec::new(),
        };

        if matches.is_empty() {
            Value::Null
        } else {
            Value::Array(matches)
        }
    }

    fn complete(&mut self, ty: &SchemaType, value: &Value, selections: &[Selection], path: &mut Vec<String>) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match ty {
            SchemaType::Scalar(scalar) => match serialize_scalar(*scalar, value) {
                Ok(v) => v,
                Err(message) => {
                    self.errors.push(ShapeError::query_at(message, path));
                    Value::Null
                }
            },
            SchemaType::List(inner) => match value {
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (idx, item) in items.iter().enumerate() {
                        path.push(idx.to_string());
                        out.push(self.complete(inner, item, selections, path));
                        path.pop();
                    }
                    Value::Array(out)
                }
                _ => {
                    self.errors.push(ShapeError::query_at(
                        format!("Expected a list for field of type \"{ty}\", found {value}"),
                        path,
                    ));
                    Value::Null
                }
            },
            SchemaType::Object(obj) => {
                let empty = Map::new();
                let source = value.as_object().unwrap_or(&empty);
                Value::Object(self.complete_object(obj, source, selections, path))
            }
        }
    }
}

/// Serialize a leaf value as its declared scalar type
fn serialize_scalar(scalar: ScalarType, value: &Value) -> Result<Value, String> {
    match (scalar, value) {
        (ScalarType::String, Value::String(_)) => Ok(value.clone()),
        (ScalarType::String, Value::Number(n)) => Ok(Value::String(number_text(n))),
        (ScalarType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (ScalarType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (ScalarType::Boolean, Value::Number(n)) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
        (scalar, other) => Err(format!("{scalar} cannot represent value: {other}")),
    }
}

/// Equality used by filter arguments. Numeric fields are modeled as strings,
/// so a number and a string match when the number's text equals the string.
fn filter_matches(found: &Value, wanted: &Value) -> bool {
    match (found, wanted) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => number_text(n) == *s,
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => found == wanted,
    }
}
