use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// A slash-joined key sequence locating a leaf in nested JSON, e.g. "/posts/id".
/// The root path is the empty string.
pub type Path = String;

/// One row of a relation: leaf path -> scalar value
pub type Record = Map<String, Value>;

/// Ordered rows produced by tabularizing a JSON value.
/// Rows need not share the same key set.
pub type Relation = Vec<Record>;

/// Configuration for tabularizing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Joins a parent path and a key
    pub separator: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            separator: String::from("/"),
        }
    }
}

impl TableConfig {
    /// Append `key` to `parent`. Paths are only ever extended.
    pub fn join(&self, parent: &str, key: &str) -> Path {
        let mut path = String::with_capacity(parent.len() + self.separator.len() + key.len());
        path.push_str(parent);
        path.push_str(&self.separator);
        path.push_str(key);
        path
    }
}

/// Group key for a cell that is absent from its row. Kept apart from "null".
pub const MISSING_KEY: &str = "undefined";

/// Text form of a scalar used when a value becomes a map key.
///
/// Strings are used verbatim and numbers go through [`number_text`]. Other
/// values use their JSON text. A missing cell maps to [`MISSING_KEY`].
pub fn key_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
        None => String::from(MISSING_KEY),
    }
}

/// Shortest text for a number. Integral floats drop their fraction, so
/// `1.0` reads "1" like the integer it equals.
pub fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                String::from("0")
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}
