use crate::melt::TableConfig;
use serde::Deserialize;

/// Configuration for schema inference and query execution
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryConfig {
    /// Synthesize filter arguments on list-of-object fields. When off,
    /// fields whose key is a pure number are left out of the schema instead.
    pub enable_filtering: bool,

    /// Report type-name collisions and surplus filter arguments as errors
    /// instead of only logging them
    pub strict: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            enable_filtering: true,
            strict: false,
        }
    }
}

/// Options handed to every operator of one evaluation.
///
/// Deserializes from a flat camelCase object, e.g.
/// `{"enableFiltering": false, "separator": "/"}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    #[serde(flatten)]
    pub query: QueryConfig,

    #[serde(flatten)]
    pub table: TableConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = TransformOptions::default();
        assert!(options.query.enable_filtering);
        assert!(!options.query.strict);
        assert_eq!(options.table.separator, "/");
    }

    #[test]
    fn test_from_visitor_options() {
        let options: TransformOptions =
            serde_json::from_value(json!({"enableFiltering": false, "strict": true})).unwrap();
        assert!(!options.query.enable_filtering);
        assert!(options.query.strict);
        assert_eq!(options.table.separator, "/");
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let options: TransformOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, TransformOptions::default());
    }
}
