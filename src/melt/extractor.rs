use crate::melt::types::{Record, Relation, TableConfig};
use serde_json::{Map, Value};
use tracing::debug;

/// Denormalizes nested JSON into a flat relation.
///
/// Sibling keys of an object are combined as a Cartesian product, so the
/// output holds one row per combination of multivalued descendants. Array
/// elements are concatenated.
pub struct Tabularizer {
    config: TableConfig,
}

impl Tabularizer {
    pub fn new(config: TableConfig) -> Self {
        Tabularizer { config }
    }

    /// Flatten a whole document. Scalars at the root yield no rows.
    pub fn table(&self, value: &Value) -> Relation {
        let rows = match value {
            Value::Array(arr) => self.list("", arr),
            Value::Object(obj) => self.record("", obj),
            _ => Vec::new(),
        };
        debug!(rows = rows.len(), "tabularized value");
        rows
    }

    /// Rows for an object at `path`.
    ///
    /// A key whose value yields no rows (an empty array or object) empties the
    /// rows accumulated so far. The next key that yields rows seeds them again,
    /// so the result depends on key order.
    pub fn record(&self, path: &str, obj: &Map<String, Value>) -> Relation {
        let mut rows: Relation = Vec::new();

        for (key, node) in obj.iter() {
            let name = self.config.join(path, key);
            let records = self.extract(&name, node);

            if rows.is_empty() {
                rows = records;
                continue;
            }

            let mut product = Vec::with_capacity(rows.len() * records.len());
            for row in &rows {
                for record in &records {
                    let mut merged = row.clone();
                    for (k, v) in record {
                        merged.insert(k.clone(), v.clone());
                    }
                    product.push(merged);
                }
            }
            rows = product;
        }

        rows
    }

    /// Rows for an array at `path`. Elements keep the array's path.
    pub fn list(&self, path: &str, arr: &[Value]) -> Relation {
        let mut rows = Vec::new();
        for node in arr {
            rows.extend(self.extract(path, node));
        }
        rows
    }

    fn extract(&self, path: &str, node: &Value) -> Relation {
        match node {
            Value::Array(arr) => self.list(path, arr),
            Value::Object(obj) => self.record(path, obj),
            scalar => {
                let mut record = Record::new();
                record.insert(path.to_string(), scalar.clone());
                vec![record]
            }
        }
    }
}

impl Default for Tabularizer {
    fn default() -> Self {
        Tabularizer::new(TableConfig::default())
    }
}

/// Flatten `value` with the default "/" separator
pub fn table(value: &Value) -> Relation {
    Tabularizer::default().table(value)
}
