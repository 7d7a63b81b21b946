use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Direction for [`sort`]. Any unrecognized order name leaves every level in
/// its original order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
    Unordered,
}

impl SortOrder {
    pub fn parse(name: &str) -> Self {
        match name {
            "ascending" => SortOrder::Ascending,
            "descending" => SortOrder::Descending,
            _ => SortOrder::Unordered,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Descending => ordering.reverse(),
            _ => ordering,
        }
    }
}

/// Recursively sort `value` by the order named `order`.
pub fn sort(value: &Value, order: &str) -> Value {
    sort_value(value, SortOrder::parse(order))
}

/// Returns a new value: object keys are enumerated in sorted order and
/// string array elements are reordered. The input is never modified.
pub fn sort_value(value: &Value, order: SortOrder) -> Value {
    match value {
        Value::Array(arr) => {
            let mut items: Vec<Value> = arr.iter().map(|v| sort_value(v, order)).collect();
            if order != SortOrder::Unordered {
                sort_string_runs(&mut items, order);
            }
            Value::Array(items)
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            if order != SortOrder::Unordered {
                keys.sort_by(|a, b| order.apply(a.cmp(b)));
            }
            let mut node = Map::new();
            for key in keys {
                node.insert(key.clone(), sort_value(&obj[key.as_str()], order));
            }
            Value::Object(node)
        }
        scalar => scalar.clone(),
    }
}

/// Only string pairs are comparable; a non-string compares equal to
/// everything, so no string ever moves across one. Each maximal run of
/// strings is sorted stably on its own and non-strings keep their index.
fn sort_string_runs(items: &mut [Value], order: SortOrder) {
    let mut start = 0;
    while start < items.len() {
        if !items[start].is_string() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < items.len() && items[end].is_string() {
            end += 1;
        }
        items[start..end].sort_by(|a, b| match (a, b) {
            (Value::String(x), Value::String(y)) => order.apply(x.cmp(y)),
            _ => Ordering::Equal,
        });
        start = end;
    }
}
