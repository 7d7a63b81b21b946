use crate::melt::types::{key_text, Record};
use serde_json::{Map, Value};

/// Nested grouping index: each level is keyed by the distinct values rows
/// hold at one path. Leaves are empty objects.
pub type GroupTree = Map<String, Value>;

/// Regroup `rows` into a tree keyed successively by `paths`.
pub fn tree<P: AsRef<str>>(rows: &[Record], paths: &[P]) -> GroupTree {
    let mut root = GroupTree::new();

    for row in rows {
        let keys: Vec<String> = paths
            .iter()
            .map(|path| key_text(row.get(path.as_ref())))
            .collect();
        descend(&mut root, &keys);
    }

    root
}

fn descend(level: &mut GroupTree, keys: &[String]) {
    if let Some((first, rest)) = keys.split_first() {
        let child = level
            .entry(first.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = child {
            descend(map, rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::extractor::table;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_groups_distinct_combinations() {
        let rows = table(&json!([
            {"country": "NO", "city": "Oslo", "pop": 1},
            {"country": "NO", "city": "Bergen", "pop": 2},
            {"country": "SE", "city": "Lund", "pop": 3},
            {"country": "NO", "city": "Oslo", "pop": 4}
        ]));

        let grouped = tree(&rows, &["/country", "/city"]);
        assert_eq!(
            Value::Object(grouped),
            json!({
                "NO": {"Oslo": {}, "Bergen": {}},
                "SE": {"Lund": {}}
            })
        );
    }

    #[test]
    fn test_non_string_values_become_text_keys() {
        let rows = table(&json!([{"n": 1}, {"n": true}, {"n": null}]));
        let grouped = tree(&rows, &["/n"]);
        let keys: Vec<&String> = grouped.keys().collect();
        assert_eq!(keys, vec!["1", "true", "null"]);
    }

    #[test]
    fn test_no_paths_yields_empty_root() {
        let rows = table(&json!([{"a": 1}]));
        let empty: [&str; 0] = [];
        assert!(tree(&rows, &empty).is_empty());
    }

    #[test]
    fn test_missing_path_groups_apart_from_null() {
        let rows = table(&json!([{"a": 1}, {"b": 2}, {"a": null}]));
        let grouped = tree(&rows, &["/a"]);
        assert_eq!(
            Value::Object(grouped),
            json!({"1": {}, "undefined": {}, "null": {}})
        );
    }
}
