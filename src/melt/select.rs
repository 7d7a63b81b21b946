use crate::melt::types::{Record, Relation};
use std::collections::HashSet;

/// Project `rows` onto `columns`, keeping the first row of every distinct
/// projected combination in first-seen order.
///
/// An empty column list returns the rows unchanged. Columns missing from a
/// row are left out of its projection.
pub fn select<C: AsRef<str>>(rows: Relation, columns: &[C]) -> Relation {
    if columns.is_empty() {
        return rows;
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut table = Vec::new();

    for row in rows.iter() {
        let mut record = Record::new();
        for column in columns {
            let column = column.as_ref();
            if let Some(value) = row.get(column) {
                record.insert(column.to_string(), value.clone());
            }
        }

        // Stable text of the projection; columns keep the requested order.
        let key = serde_json::Value::Object(record.clone()).to_string();
        if seen.insert(key) {
            table.push(record);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::extractor::table;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn relation(value: Value) -> Relation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dedup_projection() {
        let rows = relation(json!([{"/a": 1}, {"/a": 1}, {"/a": 2}]));
        let out = select(rows, &["/a"]);
        assert_eq!(out, relation(json!([{"/a": 1}, {"/a": 2}])));
    }

    #[test]
    fn test_empty_columns_is_identity() {
        let rows = relation(json!([{"/a": 1}, {"/a": 1}]));
        let none: [&str; 0] = [];
        assert_eq!(select(rows.clone(), &none), rows);
    }

    #[test]
    fn test_projects_flattened_document() {
        let rows = table(&json!({
            "user": "alice",
            "posts": [
                {"id": 1, "tags": ["a", "b"]},
                {"id": 2, "tags": ["a"]}
            ]
        }));
        assert_eq!(rows.len(), 3);

        let out = select(rows, &["/user", "/posts/id"]);
        assert_eq!(
            out,
            relation(json!([
                {"/user": "alice", "/posts/id": 1},
                {"/user": "alice", "/posts/id": 2}
            ]))
        );
    }

    #[test]
    fn test_missing_columns_are_omitted() {
        let rows = relation(json!([{"/a": 1}, {"/b": 2}, {"/b": 3}]));
        let out = select(rows, &["/a"]);
        assert_eq!(out, relation(json!([{"/a": 1}, {}])));
    }

    #[test]
    fn test_null_differs_from_missing() {
        let rows = relation(json!([{"/a": null}, {}]));
        let out = select(rows, &["/a"]);
        assert_eq!(out.len(), 2);
    }

    fn arb_relation() -> impl Strategy<Value = Relation> {
        let cell = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (0i64..4).prop_map(Value::from),
            "[ab]".prop_map(Value::from),
        ];
        let row = proptest::collection::btree_map("/[abc]", cell, 0..3)
            .prop_map(|cells| cells.into_iter().collect::<Record>());
        proptest::collection::vec(row, 0..12)
    }

    proptest! {
        #[test]
        fn prop_select_is_idempotent(rows in arb_relation(), cols in proptest::collection::vec("/[abc]", 1..3)) {
            let once = select(rows, cols.as_slice());
            let twice = select(once.clone(), cols.as_slice());
            prop_assert_eq!(&once, &twice);

            let keys: HashSet<String> = once
                .iter()
                .map(|r| Value::Object(r.clone()).to_string())
                .collect();
            prop_assert_eq!(keys.len(), once.len());
        }
    }
}
