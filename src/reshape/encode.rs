use serde_json::{json, Value};

/// The only encoding mode that transforms its input
pub const NAME_CHILDREN: &str = "name-children";

/// A node of the name/children encoding used by hierarchical charts
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedNode {
    Branch { name: Value, children: Vec<EncodedNode> },
    Leaf { name: Value },
}

impl From<EncodedNode> for Value {
    fn from(node: EncodedNode) -> Self {
        match node {
            EncodedNode::Branch { name, children } => json!({
                "name": name,
                "children": children.into_iter().map(Value::from).collect::<Vec<_>>(),
            }),
            EncodedNode::Leaf { name } => json!({ "name": name, "value": 1 }),
        }
    }
}

/// Encode `value` when `mode` is exactly "name-children", otherwise return it
/// unchanged.
pub fn encode(value: &Value, mode: &str) -> Value {
    if mode != NAME_CHILDREN {
        return value.clone();
    }
    Value::Array(encode_nodes(value).into_iter().map(Value::from).collect())
}

/// A bare scalar becomes a single leaf named by the scalar itself. Container
/// entries become branches when they have children and weighted leaves
/// otherwise; array entries are named by their index.
pub fn encode_nodes(value: &Value) -> Vec<EncodedNode> {
    match value {
        Value::Object(_) | Value::Array(_) => children(value),
        scalar => vec![EncodedNode::Leaf {
            name: scalar.clone(),
        }],
    }
}

fn children(value: &Value) -> Vec<EncodedNode> {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(obj) => obj.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(arr) => arr.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .map(|(key, child)| {
            let nested = children(child);
            if nested.is_empty() {
                EncodedNode::Leaf { name: Value::String(key) }
            } else {
                EncodedNode::Branch {
                    name: Value::String(key),
                    children: nested,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_nested_object() {
        assert_eq!(
            encode(&json!({"x": {"y": 1}}), NAME_CHILDREN),
            json!([{"name": "x", "children": [{"name": "y", "value": 1}]}])
        );
    }

    #[test]
    fn test_bare_scalar() {
        assert_eq!(
            encode(&json!("solo"), NAME_CHILDREN),
            json!([{"name": "solo", "value": 1}])
        );
        assert_eq!(
            encode(&Value::Null, NAME_CHILDREN),
            json!([{"name": null, "value": 1}])
        );
    }

    #[test]
    fn test_empty_containers_are_leaves() {
        assert_eq!(
            encode(&json!({"a": {}, "b": [], "c": "text"}), NAME_CHILDREN),
            json!([
                {"name": "a", "value": 1},
                {"name": "b", "value": 1},
                {"name": "c", "value": 1}
            ])
        );
    }

    #[test]
    fn test_arrays_use_indices() {
        assert_eq!(
            encode(&json!({"tags": ["p", "q"]}), NAME_CHILDREN),
            json!([{
                "name": "tags",
                "children": [{"name": "0", "value": 1}, {"name": "1", "value": 1}]
            }])
        );
    }

    #[test]
    fn test_other_modes_pass_through() {
        let input = json!({"x": {"y": 1}});
        assert_eq!(encode(&input, "other"), input);
        assert_eq!(encode(&input, "Name-Children"), input);
    }

    #[test]
    fn test_typed_nodes() {
        let nodes = encode_nodes(&json!({"a": {"b": 2}}));
        assert_eq!(
            nodes,
            vec![EncodedNode::Branch {
                name: json!("a"),
                children: vec![EncodedNode::Leaf { name: json!("b") }],
            }]
        );
    }

    proptest! {
        #[test]
        fn prop_other_modes_are_identity(
            pairs in proptest::collection::vec(("[a-z]{1,3}", -3i64..3), 0..6),
            mode in "[a-z-]{0,14}",
        ) {
            prop_assume!(mode != NAME_CHILDREN);
            let obj = Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
            prop_assert_eq!(encode(&obj, &mode), obj);
        }
    }
}
