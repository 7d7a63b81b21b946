use crate::schema::types::{FieldDef, Schema};
use std::fmt::Write;

/// Render the schema as GraphQL-style type definitions, root first.
pub fn render(schema: &Schema) -> String {
    let mut out = String::new();
    for (i, obj) in schema.object_types().into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "type {} {{", obj.name);
        for field in &obj.fields {
            let _ = writeln!(out, "  {}", render_field(field));
        }
        out.push_str("}\n");
    }
    out
}

fn render_field(field: &FieldDef) -> String {
    if field.args.is_empty() {
        return format!("{}: {}", field.name, field.ty);
    }
    let args: Vec<String> = field
        .args
        .iter()
        .map(|a| format!("{}: {}", a.name, a.ty))
        .collect();
    format!("{}({}): {}", field.name, args.join(", "), field.ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::schema::builder::infer_schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_render_with_filters() {
        let schema = infer_schema(
            &json!({"posts": [{"id": 1, "title": "A"}], "ok": true}),
            &QueryConfig::default(),
        );
        let expected = "\
type root {
  root: root_root
}

type root_root {
  posts(id: String, title: String): [root_root_posts_child]
  ok: Boolean
}

type root_root_posts_child {
  id: String
  title: String
}
";
        assert_eq!(render(&schema), expected);
    }

    #[test]
    fn test_render_scalar_root() {
        let schema = infer_schema(&json!("x"), &QueryConfig::default());
        assert_eq!(render(&schema), "type root {\n  root: String\n}\n");
    }
}
