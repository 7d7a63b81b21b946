//! Operator evaluation over an operand tree
//!
//! Each operator node evaluates its operands first, left to right, and then
//! produces exactly one [`Evaluation`]. Errors are never short-circuited:
//! an operator's error list is its operands' errors concatenated in order,
//! followed by its own.

use crate::config::TransformOptions;
use crate::error::ShapeError;
use crate::fetch::{HttpTransport, SourceFetcher, Transport};
use crate::melt::{select, tree, Tabularizer};
use crate::query::run_query;
use crate::reshape::{encode, sort};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// An operand tree. Operands are themselves nodes; constants are
/// [`Node::Literal`].
///
/// Deserializes from JSON tagged by `op`, e.g.
/// `{"op": "sort", "order": {"op": "literal", "value": "ascending"}, "data": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Node {
    Literal { value: Value },
    Null,
    Fetch { url: Box<Node> },
    Query { query: Box<Node>, data: Box<Node> },
    Shape { paths: Box<Node>, data: Box<Node> },
    Flatten { columns: Box<Node>, data: Box<Node> },
    Encode { encoding: Box<Node>, data: Box<Node> },
    Sort { order: Box<Node>, data: Box<Node> },
}

impl Node {
    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Literal {
            value: value.into(),
        }
    }
}

/// Result of evaluating one node: a best-effort value plus accumulated errors
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub errors: Vec<ShapeError>,
    pub value: Value,
}

impl Evaluation {
    pub fn ok(value: Value) -> Self {
        Evaluation {
            errors: Vec::new(),
            value,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Concatenates operand errors in evaluation order
struct Errors(Vec<ShapeError>);

impl Errors {
    fn take(&mut self, eval: Evaluation) -> Value {
        self.0.extend(eval.errors);
        eval.value
    }

    fn finish(mut self, result: Result<Value, ShapeError>) -> Evaluation {
        match result {
            Ok(value) => Evaluation {
                errors: self.0,
                value,
            },
            Err(err) => {
                self.0.push(err);
                Evaluation {
                    errors: self.0,
                    value: Value::Null,
                }
            }
        }
    }
}

/// Runs operator handlers with one set of options and one fetcher
pub struct Transformer {
    options: TransformOptions,
    fetcher: SourceFetcher<Box<dyn Transport>>,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Self::with_transport(options, Box::new(HttpTransport::new()))
    }

    pub fn with_transport(options: TransformOptions, transport: Box<dyn Transport>) -> Self {
        Transformer {
            options,
            fetcher: SourceFetcher::new(transport),
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn visit(&self, node: &Node) -> Evaluation {
        match node {
            Node::Literal { value } => Evaluation::ok(value.clone()),
            Node::Null => Evaluation::ok(Value::Null),
            Node::Fetch { url } => self.fetch(url),
            Node::Query { query, data } => self.query(query, data),
            Node::Shape { paths, data } => {
                self.binary(paths, data, |paths, data| {
                    let paths = string_list("shape", &paths)?;
                    let rows = self.tabularizer().table(&data);
                    Ok(Value::Object(tree(&rows, paths.as_slice())))
                })
            }
            Node::Flatten { columns, data } => {
                self.binary(columns, data, |columns, data| {
                    let columns = string_list("flatten", &columns)?;
                    let rows = select(self.tabularizer().table(&data), columns.as_slice());
                    Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
                })
            }
            Node::Encode { encoding, data } => {
                self.binary(encoding, data, |encoding, data| {
                    Ok(encode(&data, encoding.as_str().unwrap_or_default()))
                })
            }
            Node::Sort { order, data } => {
                self.binary(order, data, |order, data| {
                    Ok(sort(&data, order.as_str().unwrap_or_default()))
                })
            }
        }
    }

    fn tabularizer(&self) -> Tabularizer {
        Tabularizer::new(self.options.table.clone())
    }

    fn binary<F>(&self, first: &Node, second: &Node, op: F) -> Evaluation
    where
        F: FnOnce(Value, Value) -> Result<Value, ShapeError>,
    {
        let mut errors = Errors(Vec::new());
        let v0 = errors.take(self.visit(first));
        let v1 = errors.take(self.visit(second));
        errors.finish(op(v0, v1))
    }

    fn fetch(&self, url: &Node) -> Evaluation {
        let mut errors = Errors(Vec::new());
        let v0 = errors.take(self.visit(url));
        let result = match v0.as_str() {
            Some(url) => self.fetcher.fetch(url).map(|parsed| parsed.into_value()),
            None => Err(invalid("fetch", "a URL string", &v0)),
        };
        errors.finish(result)
    }

    fn query(&self, query: &Node, data: &Node) -> Evaluation {
        let mut errors = Errors(Vec::new());
        let v0 = errors.take(self.visit(query));
        let v1 = errors.take(self.visit(data));

        let Some(text) = v0.as_str() else {
            return errors.finish(Err(invalid("query", "a query string", &v0)));
        };

        let result = run_query(text, &v1, &self.options.query);
        debug!(errors = result.errors.len(), has_data = result.data.is_some(), "query evaluated");
        errors.0.extend(result.errors);
        errors.finish(Ok(result.data.unwrap_or(Value::Null)))
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Transformer::new(TransformOptions::default())
    }
}

fn invalid(operator: &'static str, expected: &'static str, found: &Value) -> ShapeError {
    ShapeError::InvalidOperand {
        operator,
        expected,
        found: found.to_string(),
    }
}

/// A list of path strings. Null stands for the empty list.
fn string_list(operator: &'static str, value: &Value) -> Result<Vec<String>, ShapeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(operator, "a list of path strings", value))
            })
            .collect(),
        other => Err(invalid(operator, "a list of path strings", other)),
    }
}
