//! # Crucible - JSON Shaping Toolkit
//!
//! The data engine behind a small data-shaping language: fetch JSON or CSV,
//! flatten nested documents into relations, regroup and project them, sort
//! and re-encode trees, and run field-selection queries against a schema
//! inferred from the data itself.
//!
//! ## Modules
//!
//! - **fetch**: Retrieve a source and detect CSV vs JSON
//! - **melt**: Flatten nested JSON into rows, regroup them, project columns
//! - **reshape**: Recursive sorting and name/children encoding
//! - **schema**: Infer a queryable schema from a sample value
//! - **query**: Parse and execute field-selection queries
//! - **eval**: Operator handlers that accumulate errors across operands
//!
//! ## Quick Start
//!
//! ### Flattening
//!
//! ```rust
//! use crucible::melt::{select, table};
//! use serde_json::json;
//!
//! let rows = table(&json!({"a": 1, "b": [2, 3]}));
//! assert_eq!(rows.len(), 2);
//!
//! let distinct = select(rows, &["/a"]);
//! assert_eq!(distinct.len(), 1);
//! ```
//!
//! ### Querying
//!
//! ```rust
//! use crucible::{run_query, QueryConfig};
//! use serde_json::json;
//!
//! let data = json!({"posts": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]});
//! let result = run_query("{ posts(id: 2) { title } }", &data, &QueryConfig::default());
//! assert_eq!(result.data, Some(json!({"posts": [{"title": "B"}]})));
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod fetch;
pub mod melt;
pub mod query;
pub mod reshape;
pub mod schema;

// Re-export commonly used types for convenience
pub use config::{QueryConfig, TransformOptions};
pub use error::{Result, ShapeError};
pub use eval::{Evaluation, Node, Transformer};
pub use fetch::{detect_format, HttpTransport, ParsedSource, SourceFetcher, SourceFormat, Transport};
pub use melt::{select, table, tree, GroupTree, Record, Relation, TableConfig, Tabularizer};
pub use query::{run_query, QueryResult};
pub use reshape::{encode, sort, EncodedNode, SortOrder};
pub use schema::{infer_schema, Schema, SchemaBuilder, SchemaType};
