//! Field-selection queries over inferred schemas

pub mod parser;
pub mod executor;

pub use parser::{parse_query, Selection};
pub use executor::{execute, run_query, QueryResult};
