//! JSON melting - flatten nested JSON into a relation and regroup it
//!
//! `Tabularizer` denormalizes a document into rows of path -> scalar,
//! `tree` regroups those rows into a nested index, and `select` projects
//! and deduplicates columns.

pub mod types;
pub mod extractor;
pub mod group;
pub mod select;

pub use types::{key_text, number_text, Path, Record, Relation, TableConfig, MISSING_KEY};
pub use extractor::{table, Tabularizer};
pub use group::{tree, GroupTree};
pub use select::select;
