use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Every failure an operator can report.
///
/// Operators never abort sibling evaluation with these; they are collected
/// into an ordered list and returned next to a best-effort value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// The fetched body parsed as neither CSV nor JSON.
    #[error("unrecognized format for {url}: csv: {csv}; json: {json}")]
    FormatDetection {
        url: String,
        csv: String,
        json: String,
    },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Malformed query text, unknown fields, or a value that cannot be
    /// serialized as the declared scalar type.
    #[error("query error{}: {message}", at_path(.path))]
    QueryExecution {
        message: String,
        path: Option<String>,
    },

    /// Two distinct value paths sanitized to the same object type name.
    #[error("object type name {name} is produced by both {first} and {second}")]
    SchemaNameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// More than one filter argument was given; only the first is honored.
    #[error("field {field} received {supplied} filter arguments, only {honored} was applied")]
    FilterArgumentOverflow {
        field: String,
        supplied: usize,
        honored: String,
    },

    #[error("{operator} expects {expected}, got {found}")]
    InvalidOperand {
        operator: &'static str,
        expected: &'static str,
        found: String,
    },
}

fn at_path(path: &Option<String>) -> String {
    match path {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

impl ShapeError {
    pub fn query(message: impl Into<String>) -> Self {
        ShapeError::QueryExecution {
            message: message.into(),
            path: None,
        }
    }

    pub fn query_at(message: impl Into<String>, path: &[String]) -> Self {
        ShapeError::QueryExecution {
            message: message.into(),
            path: Some(path.join(".")),
        }
    }
}
