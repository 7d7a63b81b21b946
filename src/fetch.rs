//! Source fetching with CSV / JSON auto-detection
//!
//! The format is guessed from the URL suffix only: `.csv` URLs are tried as
//! CSV first, everything else as JSON first. If the first attempt fails the
//! other format is tried, and if both fail the fetch reports
//! [`ShapeError::FormatDetection`].

use crate::error::{Result, ShapeError};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Retrieves the raw body behind a URL
pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

/// Blocking HTTP transport. Content type headers are ignored.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let fetch_error = |e: reqwest::Error| ShapeError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// The format to try first for `url`
    pub fn guess(url: &str) -> Self {
        if url.ends_with(".csv") {
            SourceFormat::Csv
        } else {
            SourceFormat::Json
        }
    }

    fn other(self) -> Self {
        match self {
            SourceFormat::Csv => SourceFormat::Json,
            SourceFormat::Json => SourceFormat::Csv,
        }
    }

    fn parse(self, body: &str) -> std::result::Result<Value, String> {
        match self {
            SourceFormat::Csv => parse_csv(body),
            SourceFormat::Json => parse_json(body),
        }
    }
}

/// A successfully parsed source and the format that accepted it
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSource {
    Csv(Value),
    Json(Value),
}

impl ParsedSource {
    pub fn format(&self) -> SourceFormat {
        match self {
            ParsedSource::Csv(_) => SourceFormat::Csv,
            ParsedSource::Json(_) => SourceFormat::Json,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ParsedSource::Csv(v) | ParsedSource::Json(v) => v,
        }
    }

    fn new(format: SourceFormat, value: Value) -> Self {
        match format {
            SourceFormat::Csv => ParsedSource::Csv(value),
            SourceFormat::Json => ParsedSource::Json(value),
        }
    }
}

/// Parse `body` fetched from `url`, falling back to the other format.
pub fn detect_format(url: &str, body: &str) -> Result<ParsedSource> {
    let first = SourceFormat::guess(url);

    let first_error = match first.parse(body) {
        Ok(value) => return Ok(ParsedSource::new(first, value)),
        Err(e) => e,
    };
    trace!(?first, error = %first_error, "first format attempt failed");

    let second = first.other();
    match second.parse(body) {
        Ok(value) => Ok(ParsedSource::new(second, value)),
        Err(second_error) => {
            let (csv, json) = match first {
                SourceFormat::Csv => (first_error, second_error),
                SourceFormat::Json => (second_error, first_error),
            };
            Err(ShapeError::FormatDetection {
                url: url.to_string(),
                csv,
                json,
            })
        }
    }
}

/// Parse a JSON document
pub fn parse_json(body: &str) -> std::result::Result<Value, String> {
    let mut bytes = body.as_bytes().to_vec();
    simd_json::serde::from_slice::<Value>(&mut bytes).map_err(|e| e.to_string())
}

/// Parse header-row CSV into an array of objects with string values.
///
/// Rows must all have the header's width. A body that opens like a JSON
/// object or array, or that is a whole JSON scalar such as `42` or `"x"`, is
/// rejected so a JSON document behind a `.csv` URL falls through to the JSON
/// attempt.
pub fn parse_csv(body: &str) -> std::result::Result<Value, String> {
    if matches!(body.trim_start().chars().next(), Some('{') | Some('[')) {
        return Err(String::from("body starts like a JSON document"));
    }
    if !body.trim().is_empty() && parse_json(body).is_ok() {
        return Err(String::from("body is a JSON value"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(String::from("missing header row"));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let mut row = Map::new();
        for (name, cell) in headers.iter().zip(record.iter()) {
            row.insert(name.to_string(), Value::String(cell.to_string()));
        }
        rows.push(Value::Object(row));
    }

    Ok(Value::Array(rows))
}

/// Fetches and parses sources through a [`Transport`]
pub struct SourceFetcher<T: Transport> {
    transport: T,
}

impl<T: Transport> SourceFetcher<T> {
    pub fn new(transport: T) -> Self {
        SourceFetcher { transport }
    }

    pub fn fetch(&self, url: &str) -> Result<ParsedSource> {
        let url = url.trim();
        let body = self.transport.get(url)?;
        let parsed = detect_format(url, &body)?;
        debug!(url, format = ?parsed.format(), bytes = body.len(), "fetched source");
        Ok(parsed)
    }
}

impl Default for SourceFetcher<HttpTransport> {
    fn default() -> Self {
        SourceFetcher::new(HttpTransport::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    /// Serves fixed bodies keyed by URL
    struct StaticTransport(HashMap<String, String>);

    impl Transport for StaticTransport {
        fn get(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| ShapeError::Fetch {
                url: url.to_string(),
                message: String::from("404 Not Found"),
            })
        }
    }

    fn fetcher(pairs: &[(&str, &str)]) -> SourceFetcher<StaticTransport> {
        SourceFetcher::new(StaticTransport(
            pairs
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn test_json_source() {
        let f = fetcher(&[("http://x/data.json", r#"{"a": [1, 2]}"#)]);
        let parsed = f.fetch("http://x/data.json").unwrap();
        assert_eq!(parsed, ParsedSource::Json(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_csv_source() {
        let f = fetcher(&[("http://x/t.csv", "name,age\nalice,30\nbob,25\n")]);
        let parsed = f.fetch("  http://x/t.csv \n").unwrap();
        assert_eq!(
            parsed,
            ParsedSource::Csv(json!([
                {"name": "alice", "age": "30"},
                {"name": "bob", "age": "25"}
            ]))
        );
    }

    #[test]
    fn test_csv_url_with_json_body_falls_back() {
        let f = fetcher(&[("http://x/t.csv", "[{\"a\": 1},\n {\"a\": 2}]")]);
        let parsed = f.fetch("http://x/t.csv").unwrap();
        assert_eq!(parsed.format(), SourceFormat::Json);
        assert_eq!(parsed.into_value(), json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn test_csv_url_with_json_scalar_falls_back() {
        for (body, expected) in [("42", json!(42)), ("\"x\"", json!("x")), ("true\n", json!(true))] {
            let parsed = detect_format("http://x/t.csv", body).unwrap();
            assert_eq!(parsed, ParsedSource::Json(expected));
        }
        assert!(parse_csv("null").is_err());
        assert_eq!(parse_csv("name\n").unwrap(), json!([]));
    }

    #[test]
    fn test_json_url_with_csv_body_falls_back() {
        let parsed = detect_format("http://x/api", "k,v\n1,2\n").unwrap();
        assert_eq!(parsed, ParsedSource::Csv(json!([{"k": "1", "v": "2"}])));
    }

    #[test]
    fn test_unrecognized_format() {
        let err = detect_format("http://x/t.csv", "a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ShapeError::FormatDetection { .. }));

        let err = detect_format("http://x/empty", "").unwrap_err();
        match err {
            ShapeError::FormatDetection { url, .. } => assert_eq!(url, "http://x/empty"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_propagates() {
        let f = fetcher(&[]);
        let err = f.fetch("http://x/missing.json").unwrap_err();
        assert!(matches!(err, ShapeError::Fetch { .. }));
    }

    #[test]
    fn test_json_keeps_key_order() {
        let value = parse_json(r#"{"z": 1, "a": 2}"#).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
