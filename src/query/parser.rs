//! Parser for field-selection queries such as `{ posts(id: 2) { title } }`
//!
//! Supports nested selection sets, aliases (`alias: field`) and scalar
//! argument literals. Commas count as whitespace and `#` starts a comment.

use crate::error::{Result, ShapeError};
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub alias: Option<String>,
    pub name: String,
    /// Arguments in the order they were written
    pub arguments: Vec<(String, Value)>,
    pub selections: Vec<Selection>,
}

impl Selection {
    /// Key under which the field's result is returned
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Parse a document consisting of one selection set.
pub fn parse_query(text: &str) -> Result<Vec<Selection>> {
    let mut parser = QueryParser::new(text);
    parser.skip_ignored();
    let selections = parser.parse_selection_set()?;
    parser.skip_ignored();
    match parser.peek() {
        None => Ok(selections),
        Some(ch) => Err(parser.error(format!("Unexpected \"{ch}\""))),
    }
}

struct QueryParser {
    chars: Vec<char>,
    pos: usize,
}

impl QueryParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        self.pos += 1;
        ch
    }

    fn error(&self, message: String) -> ShapeError {
        ShapeError::query(format!("Syntax Error: {message} at offset {}", self.pos))
    }

    fn describe(&self) -> String {
        match self.peek() {
            Some(ch) => format!("\"{ch}\""),
            None => String::from("<EOF>"),
        }
    }

    fn skip_ignored(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' || ch == '\u{feff}' {
                self.pos += 1;
            } else if ch == '#' {
                while let Some(c) = self.advance() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_ignored();
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("Expected \"{expected}\", found {}", self.describe())))
        }
    }

    fn parse_selection_set(&mut self) -> Result<Vec<Selection>> {
        self.expect('{')?;
        let mut selections = Vec::new();
        loop {
            self.skip_ignored();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error(String::from("Expected Name, found <EOF>"))),
                _ => selections.push(self.parse_selection()?),
            }
        }
        if selections.is_empty() {
            return Err(self.error(String::from("Expected Name, found \"}\"")));
        }
        Ok(selections)
    }

    fn parse_selection(&mut self) -> Result<Selection> {
        let first = self.parse_name()?;
        self.skip_ignored();

        let (alias, name) = if self.peek() == Some(':') {
            self.pos += 1;
            self.skip_ignored();
            (Some(first), self.parse_name()?)
        } else {
            (None, first)
        };

        self.skip_ignored();
        let arguments = if self.peek() == Some('(') {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        self.skip_ignored();
        let selections = if self.peek() == Some('{') {
            self.parse_selection_set()?
        } else {
            Vec::new()
        };

        Ok(Selection {
            alias,
            name,
            arguments,
            selections,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<(String, Value)>> {
        self.expect('(')?;
        let mut arguments = Vec::new();
        loop {
            self.skip_ignored();
            if self.peek() == Some(')') {
                self.pos += 1;
                break;
            }
            let name = self.parse_name()?;
            self.expect(':')?;
            self.skip_ignored();
            let value = self.parse_value()?;
            arguments.push((name, value));
        }
        if arguments.is_empty() {
            return Err(self.error(String::from("Expected Name, found \")\"")));
        }
        Ok(arguments)
    }

    fn parse_name(&mut self) -> Result<String> {
        self.skip_ignored();
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch == '_' || ch.is_ascii_alphabetic() => {}
            _ => return Err(self.error(format!("Expected Name, found {}", self.describe()))),
        }
        while let Some(ch) = self.peek() {
            if ch == '_' || ch.is_ascii_alphanumeric() {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('"') => self.parse_string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if ch == '_' || ch.is_ascii_alphabetic() => {
                let word = self.parse_name()?;
                match word.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => Err(self.error(format!("Unexpected Name \"{other}\""))),
                }
            }
            _ => Err(self.error(format!("Unexpected {}", self.describe()))),
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(s),
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('/') => s.push('/'),
                    Some('"') => s.push('"'),
                    Some('\\') => s.push('\\'),
                    Some('u') => s.push(self.parse_unicode_escape()?),
                    Some(other) => {
                        return Err(self.error(format!("Invalid character escape sequence: \\{other}")))
                    }
                    None => return Err(self.error(String::from("Unterminated string"))),
                },
                Some('\n') | None => return Err(self.error(String::from("Unterminated string"))),
                Some(ch) => s.push(ch),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let end = self.pos + 4;
        if end > self.chars.len() {
            return Err(self.error(String::from("Invalid Unicode escape sequence")));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("Invalid Unicode escape sequence: \\u{hex}")))
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if is_float => {}
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();

        let number = if is_float {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else {
            text.parse::<i64>().ok().map(Number::from)
        };
        number
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("Invalid number, found \"{text}\"")))
    }
}
