//! SQL template parsing
//!
//! A template is ordinary SQL with `:name` placeholders, where a name is a
//! run of ASCII letters, digits and underscores. The scanner is a small state
//! machine: single- and double-quoted regions are copied verbatim and never
//! scanned for placeholders, with doubled quotes honored as escapes.

use crate::error::Error;
use crate::error::Result;

/// One piece of a parsed template: literal SQL text or a named placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Sql(String),
    Param(String),
}

/// A parsed SQL template.
///
/// Concatenating the segments with one positional marker per placeholder
/// reproduces the template in positional form; the statement engine later
/// re-walks the segments to expand array bindings into multiple markers.
#[derive(Clone, Debug)]
pub struct Template {
    raw:      String,
    segments: Vec<Segment>,
    names:    Vec<String>,
}

enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
}

impl Template {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedTemplate`] when a `:` marker is not followed by an
    /// identifier character, or when a quoted region never terminates.
    pub fn parse(sql: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut state = State::Normal;
        let mut chars = sql.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match state {
                State::Normal => match c {
                    '\'' => {
                        text.push(c);
                        state = State::SingleQuoted;
                    }
                    '"' => {
                        text.push(c);
                        state = State::DoubleQuoted;
                    }
                    ':' => {
                        let mut name = String::new();
                        while let Some(&(_, next)) = chars.peek() {
                            if next.is_ascii_alphanumeric() || next == '_' {
                                name.push(next);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        if name.is_empty() {
                            return Err(Error::MalformedTemplate {
                                message: format!("placeholder marker at offset {} is not followed by an identifier", offset),
                            });
                        }
                        if !text.is_empty() {
                            segments.push(Segment::Sql(std::mem::take(&mut text)));
                        }
                        if !names.contains(&name) {
                            names.push(name.clone());
                        }
                        segments.push(Segment::Param(name));
                    }
                    _ => text.push(c),
                },
                State::SingleQuoted => {
                    text.push(c);
                    if c == '\'' {
                        if let Some(&(_, '\'')) = chars.peek() {
                            text.push('\'');
                            chars.next();
                        } else {
                            state = State::Normal;
                        }
                    }
                }
                State::DoubleQuoted => {
                    text.push(c);
                    if c == '"' {
                        if let Some(&(_, '"')) = chars.peek() {
                            text.push('"');
                            chars.next();
                        } else {
                            state = State::Normal;
                        }
                    }
                }
            }
        }

        match state {
            State::Normal => {}
            State::SingleQuoted => {
                return Err(Error::MalformedTemplate { message: "unterminated single-quoted literal".to_string() });
            }
            State::DoubleQuoted => {
                return Err(Error::MalformedTemplate { message: "unterminated double-quoted identifier".to_string() });
            }
        }

        if !text.is_empty() {
            segments.push(Segment::Sql(text));
        }

        Ok(Self { raw: sql.to_string(), segments, names })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder names, in first-appearance order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}
