//! Hadoop-style glob patterns over object paths
//!
//! A pattern is matched segment by segment against the leading segments of an
//! object path. When a pattern matches a directory, every file beneath it is
//! included, so `log_data/*/*` picks up `log_data/2018/11/events.json`.

use crate::error::{Error, Result};
use regex::Regex;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard(Regex),
}

impl Segment {
    fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == part,
            Segment::Wildcard(regex) => regex.is_match(part),
        }
    }
}

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl GlobPattern {
    /// Compile a `/`-separated pattern. Supports `*`, `?`, `[...]` and `{a,b}`.
    pub fn new(pattern: &str) -> Result<Self> {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| compile_segment(pattern, s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of path segments the pattern spans
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Leading literal segments, usable as a listing prefix
    pub fn literal_prefix(&self) -> String {
        self.segments
            .iter()
            .map_while(|s| match s {
                Segment::Literal(l) => Some(l.as_str()),
                Segment::Wildcard(_) => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Check a relative object path, given as segments
    pub fn matches<S: AsRef<str>>(&self, parts: &[S]) -> bool {
        if parts.len() < self.segments.len() {
            return false;
        }

        if parts.iter().any(|p| is_hidden(p.as_ref())) {
            return false;
        }

        self.segments
            .iter()
            .zip(parts)
            .all(|(segment, part)| segment.matches(part.as_ref()))
    }
}

/// Names starting with `_` or `.` are bookkeeping files (`_SUCCESS`, `.crc`)
fn is_hidden(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

fn compile_segment(pattern: &str, segment: &str) -> Result<Segment> {
    if !segment.contains(['*', '?', '[', '{', '\\']) {
        return Ok(Segment::Literal(segment.to_string()));
    }

    let invalid = |message: &str| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    let mut regex = String::from("^");
    let mut brace_depth = 0usize;
    let mut chars = segment.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next().ok_or_else(|| invalid("dangling escape"))?;
                regex.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                regex.push('[');
                let mut first = true;
                let mut closed = false;
                for class_char in chars.by_ref() {
                    match class_char {
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '!' | '^' if first => regex.push('^'),
                        '\\' => regex.push_str("\\\\"),
                        other => regex.push(other),
                    }
                    first = false;
                }
                if !closed {
                    return Err(invalid("unclosed character class"));
                }
                regex.push(']');
            }
            '{' => {
                brace_depth += 1;
                regex.push_str("(?:");
            }
            ',' if brace_depth > 0 => regex.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                regex.push(')');
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }

    if brace_depth > 0 {
        return Err(invalid("unclosed brace group"));
    }
    regex.push('$');

    Regex::new(&regex)
        .map(Segment::Wildcard)
        .map_err(|e| invalid(&e.to_string()))
}
