//! Glob patterns over cache keys.
//!
//! The distributed tier matches with Redis `KEYS` semantics; the local tier
//! needs the same semantics in-process, so globs are compiled to anchored
//! regular expressions.

use fairway_core::{FairwayError, FairwayResult};
use regex::Regex;

/// A compiled glob supporting `*`, `?` and `[...]` character classes.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    glob: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compiles `glob`.
    pub fn new(glob: &str) -> FairwayResult<Self> {
        let regex = Regex::new(&glob_to_regex(glob))
            .map_err(|e| FairwayError::validation(format!("Invalid key pattern '{}': {}", glob, e)))?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// Returns true if `key` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// The original glob text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    class.push(inner);
                }
                if closed && !class.is_empty() {
                    out.push('[');
                    if let Some(rest) = class.strip_prefix('^') {
                        out.push('^');
                        out.push_str(&escape_class(rest));
                    } else {
                        out.push_str(&escape_class(&class));
                    }
                    out.push(']');
                } else {
                    // Unterminated class: match literally.
                    out.push_str(&regex::escape("["));
                    out.push_str(&regex::escape(&class));
                    if closed {
                        out.push_str(&regex::escape("]"));
                    }
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}

/// Escapes everything in a character class except ranges.
fn escape_class(class: &str) -> String {
    class
        .chars()
        .map(|c| match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => format!("\\{}", c),
            other => other.to_string(),
        })
        .collect()
}
