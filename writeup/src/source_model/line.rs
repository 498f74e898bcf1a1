//! Line classification
//!
//! Every source line is matched in full against one fixed-priority grammar:
//! section header, blank line, then an optionally bulleted leaf (quote, code
//! or text). Whitespace irregularities are reported as warning messages on the
//! classified line; they never stop classification.

use super::error::{ErrorKind, WriteupError};
use regex::Regex;
use std::path::PathBuf;

/// The compiled line and span patterns
///
/// Built once per conversion and shared by reference with every nested parse.
#[derive(Debug)]
pub struct Grammar {
    version: Regex,
    license: Regex,
    section: Regex,
    blank: Regex,
    pub(crate) span: Regex,
}

impl Grammar {
    /// Compile the grammar
    pub fn new() -> Result<Self, WriteupError> {
        Ok(Self {
            version: compile(r"^writeup v(\d+)\n$")?,
            license: compile(r"^(©|Copyright|Dedicated to the public domain)")?,
            section: compile(r"^(\s*)(#+)(\s*)(.*)$")?,
            blank: compile(r"^\s*$")?,
            span: compile(r"`((?:[^\\`]|\\`|\\\\)*)`|<((?:[^\\>]|\\>|\\\\)*)>")?,
        })
    }

    /// Version number of a `writeup v<digits>` header line, as written
    pub fn version<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.version
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Whether the line starts a license notice
    pub fn is_license(&self, line: &str) -> bool {
        self.license.is_match(line)
    }

    /// Classify one line (with or without its trailing newline)
    pub fn classify<'a>(&self, line: &'a str) -> ClassifiedLine<'a> {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let mut warnings = Vec::new();

        if let Some(caps) = self.section.captures(body) {
            let indent = capture(&caps, 1);
            let depth = capture(&caps, 2).len();
            check_whitespace(Some(1), capture(&caps, 3), " following '#'", &mut warnings);
            let title = capture(&caps, 4).trim_end();
            return ClassifiedLine {
                indent: indent.chars().count(),
                kind: LineKind::SectionHeader { depth, title },
                warnings,
            };
        }

        if self.blank.is_match(body) {
            if !body.is_empty() {
                warnings.push("blank line is not empty".to_string());
            }
            return ClassifiedLine {
                indent: 0,
                kind: LineKind::Blank,
                warnings,
            };
        }

        let trimmed = body.trim_start();
        let indent = &body[..body.len() - trimmed.len()];
        let (marker_space, rest) = match trimmed.strip_prefix('*') {
            Some(after) => {
                let rest = after.trim_start();
                (Some(&after[..after.len() - rest.len()]), rest)
            }
            None => (None, trimmed),
        };

        check_whitespace(None, indent, " in indent", &mut warnings);
        let width = indent.chars().count();
        if width % 2 == 1 {
            warnings.push(format!("odd indentation: {}", width));
        }
        let level = width / 2;

        let kind = if let Some(space) = marker_space {
            check_whitespace(Some(1), space, " following '*'", &mut warnings);
            let leaf = if rest.is_empty() {
                None
            } else {
                Some(classify_leaf(rest, &mut warnings))
            };
            LineKind::ListItem {
                level: level + 1,
                leaf,
            }
        } else {
            LineKind::Leaf {
                level,
                leaf: classify_leaf(rest, &mut warnings),
            }
        };

        ClassifiedLine {
            indent: width,
            kind,
            warnings,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, WriteupError> {
    Regex::new(pattern).map_err(|e| {
        WriteupError::unlocated(
            PathBuf::from("(grammar)"),
            ErrorKind::InvalidGrammar(e.to_string()),
        )
    })
}

fn capture<'a>(caps: &regex::Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// A classified source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Width of the leading whitespace, in characters
    pub indent: usize,
    /// The line variant with its extracted fields
    pub kind: LineKind<'a>,
    /// Whitespace irregularities found on the line
    pub warnings: Vec<String>,
}

/// Line variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `#`-prefixed header
    SectionHeader {
        /// Number of `#` markers
        depth: usize,
        /// Header text
        title: &'a str,
    },

    /// `*`-prefixed list item
    ListItem {
        /// List level, 1-based
        level: usize,
        /// Leaf content following the marker, if any
        leaf: Option<Leaf<'a>>,
    },

    /// Unbulleted leaf content
    Leaf {
        /// Indentation level (indent width / 2)
        level: usize,
        /// The content
        leaf: Leaf<'a>,
    },

    /// Whitespace only
    Blank,
}

/// Leaf line content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf<'a> {
    /// `>`-prefixed quoted line, prefix and one space removed
    Quote(&'a str),
    /// `|`-prefixed code line, prefix and one space removed
    Code(&'a str),
    /// Any other text, trailing whitespace removed
    Text(&'a str),
}

fn classify_leaf<'a>(rest: &'a str, warnings: &mut Vec<String>) -> Leaf<'a> {
    if let Some(quoted) = rest.strip_prefix('>') {
        Leaf::Quote(strip_prefix_space(quoted, '>', warnings))
    } else if let Some(code) = rest.strip_prefix('|') {
        Leaf::Code(strip_prefix_space(code, '|', warnings))
    } else {
        Leaf::Text(rest.trim_end())
    }
}

fn strip_prefix_space<'a>(text: &'a str, prefix: char, warnings: &mut Vec<String>) -> &'a str {
    if text.is_empty() {
        return text;
    }
    match text.strip_prefix(' ') {
        Some(stripped) => stripped,
        None => {
            warnings.push(format!("expected a space following '{}'", prefix));
            text
        }
    }
}

/// Check a whitespace run: spaces only, and optionally an exact width
fn check_whitespace(expected: Option<usize>, text: &str, suffix: &str, warnings: &mut Vec<String>) {
    if let Some((i, c)) = text.chars().enumerate().find(|(_, c)| *c != ' ') {
        warnings.push(format!(
            "invalid whitespace character at position {}{}: {:?}",
            i + 1,
            suffix,
            c
        ));
        return;
    }
    if let Some(expected) = expected {
        let found = text.chars().count();
        if found != expected {
            warnings.push(format!(
                "expected exactly {} space{}{}; found: {}",
                expected,
                if expected == 1 { "" } else { "s" },
                suffix,
                found
            ));
        }
    }
}
