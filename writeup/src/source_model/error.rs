//! Diagnostics raised while converting writeup sources
//!
//! Two severities exist: a [`Warning`] is logged and recorded while parsing
//! continues, a [`WriteupError`] aborts the whole conversion.

use std::path::PathBuf;
use thiserror::Error;

/// The structural problem behind a fatal conversion error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// First line is not a `writeup v<digits>` header
    #[error("first line must specify writeup version matching pattern 'writeup v<digits>'")]
    MissingVersion,

    /// Version header names a version other than 0
    #[error("unsupported version number: {0}")]
    UnsupportedVersion(String),

    /// A section header line starts with whitespace
    #[error("section header must not be indented")]
    IndentedSectionHeader,

    /// A header skips one or more section depths
    #[error("section of depth {depth} is missing its parent section (open depth is {open_depth})")]
    MissingParentSection {
        /// Depth of the header being opened
        depth: usize,
        /// Depth of the innermost open section
        open_depth: usize,
    },

    /// A list item skips one or more list levels
    #[error("list item of level {level} is missing its parent list (open list level is {open_level})")]
    MissingParentList {
        /// Level of the list item being opened
        level: usize,
        /// Level of the innermost open list
        open_level: usize,
    },

    /// An indented line does not continue any open list item
    #[error("indented line has no open list item at level {level}")]
    AmbiguousIndentation {
        /// Indentation level of the line
        level: usize,
    },

    /// Angle-bracket span without a `tag:` prefix
    #[error("malformed span is missing colon after tag: `{0}`")]
    MissingSpanColon(String),

    /// Angle-bracket span with an unregistered tag
    #[error("malformed span has invalid tag: `{0}`")]
    UnknownSpanTag(String),

    /// Span attribute list that cannot be parsed
    #[error("malformed span attribute: {0}")]
    MalformedAttribute(String),

    /// Link or embed span without a target word
    #[error("`{tag}` span is missing its target")]
    MissingSpanTarget {
        /// The span tag
        tag: String,
    },

    /// Embedded file could not be opened or decoded
    #[error("embedded file could not be read: {path}: {reason}", path = .path.display())]
    EmbedUnreadable {
        /// Resolved path of the embedded file
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Embedded `.wu` file is already being converted further up the embed chain
    #[error("embedded document includes itself: {path}", path = .path.display())]
    EmbedCycle {
        /// Resolved path of the embedded file
        path: PathBuf,
    },

    /// Embedded file extension has no registered handler
    #[error("embedded file has unregistered extension: `{0}`")]
    UnknownEmbedExtension(String),

    /// Embedded CSV file could not be parsed
    #[error("embedded table is malformed: {path}: {reason}", path = .path.display())]
    MalformedTable {
        /// Resolved path of the CSV file
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// One of the built-in line patterns failed to compile
    #[error("invalid grammar pattern: {0}")]
    InvalidGrammar(String),
}

/// A fatal conversion error, located at a source line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("writeup error: {path}: line {line_num}: {kind}\n  {line:?}", path = .path.display())]
pub struct WriteupError {
    /// Source file being converted (or `(stdin)`)
    pub path: PathBuf,
    /// 1-based line number; 0 when no line is involved
    pub line_num: usize,
    /// The offending line, as read
    pub line: String,
    /// What went wrong
    pub kind: ErrorKind,
}

impl WriteupError {
    /// Create an error that is not tied to any source line
    pub fn unlocated(path: PathBuf, kind: ErrorKind) -> Self {
        Self {
            path,
            line_num: 0,
            line: String::new(),
            kind,
        }
    }
}

/// A cosmetic irregularity; conversion continues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Source file being converted
    pub path: PathBuf,
    /// 1-based line number
    pub line_num: usize,
    /// The offending line, as read
    pub line: String,
    /// Human-readable description
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "writeup warning: {}: line {}: {}\n  {:?}",
            self.path.display(),
            self.line_num,
            self.message,
            self.line
        )
    }
}
