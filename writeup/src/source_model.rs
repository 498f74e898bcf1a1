//! Source model for the parsing stage
//!
//! This module turns writeup source lines into a [`Document`] tree: line
//! classification, block tree building, inline span conversion and embed
//! resolution, together with the diagnostics they raise.

// Submodules
mod blocks;
mod document;
mod embed;
mod error;
mod image;
mod index_path;
mod inline;
mod line;
mod parser;
mod scope;
mod span;
mod table;

// Re-export public types
pub use blocks::{Block, CodeBlock, ListItem, Paragraph, Quote, Section, UnorderedList};
pub use document::Document;
pub use embed::{EmbedContent, EmbedKind};
pub use error::{ErrorKind, Warning, WriteupError};
pub use image::{ImageFormat, ImageReference};
pub use index_path::IndexPath;
pub use line::{ClassifiedLine, Grammar, Leaf, LineKind};
pub use parser::{parse_lines, split_lines};
pub use scope::{resolve_target, DocumentKind, EmbedMode, SourceContext};
pub use span::{Attributes, Span, SpanTag};
pub use table::Table;
