//! Block-level writeup elements
//!
//! This module defines the finished document tree: sections, lists and the
//! leaf blocks (paragraphs, quotes, code blocks) that hold line content.

use super::document::Document;
use super::index_path::IndexPath;
use super::span::Span;

/// Block-level element
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A heading-delimited section and its content
    Section(Section),

    /// An unordered list
    List(UnorderedList),

    /// A paragraph of span-converted lines
    Paragraph(Paragraph),

    /// A block quote holding an independent sub-document
    Quote(Quote),

    /// A block of verbatim code lines
    Code(CodeBlock),
}

/// A section opened by a `#` header (or the implicit intro section)
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Nesting depth, 1-based; equals `index.depth()`
    pub depth: usize,

    /// Quote-nesting depth of the document holding this section
    pub quote_depth: usize,

    /// Sibling ranks from the root down to this section
    pub index: IndexPath,

    /// Header text; empty for the intro section
    pub title: Vec<Span>,

    /// Content blocks, including nested sections
    pub children: Vec<Block>,
}

impl Section {
    /// Whether this is the untitled section wrapping content before the first header
    pub fn is_intro(&self) -> bool {
        self.index.is_intro()
    }

    /// Element id of the section, e.g. `s1.2` or `q1s1.2` inside a quote
    pub fn id(&self) -> String {
        format!("{}s{}", id_prefix(self.quote_depth), self.index)
    }

    /// Element id of the section heading, e.g. `h1.2`
    pub fn heading_id(&self) -> String {
        format!("{}h{}", id_prefix(self.quote_depth), self.index)
    }
}

fn id_prefix(quote_depth: usize) -> String {
    if quote_depth == 0 {
        String::new()
    } else {
        format!("q{}", quote_depth)
    }
}

/// An unordered list at one nesting level
#[derive(Debug, Clone, PartialEq)]
pub struct UnorderedList {
    /// List level, 1-based
    pub level: usize,

    /// Items in source order
    pub items: Vec<ListItem>,
}

/// A list item, which may contain multiple blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Level of the list holding this item
    pub level: usize,

    /// Item content, including nested lists
    pub children: Vec<Block>,
}

impl ListItem {
    /// Create a new empty list item
    pub fn new(level: usize) -> Self {
        Self {
            level,
            children: Vec::new(),
        }
    }

    /// The item's text if it is exactly one single-line paragraph
    pub fn single_line(&self) -> Option<&[Span]> {
        match self.children.as_slice() {
            [Block::Paragraph(paragraph)] if paragraph.lines.len() == 1 => {
                Some(paragraph.lines[0].as_slice())
            }
            _ => None,
        }
    }
}

/// Consecutive text lines, each converted to spans independently
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Lines in source order
    pub lines: Vec<Vec<Span>>,
}

/// A block quote
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Source line number of the first quoted line
    pub first_line: usize,

    /// Captured lines with the `> ` prefix removed
    pub lines: Vec<String>,

    /// The captured lines parsed as an independent document
    pub document: Document,
}

/// Verbatim code lines with the `| ` prefix removed
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Unescaped lines in source order
    pub lines: Vec<String>,
}
