//! Parsed writeup document

use super::blocks::{Block, Section};
use super::error::Warning;
use std::path::PathBuf;

/// One fully parsed writeup document
///
/// Produced for the top-level source, for every quote block and for every
/// embedded `.wu` file. Each is independent: section numbering restarts at
/// its own root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source path used in diagnostics
    pub path: PathBuf,

    /// Quote-nesting depth (0 for the top-level document)
    pub quote_depth: usize,

    /// Top-level blocks
    pub blocks: Vec<Block>,

    /// Leading license notice lines, trimmed
    pub license_lines: Vec<String>,

    /// Ids of every section, in opening order
    pub section_ids: Vec<String>,

    /// Ids of sections of depth 1 and 2, in opening order
    pub paging_ids: Vec<String>,

    /// Referenced files in encounter order, including those of nested documents
    pub dependencies: Vec<PathBuf>,

    /// Warnings raised while parsing, including those of nested documents
    pub warnings: Vec<Warning>,
}

impl Document {
    /// All sections of this document in depth-first opening order
    ///
    /// Sections of quoted or embedded sub-documents are not included.
    pub fn sections(&self) -> Vec<&Section> {
        let mut sections = Vec::new();
        collect_sections(&self.blocks, &mut sections);
        sections
    }
}

fn collect_sections<'a>(blocks: &'a [Block], sections: &mut Vec<&'a Section>) {
    for block in blocks {
        if let Block::Section(section) = block {
            sections.push(section);
            collect_sections(&section.children, sections);
        }
    }
}
