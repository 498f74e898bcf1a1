//! Conversion pipeline
//!
//! This module orchestrates the two stages of a conversion:
//! 1. **Parsing**: Build the document tree from source text, resolving embeds
//! 2. **Export**: Render the tree to HTML lines, or list its dependencies

use crate::html_exporter::{self, PageMetadata};
use crate::source_model::{
    parse_lines, split_lines, Document, EmbedMode, Grammar, SourceContext, WriteupError,
};
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// Options for a full HTML render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit the document body only, without the page wrapper
    pub fragment: bool,

    /// Metadata and assets for the page wrapper
    pub page: PageMetadata,
}

/// Stage 1: Parse a source text into a document tree
///
/// # Parameters
/// * `grammar` - Compiled line and span patterns
/// * `src_path` - Source path, used for diagnostics and to resolve references
/// * `text` - Complete source text
/// * `mode` - Whether embed targets are read or only recorded
///
/// # Returns
/// * `Ok(Document)` - The finished document
/// * `Err(WriteupError)` - The first fatal error
pub fn parse_document(
    grammar: &Grammar,
    src_path: &Path,
    text: &str,
    mode: EmbedMode,
) -> Result<Document, WriteupError> {
    let lines = split_lines(text);
    log::info!("Parsing {} ({} lines)", src_path.display(), lines.len());

    let document = parse_lines(grammar, SourceContext::root(src_path, mode), &lines)?;

    log::info!(
        "Parsed {} sections, {} dependencies, {} warnings",
        document.section_ids.len(),
        document.dependencies.len(),
        document.warnings.len()
    );
    Ok(document)
}

/// Convert a source text to HTML output lines
///
/// # Parameters
/// * `src_path` - Source path, used for diagnostics and to resolve embeds
/// * `text` - Complete source text
/// * `options` - Fragment selection and page metadata
///
/// # Returns
/// * `Ok(Vec<String>)` - Output lines, without line terminators
/// * `Err(WriteupError)` - The first fatal error; no partial output is produced
pub fn render_html(
    src_path: &Path,
    text: &str,
    options: &RenderOptions,
) -> Result<Vec<String>, WriteupError> {
    let grammar = Grammar::new()?;
    let document = parse_document(&grammar, src_path, text, EmbedMode::Embed)?;

    let lines = if options.fragment {
        html_exporter::render_fragment(&document)
    } else {
        html_exporter::render_page(&document, &options.page)
    };
    log::info!("Rendered {} output lines", lines.len());
    Ok(lines)
}

/// List every file a source text references, sorted and without duplicates
///
/// Embed and link targets are resolved against the source directory; the
/// targets themselves are never opened.
pub fn list_dependencies(src_path: &Path, text: &str) -> Result<Vec<PathBuf>, WriteupError> {
    let grammar = Grammar::new()?;
    let document = parse_document(&grammar, src_path, text, EmbedMode::DependenciesOnly)?;
    Ok(document.dependencies.into_iter().sorted().dedup().collect())
}
