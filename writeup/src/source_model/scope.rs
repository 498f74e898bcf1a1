//! Per-document parse scope
//!
//! The scope is the part of a parse pass that span conversion and embedding
//! need: the grammar, where the document came from, which line is being
//! processed, and the warnings and dependencies collected so far. Warnings
//! and fatal errors are formatted here from the current line.

use super::document::Document;
use super::error::{ErrorKind, Warning, WriteupError};
use super::line::Grammar;
use std::path::{Path, PathBuf};

/// Whether embed spans read their target files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    /// Read targets and render their content
    Embed,
    /// Only record targets as dependencies; no file I/O
    DependenciesOnly,
}

/// How a document was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// The file being converted
    Root,
    /// The content of a quote block
    Quote,
    /// A `.wu` file pulled in by an embed span
    Embedded,
}

/// Inputs of one parse pass, handed by value to nested passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// Source path used in diagnostics
    pub path: PathBuf,
    /// Directory that embed and link targets are resolved against
    pub search_dir: PathBuf,
    /// How the document was reached
    pub kind: DocumentKind,
    /// Quote-nesting depth
    pub quote_depth: usize,
    /// Source line number preceding the first line of this document
    pub line_offset: usize,
    /// Embedding or dependency listing
    pub mode: EmbedMode,
    /// Canonical paths of the documents enclosing this one, outermost first
    pub embed_chain: Vec<PathBuf>,
}

impl SourceContext {
    /// Context for the top-level source file
    pub fn root(path: &Path, mode: EmbedMode) -> Self {
        Self {
            path: path.to_path_buf(),
            search_dir: parent_dir(path),
            kind: DocumentKind::Root,
            quote_depth: 0,
            line_offset: 0,
            mode,
            embed_chain: vec![canonical_path(path)],
        }
    }

    /// Context for a quote whose first line is `first_line`
    pub fn quote(&self, first_line: usize) -> Self {
        Self {
            path: self.path.clone(),
            search_dir: self.search_dir.clone(),
            kind: DocumentKind::Quote,
            quote_depth: self.quote_depth + 1,
            line_offset: first_line.saturating_sub(1),
            mode: self.mode,
            embed_chain: self.embed_chain.clone(),
        }
    }

    /// Context for an embedded `.wu` file
    pub fn embedded(&self, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            search_dir: parent_dir(path),
            kind: DocumentKind::Embedded,
            quote_depth: self.quote_depth,
            line_offset: 0,
            mode: self.mode,
            embed_chain: self
                .embed_chain
                .iter()
                .cloned()
                .chain(std::iter::once(canonical_path(path)))
                .collect(),
        }
    }

    /// Whether `path` is one of the documents enclosing this one
    pub fn is_embedding(&self, path: &Path) -> bool {
        self.embed_chain.contains(&canonical_path(path))
    }

    /// Whether the document must start with a version header
    pub fn is_versioned(&self) -> bool {
        self.kind != DocumentKind::Quote
    }
}

/// Canonical form of `path`, or the path as given when it does not exist
fn canonical_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Resolve a reference against a search directory, without any leading `./`
pub fn resolve_target(search_dir: &Path, target: &str) -> PathBuf {
    let target = target.strip_prefix("./").unwrap_or(target);
    let joined = search_dir.join(target);
    match joined.strip_prefix(".") {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => joined,
    }
}

/// Diagnostics and dependency collection for one parse pass
pub(crate) struct ParseScope<'g> {
    pub(crate) grammar: &'g Grammar,
    pub(crate) context: SourceContext,
    line_num: usize,
    line: String,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) dependencies: Vec<PathBuf>,
}

impl<'g> ParseScope<'g> {
    pub(crate) fn new(grammar: &'g Grammar, context: SourceContext) -> Self {
        Self {
            grammar,
            context,
            line_num: 0,
            line: String::new(),
            warnings: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Make `line` the current line for diagnostics
    pub(crate) fn set_line(&mut self, line_num: usize, line: &str) {
        self.line_num = line_num;
        self.line.clear();
        self.line.push_str(line);
    }

    pub(crate) fn line_num(&self) -> usize {
        self.line_num
    }

    pub(crate) fn line(&self) -> &str {
        &self.line
    }

    /// Log and record a warning against the current line
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let warning = Warning {
            path: self.context.path.clone(),
            line_num: self.line_num,
            line: self.line.clone(),
            message: message.into(),
        };
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Build a fatal error located at the current line
    pub(crate) fn fatal(&self, kind: ErrorKind) -> WriteupError {
        WriteupError {
            path: self.context.path.clone(),
            line_num: self.line_num,
            line: self.line.clone(),
            kind,
        }
    }

    /// Resolve `target` against the search directory and record it as a dependency
    pub(crate) fn add_dependency(&mut self, target: &str) -> PathBuf {
        let resolved = resolve_target(&self.context.search_dir, target);
        log::debug!("dependency: {}", resolved.display());
        self.dependencies.push(resolved.clone());
        resolved
    }

    /// Take over the warnings and dependencies of a finished nested document
    ///
    /// The nested pass has already logged its warnings.
    pub(crate) fn absorb(&mut self, nested: &Document) {
        self.warnings.extend(nested.warnings.iter().cloned());
        self.dependencies
            .extend(nested.dependencies.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target_strips_current_dir() {
        assert_eq!(
            resolve_target(Path::new(""), "missing.txt"),
            PathBuf::from("missing.txt")
        );
        assert_eq!(
            resolve_target(Path::new("."), "missing.txt"),
            PathBuf::from("missing.txt")
        );
        assert_eq!(
            resolve_target(Path::new(""), "./data/table.csv"),
            PathBuf::from("data/table.csv")
        );
        assert_eq!(
            resolve_target(Path::new("docs"), "./table.csv"),
            PathBuf::from("docs/table.csv")
        );
    }

    #[test]
    fn test_quote_context_offsets_lines() {
        let root = SourceContext::root(Path::new("notes/doc.wu"), EmbedMode::Embed);
        assert_eq!(root.search_dir, PathBuf::from("notes"));

        let quote = root.quote(7);
        assert_eq!(quote.kind, DocumentKind::Quote);
        assert_eq!(quote.quote_depth, 1);
        assert_eq!(quote.line_offset, 6);
        assert!(!quote.is_versioned());
    }

    #[test]
    fn test_embedded_context_inherits_quote_depth() {
        let root = SourceContext::root(Path::new("doc.wu"), EmbedMode::Embed);
        let quote = root.quote(3);
        let embedded = quote.embedded(Path::new("parts/intro.wu"));
        assert_eq!(embedded.quote_depth, 1);
        assert_eq!(embedded.search_dir, PathBuf::from("parts"));
        assert_eq!(embedded.line_offset, 0);
        assert!(embedded.is_versioned());
    }

    #[test]
    fn test_embed_chain_tracks_enclosing_documents() {
        let root = SourceContext::root(Path::new("doc.wu"), EmbedMode::Embed);
        let part = root.quote(2).embedded(Path::new("parts/intro.wu"));
        assert_eq!(
            part.embed_chain,
            vec![PathBuf::from("doc.wu"), PathBuf::from("parts/intro.wu")]
        );
        assert!(part.is_embedding(Path::new("doc.wu")));
        assert!(part.is_embedding(Path::new("parts/intro.wu")));
        assert!(!root.is_embedding(Path::new("parts/intro.wu")));
    }
}
