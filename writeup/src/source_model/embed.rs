//! Embed resolution
//!
//! `<embed:path>` spans resolve their target against the document's search
//! directory and always record it as a dependency. In dependency mode that is
//! all; otherwise the file is read once and handed to the handler selected by
//! its extension (or by an explicit `ext=` attribute).

use super::document::Document;
use super::error::{ErrorKind, WriteupError};
use super::image::{ImageFormat, ImageReference};
use super::parser::{parse_lines, split_lines};
use super::scope::{EmbedMode, ParseScope};
use super::span::{Attributes, Span, SpanTag};
use super::table::Table;
use std::path::Path;

/// Handler classes for embedded files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// `.htm`, `.html`, `.svg`: inserted verbatim
    Raw,
    /// `.csv`: converted to a table
    Table,
    /// `.css`: wrapped in a style element
    Style,
    /// Raster images: referenced by an img element
    Image(ImageFormat),
    /// `.wu`: converted as a nested writeup document
    Document,
}

impl EmbedKind {
    /// Select the handler for a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "htm" | "html" | "svg" => Some(EmbedKind::Raw),
            "csv" => Some(EmbedKind::Table),
            "css" => Some(EmbedKind::Style),
            "wu" => Some(EmbedKind::Document),
            other => ImageFormat::from_extension(other).map(EmbedKind::Image),
        }
    }
}

/// Handler output for an embed span
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedContent {
    /// Dependency mode: the target was recorded but not read
    Skipped,
    /// Verbatim markup
    Raw(String),
    /// Tabular data
    Table(Table),
    /// Stylesheet text
    Style(String),
    /// Image reference
    Image(ImageReference),
    /// Nested writeup document
    Document(Box<Document>),
}

/// Resolve an embed span
pub(crate) fn embed_span(
    scope: &mut ParseScope<'_>,
    attrs: Attributes,
    words: &[String],
) -> Result<Span, WriteupError> {
    let Some(target) = words.first() else {
        return Err(scope.fatal(ErrorKind::MissingSpanTarget {
            tag: SpanTag::Embed.to_string(),
        }));
    };
    let target = target.strip_prefix("./").unwrap_or(target).to_string();
    let resolved = scope.add_dependency(&target);

    if scope.context.mode == EmbedMode::DependenciesOnly {
        return Ok(Span::Embed {
            attrs,
            target,
            content: EmbedContent::Skipped,
        });
    }

    let bytes = std::fs::read(&resolved).map_err(|e| {
        scope.fatal(ErrorKind::EmbedUnreadable {
            path: resolved.clone(),
            reason: e.to_string(),
        })
    })?;

    let extension = match attrs.get("ext") {
        Some(ext) => ext.clone(),
        None => resolved
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string(),
    };
    let kind = EmbedKind::from_extension(&extension)
        .ok_or_else(|| scope.fatal(ErrorKind::UnknownEmbedExtension(extension.clone())))?;
    log::debug!("embedding {} as {:?}", resolved.display(), kind);

    let content = match kind {
        EmbedKind::Raw => EmbedContent::Raw(decode(scope, &resolved, bytes)?),
        EmbedKind::Style => EmbedContent::Style(decode(scope, &resolved, bytes)?),
        EmbedKind::Table => {
            let table = Table::parse(&bytes).map_err(|e| {
                scope.fatal(ErrorKind::MalformedTable {
                    path: resolved.clone(),
                    reason: e.to_string(),
                })
            })?;
            EmbedContent::Table(table)
        }
        EmbedKind::Image(format) => {
            match ImageReference::from_bytes(target.clone(), format, &bytes) {
                Ok(image) => EmbedContent::Image(image),
                Err((image, e)) => {
                    scope.warn(format!(
                        "could not read image size of {}: {}",
                        resolved.display(),
                        e
                    ));
                    EmbedContent::Image(image)
                }
            }
        }
        EmbedKind::Document => {
            if scope.context.is_embedding(&resolved) {
                return Err(scope.fatal(ErrorKind::EmbedCycle { path: resolved }));
            }
            let text = decode(scope, &resolved, bytes)?;
            let document = parse_lines(
                scope.grammar,
                scope.context.embedded(&resolved),
                &split_lines(&text),
            )?;
            scope.absorb(&document);
            EmbedContent::Document(Box::new(document))
        }
    };

    Ok(Span::Embed {
        attrs,
        target,
        content,
    })
}

fn decode(scope: &ParseScope<'_>, path: &Path, bytes: Vec<u8>) -> Result<String, WriteupError> {
    String::from_utf8(bytes).map_err(|e| {
        scope.fatal(ErrorKind::EmbedUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_model::line::Grammar;
    use crate::source_model::scope::SourceContext;
    use std::fs;

    fn embed(dir: &Path, words: &[&str], attrs: Attributes) -> Result<Span, WriteupError> {
        let grammar = Grammar::new().unwrap();
        let context = SourceContext::root(&dir.join("doc.wu"), EmbedMode::Embed);
        let mut scope = ParseScope::new(&grammar, context);
        scope.set_line(3, "<embed:...>\n");
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        embed_span(&mut scope, attrs, &words)
    }

    fn content(span: Span) -> EmbedContent {
        match span {
            Span::Embed { content, .. } => content,
            other => panic!("Expected Embed span, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_dispatch() {
        assert_eq!(EmbedKind::from_extension("HTML"), Some(EmbedKind::Raw));
        assert_eq!(EmbedKind::from_extension("svg"), Some(EmbedKind::Raw));
        assert_eq!(EmbedKind::from_extension("csv"), Some(EmbedKind::Table));
        assert_eq!(EmbedKind::from_extension("css"), Some(EmbedKind::Style));
        assert_eq!(EmbedKind::from_extension("wu"), Some(EmbedKind::Document));
        assert_eq!(
            EmbedKind::from_extension("jpg"),
            Some(EmbedKind::Image(ImageFormat::Jpeg))
        );
        assert_eq!(EmbedKind::from_extension("txt"), None);
        assert_eq!(EmbedKind::from_extension(""), None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = embed(dir.path(), &["missing.txt"], Attributes::new()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmbedUnreadable { .. }));
        assert_eq!(err.line_num, 3);
    }

    #[test]
    fn test_unregistered_extension_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let err = embed(dir.path(), &["notes.txt"], Attributes::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownEmbedExtension("txt".to_string()));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("frag.html"), "<em>hi</em>").unwrap();
        let span = embed(dir.path(), &["./frag.html"], Attributes::new()).unwrap();
        let Span::Embed { target, content, .. } = span else {
            panic!("Expected Embed span");
        };
        assert_eq!(target, "frag.html");
        assert_eq!(content, EmbedContent::Raw("<em>hi</em>".to_string()));
    }

    #[test]
    fn test_ext_attribute_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.txt"), "a,b\n1,2\n").unwrap();
        let mut attrs = Attributes::new();
        attrs.insert("ext".to_string(), "csv".to_string());
        let span = embed(dir.path(), &["data.txt"], attrs).unwrap();
        let EmbedContent::Table(table) = content(span) else {
            panic!("Expected Table content");
        };
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_css_is_style() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("extra.css"), "p { margin: 0; }").unwrap();
        let span = embed(dir.path(), &["extra.css"], Attributes::new()).unwrap();
        assert_eq!(
            content(span),
            EmbedContent::Style("p { margin: 0; }".to_string())
        );
    }

    #[test]
    fn test_image_reference_with_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dot.png"), png_header(3, 2)).unwrap();
        let span = embed(dir.path(), &["dot.png"], Attributes::new()).unwrap();
        let EmbedContent::Image(image) = content(span) else {
            panic!("Expected Image content");
        };
        assert_eq!(image.src, "dot.png");
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.size, Some((3, 2)));
    }

    #[test]
    fn test_nested_document_resets_numbering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("part.wu"),
            "writeup v0\n# Part\nSee <link:ref.html>.\n",
        )
        .unwrap();
        let span = embed(dir.path(), &["part.wu"], Attributes::new()).unwrap();
        let EmbedContent::Document(document) = content(span) else {
            panic!("Expected Document content");
        };
        let sections = document.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].index.parts, vec![1]);
        assert_eq!(document.dependencies, vec![dir.path().join("ref.html")]);
    }

    #[test]
    fn test_nested_document_requires_version() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.wu"), "# Part\n").unwrap();
        let err = embed(dir.path(), &["part.wu"], Attributes::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingVersion);
        assert_eq!(err.path, dir.path().join("part.wu"));
    }

    fn parse_file(path: &Path) -> Result<Document, WriteupError> {
        let grammar = Grammar::new().unwrap();
        let text = fs::read_to_string(path).unwrap();
        parse_lines(
            &grammar,
            SourceContext::root(path, EmbedMode::Embed),
            &split_lines(&text),
        )
    }

    #[test]
    fn test_self_embed_is_fatal() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("self.wu");
        fs::write(&path, "writeup v0\n<embed:self.wu>\n").unwrap();

        // Act
        let err = parse_file(&path).unwrap_err();

        // Assert
        assert_eq!(err.kind, ErrorKind::EmbedCycle { path: path.clone() });
        assert_eq!(err.path, path);
        assert_eq!(err.line_num, 2);
    }

    #[test]
    fn test_indirect_embed_cycle_is_fatal() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wu");
        let b = dir.path().join("b.wu");
        fs::write(&a, "writeup v0\n# A\n<embed:b.wu>\n").unwrap();
        fs::write(&b, "writeup v0\n<embed:./a.wu>\n").unwrap();

        // Act
        let err = parse_file(&a).unwrap_err();

        // Assert
        assert_eq!(err.kind, ErrorKind::EmbedCycle { path: a });
        assert_eq!(err.path, b);
        assert_eq!(err.line_num, 2);
    }

    #[test]
    fn test_same_document_embedded_twice_is_not_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part.wu"), "writeup v0\nshared\n").unwrap();
        let doc = dir.path().join("doc.wu");
        fs::write(&doc, "writeup v0\n<embed:part.wu>\n<embed:part.wu>\n").unwrap();

        let document = parse_file(&doc).unwrap();

        assert_eq!(
            document.dependencies,
            vec![dir.path().join("part.wu"), dir.path().join("part.wu")]
        );
    }

    #[test]
    fn test_nested_document_without_final_newline_warns() {
        let dir = tempfile::tempdir().unwrap();
        let part = dir.path().join("part.wu");
        fs::write(&part, "writeup v0\ntext").unwrap();
        let doc = dir.path().join("doc.wu");
        fs::write(&doc, "writeup v0\n<embed:part.wu>\n").unwrap();

        let document = parse_file(&doc).unwrap();

        assert_eq!(document.warnings.len(), 1);
        assert_eq!(document.warnings[0].path, part);
        assert_eq!(document.warnings[0].line_num, 2);
        assert_eq!(document.warnings[0].message, "missing newline ('\\n')");
    }

    #[test]
    fn test_dependency_resolved_against_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        let grammar = Grammar::new().unwrap();
        let context = SourceContext::root(&dir.path().join("doc.wu"), EmbedMode::DependenciesOnly);
        let mut scope = ParseScope::new(&grammar, context);
        embed_span(&mut scope, Attributes::new(), &["img/a.png".to_string()]).unwrap();
        assert_eq!(scope.dependencies, vec![dir.path().join("img/a.png")]);
    }

    /// Minimal PNG signature and IHDR chunk
    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }
}
