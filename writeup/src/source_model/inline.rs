//! Inline span conversion
//!
//! Scans a text payload for backtick code spans and angle-bracket spans
//! (`<tag:body>`) and returns spans covering the payload exactly once.
//! Unmatched delimiters are plain text.

use super::embed;
use super::error::{ErrorKind, WriteupError};
use super::scope::ParseScope;
use super::span::{Attributes, Span, SpanTag};

/// Convert a text payload into spans
pub(crate) fn convert_spans(scope: &mut ParseScope<'_>, text: &str) -> Result<Vec<Span>, WriteupError> {
    let grammar = scope.grammar;
    let mut spans = Vec::new();
    let mut prev = 0;

    for caps in grammar.span.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if prev < whole.start() {
            spans.push(Span::text(&text[prev..whole.start()]));
        }
        prev = whole.end();

        if let Some(code) = caps.get(1) {
            spans.push(Span::Code(unescape(code.as_str(), '`')));
        } else if let Some(body) = caps.get(2) {
            let inner = unescape(body.as_str(), '>');
            spans.push(convert_tagged_span(scope, &inner)?);
        }
    }

    if prev < text.len() {
        spans.push(Span::text(&text[prev..]));
    }
    Ok(spans)
}

/// Remove backslash escapes of `quote` and of the backslash itself
fn unescape(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == quote || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn convert_tagged_span(scope: &mut ParseScope<'_>, inner: &str) -> Result<Span, WriteupError> {
    let Some((tag_text, body)) = inner.split_once(':') else {
        return Err(scope.fatal(ErrorKind::MissingSpanColon(inner.to_string())));
    };
    let tag: SpanTag = tag_text
        .parse()
        .map_err(|_| scope.fatal(ErrorKind::UnknownSpanTag(tag_text.to_string())))?;
    let (attrs, words) =
        parse_span_body(body).map_err(|reason| scope.fatal(ErrorKind::MalformedAttribute(reason)))?;

    match tag {
        SpanTag::Bold => Ok(Span::Bold {
            attrs,
            text: words.join(" "),
        }),
        SpanTag::Span => Ok(Span::Generic {
            attrs,
            text: words.join(" "),
        }),
        SpanTag::Http | SpanTag::Https | SpanTag::Mailto => {
            let Some((target, label_words)) = words.split_first() else {
                return Err(scope.fatal(ErrorKind::MissingSpanTarget {
                    tag: tag.to_string(),
                }));
            };
            let href = format!("{}:{}", tag, target);
            let label = if label_words.is_empty() {
                match tag {
                    SpanTag::Mailto => target.clone(),
                    _ => href.clone(),
                }
            } else {
                label_words.join(" ")
            };
            Ok(Span::Link { attrs, href, label })
        }
        SpanTag::Link => {
            let Some((target, label_words)) = words.split_first() else {
                return Err(scope.fatal(ErrorKind::MissingSpanTarget {
                    tag: tag.to_string(),
                }));
            };
            scope.add_dependency(target);
            let label = if label_words.is_empty() {
                target.clone()
            } else {
                label_words.join(" ")
            };
            Ok(Span::Link {
                attrs,
                href: target.clone(),
                label,
            })
        }
        SpanTag::Embed => embed::embed_span(scope, attrs, &words),
    }
}

/// Split a span body into leading `key=value` attributes and body words
///
/// Attributes are only parsed when the first word starts with an alphanumeric
/// `key=` (or is a bare `;`) and the body contains a `;` terminator;
/// otherwise the whole body is free text.
fn parse_span_body(body: &str) -> Result<(Attributes, Vec<String>), String> {
    let body = body.trim_start();
    let first_word = body.split_whitespace().next().unwrap_or("");
    let starts_with_key = first_word
        .split_once('=')
        .is_some_and(|(key, _)| key.chars().all(|c| c.is_ascii_alphanumeric()));
    let has_attributes = (starts_with_key || first_word == ";") && body.contains(';');
    if !has_attributes {
        return Ok((Attributes::new(), words(body)));
    }

    let mut attrs = Attributes::new();
    let mut rest = body;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(';') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err("attribute list is missing its terminating ';'".to_string());
        }

        let key_end = rest
            .find(|c: char| c == '=' || c == ';' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid attribute key: {:?}", key));
        }
        let Some(after_eq) = rest[key_end..].strip_prefix('=') else {
            return Err(format!("attribute {:?} is missing '=' and a value", key));
        };

        let (value, remainder) = split_value(after_eq)
            .map_err(|reason| format!("attribute {:?} {}", key, reason))?;
        if value.is_empty() {
            return Err(format!("attribute {:?} has an empty value", key));
        }
        if attrs.insert(key.to_string(), value.to_string()).is_some() {
            return Err(format!("duplicate attribute key: {:?}", key));
        }
        rest = remainder;
    }

    Ok((attrs, words(rest)))
}

/// Split one attribute value (optionally quoted) from the front of `text`
fn split_value(text: &str) -> Result<(&str, &str), String> {
    match text.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &text[1..];
            let Some(close) = inner.find(quote) else {
                return Err("has mismatched quoting".to_string());
            };
            let remainder = &inner[close + 1..];
            let terminated = remainder.is_empty()
                || remainder.starts_with(';')
                || remainder.starts_with(char::is_whitespace);
            if !terminated {
                return Err("has mismatched quoting".to_string());
            }
            Ok((&inner[..close], remainder))
        }
        _ => {
            let end = text
                .find(|c: char| c == ';' || c.is_whitespace())
                .unwrap_or(text.len());
            let value = &text[..end];
            if value.contains(['"', '\'']) {
                return Err("has mismatched quoting".to_string());
            }
            Ok((value, &text[end..]))
        }
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_model::embed::EmbedContent;
    use crate::source_model::line::Grammar;
    use crate::source_model::scope::{EmbedMode, SourceContext};
    use std::path::{Path, PathBuf};

    fn convert(text: &str, mode: EmbedMode) -> Result<(Vec<Span>, Vec<PathBuf>), WriteupError> {
        let grammar = Grammar::new().unwrap();
        let mut scope = ParseScope::new(&grammar, SourceContext::root(Path::new("doc.wu"), mode));
        scope.set_line(2, text);
        let spans = convert_spans(&mut scope, text)?;
        Ok((spans, scope.dependencies))
    }

    fn spans(text: &str) -> Vec<Span> {
        convert(text, EmbedMode::Embed).unwrap().0
    }

    fn error_kind(text: &str) -> ErrorKind {
        convert(text, EmbedMode::Embed).unwrap_err().kind
    }

    #[test]
    fn test_plain_text_is_single_span() {
        assert_eq!(spans("Hello world"), vec![Span::text("Hello world")]);
    }

    #[test]
    fn test_code_span_splits_text() {
        assert_eq!(
            spans("Hello `world`."),
            vec![Span::text("Hello "), Span::code("world"), Span::text(".")]
        );
    }

    #[test]
    fn test_code_span_escapes() {
        assert_eq!(spans(r"`a\`b`"), vec![Span::code("a`b")]);
        assert_eq!(spans(r"`back\\`"), vec![Span::code(r"back\")]);
        // A lone backslash cannot appear inside a code span.
        assert_eq!(spans(r"`\n`"), vec![Span::text(r"`\n`")]);
    }

    #[test]
    fn test_unmatched_delimiters_are_text() {
        assert_eq!(spans("a < b and `c"), vec![Span::text("a < b and `c")]);
    }

    #[test]
    fn test_bold_span() {
        assert_eq!(
            spans("x <b:very   bold> y"),
            vec![
                Span::text("x "),
                Span::Bold {
                    attrs: Attributes::new(),
                    text: "very bold".to_string()
                },
                Span::text(" y"),
            ]
        );
    }

    #[test]
    fn test_escaped_angle_bracket_in_span() {
        assert_eq!(
            spans(r"<b:a \> b>"),
            vec![Span::Bold {
                attrs: Attributes::new(),
                text: "a > b".to_string()
            }]
        );
    }

    #[test]
    fn test_http_link_defaults_label_to_target() {
        assert_eq!(
            spans("<https://example.com>"),
            vec![Span::Link {
                attrs: Attributes::new(),
                href: "https://example.com".to_string(),
                label: "https://example.com".to_string(),
            }]
        );
        assert_eq!(
            spans("<http://example.com the example>"),
            vec![Span::Link {
                attrs: Attributes::new(),
                href: "http://example.com".to_string(),
                label: "the example".to_string(),
            }]
        );
    }

    #[test]
    fn test_mailto_label_is_address() {
        assert_eq!(
            spans("<mailto:me@example.com>"),
            vec![Span::Link {
                attrs: Attributes::new(),
                href: "mailto:me@example.com".to_string(),
                label: "me@example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_link_registers_dependency() {
        let (spans, deps) = convert("see <link:./other.html Other page>", EmbedMode::Embed).unwrap();
        assert_eq!(
            spans[1],
            Span::Link {
                attrs: Attributes::new(),
                href: "./other.html".to_string(),
                label: "Other page".to_string(),
            }
        );
        assert_eq!(deps, vec![PathBuf::from("other.html")]);
    }

    #[test]
    fn test_span_with_attributes() {
        let result = spans("<span:class=note id='n1'; remember this>");
        let mut attrs = Attributes::new();
        attrs.insert("class".to_string(), "note".to_string());
        attrs.insert("id".to_string(), "n1".to_string());
        assert_eq!(
            result,
            vec![Span::Generic {
                attrs,
                text: "remember this".to_string()
            }]
        );
    }

    #[test]
    fn test_attributes_terminated_by_trailing_semicolon() {
        let result = spans("<span:class=\"a\";>");
        let Span::Generic { attrs, text } = &result[0] else {
            panic!("Expected Generic span");
        };
        assert_eq!(attrs.get("class").map(String::as_str), Some("a"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_equals_without_terminator_is_body_text() {
        assert_eq!(
            spans("<https://example.com/?a=b>"),
            vec![Span::Link {
                attrs: Attributes::new(),
                href: "https://example.com/?a=b".to_string(),
                label: "https://example.com/?a=b".to_string(),
            }]
        );
    }

    #[test]
    fn test_url_with_query_separators_is_not_attributes() {
        // Arrange
        let text = "<https://example.com/?a=b;c=d docs>";

        // Act
        let result = spans(text);

        // Assert
        assert_eq!(
            result,
            vec![Span::Link {
                attrs: Attributes::new(),
                href: "https://example.com/?a=b;c=d".to_string(),
                label: "docs".to_string(),
            }]
        );
        assert_eq!(
            spans("<span:cl-ass=x; t>"),
            vec![Span::Generic {
                attrs: Attributes::new(),
                text: "cl-ass=x; t".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_attributes_are_fatal() {
        assert!(matches!(error_kind("<span:=x; t>"), ErrorKind::MalformedAttribute(_)));
        assert!(matches!(error_kind("<span:class=; t>"), ErrorKind::MalformedAttribute(_)));
        assert!(matches!(error_kind("<span:class=\"x; t>"), ErrorKind::MalformedAttribute(_)));
        assert!(matches!(error_kind("<span:class='x\"; t>"), ErrorKind::MalformedAttribute(_)));
        assert!(matches!(error_kind("<span:a=1 a=2; t>"), ErrorKind::MalformedAttribute(_)));
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        assert_eq!(error_kind("<foo:bar>"), ErrorKind::UnknownSpanTag("foo".to_string()));
        let err = convert("<foo:bar>", EmbedMode::DependenciesOnly).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownSpanTag("foo".to_string()));
        assert_eq!(err.line_num, 2);
    }

    #[test]
    fn test_missing_colon_is_fatal() {
        assert_eq!(error_kind("<nocolon>"), ErrorKind::MissingSpanColon("nocolon".to_string()));
    }

    #[test]
    fn test_link_without_target_is_fatal() {
        assert_eq!(
            error_kind("<link:>"),
            ErrorKind::MissingSpanTarget {
                tag: "link".to_string()
            }
        );
    }

    #[test]
    fn test_embed_in_dependency_mode_skips_io() {
        let (spans, deps) = convert("<embed:missing.txt>", EmbedMode::DependenciesOnly).unwrap();
        assert_eq!(deps, vec![PathBuf::from("missing.txt")]);
        assert!(matches!(
            &spans[0],
            Span::Embed {
                content: EmbedContent::Skipped,
                ..
            }
        ));
    }
}
