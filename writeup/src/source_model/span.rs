//! Inline span representation
//!
//! A span is the unit of inline content within one source line: an escaped
//! run of plain text or one recognized marked construct.

use super::embed::EmbedContent;
use std::collections::BTreeMap;

/// Attribute name to value mapping carried by attributed spans
///
/// Keys are unique; iteration order is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// An inline content unit
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    /// Unmarked text (escaped when rendered)
    Text(String),

    /// Backtick code span with its escapes already removed
    Code(String),

    /// `<b:...>` bold text
    Bold {
        /// Extra attributes for the output element
        attrs: Attributes,
        /// Body words joined by single spaces
        text: String,
    },

    /// `<span:...>` attributed passthrough wrapper
    Generic {
        /// Attributes for the output element
        attrs: Attributes,
        /// Body words joined by single spaces
        text: String,
    },

    /// `<http:...>`, `<https:...>`, `<mailto:...>` and `<link:...>` links
    Link {
        /// Extra attributes for the output element
        attrs: Attributes,
        /// Link destination
        href: String,
        /// Visible label
        label: String,
    },

    /// `<embed:...>` file embedding
    Embed {
        /// Attributes (`ext` overrides the handler selection)
        attrs: Attributes,
        /// Target as written in the source, without a leading `./`
        target: String,
        /// Handler output
        content: EmbedContent,
    },
}

impl Span {
    /// Create a plain text span
    pub fn text(text: impl Into<String>) -> Self {
        Span::Text(text.into())
    }

    /// Create a code span
    pub fn code(text: impl Into<String>) -> Self {
        Span::Code(text.into())
    }
}

/// Tags recognized in angle-bracket spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanTag {
    /// `b`
    Bold,
    /// `embed`
    Embed,
    /// `http`
    Http,
    /// `https`
    Https,
    /// `mailto`
    Mailto,
    /// `link`
    Link,
    /// `span`
    Span,
}

impl SpanTag {
    /// The tag as written in source
    pub fn as_str(self) -> &'static str {
        match self {
            SpanTag::Bold => "b",
            SpanTag::Embed => "embed",
            SpanTag::Http => "http",
            SpanTag::Https => "https",
            SpanTag::Mailto => "mailto",
            SpanTag::Link => "link",
            SpanTag::Span => "span",
        }
    }
}

impl std::str::FromStr for SpanTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" => Ok(SpanTag::Bold),
            "embed" => Ok(SpanTag::Embed),
            "http" => Ok(SpanTag::Http),
            "https" => Ok(SpanTag::Https),
            "mailto" => Ok(SpanTag::Mailto),
            "link" => Ok(SpanTag::Link),
            "span" => Ok(SpanTag::Span),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SpanTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_round_trip() {
        for tag in [
            SpanTag::Bold,
            SpanTag::Embed,
            SpanTag::Http,
            SpanTag::Https,
            SpanTag::Mailto,
            SpanTag::Link,
            SpanTag::Span,
        ] {
            assert_eq!(tag.as_str().parse::<SpanTag>(), Ok(tag));
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!("foo".parse::<SpanTag>().is_err());
        assert!("B".parse::<SpanTag>().is_err());
    }
}
