//! HTML exporter for writeup documents
//!
//! Renders a finished [`Document`] depth-first into output lines, indenting
//! two spaces per nesting level. Rendering is a pure function of the tree.
//!
//! - Sections become `<section>` elements with numbered ids
//! - Quotes render their nested document inside `<blockquote>`
//! - License lines are moved to a footer after the last section

use crate::source_model::{
    Attributes, Block, CodeBlock, Document, EmbedContent, ImageReference, ListItem, Paragraph,
    Quote, Section, Span, Table, UnorderedList,
};

/// Metadata and inline assets for the full page wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Page title
    pub title: String,

    /// Content of the description meta tag
    pub description: String,

    /// Content of the author meta tag
    pub author: String,

    /// Stylesheet text placed in the head
    pub css: String,

    /// Script text placed in the head
    pub js: String,
}

/// Render a complete HTML page
///
/// # Parameters
/// * `doc` - The finished document
/// * `page` - Head metadata and inline assets
///
/// # Returns
/// * `Vec<String>` - Output lines, without line terminators
pub fn render_page(doc: &Document, page: &PageMetadata) -> Vec<String> {
    let mut writer = HtmlWriter::default();

    writer.out(0, "<!DOCTYPE html>");
    writer.out(0, "<html>");
    writer.out(0, "<head>");
    writer.out(1, "<meta charset=\"utf-8\">");
    writer.out(1, &format!("<title>{}</title>", escape_text(&page.title)));
    writer.out(
        1,
        &format!(
            "<meta name=\"description\" content=\"{}\">",
            escape_html(&page.description)
        ),
    );
    writer.out(
        1,
        &format!(
            "<meta name=\"author\" content=\"{}\">",
            escape_html(&page.author)
        ),
    );
    writer.out(1, &format!("<style type=\"text/css\">{}</style>", page.css));
    writer.out(
        1,
        &format!(
            "<script type=\"text/javascript\"> \"use strict\";{}</script>",
            page.js
        ),
    );
    writer.out(0, "</head>");
    writer.out(0, "<body id=\"body\">");

    writer.write_document(doc, 0);
    writer.write_id_tables(doc);

    writer.out(0, "</body>");
    writer.out(0, "</html>");
    writer.lines
}

/// Render the document body only: sections, blocks and footer
pub fn render_fragment(doc: &Document) -> Vec<String> {
    let mut writer = HtmlWriter::default();
    writer.write_document(doc, 0);
    writer.lines
}

/// Render an embedded document inside its host page
fn render_embedded(doc: &Document) -> Vec<String> {
    let mut writer = HtmlWriter {
        nested: true,
        ..HtmlWriter::default()
    };
    writer.write_document(doc, 0);
    writer.lines
}

/// Output line accumulator
#[derive(Default)]
struct HtmlWriter {
    lines: Vec<String>,
    /// Rendering a document embedded in another one
    nested: bool,
}

impl HtmlWriter {
    /// Append a line indented by `depth` levels
    fn out(&mut self, depth: usize, text: &str) {
        self.lines.push(format!("{}{}", "  ".repeat(depth), text));
    }

    /// Append a line without indentation
    fn out_raw(&mut self, text: String) {
        self.lines.push(text);
    }

    fn write_document(&mut self, doc: &Document, depth: usize) {
        for block in &doc.blocks {
            self.write_block(block, depth);
        }
        if !doc.license_lines.is_empty() {
            let owns_page = !self.nested && doc.quote_depth == 0;
            self.write_footer(&doc.license_lines, depth, owns_page);
        }
    }

    /// Only the page's own footer carries the `footer` id
    fn write_footer(&mut self, license_lines: &[String], depth: usize, with_id: bool) {
        self.out(depth, if with_id { "<footer id=\"footer\">" } else { "<footer>" });
        let last = license_lines.len() - 1;
        for (i, line) in license_lines.iter().enumerate() {
            let separator = if i < last { "<br />" } else { "" };
            self.out(depth + 1, &format!("{}{}", escape_text(line), separator));
        }
        self.out(depth, "</footer>");
    }

    /// Navigation tables listing section ids, read by the page script
    fn write_id_tables(&mut self, doc: &Document) {
        let section_ids = doc
            .section_ids
            .iter()
            .map(|id| format!("'{}'", id))
            .collect::<Vec<_>>()
            .join(",");
        let paging_ids = std::iter::once("'body'".to_string())
            .chain(doc.paging_ids.iter().map(|id| format!("'{}'", id)))
            .collect::<Vec<_>>()
            .join(", ");

        self.out(0, "<script type=\"text/javascript\"> \"use strict\";");
        self.out(0, &format!("section_ids = [{}];", section_ids));
        self.out(0, &format!("paging_ids = [{}];", paging_ids));
        self.out(0, "</script>");
    }

    fn write_block(&mut self, block: &Block, depth: usize) {
        match block {
            Block::Section(section) => self.write_section(section, depth),
            Block::List(list) => self.write_list(list, depth),
            Block::Paragraph(paragraph) => self.write_paragraph(paragraph, depth),
            Block::Quote(quote) => self.write_quote(quote, depth),
            Block::Code(code) => self.write_code(code),
        }
    }

    fn write_section(&mut self, section: &Section, depth: usize) {
        self.out(
            depth,
            &format!(
                "<section class=\"S{}\" id=\"{}\">",
                section.depth,
                section.id()
            ),
        );

        // Determine heading level (h1-h6)
        if !section.is_intro() {
            let level = section.depth.min(6);
            self.out(
                depth + 1,
                &format!(
                    "<h{} id=\"{}\">{}</h{}>",
                    level,
                    section.heading_id(),
                    spans_to_html(&section.title),
                    level
                ),
            );
        }

        for block in &section.children {
            self.write_block(block, depth + 1);
        }
        self.out(depth, "</section>");
    }

    fn write_list(&mut self, list: &UnorderedList, depth: usize) {
        self.out(depth, &format!("<ul class=\"L{}\">", list.level));
        for item in &list.items {
            self.write_list_item(item, depth + 1);
        }
        self.out(depth, "</ul>");
    }

    /// Write a list item; one single-line paragraph collapses onto the `<li>` line
    fn write_list_item(&mut self, item: &ListItem, depth: usize) {
        if let Some(spans) = item.single_line() {
            self.out(depth, &format!("<li>{}</li>", spans_to_html(spans)));
            return;
        }
        if item.children.is_empty() {
            self.out(depth, "<li></li>");
            return;
        }

        self.out(depth, "<li>");
        for block in &item.children {
            self.write_block(block, depth + 1);
        }
        self.out(depth, "</li>");
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph, depth: usize) {
        self.out(depth, "<p>");
        for (i, line) in paragraph.lines.iter().enumerate() {
            if i > 0 {
                self.out(depth + 1, "<br />");
            }
            self.out(depth + 1, &spans_to_html(line));
        }
        self.out(depth, "</p>");
    }

    fn write_quote(&mut self, quote: &Quote, depth: usize) {
        self.out(depth, "<blockquote>");
        self.write_document(&quote.document, depth + 1);
        self.out(depth, "</blockquote>");
    }

    /// Preformatted lines are never indented; the close tag follows the last line directly
    fn write_code(&mut self, code: &CodeBlock) {
        self.out_raw("<pre>".to_string());
        let last = code.lines.len().saturating_sub(1);
        for (i, line) in code.lines.iter().enumerate() {
            let close = if i == last { "</pre>" } else { "" };
            self.out_raw(format!("{}{}", escape_text(line), close));
        }
        if code.lines.is_empty() {
            self.out_raw("</pre>".to_string());
        }
    }
}

/// Convert spans to an HTML string
fn spans_to_html(spans: &[Span]) -> String {
    let mut result = String::new();

    for span in spans {
        match span {
            Span::Text(text) => result.push_str(&escape_text(text)),
            Span::Code(code) => {
                result.push_str(&format!(
                    "<code>{}</code>",
                    escape_text(code).replace(' ', "&nbsp;")
                ));
            }
            Span::Bold { attrs, text } => {
                result.push_str(&format!(
                    "<b{}>{}</b>",
                    attrs_to_html(attrs, &[]),
                    escape_text(text)
                ));
            }
            Span::Generic { attrs, text } => {
                result.push_str(&format!(
                    "<span{}>{}</span>",
                    attrs_to_html(attrs, &[]),
                    escape_text(text)
                ));
            }
            Span::Link { attrs, href, label } => {
                result.push_str(&format!(
                    "<a href=\"{}\"{}>{}</a>",
                    escape_html(href),
                    attrs_to_html(attrs, &[]),
                    escape_text(label)
                ));
            }
            Span::Embed { attrs, content, .. } => {
                result.push_str(&embed_to_html(attrs, content));
            }
        }
    }

    result
}

/// Convert embed handler output to HTML
fn embed_to_html(attrs: &Attributes, content: &EmbedContent) -> String {
    match content {
        EmbedContent::Skipped => String::new(),
        EmbedContent::Raw(markup) => markup.clone(),
        EmbedContent::Style(css) => format!("<style type=\"text/css\">{}</style>", css),
        EmbedContent::Table(table) => {
            let mut output = String::new();
            write_csv_table(&mut output, table);
            output
        }
        EmbedContent::Image(image) => image_to_html(attrs, image),
        EmbedContent::Document(doc) => render_embedded(doc).join("\n"),
    }
}

fn image_to_html(attrs: &Attributes, image: &ImageReference) -> String {
    let size = match image.size {
        Some((width, height)) => format!(" width=\"{}\" height=\"{}\"", width, height),
        None => String::new(),
    };
    format!(
        "<img src=\"{}\"{}{}>",
        escape_html(&image.src),
        attrs_to_html(attrs, &["ext"]),
        size
    )
}

/// Write a CSV table as HTML
fn write_csv_table(output: &mut String, table: &Table) {
    output.push_str("<table>\n<thead>\n<tr>\n");

    // First row is headers
    for header in &table.header {
        output.push_str(&format!("<th>{}</th>\n", escape_text(header)));
    }

    output.push_str("</tr>\n</thead>\n<tbody>\n");

    // Write data rows
    for row in &table.rows {
        output.push_str("<tr>\n");
        for cell in row {
            output.push_str(&format!("<td>{}</td>\n", escape_text(cell)));
        }
        output.push_str("</tr>\n");
    }

    output.push_str("</tbody>\n</table>");
}

/// Render attributes as ` key="value"` pairs, skipping `excluded` keys
fn attrs_to_html(attrs: &Attributes, excluded: &[&str]) -> String {
    attrs
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| format!(" {}=\"{}\"", key, escape_html(value)))
        .collect()
}

/// Escape HTML special characters in text content
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML special characters, including quotes, for attribute values
fn escape_html(text: &str) -> String {
    escape_text(text)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
