//! Block tree builder
//!
//! Consumes classified lines and maintains a stack of open sections, a stack
//! of open lists and at most one open leaf block. Leaf content is converted
//! when its block closes; quotes are re-parsed there as independent documents.

use super::blocks::{Block, CodeBlock, ListItem, Paragraph, Quote, Section, UnorderedList};
use super::document::Document;
use super::error::{ErrorKind, WriteupError};
use super::index_path::IndexPath;
use super::inline::convert_spans;
use super::line::{Grammar, Leaf, LineKind};
use super::scope::{DocumentKind, ParseScope, SourceContext};

/// Split text into lines, each keeping its trailing newline
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

/// Parse a complete document
///
/// # Parameters
/// * `grammar` - Compiled line and span patterns
/// * `context` - Where the lines came from and how embeds are handled
/// * `lines` - Source lines, each with its trailing newline (the last may lack it)
///
/// # Returns
/// * `Ok(Document)` - The finished document tree
/// * `Err(WriteupError)` - The first fatal error, located at its source line
pub fn parse_lines(
    grammar: &Grammar,
    context: SourceContext,
    lines: &[String],
) -> Result<Document, WriteupError> {
    log::debug!(
        "parsing {} ({:?}, quote depth {})",
        context.path.display(),
        context.kind,
        context.quote_depth
    );
    let line_offset = context.line_offset;
    let versioned = context.is_versioned();
    let mut parser = BlockParser::new(ParseScope::new(grammar, context));

    let mut body = lines;
    if versioned {
        let first = lines.first().map(String::as_str).unwrap_or("");
        parser.scope.set_line(line_offset + 1, first);
        match grammar.version(first) {
            None => return Err(parser.scope.fatal(ErrorKind::MissingVersion)),
            Some(version) if version.parse::<u64>() == Ok(0) => {}
            Some(version) => {
                return Err(parser
                    .scope
                    .fatal(ErrorKind::UnsupportedVersion(version.to_string())))
            }
        }
        body = &lines[1..];
    }

    let first_num = line_offset + if versioned { 2 } else { 1 };
    for (i, line) in body.iter().enumerate() {
        parser.process_line(first_num + i, line)?;
    }
    parser.finish()
}

/// Leading license notice recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LicenseState {
    /// No content line seen yet
    Start,
    /// Inside the notice; continues until a blank line
    Capturing,
    /// Recognition has ended for this document
    Done,
}

/// An open section and the number of child sections opened in it so far
struct SectionFrame {
    section: Section,
    child_count: u32,
}

/// An open list and its current item
struct ListFrame {
    list: UnorderedList,
    item: ListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafKind {
    Paragraph,
    Quote,
    Code,
}

/// One captured leaf line: source number, raw line, payload
struct LeafLine {
    line_num: usize,
    raw: String,
    text: String,
}

/// The open leaf block and the list level it belongs to
struct LeafFrame {
    kind: LeafKind,
    level: usize,
    lines: Vec<LeafLine>,
}

/// Parse-local state of one document
struct BlockParser<'g> {
    scope: ParseScope<'g>,
    sections: Vec<SectionFrame>,
    lists: Vec<ListFrame>,
    leaf: Option<LeafFrame>,
    blocks: Vec<Block>,
    root_rank: u32,
    license: LicenseState,
    license_lines: Vec<String>,
    section_ids: Vec<String>,
    paging_ids: Vec<String>,
}

impl<'g> BlockParser<'g> {
    fn new(scope: ParseScope<'g>) -> Self {
        Self {
            scope,
            sections: Vec::new(),
            lists: Vec::new(),
            leaf: None,
            blocks: Vec::new(),
            root_rank: 0,
            license: LicenseState::Start,
            license_lines: Vec::new(),
            section_ids: Vec::new(),
            paging_ids: Vec::new(),
        }
    }

    fn process_line(&mut self, line_num: usize, line: &str) -> Result<(), WriteupError> {
        self.scope.set_line(line_num, line);

        if self.capture_license(line) {
            return Ok(());
        }

        let grammar = self.scope.grammar;
        let classified = grammar.classify(line);
        for warning in classified.warnings {
            self.scope.warn(warning);
        }
        if !line.ends_with('\n') && self.scope.context.kind != DocumentKind::Quote {
            self.scope.warn("missing newline ('\\n')");
        }

        match classified.kind {
            LineKind::SectionHeader { depth, title } => {
                self.open_section(classified.indent, depth, title)
            }
            LineKind::ListItem { level, leaf } => {
                self.open_list_item(level)?;
                match leaf {
                    Some(leaf) => self.add_leaf(level, leaf),
                    None => Ok(()),
                }
            }
            LineKind::Leaf { level, leaf } => self.add_leaf(level, leaf),
            LineKind::Blank => self.finish_leaf(),
        }
    }

    /// Consume the line if it belongs to the leading license notice
    fn capture_license(&mut self, line: &str) -> bool {
        match self.license {
            LicenseState::Start if self.scope.grammar.is_license(line) => {
                self.license_lines.push(line.trim().to_string());
                self.license = LicenseState::Capturing;
                true
            }
            LicenseState::Capturing if !line.trim().is_empty() => {
                self.license_lines.push(line.trim().to_string());
                true
            }
            LicenseState::Done => false,
            _ => {
                self.license = LicenseState::Done;
                false
            }
        }
    }

    fn open_section(&mut self, indent: usize, depth: usize, title: &str) -> Result<(), WriteupError> {
        if indent > 0 {
            return Err(self.scope.fatal(ErrorKind::IndentedSectionHeader));
        }
        self.finish_leaf()?;
        self.close_lists(0);
        if self.sections.last().is_some_and(|f| f.section.is_intro()) {
            self.close_sections(0);
        }

        let open_depth = self.sections.len();
        if depth > open_depth + 1 {
            return Err(self.scope.fatal(ErrorKind::MissingParentSection { depth, open_depth }));
        }
        self.close_sections(depth - 1);

        let index = match self.sections.last_mut() {
            Some(parent) => {
                parent.child_count += 1;
                parent.section.index.child(parent.child_count)
            }
            None => {
                self.root_rank += 1;
                IndexPath::root(self.root_rank)
            }
        };
        let title = convert_spans(&mut self.scope, title)?;
        let section = Section {
            depth,
            quote_depth: self.scope.context.quote_depth,
            index,
            title,
            children: Vec::new(),
        };

        let id = section.id();
        log::debug!("open section {}", id);
        if depth <= 2 {
            self.paging_ids.push(id.clone());
        }
        self.section_ids.push(id);
        self.sections.push(SectionFrame {
            section,
            child_count: 0,
        });
        Ok(())
    }

    /// Open the untitled intro section if no section is open yet
    fn ensure_section(&mut self) {
        if self.sections.is_empty() {
            log::debug!("open intro section");
            self.sections.push(SectionFrame {
                section: Section {
                    depth: 1,
                    quote_depth: self.scope.context.quote_depth,
                    index: IndexPath::intro(),
                    title: Vec::new(),
                    children: Vec::new(),
                },
                child_count: 0,
            });
        }
    }

    fn open_list_item(&mut self, level: usize) -> Result<(), WriteupError> {
        let open_level = self.lists.len();
        if level > open_level + 1 {
            return Err(self.scope.fatal(ErrorKind::MissingParentList { level, open_level }));
        }
        self.ensure_section();
        self.finish_leaf()?;
        self.close_lists(level);

        if let Some(frame) = self.lists.get_mut(level - 1) {
            let item = std::mem::replace(&mut frame.item, ListItem::new(level));
            frame.list.items.push(item);
        } else {
            log::debug!("open list level {}", level);
            self.lists.push(ListFrame {
                list: UnorderedList {
                    level,
                    items: Vec::new(),
                },
                item: ListItem::new(level),
            });
        }
        Ok(())
    }

    /// Add leaf content at list level `level` (0 for section content)
    fn add_leaf(&mut self, level: usize, leaf: Leaf<'_>) -> Result<(), WriteupError> {
        if level > self.lists.len() {
            return Err(self.scope.fatal(ErrorKind::AmbiguousIndentation { level }));
        }
        let (kind, text) = match leaf {
            Leaf::Text(text) => (LeafKind::Paragraph, text),
            Leaf::Quote(text) => (LeafKind::Quote, text),
            Leaf::Code(text) => (LeafKind::Code, text),
        };

        let continues = self
            .leaf
            .as_ref()
            .is_some_and(|open| open.kind == kind && open.level == level);
        if !continues {
            self.finish_leaf()?;
            self.close_lists(level);
            self.ensure_section();
            self.leaf = Some(LeafFrame {
                kind,
                level,
                lines: Vec::new(),
            });
        }

        let line = LeafLine {
            line_num: self.scope.line_num(),
            raw: self.scope_line(),
            text: text.to_string(),
        };
        if let Some(open) = self.leaf.as_mut() {
            open.lines.push(line);
        }
        Ok(())
    }

    fn scope_line(&self) -> String {
        self.scope.line().to_string()
    }

    /// Close the open leaf block, converting its content
    fn finish_leaf(&mut self) -> Result<(), WriteupError> {
        let Some(leaf) = self.leaf.take() else {
            return Ok(());
        };
        let current = (self.scope.line_num(), self.scope_line());

        let block = match leaf.kind {
            LeafKind::Paragraph => {
                let mut lines = Vec::with_capacity(leaf.lines.len());
                for line in &leaf.lines {
                    self.scope.set_line(line.line_num, &line.raw);
                    lines.push(convert_spans(&mut self.scope, &line.text)?);
                }
                Block::Paragraph(Paragraph { lines })
            }
            LeafKind::Quote => {
                let first_line = leaf.lines.first().map_or(current.0, |l| l.line_num);
                let quoted: Vec<String> = leaf.lines.iter().map(|l| l.text.clone()).collect();
                let source: Vec<String> = quoted.iter().map(|l| format!("{}\n", l)).collect();
                let document = parse_lines(
                    self.scope.grammar,
                    self.scope.context.quote(first_line),
                    &source,
                )?;
                self.scope.absorb(&document);
                Block::Quote(Quote {
                    first_line,
                    lines: quoted,
                    document,
                })
            }
            LeafKind::Code => Block::Code(CodeBlock {
                lines: leaf.lines.into_iter().map(|l| l.text).collect(),
            }),
        };

        self.scope.set_line(current.0, &current.1);
        self.attach(block);
        Ok(())
    }

    /// Add a finished block to the innermost open container
    fn attach(&mut self, block: Block) {
        if let Some(frame) = self.lists.last_mut() {
            frame.item.children.push(block);
        } else if let Some(frame) = self.sections.last_mut() {
            frame.section.children.push(block);
        } else {
            self.blocks.push(block);
        }
    }

    /// Close lists until `level` remain open
    fn close_lists(&mut self, level: usize) {
        while self.lists.len() > level {
            if let Some(mut frame) = self.lists.pop() {
                log::debug!("close list level {}", frame.list.level);
                frame.list.items.push(frame.item);
                self.attach(Block::List(frame.list));
            }
        }
    }

    /// Close sections until `depth` remain open
    fn close_sections(&mut self, depth: usize) {
        while self.sections.len() > depth {
            if let Some(frame) = self.sections.pop() {
                log::debug!("close section {}", frame.section.id());
                self.attach(Block::Section(frame.section));
            }
        }
    }

    /// Close every open block and produce the document
    fn finish(mut self) -> Result<Document, WriteupError> {
        self.finish_leaf()?;
        self.close_lists(0);
        self.close_sections(0);

        let scope = self.scope;
        Ok(Document {
            path: scope.context.path,
            quote_depth: scope.context.quote_depth,
            blocks: self.blocks,
            license_lines: self.license_lines,
            section_ids: self.section_ids,
            paging_ids: self.paging_ids,
            dependencies: scope.dependencies,
            warnings: scope.warnings,
        })
    }
}
