//! Markdown parsing into an owned document tree.
//!
//! pulldown-cmark hands out a flat event stream; both renderers want a tree they can walk
//! recursively, so [`parse`] folds the events into [`Node`]s. Parsing never fails: any
//! text is some markdown document.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use std::borrow::Cow;

/// One node of a parsed document. Block and inline kinds share the enum; the parser
/// only ever nests them the way CommonMark allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document(Vec<Node>),
    Heading { level: u8, children: Vec<Node> },
    Paragraph(Vec<Node>),
    BulletList(Vec<Node>),
    OrderedList { start: u64, items: Vec<Node> },
    ListItem(Vec<Node>),
    BlockQuote(Vec<Node>),
    CodeBlock { lang: Option<String>, text: String },
    ThematicBreak,
    /// Raw HTML block, emitted verbatim by the preview.
    Html(String),
    Table(Vec<Node>),
    TableRow { header: bool, cells: Vec<Node> },
    TableCell(Vec<Node>),
    Text(String),
    Strong(Vec<Node>),
    Emphasis(Vec<Node>),
    Strikethrough(Vec<Node>),
    Code(String),
    InlineHtml(String),
    Link { dest: String, title: String, children: Vec<Node> },
    Image { dest: String, title: String, alt: Vec<Node> },
    SoftBreak,
    HardBreak,
}

impl Node {
    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(c)
            | Node::Paragraph(c)
            | Node::BulletList(c)
            | Node::ListItem(c)
            | Node::BlockQuote(c)
            | Node::Table(c)
            | Node::TableCell(c)
            | Node::Strong(c)
            | Node::Emphasis(c)
            | Node::Strikethrough(c) => c,
            Node::Heading { children, .. } | Node::Link { children, .. } => children,
            Node::OrderedList { items, .. } => items,
            Node::TableRow { cells, .. } => cells,
            Node::Image { alt, .. } => alt,
            Node::CodeBlock { .. }
            | Node::ThematicBreak
            | Node::Html(_)
            | Node::Text(_)
            | Node::Code(_)
            | Node::InlineHtml(_)
            | Node::SoftBreak
            | Node::HardBreak => &[],
        }
    }

    /// Concatenated text content, with breaks as spaces.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) | Node::Code(t) => out.push_str(t),
        Node::CodeBlock { text, .. } => out.push_str(text),
        Node::SoftBreak | Node::HardBreak => out.push(' '),
        other => other.children().iter().for_each(|c| collect_text(c, out)),
    }
}

/// Rewrite full-width fence markers (`｀｀｀`) into regular backtick fences.
pub fn normalize_source(text: &str) -> Cow<'_, str> {
    if text.contains('｀') {
        Cow::Owned(text.replace("｀｀｀", "```"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Parse markdown into a [`Node::Document`].
pub fn parse(text: &str) -> Node {
    let source = normalize_source(text);
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut stack = vec![Frame::new(Open::Document)];
    for event in Parser::new_ext(&source, options) {
        match event {
            Event::Start(tag) => stack.push(Frame::new(open_for(tag))),
            Event::End(_) => {
                // The document frame is never closed by an event.
                if stack.len() > 1 {
                    if let Some(frame) = stack.pop() {
                        let finished = frame.finish();
                        push_all(&mut stack, finished);
                    }
                }
            }
            Event::Text(t) => push(&mut stack, Node::Text(t.into_string())),
            Event::Code(t) => push(&mut stack, Node::Code(t.into_string())),
            Event::Html(t) => push(&mut stack, Node::Html(t.into_string())),
            Event::InlineHtml(t) => push(&mut stack, Node::InlineHtml(t.into_string())),
            Event::SoftBreak => push(&mut stack, Node::SoftBreak),
            Event::HardBreak => push(&mut stack, Node::HardBreak),
            Event::Rule => push(&mut stack, Node::ThematicBreak),
            Event::TaskListMarker(done) => {
                let marker = if done { "[x] " } else { "[ ] " };
                push(&mut stack, Node::Text(marker.to_string()))
            }
            Event::FootnoteReference(label) => {
                push(&mut stack, Node::Text(format!("[{}]", label)))
            }
            _ => {}
        }
    }

    // Unbalanced streams do not happen with pulldown-cmark, but fold whatever is left.
    while stack.len() > 1 {
        if let Some(frame) = stack.pop() {
            let finished = frame.finish();
            push_all(&mut stack, finished);
        }
    }
    match stack.pop() {
        Some(frame) => Node::Document(frame.children),
        None => Node::Document(Vec::new()),
    }
}

/// An element whose end event has not been seen yet.
enum Open {
    Document,
    Heading(u8),
    Paragraph,
    BulletList,
    OrderedList(u64),
    ListItem,
    BlockQuote,
    CodeBlock(Option<String>),
    HtmlBlock,
    Table,
    TableRow { header: bool },
    TableCell,
    Strong,
    Emphasis,
    Strikethrough,
    Link { dest: String, title: String },
    Image { dest: String, title: String },
    /// Containers without their own node; children are spliced into the parent.
    Transparent,
}

struct Frame {
    open: Open,
    children: Vec<Node>,
}

impl Frame {
    fn new(open: Open) -> Self {
        Self {
            open,
            children: Vec::new(),
        }
    }

    fn finish(self) -> Vec<Node> {
        let children = self.children;
        let node = match self.open {
            Open::Document | Open::Transparent => return children,
            Open::Heading(level) => Node::Heading { level, children },
            Open::Paragraph => Node::Paragraph(children),
            Open::BulletList => Node::BulletList(children),
            Open::OrderedList(start) => Node::OrderedList {
                start,
                items: children,
            },
            Open::ListItem => Node::ListItem(children),
            Open::BlockQuote => Node::BlockQuote(children),
            Open::CodeBlock(lang) => Node::CodeBlock {
                lang,
                text: raw_text(&children),
            },
            Open::HtmlBlock => Node::Html(raw_text(&children)),
            Open::Table => Node::Table(children),
            Open::TableRow { header } => Node::TableRow {
                header,
                cells: children,
            },
            Open::TableCell => Node::TableCell(children),
            Open::Strong => Node::Strong(children),
            Open::Emphasis => Node::Emphasis(children),
            Open::Strikethrough => Node::Strikethrough(children),
            Open::Link { dest, title } => Node::Link {
                dest,
                title,
                children,
            },
            Open::Image { dest, title } => Node::Image {
                dest,
                title,
                alt: children,
            },
        };
        vec![node]
    }
}

fn open_for(tag: Tag<'_>) -> Open {
    match tag {
        Tag::Heading { level, .. } => Open::Heading(heading_depth(level)),
        Tag::Paragraph => Open::Paragraph,
        Tag::List(Some(start)) => Open::OrderedList(start),
        Tag::List(None) => Open::BulletList,
        Tag::Item => Open::ListItem,
        Tag::BlockQuote(..) => Open::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
            Open::CodeBlock(info.split_whitespace().next().map(str::to_string))
        }
        Tag::CodeBlock(CodeBlockKind::Indented) => Open::CodeBlock(None),
        Tag::HtmlBlock => Open::HtmlBlock,
        Tag::Table(_) => Open::Table,
        Tag::TableHead => Open::TableRow { header: true },
        Tag::TableRow => Open::TableRow { header: false },
        Tag::TableCell => Open::TableCell,
        Tag::Strong => Open::Strong,
        Tag::Emphasis => Open::Emphasis,
        Tag::Strikethrough => Open::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => Open::Link {
            dest: dest_url.into_string(),
            title: title.into_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => Open::Image {
            dest: dest_url.into_string(),
            title: title.into_string(),
        },
        _ => Open::Transparent,
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn raw_text(children: &[Node]) -> String {
    children
        .iter()
        .map(|c| match c {
            Node::Text(t) | Node::Html(t) => t.as_str(),
            _ => "",
        })
        .collect()
}

fn push(stack: &mut [Frame], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn push_all(stack: &mut [Frame], nodes: Vec<Node>) {
    if let Some(top) = stack.last_mut() {
        top.children.extend(nodes);
    }
}
