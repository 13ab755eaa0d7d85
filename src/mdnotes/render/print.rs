//! Print rendering: a parsed document becomes a flat sequence of styled blocks.
//!
//! The mapping from markdown to print styles lives here; page layout is the sink's job
//! (see [`super::pdf::PdfSink`]). Only headings, paragraphs and lists produce output.
//! Every other block is transparent: its children are rendered in its place, and leaves
//! such as code blocks or raw HTML are dropped.

use crate::error::Result;
use crate::markup::Node;

pub const HEADING1_SIZE: f32 = 22.0;
pub const HEADING2_SIZE: f32 = 18.0;
pub const HEADING_SIZE: f32 = 16.0;
pub const BODY_SIZE: f32 = 12.0;
pub const HEADING_SPACING: f32 = 8.0;
pub const PARAGRAPH_SPACING: f32 = 6.0;
pub const LIST_INDENT: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub style: FontStyle,
    pub size: f32,
}

impl Font {
    pub const fn new(style: FontStyle, size: f32) -> Self {
        Self { style, size }
    }

    fn with_style(self, style: FontStyle) -> Self {
        Self { style, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text { text: String, font: Font },
    LineBreak,
}

impl Span {
    pub fn text(text: impl Into<String>, font: Font) -> Self {
        Span::Text {
            text: text.into(),
            font,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintBlock {
    Paragraph {
        spans: Vec<Span>,
        spacing_after: f32,
    },
    List {
        ordered: bool,
        start: u64,
        indent: f32,
        /// One phrase per list item.
        items: Vec<Vec<Span>>,
    },
}

/// Destination of print blocks.
///
/// [`render`] calls `open` once, `add` per block, and `close` exactly once, also when
/// opening or adding fails.
pub trait PrintSink {
    fn open(&mut self) -> Result<()>;
    fn add(&mut self, block: PrintBlock) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Render a document into `sink`. The first error wins; `close` runs regardless.
pub fn render<S: PrintSink + ?Sized>(doc: &Node, sink: &mut S) -> Result<()> {
    let result = sink.open().and_then(|_| render_blocks(doc.children(), sink));
    let closed = sink.close();
    result.and(closed)
}

fn render_blocks<S: PrintSink + ?Sized>(nodes: &[Node], sink: &mut S) -> Result<()> {
    for node in nodes {
        match node {
            Node::Heading { level, children } => {
                let size = match level {
                    1 => HEADING1_SIZE,
                    2 => HEADING2_SIZE,
                    _ => HEADING_SIZE,
                };
                sink.add(PrintBlock::Paragraph {
                    spans: phrase(children, Font::new(FontStyle::Bold, size)),
                    spacing_after: HEADING_SPACING,
                })?;
            }
            Node::Paragraph(children) => sink.add(PrintBlock::Paragraph {
                spans: phrase(children, body_font()),
                spacing_after: PARAGRAPH_SPACING,
            })?,
            Node::BulletList(items) => sink.add(list(false, 1, items))?,
            Node::OrderedList { start, items } => sink.add(list(true, *start, items))?,
            other => render_blocks(other.children(), sink)?,
        }
    }
    Ok(())
}

fn body_font() -> Font {
    Font::new(FontStyle::Regular, BODY_SIZE)
}

fn list(ordered: bool, start: u64, items: &[Node]) -> PrintBlock {
    let items = items
        .iter()
        .filter(|item| matches!(item, Node::ListItem(_)))
        .map(|item| {
            let mut spans = Vec::new();
            item_phrase(item.children(), body_font(), &mut spans);
            spans
        })
        .collect();
    PrintBlock::List {
        ordered,
        start,
        indent: LIST_INDENT,
        items,
    }
}

/// Content of one list item as a single phrase. Each block after the first, and each
/// entry of a nested list, starts on a new line.
fn item_phrase(nodes: &[Node], base: Font, out: &mut Vec<Span>) {
    for node in nodes {
        match node {
            Node::BulletList(items) | Node::OrderedList { items, .. } => {
                for item in items {
                    line_break(out);
                    item_phrase(item.children(), base, out);
                }
            }
            Node::Paragraph(children) | Node::Heading { children, .. } => {
                line_break(out);
                build_phrase(children, base, out);
            }
            Node::BlockQuote(children) | Node::ListItem(children) => {
                item_phrase(children, base, out)
            }
            other => build_phrase(std::slice::from_ref(other), base, out),
        }
    }
}

fn line_break(out: &mut Vec<Span>) {
    if !matches!(out.last(), None | Some(Span::LineBreak)) {
        out.push(Span::LineBreak);
    }
}

/// Inline content of `nodes` with `base` as the font. Emphasis replaces the style of
/// the enclosing font, so the innermost emphasis decides.
fn phrase(nodes: &[Node], base: Font) -> Vec<Span> {
    let mut spans = Vec::new();
    build_phrase(nodes, base, &mut spans);
    spans
}

fn build_phrase(nodes: &[Node], base: Font, out: &mut Vec<Span>) {
    for node in nodes {
        match node {
            Node::Text(text) | Node::Code(text) => out.push(Span::text(text.clone(), base)),
            Node::Strong(children) => {
                build_phrase(children, base.with_style(FontStyle::Bold), out)
            }
            Node::Emphasis(children) => {
                build_phrase(children, base.with_style(FontStyle::Italic), out)
            }
            Node::SoftBreak => out.push(Span::text(" ", base)),
            Node::HardBreak => out.push(Span::LineBreak),
            other => build_phrase(other.children(), base, out),
        }
    }
}

/// Sink that keeps every block; handy for tests and for callers that lay out themselves.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub blocks: Vec<PrintBlock>,
    pub opened: usize,
    pub closed: usize,
}

impl PrintSink for RecordingSink {
    fn open(&mut self) -> Result<()> {
        self.opened += 1;
        Ok(())
    }

    fn add(&mut self, block: PrintBlock) -> Result<()> {
        self.blocks.push(block);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotesError;
    use crate::markup::parse;

    fn record(md: &str) -> RecordingSink {
        let mut sink = RecordingSink::default();
        render(&parse(md), &mut sink).unwrap();
        sink
    }

    fn regular(text: &str) -> Span {
        Span::text(text, body_font())
    }

    #[test]
    fn heading_then_styled_paragraph() {
        let sink = record("# Title\n\n**bold** and *italic*\n");
        assert_eq!(
            sink.blocks,
            vec![
                PrintBlock::Paragraph {
                    spans: vec![Span::text("Title", Font::new(FontStyle::Bold, 22.0))],
                    spacing_after: 8.0,
                },
                PrintBlock::Paragraph {
                    spans: vec![
                        Span::text("bold", Font::new(FontStyle::Bold, 12.0)),
                        regular(" and "),
                        Span::text("italic", Font::new(FontStyle::Italic, 12.0)),
                    ],
                    spacing_after: 6.0,
                },
            ]
        );
        assert_eq!((sink.opened, sink.closed), (1, 1));
    }

    #[test]
    fn heading_sizes_follow_level() {
        let sink = record("## Two\n\n#### Four\n");
        let sizes: Vec<f32> = sink
            .blocks
            .iter()
            .map(|b| match b {
                PrintBlock::Paragraph { spans, .. } => match &spans[0] {
                    Span::Text { font, .. } => font.size,
                    Span::LineBreak => 0.0,
                },
                PrintBlock::List { .. } => 0.0,
            })
            .collect();
        assert_eq!(sizes, vec![18.0, 16.0]);
    }

    #[test]
    fn emphasis_inside_heading_keeps_heading_size() {
        let sink = record("# A *b*\n");
        match &sink.blocks[0] {
            PrintBlock::Paragraph { spans, .. } => {
                assert_eq!(spans[1], Span::text("b", Font::new(FontStyle::Italic, 22.0)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn innermost_emphasis_wins() {
        let sink = record("**a *b* c**\n");
        match &sink.blocks[0] {
            PrintBlock::Paragraph { spans, .. } => {
                assert_eq!(spans[1], Span::text("b", Font::new(FontStyle::Italic, 12.0)));
                assert_eq!(spans[2], Span::text(" c", Font::new(FontStyle::Bold, 12.0)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn breaks_map_to_space_and_newline() {
        let sink = record("a\nb  \nc\n");
        match &sink.blocks[0] {
            PrintBlock::Paragraph { spans, .. } => assert_eq!(
                spans,
                &vec![
                    regular("a"),
                    regular(" "),
                    regular("b"),
                    Span::LineBreak,
                    regular("c")
                ]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn lists_become_single_phrases() {
        let sink = record("- one\n- *two*\n\n1. first\n");
        assert_eq!(
            sink.blocks,
            vec![
                PrintBlock::List {
                    ordered: false,
                    start: 1,
                    indent: 16.0,
                    items: vec![
                        vec![regular("one")],
                        vec![Span::text("two", Font::new(FontStyle::Italic, 12.0))],
                    ],
                },
                PrintBlock::List {
                    ordered: true,
                    start: 1,
                    indent: 16.0,
                    items: vec![vec![regular("first")]],
                },
            ]
        );
    }

    #[test]
    fn nested_list_entries_start_new_lines() {
        let sink = record("- parent\n  - child one\n  - child two\n- next\n");
        assert_eq!(
            sink.blocks,
            vec![PrintBlock::List {
                ordered: false,
                start: 1,
                indent: 16.0,
                items: vec![
                    vec![
                        regular("parent"),
                        Span::LineBreak,
                        regular("child one"),
                        Span::LineBreak,
                        regular("child two"),
                    ],
                    vec![regular("next")],
                ],
            }]
        );
    }

    #[test]
    fn loose_item_paragraphs_are_separated() {
        let sink = record("- first\n\n  second\n");
        match &sink.blocks[0] {
            PrintBlock::List { items, .. } => assert_eq!(
                items[0],
                vec![regular("first"), Span::LineBreak, regular("second")]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn other_blocks_pass_through() {
        let sink = record("> quoted\n\n```\ncode\n```\n\n---\n");
        assert_eq!(
            sink.blocks,
            vec![PrintBlock::Paragraph {
                spans: vec![regular("quoted")],
                spacing_after: 6.0,
            }]
        );
    }

    struct FailingSink {
        closed: usize,
    }

    impl PrintSink for FailingSink {
        fn open(&mut self) -> Result<()> {
            Ok(())
        }

        fn add(&mut self, _block: PrintBlock) -> Result<()> {
            Err(NotesError::Io(std::io::Error::other("disk full")))
        }

        fn close(&mut self) -> Result<()> {
            self.closed += 1;
            Ok(())
        }
    }

    #[test]
    fn close_runs_once_when_add_fails() {
        let mut sink = FailingSink { closed: 0 };
        let err = render(&parse("# a\n\nb\n"), &mut sink).unwrap_err();
        assert!(matches!(err, NotesError::Io(_)));
        assert_eq!(sink.closed, 1);
    }
}
