//! PDF output for print blocks: A4 pages, 36pt margins, the standard Helvetica faces.
//!
//! Layout is a simple flow: spans are split into words, words fill lines left to right,
//! and a block that does not fit on the current page continues on the next one. The
//! document is assembled and written when the sink is closed.

use super::print::{FontStyle, PrintBlock, PrintSink, Span};
use crate::error::Result;
use log::debug;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::io::Write;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 36.0;

const LEADING: f32 = 1.4;
const BULLET: char = '•';

/// A run of text placed at an absolute position on a page.
#[derive(Debug, Clone, PartialEq)]
struct Placed {
    x: f32,
    y: f32,
    style: FontStyle,
    size: f32,
    text: String,
}

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    style: FontStyle,
    size: f32,
}

/// Lays out print blocks and writes a PDF to `writer` on close.
pub struct PdfSink<W: Write> {
    writer: Option<W>,
    pages: Vec<Vec<Placed>>,
    cursor: f32,
}

impl<W: Write> PdfSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            pages: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len().max(1)
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn current_page(&mut self) -> &mut Vec<Placed> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Flow `spans` into lines starting at `left`, advancing the cursor.
    fn flow(&mut self, spans: &[Span], left: f32, prefix: Option<Fragment>) {
        let width = PAGE_WIDTH - MARGIN - left;
        let lines = break_lines(spans, width, prefix.as_ref());
        for line in lines {
            let height = line
                .iter()
                .map(|f| f.size)
                .fold(super::print::BODY_SIZE, f32::max)
                * LEADING;
            if self.cursor - height < MARGIN {
                self.new_page();
            }
            self.cursor -= height;
            let y = self.cursor;

            let mut x = left;
            let page = self.current_page();
            for fragment in line {
                let advance = text_width(&fragment.text, fragment.style, fragment.size);
                if !fragment.text.is_empty() {
                    page.push(Placed {
                        x,
                        y,
                        style: fragment.style,
                        size: fragment.size,
                        text: fragment.text,
                    });
                }
                x += advance;
            }
        }
    }

    fn layout(&mut self, block: &PrintBlock) {
        match block {
            PrintBlock::Paragraph {
                spans,
                spacing_after,
            } => {
                self.flow(spans, MARGIN, None);
                self.cursor -= spacing_after;
            }
            PrintBlock::List {
                ordered,
                start,
                indent,
                items,
            } => {
                for (n, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. ", *start + n as u64)
                    } else {
                        format!("{} ", BULLET)
                    };
                    let prefix = Fragment {
                        text: marker,
                        style: FontStyle::Regular,
                        size: super::print::BODY_SIZE,
                    };
                    self.flow(item, MARGIN + indent, Some(prefix));
                }
                self.cursor -= super::print::PARAGRAPH_SPACING;
            }
        }
    }

    fn write_document(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let bytes = build_pdf(&self.pages);
        debug!("writing pdf: {} page(s), {} bytes", self.pages.len(), bytes.len());
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write> PrintSink for PdfSink<W> {
    fn open(&mut self) -> Result<()> {
        self.pages.clear();
        self.new_page();
        Ok(())
    }

    fn add(&mut self, block: PrintBlock) -> Result<()> {
        self.layout(&block);
        Ok(())
    }

    /// Writes the document. Later calls do nothing.
    fn close(&mut self) -> Result<()> {
        self.write_document()
    }
}

fn font_name(style: FontStyle) -> Name<'static> {
    match style {
        FontStyle::Regular => Name(b"F1"),
        FontStyle::Bold => Name(b"F2"),
        FontStyle::Italic => Name(b"F3"),
    }
}

fn build_pdf(pages: &[Vec<Placed>]) -> Vec<u8> {
    let mut next = 1;
    let mut alloc = || {
        let id = Ref::new(next);
        next += 1;
        id
    };

    let catalog_id = alloc();
    let tree_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();
    let italic_id = alloc();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);

    for (id, base) in [
        (regular_id, "Helvetica"),
        (bold_id, "Helvetica-Bold"),
        (italic_id, "Helvetica-Oblique"),
    ] {
        pdf.type1_font(id)
            .base_font(Name(base.as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (placed, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(tree_id);
            page.contents(*content_id);
            page.resources()
                .fonts()
                .pair(font_name(FontStyle::Regular), regular_id)
                .pair(font_name(FontStyle::Bold), bold_id)
                .pair(font_name(FontStyle::Italic), italic_id);
        }

        let mut content = Content::new();
        for run in placed {
            content.begin_text();
            content.set_font(font_name(run.style), run.size);
            content.next_line(run.x, run.y);
            content.show(Str(&encode_win_ansi(&run.text)));
            content.end_text();
        }
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}

/// Split spans into lines no wider than `width`. A hard break always ends a line; a
/// word wider than a whole line is broken between characters.
fn break_lines(spans: &[Span], width: f32, prefix: Option<&Fragment>) -> Vec<Vec<Fragment>> {
    let mut lines: Vec<Vec<Fragment>> = Vec::new();
    let mut line: Vec<Fragment> = Vec::new();
    let mut used = 0.0;

    if let Some(prefix) = prefix {
        used += text_width(&prefix.text, prefix.style, prefix.size);
        line.push(prefix.clone());
    }

    for span in spans {
        let (text, style, size) = match span {
            Span::LineBreak => {
                lines.push(std::mem::take(&mut line));
                used = 0.0;
                continue;
            }
            Span::Text { text, font } => (text, font.style, font.size),
        };

        for word in split_words(text) {
            let mut word = word.to_string();
            loop {
                let w = text_width(&word, style, size);
                if used + w <= width || (line.is_empty() && w <= width) {
                    used += w;
                    line.push(Fragment {
                        text: word,
                        style,
                        size,
                    });
                    break;
                }
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    used = 0.0;
                    if word.trim().is_empty() {
                        break;
                    }
                    word = word.trim_start().to_string();
                    continue;
                }
                // Word alone is wider than the line.
                let (head, tail) = split_at_width(&word, style, size, width);
                line.push(Fragment {
                    text: head,
                    style,
                    size,
                });
                lines.push(std::mem::take(&mut line));
                used = 0.0;
                if tail.is_empty() {
                    break;
                }
                word = tail;
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Words with their trailing whitespace attached.
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else if in_space {
            words.push(&text[start..i]);
            start = i;
            in_space = false;
        }
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

fn split_at_width(word: &str, style: FontStyle, size: f32, width: f32) -> (String, String) {
    let mut used = 0.0;
    for (i, c) in word.char_indices() {
        let w = char_width(c, style) * size / 1000.0;
        if used + w > width && i > 0 {
            return (word[..i].to_string(), word[i..].to_string());
        }
        used += w;
    }
    (word.to_string(), String::new())
}

pub(crate) fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, style)).sum::<f32>() * size / 1000.0
}

/// Glyph advance in thousandths of an em, from the Helvetica AFM metrics.
fn char_width(c: char, style: FontStyle) -> f32 {
    let table = match style {
        FontStyle::Bold => &HELVETICA_BOLD,
        FontStyle::Regular | FontStyle::Italic => &HELVETICA,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize] as f32,
        _ if c == BULLET => 350.0,
        _ => 556.0,
    }
}

/// Map text to WinAnsi bytes. Characters outside the encoding print as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            BULLET => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use crate::render::print::{self, Font};

    fn render_bytes(md: &str) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut sink = PdfSink::new(&mut out);
            print::render(&parse(md), &mut sink).unwrap();
        }
        out
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn writes_a_pdf_document() {
        let bytes = render_bytes("# Title\n\n**bold** and *italic*\n");
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count(&bytes, b"/Helvetica-Bold"), 1);
        assert_eq!(count(&bytes, b"/Helvetica-Oblique"), 1);
        assert_eq!(count(&bytes, b"/MediaBox"), 1);
        assert_eq!(count(&bytes, b"/WinAnsiEncoding"), 3);
    }

    #[test]
    fn empty_document_still_has_a_page() {
        let bytes = render_bytes("");
        assert_eq!(count(&bytes, b"/Count 1"), 1);
    }

    #[test]
    fn long_documents_paginate() {
        let md: String = (0..120).map(|i| format!("paragraph {}\n\n", i)).collect();
        let mut out = Vec::new();
        let mut sink = PdfSink::new(&mut out);
        print::render(&parse(&md), &mut sink).unwrap();
        assert!(sink.page_count() > 1);
    }

    #[test]
    fn close_writes_only_once() {
        let mut out = Vec::new();
        {
            let mut sink = PdfSink::new(&mut out);
            sink.open().unwrap();
            sink.close().unwrap();
            sink.close().unwrap();
        }
        assert_eq!(count(&out, b"%%EOF"), 1);
    }

    #[test]
    fn lines_wrap_within_width() {
        let font = Font::new(FontStyle::Regular, 12.0);
        let spans = vec![Span::text("word ".repeat(60), font)];
        let lines = break_lines(&spans, 200.0, None);
        assert!(lines.len() > 1);
        for line in &lines {
            let width: f32 = line
                .iter()
                .map(|f| text_width(f.text.trim_end(), f.style, f.size))
                .sum();
            assert!(width <= 200.0 + 0.01, "line too wide: {}", width);
        }
    }

    #[test]
    fn hard_break_starts_new_line() {
        let font = Font::new(FontStyle::Regular, 12.0);
        let spans = vec![Span::text("a", font), Span::LineBreak, Span::text("b", font)];
        assert_eq!(break_lines(&spans, 500.0, None).len(), 2);
    }

    #[test]
    fn oversized_word_is_split() {
        let font = Font::new(FontStyle::Regular, 12.0);
        let spans = vec![Span::text("x".repeat(200), font)];
        let lines = break_lines(&spans, 100.0, None);
        assert!(lines.len() > 1);
        let joined: String = lines.iter().flatten().map(|f| f.text.as_str()).collect();
        assert_eq!(joined, "x".repeat(200));
    }

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(encode_win_ansi("aé•中"), vec![b'a', 0xe9, 0x95, b'?']);
    }

    #[test]
    fn widths_use_metrics() {
        assert_eq!(text_width("A", FontStyle::Regular, 1000.0), 667.0);
        assert_eq!(text_width("b", FontStyle::Bold, 1000.0), 611.0);
    }
}
