//! PDF export via lopdf.
//!
//! Layout is deliberately simple: A4 pages, Times for body text and
//! Times-Bold for headings, greedy word wrap using an average glyph width,
//! and a new page whenever the cursor reaches the bottom margin. List
//! items get a literal bullet or number prefix.

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use shared_types::Alignment;

use crate::markup::{parse_blocks, Block, BlockKind};

const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 56.0;

/// Average glyph width as a fraction of the font size; close enough for
/// wrapping Times at body sizes.
const GLYPH_WIDTH_RATIO: f64 = 0.5;

/// CSS pixels (margin-left) to points.
const PX_TO_PT: f64 = 0.75;

fn type_for(kind: BlockKind) -> (f64, bool) {
    match kind {
        BlockKind::Heading(1) => (22.0, true),
        BlockKind::Heading(2) => (18.0, true),
        BlockKind::Heading(_) => (14.0, true),
        BlockKind::Paragraph | BlockKind::ListItem { .. } => (12.0, false),
    }
}

fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * GLYPH_WIDTH_RATIO
}

/// Greedy word wrap into lines not wider than `max_width`.
fn wrap(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if text_width(&candidate, size) <= max_width || line.is_empty() {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct PageBuilder {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f64,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn line(&mut self, text: &str, x: f64, size: f64, bold: bool) {
        if self.y - size < MARGIN {
            self.pages.push(std::mem::take(&mut self.ops));
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= size;
        let font = if bold { "F2" } else { "F1" };
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops
            .push(Operation::new("Td", vec![x.into(), self.y.into()]));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(text)]));
        self.ops.push(Operation::new("ET", vec![]));
        self.y -= size * 0.5;
    }

    fn gap(&mut self, size: f64) {
        self.y -= size * 0.4;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.ops);
        self.pages
    }
}

fn layout(blocks: &[Block]) -> Vec<Vec<Operation>> {
    let mut builder = PageBuilder::new();
    let mut ordinal = 0u32;

    for block in blocks {
        let (size, bold) = type_for(block.kind);
        let indent = block.indent_px as f64 * PX_TO_PT;
        let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;

        let prefix = match block.kind {
            BlockKind::ListItem { ordered: false } => {
                ordinal = 0;
                "- ".to_string()
            }
            BlockKind::ListItem { ordered: true } => {
                ordinal += 1;
                format!("{ordinal}. ")
            }
            _ => {
                ordinal = 0;
                String::new()
            }
        };

        let text = format!("{prefix}{}", block.text());
        for line in wrap(&text, size, usable) {
            let x = match block.align {
                Some(Alignment::Center) => {
                    MARGIN + indent + (usable - text_width(&line, size)).max(0.0) / 2.0
                }
                Some(Alignment::Right) => {
                    MARGIN + indent + (usable - text_width(&line, size)).max(0.0)
                }
                _ => MARGIN + indent,
            };
            builder.line(&line, x, size, bold);
        }
        builder.gap(size);
    }

    builder.finish()
}

pub fn render(markup: &str) -> Result<Vec<u8>> {
    let blocks = parse_blocks(markup);
    let pages = layout(&blocks);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_regular),
            "F2" => Object::Reference(font_bold),
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let stream_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(stream_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_valid_pdf() {
        let bytes = render("<h1>Title</h1><p>A short paragraph.</p>").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_empty_document_still_has_one_page() {
        let bytes = render("").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_document_paginates() {
        let paragraph = "<p>These words repeat to fill vertical space on the page.</p>";
        let markup = paragraph.repeat(80);
        let bytes = render(&markup).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("one two three four five six seven eight", 12.0, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 12.0) <= 100.0 || !line.contains(' '));
        }
    }
}
