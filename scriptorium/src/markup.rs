//! Markup processing for the editor document.
//!
//! The document is stored as an HTML subset: `h1`-`h3`, `p`, `div`,
//! `ul`/`ol`/`li`, `br`, inline `b`/`strong`, `i`/`em`, `u`, plus
//! `text-align` and `margin-left` styles on block tags. This module owns
//! every conversion in and out of that representation:
//! - stripping to plain text (word/character counts, analysis input)
//! - escaping imported `.txt`/`.md` content into markup
//! - cleaning model output (boilerplate prefixes, surrounding quotes)
//! - converting light markdown in model output to markup
//! - parsing markup into blocks and styled runs for the exporters

use regex::Regex;
use std::sync::OnceLock;

use shared_types::Alignment;

fn block_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(?:p|div|h1|h2|h3|li)>|<br\s*/?>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Escape HTML special characters.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Reverse of [`escape_html`], plus `&nbsp;`.
pub fn unescape_html(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Strip all markup, turning block boundaries and `<br>` into newlines.
pub fn strip_markup(markup: &str) -> String {
    let broken = block_break_re().replace_all(markup, "\n");
    let stripped = tag_re().replace_all(&broken, "");
    let text = unescape_html(&stripped);
    text.trim_end_matches('\n').to_string()
}

pub fn word_count(markup: &str) -> usize {
    strip_markup(markup).split_whitespace().count()
}

pub fn char_count(markup: &str) -> usize {
    strip_markup(markup).chars().count()
}

/// Convert imported plain-text content into markup: HTML-escape, then turn
/// newlines into `<br>`. Markdown files are imported verbatim as text; the
/// markdown-to-markup path exists only for model output.
pub fn import_to_markup(content: &str) -> String {
    escape_html(content).replace("\r\n", "<br>").replace('\n', "<br>")
}

fn boilerplate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A separator after the keyword is mandatory, so prose that merely
    // starts with one of the words ("Surely...", "Sure enough...") is kept.
    // The "here is/are" preamble must end in a colon; a bare period would
    // let the free tail swallow a whole opening sentence.
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)^(?:(?:sure|certainly|of course|okay|alright)(?:[,!.:]|\n)|here(?:'s| is| are)[^:\n]*:)\s*"#,
        )
        .unwrap()
    })
}

/// Strip conversational boilerplate and surrounding quote characters from
/// model output before it is inserted into the document.
pub fn clean_model_output(text: &str) -> String {
    let mut cleaned = text.trim().to_string();

    // A leading "Here's a rewritten version:" style preamble, with or
    // without its own line.
    cleaned = boilerplate_re().replace(&cleaned, "").trim().to_string();

    // One pair of surrounding quotes, straight or curly.
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')] {
        if cleaned.len() >= 2 && cleaned.starts_with(open) && cleaned.ends_with(close) {
            cleaned = cleaned[open.len_utf8()..cleaned.len() - close.len_utf8()]
                .trim()
                .to_string();
            break;
        }
    }

    cleaned
}

fn single_paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^<p>(.*)</p>\s*$").unwrap())
}

/// Convert markdown constructs in model output to the markup subset.
///
/// Best-effort by design: pulldown-cmark handles the conversion and the
/// result is inserted without validation. A single-paragraph result is
/// unwrapped so inline insertions do not nest block tags.
pub fn markdown_to_markup(text: &str) -> String {
    let parser = pulldown_cmark::Parser::new(text);
    let mut html = String::with_capacity(text.len() * 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    let html = html.trim_end().to_string();

    if let Some(caps) = single_paragraph_re().captures(&html) {
        if !caps[1].contains("<p>") {
            return caps[1].to_string();
        }
    }
    html
}

// ============================================================================
// Block parsing (exporters)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem { ordered: bool },
}

/// A contiguous piece of block text with uniform inline styling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub align: Option<Alignment>,
    pub indent_px: u32,
    pub runs: Vec<Run>,
}

impl Block {
    fn new(kind: BlockKind, align: Option<Alignment>, indent_px: u32) -> Self {
        Self {
            kind,
            align,
            indent_px,
            runs: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

fn block_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)((?:[^>])*?)/?>").unwrap())
}

fn align_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"text-align:\s*(left|center|right|justify)").unwrap())
}

fn indent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"margin-left:\s*(\d+)px").unwrap())
}

pub fn parse_align(attrs: &str) -> Option<Alignment> {
    align_re()
        .captures(attrs)
        .and_then(|caps| match &caps[1] {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        })
}

pub fn parse_indent(attrs: &str) -> u32 {
    indent_re()
        .captures(attrs)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Parse the markup string into a flat sequence of blocks with styled runs.
///
/// Unknown tags are dropped. Text outside any block tag opens an implicit
/// paragraph; `<br>` ends the current block and the next text reopens one
/// with the same attributes.
pub fn parse_blocks(markup: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;
    let mut pending_kind = BlockKind::Paragraph;
    let mut pending_align: Option<Alignment> = None;
    let mut pending_indent: u32 = 0;
    let mut bold = 0i32;
    let mut italic = 0i32;
    let mut underline = 0i32;
    let mut list_stack: Vec<bool> = Vec::new();
    let mut last = 0;

    #[allow(clippy::too_many_arguments)]
    fn push_text(
        text: &str,
        current: &mut Option<Block>,
        bold: i32,
        italic: i32,
        underline: i32,
        kind: BlockKind,
        align: Option<Alignment>,
        indent: u32,
    ) {
        let unescaped = unescape_html(text);
        if current.is_none() && unescaped.trim().is_empty() {
            return;
        }
        let block = current.get_or_insert_with(|| Block::new(kind, align, indent));
        block.runs.push(Run {
            text: unescaped,
            bold: bold > 0,
            italic: italic > 0,
            underline: underline > 0,
        });
    }

    for caps in block_token_re().captures_iter(markup) {
        let whole = caps.get(0).unwrap();
        push_text(
            &markup[last..whole.start()],
            &mut current,
            bold,
            italic,
            underline,
            pending_kind,
            pending_align,
            pending_indent,
        );
        last = whole.end();

        let closing = &caps[1] == "/";
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        match name.as_str() {
            "b" | "strong" => bold += if closing { -1 } else { 1 },
            "i" | "em" => italic += if closing { -1 } else { 1 },
            "u" => underline += if closing { -1 } else { 1 },
            "br" => {
                // Line break: close the block, keep its attributes for the
                // continuation.
                if let Some(block) = current.take() {
                    pending_kind = block.kind;
                    pending_align = block.align;
                    pending_indent = block.indent_px;
                    blocks.push(block);
                }
            }
            "p" | "div" => {
                if closing {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    pending_kind = BlockKind::Paragraph;
                    pending_align = None;
                    pending_indent = 0;
                } else {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    pending_kind = BlockKind::Paragraph;
                    pending_align = parse_align(attrs);
                    pending_indent = parse_indent(attrs);
                    current = Some(Block::new(pending_kind, pending_align, pending_indent));
                }
            }
            "h1" | "h2" | "h3" => {
                let level = name.as_bytes()[1] - b'0';
                if closing {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    pending_kind = BlockKind::Paragraph;
                    pending_align = None;
                    pending_indent = 0;
                } else {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    pending_kind = BlockKind::Heading(level);
                    pending_align = parse_align(attrs);
                    pending_indent = parse_indent(attrs);
                    current = Some(Block::new(pending_kind, pending_align, pending_indent));
                }
            }
            "ul" | "ol" => {
                if closing {
                    list_stack.pop();
                } else {
                    list_stack.push(name == "ol");
                }
            }
            "li" => {
                if closing {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    pending_kind = BlockKind::Paragraph;
                    pending_align = None;
                    pending_indent = 0;
                } else {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    let ordered = list_stack.last().copied().unwrap_or(false);
                    pending_kind = BlockKind::ListItem { ordered };
                    pending_align = parse_align(attrs);
                    pending_indent = parse_indent(attrs);
                    current = Some(Block::new(pending_kind, pending_align, pending_indent));
                }
            }
            _ => {}
        }
    }

    push_text(
        &markup[last..],
        &mut current,
        bold,
        italic,
        underline,
        pending_kind,
        pending_align,
        pending_indent,
    );
    if let Some(block) = current.take() {
        blocks.push(block);
    }

    blocks.retain(|b| !b.runs.is_empty() || b.kind != BlockKind::Paragraph);
    blocks
}
