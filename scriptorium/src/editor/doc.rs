//! Transforms over the markup string: selection validation, range
//! replacement, and formatting commands applied at a selection.

use regex::Regex;
use std::sync::OnceLock;

use shared_types::{Alignment, FormatCommand, SavedSelection};

use super::EditorError;
use crate::markup;

/// Indent step applied by the indent/outdent commands.
const INDENT_STEP_PX: u32 = 40;

/// Validate a saved selection against the current document.
///
/// Epoch mismatch means the document was replaced wholesale after capture;
/// offsets must lie inside the document on char boundaries. Revision drift
/// alone is allowed - ordinary edits do not invalidate a selection whose
/// offsets still land on boundaries.
pub fn validate_selection(
    content: &str,
    selection: &SavedSelection,
    epoch: u64,
) -> Result<(), EditorError> {
    if selection.epoch != epoch {
        return Err(EditorError::StaleSelection);
    }
    if selection.start > selection.end || selection.end > content.len() {
        return Err(EditorError::InvalidRange);
    }
    if !content.is_char_boundary(selection.start) || !content.is_char_boundary(selection.end) {
        return Err(EditorError::InvalidRange);
    }
    Ok(())
}

/// Replace the selected byte range with `text`.
pub fn replace_range(content: &str, selection: &SavedSelection, text: &str) -> String {
    let mut next = String::with_capacity(content.len() + text.len());
    next.push_str(&content[..selection.start]);
    next.push_str(text);
    next.push_str(&content[selection.end..]);
    next
}

/// Apply a formatting command at the selection. Inline commands wrap the
/// selected range; block commands rewrite the block containing the
/// selection start.
pub fn apply_format(
    content: &str,
    selection: &SavedSelection,
    command: FormatCommand,
) -> Result<String, EditorError> {
    match command {
        FormatCommand::Bold => Ok(wrap_inline(content, selection, "b")),
        FormatCommand::Italic => Ok(wrap_inline(content, selection, "i")),
        FormatCommand::Underline => Ok(wrap_inline(content, selection, "u")),
        FormatCommand::Heading { level } => {
            let level = level.clamp(1, 3);
            Ok(rewrite_block(content, selection.start, |inner, _| {
                format!("<h{level}>{inner}</h{level}>")
            }))
        }
        FormatCommand::BulletList => Ok(rewrite_block(content, selection.start, |inner, _| {
            format!("<ul><li>{inner}</li></ul>")
        })),
        FormatCommand::NumberedList => Ok(rewrite_block(content, selection.start, |inner, _| {
            format!("<ol><li>{inner}</li></ol>")
        })),
        FormatCommand::Align { alignment } => {
            Ok(restyle_block(content, selection.start, |tag, attrs| {
                let value = align_value(alignment);
                let style = set_style_prop(style_of(attrs), "text-align", Some(value));
                rebuild_open_tag(tag, attrs, &style)
            }))
        }
        FormatCommand::Indent => Ok(restyle_block(content, selection.start, |tag, attrs| {
            let style = style_of(attrs);
            let current = markup::parse_indent(&style);
            let next = current + INDENT_STEP_PX;
            let style = set_style_prop(style, "margin-left", Some(&format!("{next}px")));
            rebuild_open_tag(tag, attrs, &style)
        })),
        FormatCommand::Outdent => Ok(restyle_block(content, selection.start, |tag, attrs| {
            let style = style_of(attrs);
            let current = markup::parse_indent(&style);
            let next = current.saturating_sub(INDENT_STEP_PX);
            let value = (next > 0).then(|| format!("{next}px"));
            let style = set_style_prop(style, "margin-left", value.as_deref());
            rebuild_open_tag(tag, attrs, &style)
        })),
    }
}

fn wrap_inline(content: &str, selection: &SavedSelection, tag: &str) -> String {
    if selection.is_empty() {
        return content.to_string();
    }
    format!(
        "{}<{tag}>{}</{tag}>{}",
        &content[..selection.start],
        &content[selection.start..selection.end],
        &content[selection.end..]
    )
}

/// Byte span of the block element containing `pos`, if any.
struct BlockSpan {
    start: usize,
    end: usize,
    tag: String,
    attrs: String,
    inner_start: usize,
    inner_end: usize,
}

fn open_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(p|h1|h2|h3|div|li)\b([^>]*)>").unwrap())
}

fn enclosing_block(content: &str, pos: usize) -> Option<BlockSpan> {
    for caps in open_tag_re().captures_iter(content) {
        let open = caps.get(0).unwrap();
        let tag = caps[1].to_ascii_lowercase();
        let close_pat = format!("</{tag}>");
        let inner_start = open.end();
        let Some(close_rel) = content[inner_start..].find(&close_pat) else {
            continue;
        };
        let inner_end = inner_start + close_rel;
        let end = inner_end + close_pat.len();
        if pos >= open.start() && pos < end {
            return Some(BlockSpan {
                start: open.start(),
                end,
                tag,
                attrs: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                inner_start,
                inner_end,
            });
        }
    }
    None
}

/// Replace the block containing `pos` using `build(inner, attrs)`. A
/// document with no block tags is treated as one implicit block.
fn rewrite_block(content: &str, pos: usize, build: impl Fn(&str, &str) -> String) -> String {
    match enclosing_block(content, pos) {
        Some(span) => {
            let inner = &content[span.inner_start..span.inner_end];
            let rebuilt = build(inner, &span.attrs);
            format!("{}{}{}", &content[..span.start], rebuilt, &content[span.end..])
        }
        None => build(content, ""),
    }
}

/// Rewrite only the open tag of the block containing `pos`, keeping the
/// inner content. Plain text gets wrapped in a styled paragraph.
fn restyle_block(content: &str, pos: usize, build: impl Fn(&str, &str) -> String) -> String {
    match enclosing_block(content, pos) {
        Some(span) => {
            let open = build(&span.tag, &span.attrs);
            format!(
                "{}{}{}{}",
                &content[..span.start],
                open,
                &content[span.inner_start..span.end],
                &content[span.end..]
            )
        }
        None => {
            let open = build("p", "");
            format!("{open}{content}</p>")
        }
    }
}

fn align_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "justify",
    }
}

fn style_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"style\s*=\s*"([^"]*)""#).unwrap())
}

fn style_of(attrs: &str) -> String {
    style_attr_re()
        .captures(attrs)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Set or remove one property in a `style` attribute value.
fn set_style_prop(style: String, prop: &str, value: Option<&str>) -> String {
    let mut props: Vec<(String, String)> = style
        .split(';')
        .filter_map(|decl| {
            let (name, val) = decl.split_once(':')?;
            let name = name.trim();
            let val = val.trim();
            (!name.is_empty() && !val.is_empty())
                .then(|| (name.to_string(), val.to_string()))
        })
        .filter(|(name, _)| name != prop)
        .collect();
    if let Some(value) = value {
        props.push((prop.to_string(), value.to_string()));
    }
    props
        .into_iter()
        .map(|(name, val)| format!("{name}: {val}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rebuild an open tag with `style` replaced, preserving other attributes.
fn rebuild_open_tag(tag: &str, attrs: &str, style: &str) -> String {
    let without_style = style_attr_re().replace(attrs, "").trim().to_string();
    let mut pieces = vec![format!("<{tag}")];
    if !without_style.is_empty() {
        pieces.push(format!(" {without_style}"));
    }
    if !style.is_empty() {
        pieces.push(format!(" style=\"{style}\""));
    }
    pieces.push(">".to_string());
    pieces.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(start: usize, end: usize) -> SavedSelection {
        SavedSelection {
            start,
            end,
            epoch: 0,
            revision: 0,
        }
    }

    #[test]
    fn test_validate_selection_epoch_mismatch_is_stale() {
        let selection = SavedSelection {
            start: 0,
            end: 4,
            epoch: 1,
            revision: 3,
        };
        assert_eq!(
            validate_selection("content", &selection, 2),
            Err(EditorError::StaleSelection)
        );
        assert!(validate_selection("content", &selection, 1).is_ok());
    }

    #[test]
    fn test_validate_selection_rejects_out_of_bounds_and_split_chars() {
        assert_eq!(
            validate_selection("abc", &sel(1, 9), 0),
            Err(EditorError::InvalidRange)
        );
        // 'é' is two bytes; offset 1 splits it.
        assert_eq!(
            validate_selection("été", &sel(1, 3), 0),
            Err(EditorError::InvalidRange)
        );
    }

    #[test]
    fn test_replace_range() {
        let next = replace_range("<p>old words</p>", &sel(3, 6), "new");
        assert_eq!(next, "<p>new words</p>");
    }

    #[test]
    fn test_wrap_inline_bold() {
        let next = apply_format("<p>make this bold</p>", &sel(8, 12), FormatCommand::Bold).unwrap();
        assert_eq!(next, "<p>make <b>this</b> bold</p>");
    }

    #[test]
    fn test_wrap_inline_empty_selection_is_noop() {
        let content = "<p>text</p>";
        let next = apply_format(content, &sel(4, 4), FormatCommand::Italic).unwrap();
        assert_eq!(next, content);
    }

    #[test]
    fn test_heading_rewrites_enclosing_block() {
        let next = apply_format(
            "<p>Intro</p><p>Title here</p>",
            &sel(15, 15),
            FormatCommand::Heading { level: 2 },
        )
        .unwrap();
        assert_eq!(next, "<p>Intro</p><h2>Title here</h2>");
    }

    #[test]
    fn test_heading_wraps_plain_text_document() {
        let next =
            apply_format("bare text", &sel(0, 0), FormatCommand::Heading { level: 1 }).unwrap();
        assert_eq!(next, "<h1>bare text</h1>");
    }

    #[test]
    fn test_bullet_list_wraps_block() {
        let next = apply_format("<p>item</p>", &sel(3, 3), FormatCommand::BulletList).unwrap();
        assert_eq!(next, "<ul><li>item</li></ul>");
    }

    #[test]
    fn test_align_sets_style_preserving_inner() {
        let next = apply_format(
            "<p>some <b>bold</b></p>",
            &sel(3, 3),
            FormatCommand::Align {
                alignment: Alignment::Center,
            },
        )
        .unwrap();
        assert_eq!(next, "<p style=\"text-align: center\">some <b>bold</b></p>");
    }

    #[test]
    fn test_align_replaces_existing_alignment() {
        let content = "<p style=\"text-align: center\">x</p>";
        let next = apply_format(
            content,
            &sel(31, 31),
            FormatCommand::Align {
                alignment: Alignment::Right,
            },
        )
        .unwrap();
        assert_eq!(next, "<p style=\"text-align: right\">x</p>");
    }

    #[test]
    fn test_indent_accumulates_and_outdent_removes() {
        let once = apply_format("<p>x</p>", &sel(3, 3), FormatCommand::Indent).unwrap();
        assert_eq!(once, "<p style=\"margin-left: 40px\">x</p>");
        let twice = apply_format(&once, &sel(30, 30), FormatCommand::Indent).unwrap();
        assert_eq!(twice, "<p style=\"margin-left: 80px\">x</p>");
        let back = apply_format(&twice, &sel(30, 30), FormatCommand::Outdent).unwrap();
        assert_eq!(back, "<p style=\"margin-left: 40px\">x</p>");
        let cleared = apply_format(&back, &sel(30, 30), FormatCommand::Outdent).unwrap();
        assert_eq!(cleared, "<p>x</p>");
    }
}
