//! DOCX export: a minimal OOXML package (content types, relationships,
//! styles, document) zipped with deflate. The document part is generated
//! with quick-xml; everything else is static boilerplate.
//!
//! List items are rendered as prefixed paragraphs rather than through
//! `numbering.xml`, mirroring the PDF exporter.

use std::io::{Cursor, Write};

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use shared_types::Alignment;

use crate::markup::{parse_blocks, Block, BlockKind};

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// CSS pixels (margin-left) to twentieths of a point.
const PX_TO_TWIPS: u32 = 15;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal">
<w:name w:val="Normal"/>
<w:rPr><w:sz w:val="24"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading1">
<w:name w:val="heading 1"/><w:basedOn w:val="Normal"/>
<w:rPr><w:b/><w:sz w:val="44"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading2">
<w:name w:val="heading 2"/><w:basedOn w:val="Normal"/>
<w:rPr><w:b/><w:sz w:val="36"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading3">
<w:name w:val="heading 3"/><w:basedOn w:val="Normal"/>
<w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
</w:style>
</w:styles>"#;

fn jc_value(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn empty_tag(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> Result<()> {
    writer.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

fn empty_tag_with(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut tag = BytesStart::new(name);
    for (key, value) in attrs {
        tag.push_attribute((*key, *value));
    }
    writer.write_event(Event::Empty(tag))?;
    Ok(())
}

fn write_paragraph(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    block: &Block,
    prefix: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    if let BlockKind::Heading(level) = block.kind {
        let style = format!("Heading{level}");
        empty_tag_with(writer, "w:pStyle", &[("w:val", style.as_str())])?;
    }
    if let Some(align) = block.align {
        empty_tag_with(writer, "w:jc", &[("w:val", jc_value(align))])?;
    }
    if block.indent_px > 0 {
        let twips = (block.indent_px * PX_TO_TWIPS).to_string();
        empty_tag_with(writer, "w:ind", &[("w:left", twips.as_str())])?;
    }
    // 1.5 line spacing throughout, matching the editor view.
    empty_tag_with(
        writer,
        "w:spacing",
        &[("w:line", "360"), ("w:lineRule", "auto")],
    )?;
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;

    if !prefix.is_empty() {
        write_run(writer, prefix, false, false, false)?;
    }
    for run in &block.runs {
        write_run(writer, &run.text, run.bold, run.italic, run.underline)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_run(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    text: &str,
    bold: bool,
    italic: bool,
    underline: bool,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    if bold || italic || underline {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if bold {
            empty_tag(writer, "w:b")?;
        }
        if italic {
            empty_tag(writer, "w:i")?;
        }
        if underline {
            empty_tag_with(writer, "w:u", &[("w:val", "single")])?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }
    let mut text_tag = BytesStart::new("w:t");
    text_tag.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(text_tag))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn build_document(blocks: &[Block]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORD_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    if blocks.is_empty() {
        // Word rejects a body with no paragraphs.
        let placeholder = Block {
            kind: BlockKind::Paragraph,
            align: None,
            indent_px: 0,
            runs: Vec::new(),
        };
        write_paragraph(&mut writer, &placeholder, "")?;
    } else {
        let mut ordinal = 0u32;
        for block in blocks {
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
            write_paragraph(&mut writer, block, &prefix)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner().into_inner())
}

pub fn render(markup: &str) -> Result<Vec<u8>> {
    let blocks = parse_blocks(markup);
    let document = build_document(&blocks)?;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;
        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(DOCUMENT_RELS.as_bytes())?;
        zip.start_file("word/styles.xml", options)?;
        zip.write_all(STYLES.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(&document)?;
        zip.finish()?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render("<p>hello</p>").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_document_carries_text_and_styles() {
        let bytes =
            render("<h2>Methods</h2><p style=\"text-align: center\">Plain <b>bold</b></p>")
                .unwrap();
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:pStyle w:val="Heading2"/>"#));
        assert!(document.contains(r#"<w:jc w:val="center"/>"#));
        assert!(document.contains("Methods"));
        assert!(document.contains("<w:b/>"));
        assert!(document.contains(r#"<w:t xml:space="preserve">bold</w:t>"#));
    }

    #[test]
    fn test_empty_document_gets_placeholder_paragraph() {
        let bytes = render("").unwrap();
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains("<w:p>"));
    }

    #[test]
    fn test_list_items_are_prefixed() {
        let bytes = render("<ol><li>first</li><li>second</li></ol>").unwrap();
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:t xml:space="preserve">1. </w:t>"#));
        assert!(document.contains(r#"<w:t xml:space="preserve">2. </w:t>"#));
    }

    #[test]
    fn test_indent_converts_to_twips() {
        let bytes = render("<p style=\"margin-left: 40px\">indented</p>").unwrap();
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:ind w:left="600"/>"#));
    }
}
