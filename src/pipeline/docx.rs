//! Minimal WordprocessingML support: paragraph text in, paragraph text out.
//!
//! Reading walks the body-level `w:p` elements of `word/document.xml` and
//! keeps only their text runs (`w:t`), tabs and breaks. Styling, tables,
//! images and headers are ignored.
//!
//! Writing produces the smallest package Word and LibreOffice accept:
//! `[Content_Types].xml`, `_rels/.rels` and `word/document.xml`.

use crate::error::ConversionError;
use roxmltree::{Document, Node};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Paragraph texts of a DOCX, in document order.
///
/// Within a paragraph, tabs become `\t` and line breaks become `\n`.
/// `name` is only used in error messages.
pub fn read_paragraphs(bytes: &[u8], name: &str) -> Result<Vec<String>, ConversionError> {
    let not_docx = |detail: String| ConversionError::UnsupportedFormat {
        file: name.to_string(),
        expected: "DOCX document",
        detail,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| not_docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| not_docx(format!("ZIP archive has no {DOCUMENT_PART}")))?
        .read_to_string(&mut xml)
        .map_err(|e| not_docx(format!("{DOCUMENT_PART}: {e}")))?;

    let doc = Document::parse(&xml).map_err(|e| not_docx(format!("{DOCUMENT_PART}: {e}")))?;
    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .ok_or_else(|| not_docx("document has no body".to_string()))?;

    let paragraphs: Vec<String> = body
        .children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .map(|p| {
            let mut text = String::new();
            collect_text(p, &mut text);
            text
        })
        .collect();

    debug!("Read {} paragraphs from {}", paragraphs.len(), name);
    Ok(paragraphs)
}

/// Append the run text under `node`, without descending into nested
/// paragraphs (text boxes) or deleted text.
fn collect_text(node: Node, out: &mut String) {
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => out.push_str(child.text().unwrap_or("")),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            "p" | "txbxContent" | "del" | "pPr" | "rPr" => {}
            _ => collect_text(child, out),
        }
    }
}

/// Build a DOCX with one paragraph per entry.
///
/// `\n` inside an entry becomes a line break and `\t` a tab.
pub fn write_paragraphs(paragraphs: &[String]) -> Result<Vec<u8>, ConversionError> {
    let mut document = String::with_capacity(paragraphs.iter().map(String::len).sum::<usize>() + 512);
    document.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    document.push('\n');
    document.push_str(&format!(r#"<w:document xmlns:w="{W_NS}"><w:body>"#));
    for paragraph in paragraphs {
        push_paragraph(&mut document, paragraph);
    }
    document.push_str("<w:sectPr/></w:body></w:document>");

    let zip_err = |e: zip::result::ZipError| ConversionError::tool("zip", e);
    let io_err = |e: std::io::Error| ConversionError::tool("zip", e);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (part, content) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", RELS_XML),
        (DOCUMENT_PART, document.as_str()),
    ] {
        zip.start_file(part, options).map_err(zip_err)?;
        zip.write_all(content.as_bytes()).map_err(io_err)?;
    }
    let bytes = zip.finish().map_err(zip_err)?.into_inner();

    debug!("Wrote DOCX: {} paragraphs, {} bytes", paragraphs.len(), bytes.len());
    Ok(bytes)
}

fn push_paragraph(out: &mut String, text: &str) {
    if text.is_empty() {
        out.push_str("<w:p/>");
        return;
    }
    out.push_str("<w:p><w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                out.push_str(r#"<w:t xml:space="preserve">"#);
                push_escaped(out, segment);
                out.push_str("</w:t>");
            }
        }
    }
    out.push_str("</w:r></w:p>");
}

/// XML-escape `text`, dropping characters XML 1.0 cannot represent.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => {}
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
}
