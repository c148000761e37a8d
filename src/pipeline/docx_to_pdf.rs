//! DOCX → PDF: paragraph text laid out in Helvetica.
//!
//! Only text survives. Each paragraph starts on a new line, long lines are
//! word-wrapped to the usable width and pages break when the next line
//! would cross the bottom margin. An empty document yields one blank page.

use super::docx::read_paragraphs;
use super::pdf::{save, PdfBuilder};
use super::FormatAdapter;
use crate::config::{ConversionConfig, LINE_SPACING};
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, StringFormat};
use tracing::{debug, info};

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.55;
const TAB_WIDTH: usize = 4;

pub struct DocxToPdf;

impl FormatAdapter for DocxToPdf {
    fn backend(&self) -> &'static str {
        "lopdf"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let file = request.single_file()?;
        let paragraphs = read_paragraphs(file.bytes(), file.name())?;

        let (width, height) = config.page_size.dimensions();
        let margin = config.margin_pt;
        let font_size = config.font_size;
        let leading = font_size * LINE_SPACING;

        let max_chars = (((width - 2.0 * margin) / (font_size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
        let lines_per_page = ((((height - 2.0 * margin) / leading).floor() as usize) + 1).max(1);

        let lines = layout_lines(&paragraphs, max_chars);
        let pages: Vec<&[String]> = if lines.is_empty() {
            vec![lines.as_slice()]
        } else {
            lines.chunks(lines_per_page).collect()
        };
        debug!(
            "Laid out {} paragraphs → {} lines, {} per page, {} chars per line",
            paragraphs.len(),
            lines.len(),
            lines_per_page,
            max_chars
        );

        let mut builder = PdfBuilder::new();
        let font_id = builder.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]);

        let progress = config.progress();
        let total = pages.len();
        for (idx, page_lines) in pages.iter().enumerate() {
            let content = page_content(page_lines, margin, height - margin, font_size, leading)
                .encode()
                .map_err(|e| ConversionError::tool("lopdf", e))?;
            builder.add_page(width, height, resources.clone(), content);
            progress.on_item_complete(idx + 1, total);
        }

        let mut doc = builder.finish()?;
        let bytes = save(&mut doc)?;
        info!("DOCX '{}' → {} page PDF ({} bytes)", file.name(), total, bytes.len());
        Ok(AdapterOutput::Single(bytes))
    }
}

/// Text operators for one page, first baseline at (`x`, `top`).
fn page_content(lines: &[String], x: f32, top: f32, font_size: f32, leading: f32) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), font_size.into()]),
        Operation::new("TL", vec![leading.into()]),
        Operation::new("Td", vec![x.into(), (top - font_size).into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(line), StringFormat::Literal)],
            ));
        }
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Break paragraphs into display lines of at most `max_chars` characters.
///
/// Explicit breaks inside a paragraph start new lines; blank paragraphs
/// become blank lines.
pub(crate) fn layout_lines(paragraphs: &[String], max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in paragraphs {
        let expanded = paragraph.replace('\t', &" ".repeat(TAB_WIDTH));
        for raw in expanded.split('\n') {
            wrap_line(raw, max_chars, &mut lines);
        }
    }
    lines
}

fn wrap_line(text: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Hard-split words that cannot fit on any line.
        while word.len() > max_chars {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            out.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    out.push(current);
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`.
pub(crate) fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '\u{2013}' => 0x96,
                '\u{2014}' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => b'?',
            },
        })
        .collect()
}
