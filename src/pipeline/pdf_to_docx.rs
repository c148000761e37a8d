//! PDF → DOCX: per-page text extraction.
//!
//! Each page contributes a `--- Page N ---` marker paragraph followed by one
//! paragraph holding the page text, with the extracted line breaks kept as
//! DOCX breaks. Layout, fonts and images are not reproduced.

use super::docx::write_paragraphs;
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::engine::{bind_pdfium, open_pdf};
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use tracing::{debug, info};

pub struct PdfToDocx;

impl FormatAdapter for PdfToDocx {
    fn backend(&self) -> &'static str {
        "pdfium"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let file = request.single_file()?;
        let pdfium = bind_pdfium(config)?;
        let document = open_pdf(&pdfium, file)?;

        let pages = document.pages();
        let total = pages.len() as usize;
        let progress = config.progress();
        let mut paragraphs = Vec::with_capacity(total * 2);

        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| ConversionError::tool("pdfium", format!("page {}: {:?}", idx + 1, e)))?
                .all();
            debug!("Page {}: {} chars of text", idx + 1, text.len());

            paragraphs.push(page_marker(idx + 1));
            paragraphs.push(normalize_text(&text));
            progress.on_item_complete(idx + 1, total);
        }

        let bytes = write_paragraphs(&paragraphs)?;
        info!("PDF '{}' → DOCX: {} pages, {} bytes", file.name(), total, bytes.len());
        Ok(AdapterOutput::Single(bytes))
    }
}

pub(crate) fn page_marker(page: usize) -> String {
    format!("--- Page {page} ---")
}

/// Unify line endings and drop trailing blank lines.
pub(crate) fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim_end_matches(['\n', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_format() {
        assert_eq!(page_marker(3), "--- Page 3 ---");
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\n\n  \n"), "a\nb\nc");
        assert_eq!(normalize_text(""), "");
    }
}
