//! Split PDF: keep an inclusive, 1-based page range.
//!
//! The end page is clamped to the page count. A start beyond the last page
//! yields a zero-page document.

use super::pdf::{load, save, PdfBuilder};
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use tracing::{info, warn};

pub struct SplitPdf;

impl FormatAdapter for SplitPdf {
    fn backend(&self) -> &'static str {
        "lopdf"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let file = request.single_file()?;
        let range = request.page_range()?;
        let doc = load(file)?;
        let page_count = doc.get_pages().len() as u32;

        let selected = range.clamp_to(page_count);
        if selected.is_empty() {
            warn!(
                "Page range {}-{} is past the end of '{}' ({} pages); result has no pages",
                range.start(),
                range.end(),
                file.name(),
                page_count
            );
        }

        let mut builder = PdfBuilder::new();
        let kept = builder.import_pages(doc, &selected)?;
        config.progress().on_item_complete(1, 1);

        let mut doc = builder.finish()?;
        let bytes = save(&mut doc)?;
        info!(
            "Split '{}' pages {}-{} → {} of {} pages",
            file.name(),
            range.start(),
            range.end(),
            kept,
            page_count
        );
        Ok(AdapterOutput::Single(bytes))
    }
}
