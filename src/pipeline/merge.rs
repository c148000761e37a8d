//! Merge PDFs: all pages of every upload, in upload order.

use super::pdf::{load, save, PdfBuilder};
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use tracing::{debug, info};

pub struct MergePdfs;

impl FormatAdapter for MergePdfs {
    fn backend(&self) -> &'static str {
        "lopdf"
    }

    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError> {
        let files = request.files();
        let total = files.len();
        let progress = config.progress();
        let mut builder = PdfBuilder::new();

        for (idx, file) in files.iter().enumerate() {
            let doc = load(file)?;
            let all: Vec<u32> = (1..=doc.get_pages().len() as u32).collect();
            let appended = builder.import_pages(doc, &all)?;
            debug!("Merged '{}': {} pages", file.name(), appended);
            progress.on_item_complete(idx + 1, total);
        }

        let pages = builder.page_count();
        let mut doc = builder.finish()?;
        let bytes = save(&mut doc)?;
        info!("Merged {} file(s) → {} pages ({} bytes)", total, pages, bytes.len());
        Ok(AdapterOutput::Single(bytes))
    }
}
