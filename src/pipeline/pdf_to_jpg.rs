//! PDF → JPG: rasterise every page with pdfium.
//!
//! Pages render at `config.dpi`, with the longest edge capped at
//! `max_rendered_pixels` so oversized pages stay bounded in memory.
//! pdfium is blocking and CPU-bound; the async entry points already run
//! this on a `spawn_blocking` thread.

use super::encode::encode_jpeg;
use super::FormatAdapter;
use crate::config::ConversionConfig;
use crate::engine::{bind_pdfium, open_pdf};
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::validate::ValidatedRequest;
use pdfium_render::prelude::*;
use tracing::{debug, info};

pub struct PdfToJpg;

impl FormatAdapter for PdfToJpg {
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
        info!("PDF loaded: {} pages", total);

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(config.dpi as f32 / 72.0)
            .set_maximum_width(config.max_rendered_pixels as i32)
            .set_maximum_height(config.max_rendered_pixels as i32);

        let progress = config.progress();
        let mut images = Vec::with_capacity(total);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConversionError::tool("pdfium", format!("rendering page {} failed: {:?}", idx + 1, e))
            })?;

            let image = bitmap.as_image();
            debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());

            let jpeg = encode_jpeg(&image, config.jpeg_quality).map_err(|e| ConversionError::tool("image", e))?;
            images.push(jpeg);
            progress.on_item_complete(idx + 1, total);
        }

        Ok(AdapterOutput::Pages(images))
    }
}
