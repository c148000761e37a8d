//! Format adapters, one per conversion task.
//!
//! Each submodule wraps exactly one transformation. Adapters receive an
//! already-validated request and return raw bytes; they never see
//! unvalidated input and never write files.
//!
//! ## Adapter table
//!
//! ```text
//! images-to-pdf ──▶ images_to_pdf  (image + lopdf)
//! pdf-to-jpg    ──▶ pdf_to_jpg     (pdfium + image)
//! docx-to-pdf   ──▶ docx_to_pdf    (zip/roxmltree + lopdf)
//! pdf-to-docx   ──▶ pdf_to_docx    (pdfium + zip)
//! merge-pdfs    ──▶ merge          (lopdf)
//! split-pdf     ──▶ split          (lopdf)
//! protect-pdf   ──▶ protect        (lopdf)
//! ```
//!
//! Shared helpers: [`pdf`] (document assembly), [`docx`] (WordprocessingML
//! read/write), [`encode`] (JPEG).

pub mod docx;
pub mod docx_to_pdf;
pub mod encode;
pub mod images_to_pdf;
pub mod merge;
pub mod pdf;
pub mod pdf_to_docx;
pub mod pdf_to_jpg;
pub mod protect;
pub mod split;

use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::AdapterOutput;
use crate::task::ConversionTask;
use crate::validate::ValidatedRequest;

/// A stateless converter for one task.
pub trait FormatAdapter: Send + Sync {
    /// The library doing the work, for log lines.
    fn backend(&self) -> &'static str;

    /// Convert the request's files.
    fn convert(
        &self,
        request: &ValidatedRequest,
        config: &ConversionConfig,
    ) -> Result<AdapterOutput, ConversionError>;
}

impl ConversionTask {
    /// The adapter that performs this task.
    pub fn adapter(self) -> &'static dyn FormatAdapter {
        match self {
            ConversionTask::ImagesToPdf => &images_to_pdf::ImagesToPdf,
            ConversionTask::PdfToJpg => &pdf_to_jpg::PdfToJpg,
            ConversionTask::DocxToPdf => &docx_to_pdf::DocxToPdf,
            ConversionTask::PdfToDocx => &pdf_to_docx::PdfToDocx,
            ConversionTask::MergePdfs => &merge::MergePdfs,
            ConversionTask::SplitPdf => &split::SplitPdf,
            ConversionTask::ProtectPdf => &protect::ProtectPdf,
        }
    }
}
