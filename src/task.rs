//! The closed set of conversions the crate performs.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the seven conversions. Chosen once per request and passed
/// explicitly to the validator and the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionTask {
    ImagesToPdf,
    PdfToJpg,
    DocxToPdf,
    PdfToDocx,
    MergePdfs,
    SplitPdf,
    ProtectPdf,
}

impl ConversionTask {
    /// All tasks in menu order.
    pub const ALL: [ConversionTask; 7] = [
        ConversionTask::ImagesToPdf,
        ConversionTask::PdfToJpg,
        ConversionTask::DocxToPdf,
        ConversionTask::PdfToDocx,
        ConversionTask::MergePdfs,
        ConversionTask::SplitPdf,
        ConversionTask::ProtectPdf,
    ];

    /// Stable machine identifier, e.g. `"merge-pdfs"`.
    pub fn id(self) -> &'static str {
        match self {
            ConversionTask::ImagesToPdf => "images-to-pdf",
            ConversionTask::PdfToJpg => "pdf-to-jpg",
            ConversionTask::DocxToPdf => "docx-to-pdf",
            ConversionTask::PdfToDocx => "pdf-to-docx",
            ConversionTask::MergePdfs => "merge-pdfs",
            ConversionTask::SplitPdf => "split-pdf",
            ConversionTask::ProtectPdf => "protect-pdf",
        }
    }

    /// Human-readable menu label, e.g. `"Merge PDFs"`.
    pub fn label(self) -> &'static str {
        match self {
            ConversionTask::ImagesToPdf => "Images to PDF",
            ConversionTask::PdfToJpg => "PDF to JPG",
            ConversionTask::DocxToPdf => "DOCX to PDF",
            ConversionTask::PdfToDocx => "PDF to DOCX",
            ConversionTask::MergePdfs => "Merge PDFs",
            ConversionTask::SplitPdf => "Split PDF",
            ConversionTask::ProtectPdf => "Protect PDF",
        }
    }

    /// Every identifier, for help and error messages.
    pub fn ids() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.id()).collect()
    }
}

impl fmt::Display for ConversionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConversionTask {
    type Err = ConversionError;

    /// Accepts the identifier (`split-pdf`) or the menu label (`Split PDF`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(wanted) || t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConversionError::UnknownTask {
                name: s.to_string(),
            })
    }
}
