//! Conversion results and the result packager.
//!
//! A request produces exactly one [`ConversionResult`]. [`package`] turns a
//! successful result into [`DownloadableArtifact`]s by attaching the fixed
//! filename and content type for the task; the bytes are moved, never
//! rewritten. [`write_artifacts`] persists artifacts to a directory.

use crate::error::{ConversionError, ConversionFailure};
use crate::task::ConversionTask;
use crate::upload::{MIME_DOCX, MIME_JPEG, MIME_PDF};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw adapter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutput {
    /// One document.
    Single(Vec<u8>),
    /// One blob per page, in page order.
    Pages(Vec<Vec<u8>>),
}

/// The bytes of a successful conversion. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPayload {
    output: AdapterOutput,
}

impl ConversionPayload {
    pub(crate) fn new(output: AdapterOutput) -> Self {
        Self { output }
    }

    /// Number of blobs (pages for PDF to JPG, otherwise 1).
    pub fn len(&self) -> usize {
        match self.output {
            AdapterOutput::Single(_) => 1,
            AdapterOutput::Pages(ref pages) => pages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow every blob in order.
    pub fn blobs(&self) -> Vec<&[u8]> {
        match self.output {
            AdapterOutput::Single(ref bytes) => vec![bytes.as_slice()],
            AdapterOutput::Pages(ref pages) => pages.iter().map(Vec::as_slice).collect(),
        }
    }

    fn into_blobs(self) -> Vec<Vec<u8>> {
        match self.output {
            AdapterOutput::Single(bytes) => vec![bytes],
            AdapterOutput::Pages(pages) => pages,
        }
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Success(ConversionPayload),
    Failure(ConversionFailure),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&ConversionFailure> {
        match self {
            ConversionResult::Failure(f) => Some(f),
            ConversionResult::Success(_) => None,
        }
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<ConversionPayload, ConversionFailure> {
        match self {
            ConversionResult::Success(p) => Ok(p),
            ConversionResult::Failure(f) => Err(f),
        }
    }
}

impl From<ConversionError> for ConversionResult {
    fn from(err: ConversionError) -> Self {
        ConversionResult::Failure(err.into())
    }
}

/// One deliverable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadableArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Content type of every artifact a task produces.
pub fn content_type_for(task: ConversionTask) -> &'static str {
    match task {
        ConversionTask::PdfToJpg => MIME_JPEG,
        ConversionTask::PdfToDocx => MIME_DOCX,
        ConversionTask::ImagesToPdf
        | ConversionTask::DocxToPdf
        | ConversionTask::MergePdfs
        | ConversionTask::SplitPdf
        | ConversionTask::ProtectPdf => MIME_PDF,
    }
}

/// Filename for the `index`-th (0-based) artifact of a task.
pub fn filename_for(task: ConversionTask, index: usize) -> String {
    match task {
        ConversionTask::ImagesToPdf => "images_to_pdf.pdf".to_string(),
        ConversionTask::PdfToJpg => format!("page_{}.jpg", index + 1),
        ConversionTask::DocxToPdf => "docx_to_pdf.pdf".to_string(),
        ConversionTask::PdfToDocx => "converted.docx".to_string(),
        ConversionTask::MergePdfs => "merged.pdf".to_string(),
        ConversionTask::SplitPdf => "split.pdf".to_string(),
        ConversionTask::ProtectPdf => "protected.pdf".to_string(),
    }
}

/// Attach filenames and content types to a result.
///
/// Returns the failure unchanged if the request failed, so the caller can
/// show its message.
pub fn package(
    result: ConversionResult,
    task: ConversionTask,
) -> Result<Vec<DownloadableArtifact>, ConversionFailure> {
    let payload = result.into_result()?;
    let content_type = content_type_for(task);

    let artifacts: Vec<DownloadableArtifact> = payload
        .into_blobs()
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| DownloadableArtifact {
            filename: filename_for(task, i),
            content_type,
            size: bytes.len(),
            bytes,
        })
        .collect();

    debug!("Packaged {} artifact(s) for {}", artifacts.len(), task);
    Ok(artifacts)
}

/// Write artifacts into `dir`, creating it if needed.
///
/// Each file is written to a temporary file in the same directory and
/// renamed into place, so a failed write never leaves a partial artifact.
pub fn write_artifacts(
    artifacts: &[DownloadableArtifact],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, ConversionError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| ConversionError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.filename);
        let write_err = |e: std::io::Error| ConversionError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&artifact.bytes).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        info!("Wrote {} ({} bytes)", path.display(), artifact.size);
        written.push(path);
    }
    Ok(written)
}
