//! Request validation: the only way to obtain a [`ValidatedRequest`].
//!
//! Checks upload presence, file count, content kind (magic bytes, and the
//! declared media type when it is specific), and the task parameters.
//! Nothing here decodes a file or calls a conversion library.

use crate::error::{ConversionError, ValidationError};
use crate::task::ConversionTask;
use crate::upload::{is_generic_media_type, magic_of, SniffedKind, UploadedFile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Caller-supplied, task-specific parameters. Unused fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionParams {
    /// First page to keep for Split PDF (1-based). Default: 1.
    pub start_page: Option<u32>,
    /// Last page to keep for Split PDF (inclusive). Default: `start_page`.
    pub end_page: Option<u32>,
    /// Password for Protect PDF.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl ConversionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_range(mut self, start: u32, end: u32) -> Self {
        self.start_page = Some(start);
        self.end_page = Some(end);
        self
    }

    pub fn start_page(mut self, page: u32) -> Self {
        self.start_page = Some(page);
        self
    }

    pub fn end_page(mut self, page: u32) -> Self {
        self.end_page = Some(page);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// A 1-based, inclusive page range with `1 <= start <= end`.
///
/// `end` may exceed the document; it is clamped when the document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self, ValidationError> {
        if start < 1 || start > end {
            return Err(ValidationError::InvalidPageRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// The 1-based page numbers of this range that exist in a document of
    /// `page_count` pages, in order.
    pub fn clamp_to(&self, page_count: u32) -> Vec<u32> {
        (self.start..=self.end.min(page_count)).collect()
    }
}

/// Parameters after validation, typed per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskParams {
    None,
    PageRange(PageRange),
    Password(String),
}

/// A request that passed [`validate`]. Adapters only ever see this type.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    task: ConversionTask,
    files: Vec<UploadedFile>,
    params: TaskParams,
}

impl ValidatedRequest {
    pub fn task(&self) -> ConversionTask {
        self.task
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn params(&self) -> &TaskParams {
        &self.params
    }

    /// The single input of a one-file task.
    pub(crate) fn single_file(&self) -> Result<&UploadedFile, ConversionError> {
        self.files.first().ok_or_else(|| {
            ConversionError::Internal(format!("{} request without a file", self.task))
        })
    }

    pub(crate) fn page_range(&self) -> Result<PageRange, ConversionError> {
        match self.params {
            TaskParams::PageRange(range) => Ok(range),
            _ => Err(ConversionError::Internal(format!(
                "{} request without a page range",
                self.task
            ))),
        }
    }

    pub(crate) fn password(&self) -> Result<&str, ConversionError> {
        match self.params {
            TaskParams::Password(ref pwd) => Ok(pwd),
            _ => Err(ConversionError::Internal(format!(
                "{} request without a password",
                self.task
            ))),
        }
    }
}

// ── Per-task requirements ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Accepts {
    Images,
    Pdf,
    Docx,
}

impl Accepts {
    fn describe(self) -> &'static str {
        match self {
            Accepts::Images => "JPEG or PNG image",
            Accepts::Pdf => "PDF",
            Accepts::Docx => "DOCX document",
        }
    }

    fn admits(self, kind: SniffedKind) -> bool {
        matches!(
            (self, kind),
            (Accepts::Images, SniffedKind::Jpeg | SniffedKind::Png)
                | (Accepts::Pdf, SniffedKind::Pdf)
                | (Accepts::Docx, SniffedKind::Zip)
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Count {
    ExactlyOne,
    AtLeastOne,
}

struct Requirement {
    accepts: Accepts,
    count: Count,
    expected: &'static str,
}

fn requirement(task: ConversionTask) -> Requirement {
    use ConversionTask::*;
    match task {
        ImagesToPdf => Requirement {
            accepts: Accepts::Images,
            count: Count::AtLeastOne,
            expected: "at least 1 JPEG or PNG image",
        },
        PdfToJpg | PdfToDocx | SplitPdf | ProtectPdf => Requirement {
            accepts: Accepts::Pdf,
            count: Count::ExactlyOne,
            expected: "exactly 1 PDF",
        },
        MergePdfs => Requirement {
            accepts: Accepts::Pdf,
            count: Count::AtLeastOne,
            expected: "at least 1 PDF",
        },
        DocxToPdf => Requirement {
            accepts: Accepts::Docx,
            count: Count::ExactlyOne,
            expected: "exactly 1 DOCX document",
        },
    }
}

/// Validate a request.
///
/// # Errors
/// - [`ValidationError`] for missing uploads, wrong file counts, a bad page
///   range or an empty password
/// - [`ConversionError::UnsupportedFormat`] when a file's content is not what
///   the task needs, or contradicts its declared media type
pub fn validate(
    task: ConversionTask,
    files: Vec<UploadedFile>,
    params: &ConversionParams,
) -> Result<ValidatedRequest, ConversionError> {
    let req = requirement(task);

    match (req.count, files.len()) {
        (_, 0) => {
            return Err(ValidationError::MissingUpload {
                task,
                expected: req.expected,
            }
            .into())
        }
        (Count::ExactlyOne, n) if n != 1 => {
            return Err(ValidationError::FileCount {
                task,
                expected: req.expected,
                got: n,
            }
            .into())
        }
        _ => {}
    }

    for file in &files {
        check_content(file, req.accepts)?;
    }

    let params = validate_params(task, params)?;
    debug!("Validated {} request: {} file(s), {:?}", task, files.len(), params);

    Ok(ValidatedRequest {
        task,
        files,
        params,
    })
}

fn check_content(file: &UploadedFile, accepts: Accepts) -> Result<(), ConversionError> {
    let unsupported = |detail: String| ConversionError::UnsupportedFormat {
        file: file.name().to_string(),
        expected: accepts.describe(),
        detail,
    };

    let kind = match file.sniff() {
        Some(kind) if accepts.admits(kind) => kind,
        Some(kind) => return Err(unsupported(format!("content is {}", kind.media_type()))),
        None => {
            return Err(unsupported(format!(
                "unrecognised content, first bytes {}",
                magic_of(file.bytes())
            )))
        }
    };

    let declared = file.media_type();
    if !is_generic_media_type(declared) && !declared_matches(declared, kind) {
        return Err(unsupported(format!(
            "declared as {} but content is {}",
            declared,
            kind.media_type()
        )));
    }

    Ok(())
}

fn declared_matches(declared: &str, kind: SniffedKind) -> bool {
    let declared = declared.trim();
    let eq = |m: &str| declared.eq_ignore_ascii_case(m);
    match kind {
        SniffedKind::Jpeg => eq("image/jpeg") || eq("image/jpg"),
        SniffedKind::Zip => eq(kind.media_type()) || eq("application/zip"),
        _ => eq(kind.media_type()),
    }
}

fn validate_params(
    task: ConversionTask,
    params: &ConversionParams,
) -> Result<TaskParams, ValidationError> {
    match task {
        ConversionTask::SplitPdf => {
            let start = params.start_page.unwrap_or(1);
            let end = params.end_page.unwrap_or(start);
            Ok(TaskParams::PageRange(PageRange::new(start, end)?))
        }
        ConversionTask::ProtectPdf => match params.password {
            Some(ref pwd) if !pwd.is_empty() => Ok(TaskParams::Password(pwd.clone())),
            _ => Err(ValidationError::EmptyPassword),
        },
        _ => Ok(TaskParams::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::upload::{MIME_DOCX, MIME_JPEG, MIME_OCTET_STREAM, MIME_PDF, MIME_PNG};

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile::new(name, MIME_PDF, b"%PDF-1.7\n".to_vec())
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(name, MIME_PNG, b"\x89PNG\r\n\x1a\n0000".to_vec())
    }

    fn docx(name: &str) -> UploadedFile {
        UploadedFile::new(name, MIME_DOCX, b"PK\x03\x04....".to_vec())
    }

    #[test]
    fn missing_upload_rejected_for_every_task() {
        for task in ConversionTask::ALL {
            let err = validate(task, vec![], &ConversionParams::new().password("x")).unwrap_err();
            assert!(
                matches!(err, ConversionError::Validation(ValidationError::MissingUpload { .. })),
                "{task}: {err:?}"
            );
        }
    }

    #[test]
    fn single_pdf_tasks_reject_two_files() {
        for task in [
            ConversionTask::PdfToJpg,
            ConversionTask::PdfToDocx,
            ConversionTask::SplitPdf,
            ConversionTask::ProtectPdf,
        ] {
            let err = validate(
                task,
                vec![pdf("a.pdf"), pdf("b.pdf")],
                &ConversionParams::new().password("pw"),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                ConversionError::Validation(ValidationError::FileCount { got: 2, .. })
            ));
        }
    }

    #[test]
    fn merge_accepts_one_or_more() {
        let one = validate(ConversionTask::MergePdfs, vec![pdf("a.pdf")], &ConversionParams::new());
        assert!(one.is_ok());
        let three = validate(
            ConversionTask::MergePdfs,
            vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
            &ConversionParams::new(),
        )
        .unwrap();
        assert_eq!(three.files().len(), 3);
    }

    #[test]
    fn images_must_be_jpeg_or_png() {
        let gif = UploadedFile::new("cat.gif", "image/gif", b"GIF89a....".to_vec());
        let err = validate(ConversionTask::ImagesToPdf, vec![png("a.png"), gif], &ConversionParams::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("cat.gif"));
    }

    #[test]
    fn pdf_task_rejects_image_content() {
        let err = validate(ConversionTask::PdfToJpg, vec![png("scan.png")], &ConversionParams::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn declared_type_must_match_content() {
        let lying = UploadedFile::new("doc.pdf", MIME_JPEG, b"%PDF-1.7\n".to_vec());
        let err = validate(ConversionTask::SplitPdf, vec![lying], &ConversionParams::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("declared as image/jpeg"));

        let generic = UploadedFile::new("doc", MIME_OCTET_STREAM, b"%PDF-1.7\n".to_vec());
        assert!(validate(ConversionTask::SplitPdf, vec![generic], &ConversionParams::new()).is_ok());
    }

    #[test]
    fn docx_accepts_zip_declaration() {
        let zipped = UploadedFile::new("doc.docx", "application/zip", b"PK\x03\x04..".to_vec());
        assert!(validate(ConversionTask::DocxToPdf, vec![zipped], &ConversionParams::new()).is_ok());
        assert!(validate(ConversionTask::DocxToPdf, vec![docx("d.docx")], &ConversionParams::new()).is_ok());
    }

    #[test]
    fn split_range_defaults_and_checks() {
        let req = validate(ConversionTask::SplitPdf, vec![pdf("a.pdf")], &ConversionParams::new()).unwrap();
        assert_eq!(req.params(), &TaskParams::PageRange(PageRange::new(1, 1).unwrap()));

        let req = validate(
            ConversionTask::SplitPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().start_page(3),
        )
        .unwrap();
        assert_eq!(req.page_range().unwrap(), PageRange::new(3, 3).unwrap());

        let err = validate(
            ConversionTask::SplitPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().page_range(4, 2),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Validation(ValidationError::InvalidPageRange { start: 4, end: 2 })
        ));

        let err = validate(
            ConversionTask::SplitPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().page_range(0, 2),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn end_page_beyond_document_is_not_a_validation_error() {
        let req = validate(
            ConversionTask::SplitPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().page_range(2, 100),
        );
        assert!(req.is_ok());
    }

    #[test]
    fn protect_requires_password() {
        let err = validate(ConversionTask::ProtectPdf, vec![pdf("a.pdf")], &ConversionParams::new())
            .unwrap_err();
        assert!(matches!(err, ConversionError::Validation(ValidationError::EmptyPassword)));

        let err = validate(
            ConversionTask::ProtectPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().password(""),
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::Validation(ValidationError::EmptyPassword)));

        let req = validate(
            ConversionTask::ProtectPdf,
            vec![pdf("a.pdf")],
            &ConversionParams::new().password("s3cret"),
        )
        .unwrap();
        assert_eq!(req.password().unwrap(), "s3cret");
    }

    #[test]
    fn clamp_to_document() {
        let range = PageRange::new(2, 4).unwrap();
        assert_eq!(range.clamp_to(5), vec![2, 3, 4]);
        let range = PageRange::new(2, 100).unwrap();
        assert_eq!(range.clamp_to(5), vec![2, 3, 4, 5]);
        let range = PageRange::new(7, 9).unwrap();
        assert_eq!(range.clamp_to(5), Vec::<u32>::new());
    }
}
