//! Error types for the pdfdesk library.
//!
//! Two types mirror the two sides of the request boundary:
//!
//! * [`ConversionError`]: everything that can go wrong inside the crate
//!   (bad upload, unreadable content, a library call that raised). Returned
//!   as `Err(ConversionError)` from [`crate::validate::validate`], the
//!   adapters and the filesystem helpers.
//!
//! * [`ConversionFailure`]: the cloneable, serialisable form that travels
//!   inside [`crate::output::ConversionResult::Failure`]. It carries only an
//!   [`ErrorKind`] and a human-readable message, so no library error type
//!   ever leaks past the dispatcher.

use crate::task::ConversionTask;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the shape of a request, caught before any library call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No file was uploaded.
    #[error("{task}: no file uploaded.\nUpload {expected}.")]
    MissingUpload {
        task: ConversionTask,
        expected: &'static str,
    },

    /// The number of uploaded files does not fit the task.
    #[error("{task}: expected {expected}, got {got} files")]
    FileCount {
        task: ConversionTask,
        expected: &'static str,
        got: usize,
    },

    /// Page numbers are 1-based and the range must not be reversed.
    #[error("Invalid page range {start}-{end}: pages start at 1 and start must be <= end")]
    InvalidPageRange { start: u32, end: u32 },

    /// Protect was requested without a password.
    #[error("A non-empty password is required to protect a PDF")]
    EmptyPassword,
}

/// All errors raised by the pdfdesk library.
#[derive(Debug, Error)]
pub enum ConversionError {
    // ── Request errors ────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// File content does not match what the task (or the declared media type) requires.
    #[error("'{file}' is not a valid {expected}: {detail}")]
    UnsupportedFormat {
        file: String,
        expected: &'static str,
        detail: String,
    },

    /// The task name does not name one of the seven conversions.
    #[error("Unknown task '{name}'.\nValid tasks: {}", ConversionTask::ids().join(", "))]
    UnknownTask { name: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Library errors ────────────────────────────────────────────────────
    /// An underlying conversion library raised.
    #[error("{tool} failed: {detail}")]
    ExternalTool { tool: &'static str, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF rendering and text extraction need the native pdfium library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium, or\n\
  • pass --pdfium-lib /path/to/libpdfium, or\n\
  • install libpdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Shorthand for wrapping a library error.
    pub(crate) fn tool(tool: &'static str, err: impl fmt::Display) -> Self {
        ConversionError::ExternalTool {
            tool,
            detail: err.to_string(),
        }
    }

    /// The user-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Validation(_)
            | ConversionError::FileNotFound { .. }
            | ConversionError::PermissionDenied { .. }
            | ConversionError::InvalidConfig(_) => ErrorKind::Validation,
            ConversionError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConversionError::UnknownTask { .. } => ErrorKind::UnknownTask,
            ConversionError::ExternalTool { .. }
            | ConversionError::PdfiumBindingFailed(_)
            | ConversionError::OutputWriteFailed { .. }
            | ConversionError::Internal(_) => ErrorKind::ExternalToolFailure,
        }
    }
}

/// Coarse error category shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input; fix the request and retry.
    Validation,
    /// File content does not match its declared or required type.
    UnsupportedFormat,
    /// The underlying library raised during conversion.
    ExternalToolFailure,
    /// The task name is not recognised.
    UnknownTask,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::ExternalToolFailure => "conversion failed",
            ErrorKind::UnknownTask => "unknown task",
        };
        f.write_str(s)
    }
}

/// A failed request as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ConversionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<ConversionError> for ConversionFailure {
    fn from(err: ConversionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
