//! # pdfdesk
//!
//! Seven everyday document conversions behind one dispatcher: images to
//! PDF, PDF to JPG, DOCX to PDF, PDF to DOCX, merge, split and password
//! protection.
//!
//! The crate does none of the heavy format work itself. Rendering and text
//! extraction go through pdfium, page surgery and encryption through lopdf,
//! and DOCX through zip + roxmltree. What lives here is the glue: a closed
//! task enum, a validator, an adapter per task and a packager that names the
//! outputs.
//!
//! ## Request Flow
//!
//! ```text
//! task + files + params
//!  │
//!  ├─ 1. Validate  file count, sniffed content, page range, password
//!  ├─ 2. Dispatch  closed task → adapter table, progress events, logging
//!  ├─ 3. Adapt     pdfium / lopdf / image / zip (blocking, CPU-bound)
//!  └─ 4. Package   fixed filenames + content types → DownloadableArtifact
//! ```
//!
//! Every failure, whether a bad upload or a library error, comes back as a
//! [`ConversionResult::Failure`] carrying an [`ErrorKind`] and a message.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfdesk::{convert, package, ConversionConfig, ConversionParams, ConversionTask, UploadedFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let task = ConversionTask::SplitPdf;
//!     let files = vec![UploadedFile::from_path("report.pdf")?];
//!     let params = ConversionParams::new().page_range(2, 4);
//!
//!     let result = convert(task, files, &params, &ConversionConfig::default());
//!     for artifact in package(result, task)? {
//!         println!("{}: {} bytes", artifact.filename, artifact.size);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfdesk` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfdesk = { version = "0.1", default-features = false }
//! ```
//!
//! ## Native pdfium
//!
//! Only PDF to JPG and PDF to DOCX need libpdfium. It is looked up per
//! request: [`ConversionConfig::pdfium_library_path`], then
//! `PDFIUM_LIB_PATH`, then the system loader, then the working directory.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod task;
pub mod upload;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSize};
pub use dispatch::{convert, convert_async, convert_named, convert_to_dir, dispatch, dispatch_async};
pub use error::{ConversionError, ConversionFailure, ErrorKind, ValidationError};
pub use output::{
    package, write_artifacts, AdapterOutput, ConversionPayload, ConversionResult, DownloadableArtifact,
};
pub use pipeline::pdf::page_count;
pub use pipeline::FormatAdapter;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use task::ConversionTask;
pub use upload::{SniffedKind, UploadedFile};
pub use validate::{validate, ConversionParams, PageRange, TaskParams, ValidatedRequest};
