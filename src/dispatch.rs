//! Conversion entry points.
//!
//! [`dispatch`] runs one validated request through its adapter and always
//! returns a [`ConversionResult`]; adapter errors and panics both become
//! [`ConversionResult::Failure`]. The `convert*` functions validate first.
//! The `*_async` variants move the blocking work onto
//! `tokio::task::spawn_blocking` because pdfium and lopdf are CPU-bound and
//! must not stall async worker threads.

use crate::config::ConversionConfig;
use crate::error::{ConversionError, ConversionFailure};
use crate::output::{package, write_artifacts, ConversionPayload, ConversionResult};
use crate::task::ConversionTask;
use crate::upload::UploadedFile;
use crate::validate::{validate, ConversionParams, ValidatedRequest};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run a validated request through the adapter for its task.
///
/// Fires `on_conversion_start` / `on_conversion_complete` on the configured
/// progress callback. Never panics on adapter failure.
pub fn dispatch(request: &ValidatedRequest, config: &ConversionConfig) -> ConversionResult {
    let start = Instant::now();
    let task = request.task();
    let adapter = task.adapter();
    let progress = config.progress();

    info!(
        "Starting {}: {} file(s) via {}",
        task,
        request.files().len(),
        adapter.backend()
    );
    progress.on_conversion_start(task, request.files().len());

    let outcome = catch_unwind(AssertUnwindSafe(|| adapter.convert(request, config)))
        .unwrap_or_else(|panic| Err(ConversionError::Internal(panic_message(panic.as_ref()))));

    let result = match outcome {
        Ok(output) => {
            let payload = ConversionPayload::new(output);
            info!(
                "Finished {}: {} blob(s), {} bytes in {}ms",
                task,
                payload.len(),
                payload.blobs().iter().map(|b| b.len()).sum::<usize>(),
                start.elapsed().as_millis()
            );
            ConversionResult::Success(payload)
        }
        Err(e) => {
            warn!("{} failed: {}", task, e);
            ConversionResult::from(e)
        }
    };

    progress.on_conversion_complete(task, result.is_success());
    result
}

/// Validate `files` for `task`, then dispatch.
pub fn convert(
    task: ConversionTask,
    files: Vec<UploadedFile>,
    params: &ConversionParams,
    config: &ConversionConfig,
) -> ConversionResult {
    match validate(task, files, params) {
        Ok(request) => dispatch(&request, config),
        Err(e) => {
            debug!("Rejected {} request: {}", task, e);
            ConversionResult::from(e)
        }
    }
}

/// Like [`convert`], with the task given by id or menu label.
///
/// An unrecognised name yields an `UnknownTask` failure.
pub fn convert_named(
    name: &str,
    files: Vec<UploadedFile>,
    params: &ConversionParams,
    config: &ConversionConfig,
) -> ConversionResult {
    match name.parse::<ConversionTask>() {
        Ok(task) => convert(task, files, params, config),
        Err(e) => {
            warn!("{}", e);
            ConversionResult::from(e)
        }
    }
}

/// Convert and write the packaged artifacts into `dir`.
///
/// # Returns
/// The paths written, in artifact order.
pub fn convert_to_dir(
    task: ConversionTask,
    files: Vec<UploadedFile>,
    params: &ConversionParams,
    dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, ConversionFailure> {
    let artifacts = package(convert(task, files, params, config), task)?;
    Ok(write_artifacts(&artifacts, dir)?)
}

/// [`dispatch`] on a blocking thread.
pub async fn dispatch_async(request: ValidatedRequest, config: ConversionConfig) -> ConversionResult {
    tokio::task::spawn_blocking(move || dispatch(&request, &config))
        .await
        .unwrap_or_else(|e| ConversionError::Internal(format!("Conversion task panicked: {}", e)).into())
}

/// [`convert`] on a blocking thread.
///
/// # Example
/// ```rust,no_run
/// use pdfdesk::{convert_async, package, ConversionConfig, ConversionParams, ConversionTask, UploadedFile};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let files = vec![
///     UploadedFile::from_path("a.pdf")?,
///     UploadedFile::from_path("b.pdf")?,
/// ];
/// let task = ConversionTask::MergePdfs;
/// let result = convert_async(task, files, ConversionParams::new(), ConversionConfig::default()).await;
/// for artifact in package(result, task)? {
///     println!("{} ({} bytes)", artifact.filename, artifact.size);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_async(
    task: ConversionTask,
    files: Vec<UploadedFile>,
    params: ConversionParams,
    config: ConversionConfig,
) -> ConversionResult {
    tokio::task::spawn_blocking(move || convert(task, files, &params, &config))
        .await
        .unwrap_or_else(|e| ConversionError::Internal(format!("Conversion task panicked: {}", e)).into())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Conversion panicked: {detail}")
}
