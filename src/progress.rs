//! Progress-callback trait for per-item conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the dispatcher works through a request. An "item" is whatever
//! the task iterates over: images for Images to PDF, pages for the PDF
//! readers and writers, input files for Merge.
//!
//! # Example
//!
//! ```rust
//! use pdfdesk::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, item: usize, total_items: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} done", item, total_items);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::task::ConversionTask;
use std::sync::Arc;

/// Called by the dispatcher and adapters as a request progresses.
///
/// Implementations must be `Send + Sync` because the async entry points run
/// the conversion on a blocking thread. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the adapter runs.
    ///
    /// `total_items` is a best guess made from the upload (number of files);
    /// adapters that discover the real count (pages) report it through
    /// `on_item_complete`.
    fn on_conversion_start(&self, task: ConversionTask, total_items: usize) {
        let _ = (task, total_items);
    }

    /// Called after each image, page or file is processed.
    ///
    /// * `item`: 1-indexed item number
    /// * `total_items`: items this adapter will process
    fn on_item_complete(&self, item: usize, total_items: usize) {
        let _ = (item, total_items);
    }

    /// Called once when the request finishes, successfully or not.
    fn on_conversion_complete(&self, task: ConversionTask, succeeded: bool) {
        let _ = (task, succeeded);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
