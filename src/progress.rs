//! Progress-callback trait for per-job batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch runner works through its list.
//!
//! # Example
//!
//! ```rust
//! use docx2pdf::{BatchProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_job_complete(&self, index: usize, total: usize, output: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", index, total, output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it processes each job.
///
/// Jobs run one at a time, so events arrive in input order. Implementations
/// must still be `Send + Sync` because the callback lives inside the shared
/// [`crate::config::ConversionConfig`]. All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first job.
    ///
    /// # Arguments
    /// * `total_jobs` - number of inputs submitted
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called just before a job is validated and handed to the engine.
    ///
    /// # Arguments
    /// * `index` - 1-indexed position in the input list
    /// * `total` - total jobs
    /// * `input` - the DOCX path
    fn on_job_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called when a job produced its PDF.
    fn on_job_complete(&self, index: usize, total: usize, output: &Path) {
        let _ = (index, total, output);
    }

    /// Called when a job failed validation or conversion.
    ///
    /// # Arguments
    /// * `error` - human-readable error description
    fn on_job_error(&self, index: usize, total: usize, input: &Path, error: &str) {
        let _ = (index, total, input, error);
    }

    /// Called once after every job has been attempted.
    ///
    /// # Arguments
    /// * `total_jobs`    - jobs submitted
    /// * `success_count` - jobs that produced a PDF
    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let _ = (total_jobs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        started_total: Arc<AtomicUsize>,
        completed_total: Arc<AtomicUsize>,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_jobs: usize) {
            self.started_total.store(total_jobs, Ordering::SeqCst);
        }

        fn on_job_start(&self, _index: usize, _total: usize, _input: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_job_complete(&self, _index: usize, _total: usize, _output: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_job_error(&self, _index: usize, _total: usize, _input: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_jobs: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_job_start(1, 2, Path::new("a.docx"));
        cb.on_job_complete(1, 2, Path::new("out/a.pdf"));
        cb.on_job_error(2, 2, Path::new("b.docx"), "engine crashed");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            started_total: Arc::new(AtomicUsize::new(0)),
            completed_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_batch_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_job_start(1, 3, Path::new("a.docx"));
        tracker.on_job_complete(1, 3, Path::new("out/a.pdf"));
        tracker.on_job_start(2, 3, Path::new("b.docx"));
        tracker.on_job_complete(2, 3, Path::new("out/b.pdf"));
        tracker.on_job_start(3, 3, Path::new("c.txt"));
        tracker.on_job_error(3, 3, Path::new("c.txt"), "not a DOCX file");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(3, 2);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_job_start(1, 10, Path::new("x.docx"));
    }
}
