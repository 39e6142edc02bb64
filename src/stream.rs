//! Streaming batch API: emit each job's result as soon as it finishes.
//!
//! Unlike the eager [`crate::convert::convert_batch`], which returns only
//! after every document is done, [`convert_batch_stream`] yields one
//! [`ConversionResult`] per input through a `Stream`. Jobs still run one at a
//! time and results arrive in input order, so a caller can persist progress
//! or update a UI after every document.
//!
//! The stream is lazy: no engine is started until it is polled, and dropping
//! it mid-way stops the batch after the current job.

use crate::config::ConversionConfig;
use crate::convert::{plan_jobs, prepare_output_dir, run_indexed_job};
use crate::error::Docx2PdfError;
use crate::output::ConversionResult;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-job results.
pub type BatchStream = Pin<Box<dyn Stream<Item = ConversionResult> + Send>>;

/// Convert `inputs` into `output_dir`, streaming one result per input.
///
/// The progress callback receives `on_batch_start` and the per-job events.
/// `on_batch_complete` is not fired because the caller decides when the
/// stream is finished.
///
/// # Returns
/// - `Ok(BatchStream)` - yields exactly `inputs.len()` items when fully drained
/// - `Err(Docx2PdfError)` - `output_dir` could not be created
///
/// # Example
/// ```rust,no_run
/// use docx2pdf::{convert_batch_stream, ConversionConfig};
/// use futures::StreamExt;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let inputs = vec![PathBuf::from("a.docx"), PathBuf::from("b.docx")];
/// let config = ConversionConfig::default();
/// let mut results = convert_batch_stream(&inputs, "out", &config).await?;
/// while let Some(result) = results.next().await {
///     match result.error {
///         None => println!("ok   {}", result.job.output.display()),
///         Some(e) => eprintln!("fail {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_batch_stream(
    inputs: &[PathBuf],
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchStream, Docx2PdfError> {
    let output_dir = output_dir.as_ref();
    prepare_output_dir(output_dir).await?;

    let jobs = plan_jobs(inputs, output_dir);
    let total = jobs.len();
    let engine = config.resolve_engine();
    info!(
        "Streaming batch of {} document(s) → {}",
        total,
        output_dir.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let config = config.clone();
    let s = stream::iter(jobs.into_iter().enumerate()).then(move |(i, job)| {
        let engine = Arc::clone(&engine);
        let config = config.clone();
        async move { run_indexed_job(engine.as_ref(), job, i + 1, total, &config).await }
    });

    Ok(Box::pin(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assemble::test_pdf;
    use crate::pipeline::engine::ConversionEngine;
    use futures::future::BoxFuture;

    struct MarkerEngine;

    impl ConversionEngine for MarkerEngine {
        fn name(&self) -> &str {
            "marker"
        }

        fn convert<'a>(
            &'a self,
            input: &'a Path,
            output: &'a Path,
        ) -> BoxFuture<'a, Result<(), Docx2PdfError>> {
            Box::pin(async move {
                let stem = input.file_stem().unwrap().to_string_lossy().to_string();
                test_pdf::write(output, &[stem.as_str()]);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn yields_one_result_per_input_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.docx");
        let b = dir.path().join("b.docx");
        std::fs::write(&a, b"PK").unwrap();
        std::fs::write(&b, b"PK").unwrap();
        let inputs = vec![b.clone(), dir.path().join("gone.docx"), a.clone()];
        let config = ConversionConfig::builder()
            .engine(Arc::new(MarkerEngine))
            .build()
            .unwrap();

        let results: Vec<ConversionResult> =
            convert_batch_stream(&inputs, dir.path().join("out"), &config)
                .await
                .unwrap()
                .collect()
                .await;

        let order: Vec<_> = results.iter().map(|r| r.job.input.clone()).collect();
        assert_eq!(order, inputs);
        let ok: Vec<_> = results.iter().map(|r| r.is_success()).collect();
        assert_eq!(ok, vec![true, false, true]);
    }

    #[tokio::test]
    async fn nothing_runs_until_polled() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.docx");
        std::fs::write(&a, b"PK").unwrap();
        let out = dir.path().join("out");
        let config = ConversionConfig::builder()
            .engine(Arc::new(MarkerEngine))
            .build()
            .unwrap();

        let stream = convert_batch_stream(&[a], &out, &config).await.unwrap();
        assert!(out.is_dir());
        assert!(!out.join("a.pdf").exists());
        drop(stream);
    }
}
