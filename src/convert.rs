//! Eager entry points: single conversion, batch, merge, split and inspect.
//!
//! Batch conversion here waits for every job and returns one
//! [`BatchReport`]. Use [`crate::stream::convert_batch_stream`] instead when
//! results should be observed as each job finishes. Both run the same
//! per-job routine, so their outcomes are identical.

use crate::config::ConversionConfig;
use crate::error::{Docx2PdfError, JobError};
use crate::output::{
    non_empty_size, BatchReport, ConversionJob, ConversionResult, ConvertedDocument, MergeReport,
    PdfInfo, SplitReport,
};
use crate::pipeline::engine::ConversionEngine;
use crate::pipeline::{assemble, input};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one DOCX file to PDF.
///
/// `output` defaults to the input path with a `.pdf` extension.
///
/// # Errors
/// Validation errors are returned before the engine is started. Engine
/// failures, timeouts and a missing or empty output are returned as
/// conversion errors.
pub async fn convert(
    input_path: impl AsRef<Path>,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConvertedDocument, Docx2PdfError> {
    let start = Instant::now();
    let input_path = input_path.as_ref();
    input::validate_document(input_path, &config.accepted_extensions)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input::default_output_path(input_path));
    info!(
        "Converting {} → {}",
        input_path.display(),
        output.display()
    );

    if output == input_path {
        return Err(Docx2PdfError::InvalidInput(format!(
            "output '{}' would overwrite the input",
            output.display()
        )));
    }
    clear_stale_output(&output).await?;
    let engine = config.resolve_engine();
    engine.convert(input_path, &output).await?;

    let bytes = non_empty_size(&output).ok_or_else(|| Docx2PdfError::ConversionFailed {
        path: input_path.to_path_buf(),
        detail: format!("no PDF found at '{}' after conversion", output.display()),
    })?;

    Ok(ConvertedDocument {
        input: input_path.to_path_buf(),
        output,
        bytes,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConvertedDocument, Docx2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Docx2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, output, config))
}

/// Convert every input into `output_dir`, one document at a time.
///
/// Individual failures are recorded in the report and never stop the batch.
/// The only fatal error is an `output_dir` that cannot be created, in which
/// case nothing is converted.
pub async fn convert_batch(
    inputs: &[PathBuf],
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Docx2PdfError> {
    let start = Instant::now();
    let output_dir = output_dir.as_ref();
    prepare_output_dir(output_dir).await?;

    let jobs = plan_jobs(inputs, output_dir);
    let total = jobs.len();
    let engine = config.resolve_engine();
    info!(
        "Batch of {} document(s) → {} (engine: {})",
        total,
        output_dir.display(),
        engine.name()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut report = BatchReport::default();
    for (i, job) in jobs.into_iter().enumerate() {
        let result = run_indexed_job(engine.as_ref(), job, i + 1, total, config).await;
        report.record(result);
    }
    report.duration_ms = start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, report.succeeded.len());
    }

    info!(
        "Batch complete: {}/{} converted in {}ms",
        report.succeeded.len(),
        total,
        report.duration_ms
    );
    Ok(report)
}

/// Concatenate existing PDFs into `output`, in list order.
///
/// Missing inputs are skipped and listed in [`MergeReport::skipped`]. The
/// parent directory of `output` must already exist.
///
/// # Errors
/// * [`Docx2PdfError::NoMergeInputs`] when none of the inputs exists; no
///   output file is created.
/// * [`Docx2PdfError::CorruptPdf`] when an existing input cannot be parsed.
pub async fn merge_pdfs(
    inputs: &[PathBuf],
    output: impl AsRef<Path>,
) -> Result<MergeReport, Docx2PdfError> {
    let inputs = inputs.to_vec();
    let output = output.as_ref().to_path_buf();
    info!("Merging {} PDF(s) into {}", inputs.len(), output.display());
    blocking(move || assemble::merge_blocking(&inputs, &output)).await
}

/// Write each page of `input` to `output_dir/{base_name}_page_{i}.pdf`.
///
/// `output_dir` is created if missing. The first page that cannot be
/// written aborts the split.
pub async fn split_pdf(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    base_name: &str,
) -> Result<SplitReport, Docx2PdfError> {
    let input_path = input_path.as_ref().to_path_buf();
    let output_dir = output_dir.as_ref().to_path_buf();
    let base_name = base_name.to_string();
    info!(
        "Splitting {} into {}",
        input_path.display(),
        output_dir.display()
    );
    blocking(move || assemble::split_blocking(&input_path, &output_dir, &base_name)).await
}

/// Read page count, version and encryption flag of a PDF without modifying it.
pub async fn inspect(path: impl AsRef<Path>) -> Result<PdfInfo, Docx2PdfError> {
    let path = path.as_ref().to_path_buf();
    blocking(move || assemble::inspect_blocking(&path)).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn blocking<T, F>(f: F) -> Result<T, Docx2PdfError>
where
    F: FnOnce() -> Result<T, Docx2PdfError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Docx2PdfError::Internal(format!("PDF task panicked: {e}")))?
}

/// Remove an earlier run's file at `output` so the post-check only sees
/// what this run's engine wrote.
async fn clear_stale_output(output: &Path) -> Result<(), Docx2PdfError> {
    match tokio::fs::remove_file(output).await {
        Ok(()) => {
            debug!("Removed previous output {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Docx2PdfError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        }),
    }
}

/// Create the batch output directory.
pub(crate) async fn prepare_output_dir(output_dir: &Path) -> Result<(), Docx2PdfError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Docx2PdfError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })
}

/// One job per input, in input order.
pub(crate) fn plan_jobs(inputs: &[PathBuf], output_dir: &Path) -> Vec<ConversionJob> {
    let mut seen = HashSet::new();
    inputs
        .iter()
        .map(|input_path| {
            let output = input::derive_output_path(input_path, output_dir);
            if !seen.insert(output.clone()) {
                warn!(
                    "{} maps to {} which an earlier input also writes; it will be overwritten",
                    input_path.display(),
                    output.display()
                );
            }
            ConversionJob::new(input_path.clone(), output)
        })
        .collect()
}

/// Run one job and report it to the progress callback.
pub(crate) async fn run_indexed_job(
    engine: &dyn ConversionEngine,
    job: ConversionJob,
    index: usize,
    total: usize,
    config: &ConversionConfig,
) -> ConversionResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_job_start(index, total, &job.input);
    }

    let result = run_job(engine, job, &config.accepted_extensions).await;

    match result.error {
        None => {
            debug!("[{}/{}] {}", index, total, result.job.output.display());
            if let Some(ref cb) = config.progress_callback {
                cb.on_job_complete(index, total, &result.job.output);
            }
        }
        Some(ref e) => {
            warn!("[{}/{}] {}", index, total, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_job_error(index, total, &result.job.input, &e.to_string());
            }
        }
    }
    result
}

/// Validate, convert and post-check a single job. Never fails the batch.
async fn run_job(
    engine: &dyn ConversionEngine,
    job: ConversionJob,
    accepted: &[String],
) -> ConversionResult {
    let start = Instant::now();
    let elapsed = || start.elapsed().as_millis() as u64;

    if let Err(e) = input::validate_document(&job.input, accepted) {
        let err = JobError::from_fatal(&job.input, &e);
        return ConversionResult::failed(job, err, elapsed());
    }

    if let Err(e) = clear_stale_output(&job.output).await {
        let err = JobError::from_fatal(&job.input, &e);
        return ConversionResult::failed(job, err, elapsed());
    }

    if let Err(e) = engine.convert(&job.input, &job.output).await {
        let err = JobError::from_fatal(&job.input, &e);
        return ConversionResult::failed(job, err, elapsed());
    }

    if non_empty_size(&job.output).is_none() {
        let err = JobError::MissingOutput {
            input: job.input.clone(),
            output: job.output.clone(),
        };
        return ConversionResult::failed(job, err, elapsed());
    }

    ConversionResult::succeeded(job, elapsed())
}
