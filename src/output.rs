//! Result types returned by the conversion, merge, split and inspect entry points.

use crate::error::JobError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One planned DOCX → PDF conversion. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// DOCX path as given by the caller.
    pub input: PathBuf,
    /// Where the PDF is written.
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Whether a job produced its PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

/// Outcome of a single batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub job: ConversionJob,
    pub outcome: JobOutcome,
    /// Set when `outcome` is [`JobOutcome::Failed`].
    pub error: Option<JobError>,
    /// Wall-clock time spent on this job.
    pub duration_ms: u64,
}

impl ConversionResult {
    pub fn succeeded(job: ConversionJob, duration_ms: u64) -> Self {
        Self {
            job,
            outcome: JobOutcome::Succeeded,
            error: None,
            duration_ms,
        }
    }

    pub fn failed(job: ConversionJob, error: JobError, duration_ms: u64) -> Self {
        Self {
            job,
            outcome: JobOutcome::Failed,
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == JobOutcome::Succeeded
    }
}

/// Accumulated outcome of a batch run.
///
/// Every submitted input appears exactly once: its output path in
/// `succeeded`, or the input path itself in `failed`. Both sequences keep the
/// relative order of the input list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Output PDF paths of the jobs that succeeded.
    pub succeeded: Vec<PathBuf>,
    /// Input paths of the jobs that failed.
    pub failed: Vec<PathBuf>,
    /// One entry per submitted input, in input order.
    pub results: Vec<ConversionResult>,
    /// Wall-clock time of the whole batch.
    pub duration_ms: u64,
}

impl BatchReport {
    /// Record one finished job.
    pub fn record(&mut self, result: ConversionResult) {
        match result.outcome {
            JobOutcome::Succeeded => self.succeeded.push(result.job.output.clone()),
            JobOutcome::Failed => self.failed.push(result.job.input.clone()),
        }
        self.results.push(result);
    }

    /// Number of jobs submitted.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// `true` when every job succeeded (vacuously true for an empty batch).
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Results of failed jobs, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// A single-file conversion that succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedDocument {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Size of the written PDF.
    pub bytes: u64,
    pub duration_ms: u64,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub output: PathBuf,
    /// Inputs whose pages were appended, in order.
    pub merged: Vec<PathBuf>,
    /// Inputs that did not exist and were skipped.
    pub skipped: Vec<PathBuf>,
    /// Pages in the merged document.
    pub page_count: usize,
    /// Size of the merged file.
    pub bytes: u64,
}

/// Outcome of a successful split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    pub source: PathBuf,
    /// One file per page; `files[i]` holds page `i + 1`.
    pub files: Vec<PathBuf>,
    pub page_count: usize,
}

/// Structural facts about an existing PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfInfo {
    pub path: PathBuf,
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
    pub file_size_bytes: u64,
}

/// Size of `path` when it exists and is non-empty.
pub(crate) fn non_empty_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file() && m.len() > 0)
        .map(|m| m.len())
}
