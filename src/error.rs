//! Error types for the docx2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Docx2PdfError`] - **Fatal**: the requested operation cannot complete
//!   (bad input file, engine missing, nothing to merge, split aborted).
//!   Returned as `Err(Docx2PdfError)` from the top-level functions.
//!
//! * [`JobError`] - **Non-fatal**: one document of a batch failed but the
//!   batch carries on. Stored inside [`crate::output::ConversionResult`] so
//!   callers can inspect partial success.
//!
//! Every fatal error belongs to one [`ErrorKind`]. Callers that want to retry
//! should look at [`Docx2PdfError::is_retryable`] rather than matching on
//! variants: engine hiccups are retryable, validation failures never are.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2pdf library.
#[derive(Debug, Error)]
pub enum Docx2PdfError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("Not a regular file: '{path}'")]
    NotAFile { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input does not carry one of the accepted document extensions.
    #[error("'{path}' is not a {expected} file")]
    UnsupportedExtension { path: PathBuf, expected: String },

    /// An argument is malformed (empty base name, path separator in a name, …).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The templates directory does not exist.
    #[error("Templates directory not found: '{path}'")]
    TemplatesDirNotFound { path: PathBuf },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The external engine binary could not be started.
    #[error(
        "Conversion engine '{engine}' is not available: {detail}\n\
Install LibreOffice or point --soffice / DOCX2PDF_SOFFICE at the soffice binary."
    )]
    EngineUnavailable { engine: String, detail: String },

    /// The engine ran but did not produce a PDF.
    #[error("Conversion of '{path}' failed: {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// The engine did not finish within the configured timeout.
    #[error("Conversion of '{path}' timed out after {secs}s")]
    EngineTimeout { path: PathBuf, secs: u64 },

    // ── Merge errors ──────────────────────────────────────────────────────
    /// None of the paths handed to the merger exists.
    #[error("No valid PDF files to merge ({requested} requested, none found)")]
    NoMergeInputs { requested: usize },

    // ── PDF errors (merge + split) ────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Writing one page of a split failed; the split was aborted.
    #[error("Failed to write page {page} to '{path}': {detail}")]
    PageWriteFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file or directory.
    #[error("Failed to write output '{path}': {source}")]
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

/// Coarse classification of a [`Docx2PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing file, wrong extension, bad argument or configuration.
    Validation,
    /// The external engine failed, timed out or is absent.
    Conversion,
    /// Nothing to merge.
    Merge,
    /// A PDF could not be parsed, or a split page could not be written.
    Pdf,
    /// An output file or directory could not be written.
    Io,
    /// Bug or runtime failure.
    Internal,
}

impl Docx2PdfError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Docx2PdfError::FileNotFound { .. }
            | Docx2PdfError::NotAFile { .. }
            | Docx2PdfError::PermissionDenied { .. }
            | Docx2PdfError::UnsupportedExtension { .. }
            | Docx2PdfError::InvalidInput(_)
            | Docx2PdfError::TemplatesDirNotFound { .. }
            | Docx2PdfError::InvalidConfig(_) => ErrorKind::Validation,
            Docx2PdfError::EngineUnavailable { .. }
            | Docx2PdfError::ConversionFailed { .. }
            | Docx2PdfError::EngineTimeout { .. } => ErrorKind::Conversion,
            Docx2PdfError::NoMergeInputs { .. } => ErrorKind::Merge,
            Docx2PdfError::CorruptPdf { .. } | Docx2PdfError::PageWriteFailed { .. } => {
                ErrorKind::Pdf
            }
            Docx2PdfError::OutputWriteFailed { .. } => ErrorKind::Io,
            Docx2PdfError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` when running the same operation again may succeed.
    ///
    /// A missing engine is not retryable: installing it is a human step.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Docx2PdfError::ConversionFailed { .. }
                | Docx2PdfError::EngineTimeout { .. }
                | Docx2PdfError::OutputWriteFailed { .. }
        )
    }
}

/// A non-fatal error for a single batch job.
///
/// Stored alongside [`crate::output::ConversionResult`] when a job fails.
/// The batch continues with the next job.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum JobError {
    /// The input was rejected before the engine was started.
    #[error("{input}: validation failed: {detail}")]
    Invalid { input: PathBuf, detail: String },

    /// The engine failed on this document.
    #[error("{input}: conversion failed: {detail}")]
    EngineFailed {
        input: PathBuf,
        detail: String,
        retryable: bool,
    },

    /// The engine reported success but left no usable PDF behind.
    #[error("{input}: engine produced no output at {output}")]
    MissingOutput { input: PathBuf, output: PathBuf },
}

impl JobError {
    /// Wrap a fatal error raised while processing `input` as a job error.
    pub fn from_fatal(input: impl Into<PathBuf>, err: &Docx2PdfError) -> Self {
        let input = input.into();
        match err.kind() {
            ErrorKind::Validation => JobError::Invalid {
                input,
                detail: err.to_string(),
            },
            _ => JobError::EngineFailed {
                input,
                detail: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}
