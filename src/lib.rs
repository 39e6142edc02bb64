//! # docx2pdf
//!
//! Convert DOCX documents to PDF through LibreOffice, then merge or split the
//! resulting PDFs.
//!
//! ## What it does
//!
//! ```text
//! DOCX ──┬─ convert        one document, one PDF
//!        └─ convert_batch  many documents into a directory, failures isolated
//!
//! PDFs ──┬─ merge_pdfs     concatenate in list order
//!        ├─ split_pdf      one file per page: {base}_page_{i}.pdf
//!        └─ inspect        page count, version, encryption flag
//! ```
//!
//! Rendering is delegated to an external engine behind the
//! [`ConversionEngine`] trait. The default, [`SofficeEngine`], runs a fresh
//! headless `soffice` with a throw-away profile for every document. Merge and
//! split work on the PDF object graph directly with `lopdf` and need no
//! engine at all.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2pdf::{convert_batch, merge_pdfs, ConversionConfig};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let inputs = vec![PathBuf::from("cover.docx"), PathBuf::from("body.docx")];
//!
//!     let report = convert_batch(&inputs, "out", &config).await?;
//!     eprintln!("{}/{} converted", report.succeeded.len(), report.total());
//!
//!     let merged = merge_pdfs(&report.succeeded, "out/bundle.pdf").await?;
//!     eprintln!("{} pages", merged.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2pdf` binary (clap + anyhow + indicatif + dialoguer + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docx2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_batch, convert_sync, inspect, merge_pdfs, split_pdf};
pub use error::{Docx2PdfError, ErrorKind, JobError};
pub use output::{
    BatchReport, ConversionJob, ConversionResult, ConvertedDocument, JobOutcome, MergeReport,
    PdfInfo, SplitReport,
};
pub use pipeline::engine::{ConversionEngine, SofficeEngine};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_batch_stream, BatchStream};
pub use templates::list_templates;
