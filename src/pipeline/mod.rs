//! Building blocks behind the public entry points.
//!
//! ## Data Flow
//!
//! ```text
//! batch:  input ──▶ engine ──▶ (write)      DOCX → PDF, one job at a time
//! merge:  assemble ──▶ write                 N PDFs → 1 PDF
//! split:  assemble ──▶ write                 1 PDF → N PDFs
//! ```
//!
//! 1. [`input`]    - validate paths and derive output names
//! 2. [`engine`]   - the converter adapter; drives LibreOffice per document
//! 3. [`assemble`] - page-level PDF surgery with `lopdf`; blocking, so the
//!    async callers wrap it in `spawn_blocking`
//! 4. [`write`]    - temp-file-and-rename writes shared by every stage

pub mod assemble;
pub mod engine;
pub mod input;
pub mod write;
