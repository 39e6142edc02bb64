//! Input validation and output-path derivation.
//!
//! Validation is cheap and runs before the engine is started, so a bad path
//! in a batch costs nothing but a log line.

use crate::error::Docx2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension written by every conversion.
pub const PDF_EXTENSION: &str = "pdf";

/// Check that `path` is a readable regular file whose extension is one of
/// `accepted` (case-insensitive).
pub fn validate_document(path: &Path, accepted: &[String]) -> Result<(), Docx2PdfError> {
    validate_readable_file(path)?;

    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| accepted.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false);

    if !matches {
        return Err(Docx2PdfError::UnsupportedExtension {
            path: path.to_path_buf(),
            expected: accepted
                .iter()
                .map(|e| e.to_uppercase())
                .collect::<Vec<_>>()
                .join("/"),
        });
    }

    debug!("Validated input document: {}", path.display());
    Ok(())
}

/// Check that `path` exists, is a regular file and can be opened for reading.
pub fn validate_readable_file(path: &Path) -> Result<(), Docx2PdfError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Docx2PdfError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Docx2PdfError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !meta.is_file() {
        return Err(Docx2PdfError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Docx2PdfError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(Docx2PdfError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// `output_dir / <input stem>.pdf`.
///
/// Inputs without a usable stem fall back to `document.pdf`; such inputs
/// never pass [`validate_document`] anyway.
pub fn derive_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "document".into());
    let mut file_name = stem;
    file_name.push(".");
    file_name.push(PDF_EXTENSION);
    output_dir.join(file_name)
}

/// The input path with its extension replaced by `.pdf`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(PDF_EXTENSION)
}

/// Reject split base names that are empty or would escape the output directory.
pub fn validate_base_name(base_name: &str) -> Result<(), Docx2PdfError> {
    if base_name.trim().is_empty() {
        return Err(Docx2PdfError::InvalidInput(
            "split base name must not be empty".into(),
        ));
    }
    if base_name.contains(['/', '\\']) || base_name == "." || base_name == ".." {
        return Err(Docx2PdfError::InvalidInput(format!(
            "split base name '{base_name}' must be a plain file name"
        )));
    }
    Ok(())
}

/// File name of page `page_num` (1-indexed) of a split.
pub fn split_page_file_name(base_name: &str, page_num: usize) -> String {
    format!("{base_name}_page_{page_num}.{PDF_EXTENSION}")
}
