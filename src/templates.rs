//! The template catalogue: DOCX files sitting in a conventional directory.

use crate::error::Docx2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// List the documents directly inside `dir` whose extension is one of
/// `extensions` (case-insensitive), sorted by file name.
///
/// Subdirectories are not searched. Hidden files and Office lock files
/// (`~$name.docx`) are skipped.
pub fn list_templates(
    dir: impl AsRef<Path>,
    extensions: &[String],
) -> Result<Vec<PathBuf>, Docx2PdfError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Docx2PdfError::TemplatesDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|_| Docx2PdfError::PermissionDenied {
        path: dir.to_path_buf(),
    })?;

    let mut templates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            !name.starts_with('.') && !name.starts_with("~$")
        })
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|a| a.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
        .collect();

    templates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} template(s) in {}", templates.len(), dir.display());
    Ok(templates)
}
