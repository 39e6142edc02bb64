//! Atomic output writes: temp file in the destination directory, then rename.
//!
//! A reader polling the destination sees either nothing or the complete
//! file, never a truncated one. The destination directory must already
//! exist; callers decide whether to create it.

use crate::error::Docx2PdfError;
use std::fs::File;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `bytes` to `path` atomically. Returns the final file size.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<u64, Docx2PdfError> {
    use std::io::Write;
    persist_with(path, |file| file.write_all(bytes))
}

/// Copy `src` to `dst` atomically. Returns the final file size.
///
/// Works across file systems, unlike a bare rename.
pub fn copy_atomically(src: &Path, dst: &Path) -> Result<u64, Docx2PdfError> {
    persist_with(dst, |file| {
        let mut reader = File::open(src)?;
        io::copy(&mut reader, file).map(|_| ())
    })
}

fn persist_with<F>(path: &Path, fill: F) -> Result<u64, Docx2PdfError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let write_err = |source: io::Error| Docx2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".docx2pdf-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(write_err)?;

    fill(tmp.as_file_mut()).map_err(write_err)?;
    tmp.as_file_mut().sync_all().map_err(write_err)?;

    persist(tmp, path).map_err(write_err)?;

    std::fs::metadata(path).map(|m| m.len()).map_err(write_err)
}

fn persist(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    // The temp file is removed by its destructor when persist fails.
    tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}
