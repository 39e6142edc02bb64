//! The converter adapter: one DOCX in, one PDF out, through an external engine.
//!
//! ## Engine lifetime
//!
//! Each call to [`ConversionEngine::convert`] owns its engine instance from
//! start to finish. [`SofficeEngine`] launches a fresh headless LibreOffice
//! process with a throw-away user profile for every document:
//!
//! * the child is spawned with `kill_on_drop`, so a timeout or a dropped
//!   future terminates it;
//! * the profile and staging directories are `TempDir`s, removed when the
//!   call returns on every path.
//!
//! A crashing engine therefore only fails the current job. The cost is one
//! engine start-up per document.

use crate::error::Docx2PdfError;
use crate::output::non_empty_size;
use crate::pipeline::input::derive_output_path;
use crate::pipeline::write::copy_atomically;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Renders one document into one PDF.
///
/// Implementations must write the PDF at `output` only when the whole
/// conversion succeeded and must release every external resource before the
/// returned future completes. Callers validate `input` beforehand.
pub trait ConversionEngine: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Convert `input` into a PDF at `output`, creating `output`'s parent
    /// directory if needed.
    fn convert<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
    ) -> BoxFuture<'a, Result<(), Docx2PdfError>>;
}

/// LibreOffice in headless mode.
#[derive(Debug, Clone)]
pub struct SofficeEngine {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for SofficeEngine {
    fn default() -> Self {
        Self::new(default_soffice_binary())
    }
}

impl SofficeEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, input: &Path, staging: &Path, profile: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--norestore")
            .arg("--nolockcheck")
            .arg(format!("-env:UserInstallation={}", file_url(profile)))
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(staging)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), Docx2PdfError> {
        let internal = |what: &str, e: std::io::Error| {
            Docx2PdfError::Internal(format!("{what}: {e}"))
        };

        let input_abs = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| internal("current directory", e))?
                .join(input)
        };

        let profile = tempfile::Builder::new()
            .prefix("docx2pdf-profile-")
            .tempdir()
            .map_err(|e| internal("engine profile directory", e))?;
        let staging = tempfile::Builder::new()
            .prefix("docx2pdf-staging-")
            .tempdir()
            .map_err(|e| internal("engine staging directory", e))?;

        let mut cmd = self.command(&input_abs, staging.path(), profile.path());
        debug!("Launching engine: {:?}", cmd);

        let child = cmd.spawn().map_err(|e| Docx2PdfError::EngineUnavailable {
            engine: self.binary.display().to_string(),
            detail: e.to_string(),
        })?;

        let output_res = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(res) => res,
            Err(_) => {
                warn!(
                    "Engine timed out after {}s on {}",
                    self.timeout.as_secs(),
                    input.display()
                );
                return Err(Docx2PdfError::EngineTimeout {
                    path: input.to_path_buf(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let proc_out = output_res.map_err(|e| Docx2PdfError::ConversionFailed {
            path: input.to_path_buf(),
            detail: format!("waiting for engine: {e}"),
        })?;
        let stderr = String::from_utf8_lossy(&proc_out.stderr).trim().to_string();

        if !proc_out.status.success() {
            return Err(Docx2PdfError::ConversionFailed {
                path: input.to_path_buf(),
                detail: format!("engine exited with {}: {}", proc_out.status, stderr),
            });
        }

        let produced = derive_output_path(&input_abs, staging.path());
        if non_empty_size(&produced).is_none() {
            return Err(Docx2PdfError::ConversionFailed {
                path: input.to_path_buf(),
                detail: if stderr.is_empty() {
                    "engine exited cleanly but wrote no PDF".to_string()
                } else {
                    format!("engine exited cleanly but wrote no PDF: {stderr}")
                },
            });
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Docx2PdfError::OutputWriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let target = output.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || copy_atomically(&produced, &target))
            .await
            .map_err(|e| Docx2PdfError::Internal(format!("copy task panicked: {e}")))??;
        info!(
            "Converted {} → {} ({} bytes)",
            input.display(),
            output.display(),
            bytes
        );
        Ok(())
    }
}

impl ConversionEngine for SofficeEngine {
    fn name(&self) -> &str {
        "soffice"
    }

    fn convert<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
    ) -> BoxFuture<'a, Result<(), Docx2PdfError>> {
        Box::pin(self.run(input, output))
    }
}

/// Platform default for the LibreOffice executable.
pub fn default_soffice_binary() -> PathBuf {
    if cfg!(target_os = "windows") {
        let program_files = PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe");
        if program_files.exists() {
            return program_files;
        }
        return PathBuf::from("soffice.exe");
    }
    if cfg!(target_os = "macos") {
        let bundle = PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice");
        if bundle.exists() {
            return bundle;
        }
    }
    PathBuf::from("soffice")
}

/// `file://` URL for a local directory, as LibreOffice expects for `-env:` options.
fn file_url(path: &Path) -> String {
    let s = path
        .to_string_lossy()
        .replace('\\', "/")
        .replace(' ', "%20");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}
