//! Configuration types for DOCX-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Merge and split need no engine and
//! take their arguments directly.

use crate::error::Docx2PdfError;
use crate::pipeline::engine::{ConversionEngine, SofficeEngine};
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default engine timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default directory scanned by [`crate::list_templates`].
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Configuration for DOCX-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .timeout_secs(60)
///     .soffice_binary("/usr/bin/soffice")
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 60);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Pre-constructed engine. Takes precedence over `soffice_binary`.
    pub engine: Option<Arc<dyn ConversionEngine>>,

    /// Path or name of the LibreOffice `soffice` executable.
    /// If None, the platform default is used.
    pub soffice_binary: Option<PathBuf>,

    /// Maximum time a single document may spend in the engine. Default: 120.
    ///
    /// The engine process is killed when the limit is hit and the job is
    /// reported as failed.
    pub timeout_secs: u64,

    /// Accepted input extensions, lower-case, without the dot. Default: `["docx"]`.
    pub accepted_extensions: Vec<String>,

    /// Directory scanned for DOCX templates. Default: `templates`.
    pub templates_dir: PathBuf,

    /// Receives per-job events during a batch.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            engine: None,
            soffice_binary: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accepted_extensions: vec!["docx".to_string()],
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .field("soffice_binary", &self.soffice_binary)
            .field("timeout_secs", &self.timeout_secs)
            .field("accepted_extensions", &self.accepted_extensions)
            .field("templates_dir", &self.templates_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The engine this configuration converts with.
    ///
    /// A configured engine wins; otherwise a [`SofficeEngine`] is created from
    /// `soffice_binary` and `timeout_secs`.
    pub fn resolve_engine(&self) -> Arc<dyn ConversionEngine> {
        if let Some(ref engine) = self.engine {
            return Arc::clone(engine);
        }
        let engine = match self.soffice_binary {
            Some(ref binary) => SofficeEngine::new(binary.clone()),
            None => SofficeEngine::default(),
        };
        Arc::new(engine.with_timeout_secs(self.timeout_secs))
    }

    /// Human-readable list of accepted extensions, e.g. `DOCX` or `DOCX/DOC`.
    pub fn extension_label(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|e| e.to_uppercase())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn engine(mut self, engine: Arc<dyn ConversionEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn soffice_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_binary = Some(path.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.clamp(1, 3600);
        self
    }

    /// Replace the accepted extensions. A leading dot is stripped and case is folded.
    pub fn accepted_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.accepted_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.templates_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docx2PdfError> {
        let c = &self.config;
        if c.accepted_extensions.is_empty() {
            return Err(Docx2PdfError::InvalidConfig(
                "At least one accepted input extension is required".into(),
            ));
        }
        if c.accepted_extensions.iter().any(|e| e == "pdf") {
            return Err(Docx2PdfError::InvalidConfig(
                "PDF cannot be an input extension: outputs would overwrite inputs".into(),
            ));
        }
        if c.timeout_secs == 0 {
            return Err(Docx2PdfError::InvalidConfig("Timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}
