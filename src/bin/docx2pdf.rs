//! CLI binary for docx2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to one operation,
//! runs it and prints a status line per outcome.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dialoguer::Select;
use docx2pdf::config::{DEFAULT_TEMPLATES_DIR, DEFAULT_TIMEOUT_SECS};
use docx2pdf::{
    convert, convert_batch, inspect, list_templates, merge_pdfs, split_pdf,
    BatchProgressCallback, ConversionConfig, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Console: markers and colour, decided once in main ────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Warning,
    Failure,
}

/// Where status lines go and how they look.
///
/// Status lines always go to stderr; reports, listings and JSON go to stdout.
#[derive(Debug, Clone, Copy)]
struct Console {
    color: bool,
    ascii: bool,
    quiet: bool,
}

impl Console {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            color: !cli.no_color && std::env::var_os("NO_COLOR").is_none(),
            ascii: cli.ascii,
            quiet: cli.quiet,
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }
    fn yellow(&self, s: &str) -> String {
        self.paint("33", s)
    }
    fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }
    fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
    fn dim(&self, s: &str) -> String {
        self.paint("2", s)
    }

    fn arrow(&self) -> &'static str {
        if self.ascii {
            "->"
        } else {
            "→"
        }
    }

    fn marker(&self, status: Status) -> String {
        match (status, self.ascii) {
            (Status::Success, false) => self.green("✔"),
            (Status::Warning, false) => self.yellow("⚠"),
            (Status::Failure, false) => self.red("✘"),
            (Status::Success, true) => self.green("[SUCCESS]"),
            (Status::Warning, true) => self.yellow("[WARNING]"),
            (Status::Failure, true) => self.red("[ERROR]"),
        }
    }

    fn line(&self, status: Status, msg: &str) -> String {
        format!("{} {}", self.marker(status), msg)
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", self.line(Status::Success, msg));
        }
    }

    fn warning(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", self.line(Status::Warning, msg));
        }
    }

    /// Failures are printed even in quiet mode.
    fn failure(&self, msg: &str) {
        eprintln!("{}", self.line(Status::Failure, msg));
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{msg}");
        }
    }
}

// ── Batch progress using indicatif ───────────────────────────────────────────

/// Prints one status line per job, above a progress bar when one is shown.
struct CliBatchProgress {
    bar: Option<ProgressBar>,
    console: Console,
}

impl CliBatchProgress {
    fn new(console: Console, with_bar: bool) -> Arc<Self> {
        let bar = with_bar.then(|| {
            let template = if console.ascii {
                "{prefix}  [{bar:40}] {pos:>3}/{len} documents  {elapsed_precise}  {msg}"
            } else {
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} documents  \
                 ⏱ {elapsed_precise}  {msg}"
            };
            let chars = if console.ascii { "#>-" } else { "█▉▊▋▌▍▎▏  " };
            let style = ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(chars);
            let bar = ProgressBar::new(0);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Arc::new(Self { bar, console })
    }

    fn print(&self, line: String) {
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl BatchProgressCallback for CliBatchProgress {
    fn on_batch_start(&self, total_jobs: usize) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total_jobs as u64);
        }
        self.print(format!(
            "Batch converting {} DOCX file(s) to PDF...",
            self.console.bold(&total_jobs.to_string())
        ));
    }

    fn on_job_start(&self, _index: usize, _total: usize, input: &Path) {
        if let Some(ref bar) = self.bar {
            bar.set_message(file_name(input));
        }
    }

    fn on_job_complete(&self, index: usize, total: usize, output: &Path) {
        self.print(format!(
            "  {} {:>3}/{:<3} {} {}",
            self.console.marker(Status::Success),
            index,
            total,
            self.console.arrow(),
            output.display()
        ));
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_job_error(&self, index: usize, total: usize, _input: &Path, error: &str) {
        let msg = if error.chars().count() > 100 {
            format!("{}...", error.chars().take(99).collect::<String>())
        } else {
            error.to_string()
        };
        self.print(format!(
            "  {} {:>3}/{:<3} {}",
            self.console.marker(Status::Failure),
            index,
            total,
            self.console.red(&msg)
        ));
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&self, _total_jobs: usize, _success_count: usize) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one document (writes report.pdf next to it)
  docx2pdf report.docx

  # Pick a template from ./templates interactively
  docx2pdf

  # List templates
  docx2pdf --list --templates-dir ./templates

  # Batch convert into a directory
  docx2pdf -b cover.docx body.docx annex.docx --batch-output-dir out/

  # Merge PDFs in the given order
  docx2pdf -m out/cover.pdf out/body.pdf --merge-output bundle.pdf

  # Split a PDF into bundle_page_1.pdf, bundle_page_2.pdf, …
  docx2pdf --split-pdf bundle.pdf --split-output-dir pages/ --split-base-name bundle

  # Inspect a PDF as JSON
  docx2pdf --inspect-only bundle.pdf --json

EXIT CODES:
  0  success (a batch counts as success when at least one file converted)
  1  invalid arguments, missing flag combination, or failed operation

ENVIRONMENT VARIABLES:
  DOCX2PDF_SOFFICE        Path to the LibreOffice soffice binary
  DOCX2PDF_TIMEOUT        Per-document engine timeout in seconds
  DOCX2PDF_TEMPLATES_DIR  Directory scanned by --list
  NO_COLOR                Disable coloured output
  RUST_LOG                Override log filtering (e.g. docx2pdf=debug)
"#;

/// Convert DOCX files to PDF, merge PDFs, and split PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "docx2pdf",
    version,
    about = "Convert DOCX files to PDF, merge PDFs, and split PDFs",
    long_about = "Convert DOCX documents to PDF through a headless LibreOffice, one document \
at a time, then optionally merge PDFs into one or split a PDF into single-page files.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// DOCX file to convert. Omit to choose from the templates directory.
    input: Option<PathBuf>,

    /// Output PDF path (default: the input path with a .pdf extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List available DOCX templates and exit.
    #[arg(short, long)]
    list: bool,

    /// Directory holding DOCX templates.
    #[arg(long, env = "DOCX2PDF_TEMPLATES_DIR", default_value = DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,

    /// Merge these PDF files into one, in order.
    #[arg(short, long, num_args = 1.., value_name = "PDF")]
    merge: Option<Vec<PathBuf>>,

    /// Output file for the merged PDF (required with --merge).
    #[arg(long, value_name = "PDF")]
    merge_output: Option<PathBuf>,

    /// Convert these DOCX files to PDF in batch.
    #[arg(short, long, num_args = 1.., value_name = "DOCX")]
    batch: Option<Vec<PathBuf>>,

    /// Output directory for batch conversion (required with --batch).
    #[arg(long, value_name = "DIR")]
    batch_output_dir: Option<PathBuf>,

    /// Split this PDF into one file per page.
    #[arg(long, value_name = "PDF")]
    split_pdf: Option<PathBuf>,

    /// Output directory for split pages (required with --split-pdf).
    #[arg(long, value_name = "DIR")]
    split_output_dir: Option<PathBuf>,

    /// Base name for split page files (required with --split-pdf).
    #[arg(long, value_name = "NAME")]
    split_base_name: Option<String>,

    /// Print page count, version and encryption flag of a PDF; no conversion.
    #[arg(long, value_name = "PDF")]
    inspect_only: Option<PathBuf>,

    /// Print the operation's report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Path to the LibreOffice soffice binary.
    #[arg(long, env = "DOCX2PDF_SOFFICE", value_name = "PATH")]
    soffice: Option<PathBuf>,

    /// Per-document engine timeout in seconds (1–3600).
    #[arg(long, env = "DOCX2PDF_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..=3600))]
    timeout: u64,

    /// Disable the batch progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,

    /// Use plain [SUCCESS]/[WARNING]/[ERROR] markers instead of symbols.
    #[arg(long)]
    ascii: bool,

    /// Disable coloured output.
    #[arg(long)]
    no_color: bool,
}

/// The one operation a command line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    List,
    Batch {
        inputs: Vec<PathBuf>,
        output_dir: PathBuf,
    },
    Merge {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    Split {
        input: PathBuf,
        output_dir: PathBuf,
        base_name: String,
    },
    Inspect {
        pdf: PathBuf,
    },
    Single {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
}

/// Pick the operation by precedence and check its required flags.
fn select_mode(cli: &Cli) -> Result<Mode> {
    if cli.list {
        return Ok(Mode::List);
    }
    if let Some(ref inputs) = cli.batch {
        let output_dir = cli
            .batch_output_dir
            .clone()
            .ok_or_else(|| anyhow!("--batch-output-dir is required when using --batch"))?;
        return Ok(Mode::Batch {
            inputs: inputs.clone(),
            output_dir,
        });
    }
    if let Some(ref inputs) = cli.merge {
        let output = cli
            .merge_output
            .clone()
            .ok_or_else(|| anyhow!("--merge-output is required when using --merge"))?;
        return Ok(Mode::Merge {
            inputs: inputs.clone(),
            output,
        });
    }
    if let Some(ref input) = cli.split_pdf {
        let (Some(output_dir), Some(base_name)) =
            (cli.split_output_dir.clone(), cli.split_base_name.clone())
        else {
            bail!("--split-output-dir and --split-base-name are required when using --split-pdf");
        };
        return Ok(Mode::Split {
            input: input.clone(),
            output_dir,
            base_name,
        });
    }
    if let Some(ref pdf) = cli.inspect_only {
        return Ok(Mode::Inspect { pdf: pdf.clone() });
    }
    Ok(Mode::Single {
        input: cli.input.clone(),
        output: cli.output.clone(),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are not errors.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let console = Console::from_cli(&cli);

    // ── Logging setup ────────────────────────────────────────────────────
    // The console prints every outcome, so library logs stay at WARN unless
    // asked for; the progress bar silences them further.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || (show_progress && cli.batch.is_some()) {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(console.color)
        .init();

    match run(&cli, console, show_progress).await {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            }
            console.failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, console: Console, show_progress: bool) -> Result<ExitCode> {
    // Flag combinations are checked before anything touches the disk.
    let mode = select_mode(cli)?;

    let progress = batch_progress(&mode, cli, console, show_progress);
    let config = build_config(cli, progress)?;

    match mode {
        Mode::List => run_list(&config, console),
        Mode::Batch { inputs, output_dir } => {
            run_batch(&inputs, &output_dir, &config, console, cli.json).await
        }
        Mode::Merge { inputs, output } => run_merge(&inputs, &output, console, cli.json).await,
        Mode::Split {
            input,
            output_dir,
            base_name,
        } => run_split(&input, &output_dir, &base_name, console, cli.json).await,
        Mode::Inspect { pdf } => run_inspect(&pdf, cli.json).await,
        Mode::Single { input, output } => {
            run_single(input, output.as_deref(), &config, console, cli.json).await
        }
    }
}

/// Progress reporting exists only for batches; other modes print their own
/// status lines and must not leave a bar behind.
fn batch_progress(
    mode: &Mode,
    cli: &Cli,
    console: Console,
    show_progress: bool,
) -> Option<ProgressCallback> {
    if !matches!(mode, Mode::Batch { .. }) || cli.quiet || cli.json {
        return None;
    }
    Some(CliBatchProgress::new(console, show_progress) as Arc<dyn BatchProgressCallback>)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .timeout_secs(cli.timeout)
        .templates_dir(&cli.templates_dir);
    if let Some(ref soffice) = cli.soffice {
        builder = builder.soffice_binary(soffice);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn run_list(config: &ConversionConfig, console: Console) -> Result<ExitCode> {
    match list_templates(&config.templates_dir, &config.accepted_extensions) {
        Ok(templates) => {
            print_templates(&templates);
            if templates.is_empty() {
                console.warning(&format!(
                    "No {} templates found in {}",
                    config.extension_label(),
                    config.templates_dir.display()
                ));
            }
        }
        Err(e) => console.warning(&e.to_string()),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_templates(templates: &[PathBuf]) {
    println!("Available DOCX templates:");
    for (i, path) in templates.iter().enumerate() {
        println!("  {}. {}", i + 1, file_name(path));
    }
}

async fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &ConversionConfig,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    let report = convert_batch(inputs, output_dir, config)
        .await
        .context("Batch conversion failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }

    let total = report.total();
    let converted = report.succeeded.len();
    if converted == 0 {
        console.failure(&format!(
            "Batch conversion failed: none of {total} file(s) converted"
        ));
        return Ok(ExitCode::FAILURE);
    }

    if report.all_succeeded() {
        console.success(&format!(
            "Batch conversion completed: {converted}/{total} files converted in {}ms",
            report.duration_ms
        ));
    } else {
        console.warning(&format!(
            "Batch conversion completed: {converted}/{total} files converted, {} failed",
            report.failed.len()
        ));
        for failure in report.failures() {
            if let Some(ref e) = failure.error {
                console.warning(&format!("  {e}"));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_merge(
    inputs: &[PathBuf],
    output: &Path,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    console.info(&format!(
        "Merging {} PDF file(s) into '{}'...",
        inputs.len(),
        output.display()
    ));
    let report = merge_pdfs(inputs, output)
        .await
        .context("PDF merge failed")?;

    if !console.quiet {
        for path in &report.merged {
            eprintln!("  {} {}", console.dim("Added:"), file_name(path));
        }
    }
    for path in &report.skipped {
        console.warning(&format!("File not found, skipped: {}", path.display()));
    }
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }
    console.success(&format!(
        "Merged {} PDF(s) into '{}' ({} pages, {} bytes)",
        report.merged.len(),
        report.output.display(),
        report.page_count,
        report.bytes
    ));
    Ok(ExitCode::SUCCESS)
}

async fn run_split(
    input: &Path,
    output_dir: &Path,
    base_name: &str,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    console.info(&format!(
        "Splitting PDF '{}' into individual pages...",
        input.display()
    ));
    let report = split_pdf(input, output_dir, base_name)
        .await
        .context("PDF split failed")?;

    if !console.quiet {
        for (i, path) in report.files.iter().enumerate() {
            eprintln!("  {} {}", console.dim(&format!("page {}:", i + 1)), file_name(path));
        }
    }
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }
    console.success(&format!(
        "Split '{}' into {} page(s) in '{}'",
        input.display(),
        report.page_count,
        output_dir.display()
    ));
    Ok(ExitCode::SUCCESS)
}

async fn run_inspect(pdf: &Path, json: bool) -> Result<ExitCode> {
    let info = inspect(pdf).await.context("Failed to inspect PDF")?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
        );
    } else {
        println!("File:         {}", info.path.display());
        println!("Pages:        {}", info.page_count);
        println!("PDF Version:  {}", info.pdf_version);
        println!("Encrypted:    {}", info.is_encrypted);
        println!("Size:         {} bytes", info.file_size_bytes);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_single(
    input: Option<PathBuf>,
    output: Option<&Path>,
    config: &ConversionConfig,
    console: Console,
    json: bool,
) -> Result<ExitCode> {
    let input = match input {
        Some(input) => input,
        None => match choose_template(config, console)? {
            Some(choice) => choice,
            None => return Ok(ExitCode::SUCCESS),
        },
    };

    console.info(&format!("Converting '{}'...", input.display()));
    let doc = convert(&input, output, config)
        .await
        .context("Conversion failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("Failed to serialise result")?
        );
    }
    console.success(&format!(
        "Converted '{}' {} '{}' ({} bytes, {}ms)",
        input.display(),
        console.arrow(),
        doc.output.display(),
        doc.bytes,
        doc.duration_ms
    ));
    Ok(ExitCode::SUCCESS)
}

/// List templates and let the user pick one. `None` means nothing to do.
fn choose_template(config: &ConversionConfig, console: Console) -> Result<Option<PathBuf>> {
    let templates = match list_templates(&config.templates_dir, &config.accepted_extensions) {
        Ok(t) => t,
        Err(e) => {
            console.warning(&e.to_string());
            return Ok(None);
        }
    };
    if templates.is_empty() {
        console.warning(&format!(
            "No {} templates found in {}",
            config.extension_label(),
            config.templates_dir.display()
        ));
        return Ok(None);
    }

    let items: Vec<String> = templates.iter().map(|p| file_name(p)).collect();
    let choice = Select::new()
        .with_prompt("Select the template to convert")
        .items(&items)
        .default(0)
        .interact_opt();

    match choice {
        Ok(Some(idx)) => {
            console.info(&format!("Selected: {}", items[idx]));
            Ok(Some(templates[idx].clone()))
        }
        Ok(None) => {
            console.warning("Operation cancelled");
            Ok(None)
        }
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
            console.warning("Operation cancelled");
            Ok(None)
        }
        Err(e) => Err(e).context("Template selection failed"),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
