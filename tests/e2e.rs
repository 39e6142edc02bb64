//! Integration tests for docx2pdf.
//!
//! Most tests drive the public API with a scripted in-process engine and PDFs
//! generated with `lopdf`, so they run anywhere. The LibreOffice round trip
//! at the bottom is gated behind the `E2E_ENABLED` environment variable and
//! needs `soffice` on the PATH (or `DOCX2PDF_SOFFICE`) plus DOCX files in
//! `./test_cases/`.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use docx2pdf::{
    convert_batch, convert_batch_stream, convert_sync, inspect, merge_pdfs, split_pdf,
    BatchProgressCallback, ConversionConfig, ConversionEngine, Docx2PdfError, ErrorKind, JobError,
    JobOutcome,
};
use futures::future::BoxFuture;
use futures::StreamExt;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Build a PDF with one page per label. Each page carries its label in a
/// `/Label` entry so page order can be checked after merge and split.
fn write_pdf(path: &Path, labels: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => content_id,
            "Label" => Object::string_literal(*label),
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_object(*id).unwrap().as_dict().unwrap();
            match page.get(b"Label").unwrap() {
                Object::String(bytes, _) => String::from_utf8_lossy(bytes).to_string(),
                other => panic!("unexpected label {other:?}"),
            }
        })
        .collect()
}

fn touch_docx(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"PK\x03\x04 fake docx").unwrap();
    path
}

/// In-process engine: renders a one-page PDF labelled with the input stem.
/// Inputs whose stem starts with `broken` fail like a crashing engine.
#[derive(Default)]
struct ScriptedEngine {
    calls: AtomicUsize,
}

impl ConversionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn convert<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
    ) -> BoxFuture<'a, Result<(), Docx2PdfError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stem = input.file_stem().unwrap().to_string_lossy().to_string();
            if stem.starts_with("broken") {
                return Err(Docx2PdfError::ConversionFailed {
                    path: input.to_path_buf(),
                    detail: "engine exited with exit status: 1".into(),
                });
            }
            write_pdf(output, &[stem.as_str()]);
            Ok(())
        })
    }
}

fn config_with(engine: Arc<ScriptedEngine>) -> ConversionConfig {
    ConversionConfig::builder()
        .engine(engine)
        .build()
        .expect("builder must succeed")
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_batch_partitions_every_input() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch_docx(dir.path(), "intro.docx"),
        dir.path().join("absent.docx"),
        touch_docx(dir.path(), "broken.docx"),
        touch_docx(dir.path(), "notes.txt"),
        touch_docx(dir.path(), "outro.DOCX"),
    ];
    let out = dir.path().join("pdf");
    let engine = Arc::new(ScriptedEngine::default());

    let report = convert_batch(&inputs, &out, &config_with(Arc::clone(&engine)))
        .await
        .unwrap();

    assert_eq!(report.total(), inputs.len());
    assert_eq!(report.succeeded.len() + report.failed.len(), inputs.len());
    assert_eq!(
        report.succeeded,
        vec![out.join("intro.pdf"), out.join("outro.pdf")]
    );
    assert_eq!(
        report.failed,
        vec![inputs[1].clone(), inputs[2].clone(), inputs[3].clone()]
    );
    for path in &report.succeeded {
        assert!(!report.failed.contains(path));
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
    // Validation failures never reach the engine.
    assert_eq!(engine.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_batch_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch_docx(dir.path(), "a.docx"),
        touch_docx(dir.path(), "broken.docx"),
        touch_docx(dir.path(), "b.docx"),
    ];
    let out = dir.path().join("pdf");
    let config = config_with(Arc::new(ScriptedEngine::default()));

    let first = convert_batch(&inputs, &out, &config).await.unwrap();
    let second = convert_batch(&inputs, &out, &config).await.unwrap();

    assert_eq!(first.succeeded, second.succeeded);
    assert_eq!(first.failed, second.failed);
    assert_eq!(labels(&out.join("a.pdf")), vec!["a"]);
    let mut names: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.pdf", "b.pdf"]);
}

#[tokio::test]
async fn test_batch_progress_events_arrive_in_order() {
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl BatchProgressCallback for Recorder {
        fn on_batch_start(&self, total_jobs: usize) {
            self.events.lock().unwrap().push(format!("start {total_jobs}"));
        }
        fn on_job_complete(&self, index: usize, _total: usize, _output: &Path) {
            self.events.lock().unwrap().push(format!("ok {index}"));
        }
        fn on_job_error(&self, index: usize, _total: usize, _input: &Path, _error: &str) {
            self.events.lock().unwrap().push(format!("err {index}"));
        }
        fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {success_count}/{total_jobs}"));
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch_docx(dir.path(), "a.docx"),
        touch_docx(dir.path(), "broken.docx"),
    ];
    let recorder = Arc::new(Recorder {
        events: Mutex::new(Vec::new()),
    });
    let config = ConversionConfig::builder()
        .engine(Arc::new(ScriptedEngine::default()))
        .progress_callback(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .build()
        .unwrap();

    convert_batch(&inputs, dir.path().join("out"), &config)
        .await
        .unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, vec!["start 2", "ok 1", "err 2", "done 1/2"]);
}

#[tokio::test]
async fn test_stream_matches_eager_batch() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch_docx(dir.path(), "x.docx"),
        touch_docx(dir.path(), "broken.docx"),
        touch_docx(dir.path(), "y.docx"),
    ];
    let config = config_with(Arc::new(ScriptedEngine::default()));

    let eager = convert_batch(&inputs, dir.path().join("eager"), &config)
        .await
        .unwrap();
    let streamed: Vec<_> = convert_batch_stream(&inputs, dir.path().join("streamed"), &config)
        .await
        .unwrap()
        .collect()
        .await;

    let eager_outcomes: Vec<JobOutcome> = eager.results.iter().map(|r| r.outcome).collect();
    let streamed_outcomes: Vec<JobOutcome> = streamed.iter().map(|r| r.outcome).collect();
    assert_eq!(eager_outcomes, streamed_outcomes);
    match streamed[1].error {
        Some(JobError::EngineFailed { retryable, .. }) => assert!(retryable),
        ref other => panic!("unexpected {other:?}"),
    }
}

// ── Merge ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_merge_concatenates_in_list_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    let c = dir.path().join("c.pdf");
    write_pdf(&a, &["a1", "a2"]);
    write_pdf(&b, &["b1", "b2", "b3"]);
    write_pdf(&c, &["c1"]);
    let out = dir.path().join("merged.pdf");

    let report = merge_pdfs(&[a, b, c], &out).await.unwrap();

    assert_eq!(report.page_count, 6);
    assert!(report.bytes > 0);
    assert_eq!(labels(&out), vec!["a1", "a2", "b1", "b2", "b3", "c1"]);
}

#[tokio::test]
async fn test_merge_skips_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    write_pdf(&a, &["a1"]);
    write_pdf(&b, &["b1", "b2"]);
    let missing = dir.path().join("missing.pdf");
    let out = dir.path().join("merged.pdf");

    let report = merge_pdfs(&[a, missing.clone(), b], &out).await.unwrap();

    assert_eq!(report.skipped, vec![missing]);
    assert_eq!(report.merged.len(), 2);
    assert_eq!(labels(&out), vec!["a1", "b1", "b2"]);
}

#[tokio::test]
async fn test_merge_with_no_valid_inputs_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.pdf");

    let err = merge_pdfs(
        &[dir.path().join("x.pdf"), dir.path().join("y.pdf")],
        &out,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Docx2PdfError::NoMergeInputs { requested: 2 }));
    assert_eq!(err.kind(), ErrorKind::Merge);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_batch_then_merge_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        touch_docx(dir.path(), "cover.docx"),
        touch_docx(dir.path(), "broken.docx"),
        touch_docx(dir.path(), "body.docx"),
    ];
    let out = dir.path().join("pdf");
    let config = config_with(Arc::new(ScriptedEngine::default()));

    let report = convert_batch(&inputs, &out, &config).await.unwrap();
    let bundle = dir.path().join("bundle.pdf");
    let merged = merge_pdfs(&report.succeeded, &bundle).await.unwrap();

    assert_eq!(merged.page_count, 2);
    assert_eq!(labels(&bundle), vec!["cover", "body"]);
}

// ── Split ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_split_five_pages() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("doc.pdf");
    write_pdf(&src, &["p1", "p2", "p3", "p4", "p5"]);
    let out_dir = dir.path().join("pages").join("nested");

    let report = split_pdf(&src, &out_dir, "doc").await.unwrap();

    assert_eq!(report.page_count, 5);
    for i in 1..=5 {
        let file = out_dir.join(format!("doc_page_{i}.pdf"));
        assert_eq!(report.files[i - 1], file);
        assert_eq!(labels(&file), vec![format!("p{i}")]);
    }
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 5);
}

#[tokio::test]
async fn test_split_then_merge_restores_order() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("doc.pdf");
    write_pdf(&src, &["one", "two", "three"]);

    let split = split_pdf(&src, dir.path().join("pages"), "doc").await.unwrap();
    let rejoined = dir.path().join("rejoined.pdf");
    merge_pdfs(&split.files, &rejoined).await.unwrap();

    assert_eq!(labels(&rejoined), vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_split_corrupt_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("bad.pdf");
    std::fs::write(&src, b"%PDF-1.4 garbage without xref").unwrap();

    let err = split_pdf(&src, dir.path().join("pages"), "bad")
        .await
        .unwrap_err();
    assert!(matches!(err, Docx2PdfError::CorruptPdf { .. }));
}

// ── Single conversion & inspection ───────────────────────────────────────────

#[test]
fn test_convert_sync_to_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch_docx(dir.path(), "memo.docx");
    let output = dir.path().join("renamed.pdf");
    let config = config_with(Arc::new(ScriptedEngine::default()));

    let doc = convert_sync(&input, Some(&output), &config).unwrap();

    assert_eq!(doc.output, output);
    assert_eq!(labels(&output), vec!["memo"]);
}

#[test]
fn test_inspect_generated_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("doc.pdf");
    write_pdf(&src, &["p1", "p2", "p3"]);

    let info = tokio_test::block_on(inspect(&src)).unwrap();

    assert_eq!(info.page_count, 3);
    assert_eq!(info.pdf_version, "1.5");
    assert!(!info.is_encrypted);
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["page_count"], 3);
}

#[test]
fn test_noop_callback_is_send_sync() {
    use docx2pdf::NoopProgressCallback;

    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoopProgressCallback>();
    assert_send_sync::<ConversionConfig>();
}

// ── LibreOffice round trip (E2E_ENABLED only) ────────────────────────────────

#[tokio::test]
async fn test_soffice_batch_round_trip() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let mut inputs: Vec<PathBuf> = match std::fs::read_dir(test_cases_dir()) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|e| e == "docx").unwrap_or(false))
            .collect(),
        Err(_) => Vec::new(),
    };
    if inputs.is_empty() {
        println!("SKIP: no .docx files in {}", test_cases_dir().display());
        return;
    }
    inputs.sort();

    let mut builder = ConversionConfig::builder().timeout_secs(180);
    if let Ok(soffice) = std::env::var("DOCX2PDF_SOFFICE") {
        builder = builder.soffice_binary(soffice);
    }
    let config = builder.build().unwrap();
    let out = tempfile::tempdir().unwrap();

    let report = convert_batch(&inputs, out.path(), &config).await.unwrap();
    println!(
        "converted {}/{} in {}ms",
        report.succeeded.len(),
        report.total(),
        report.duration_ms
    );
    assert!(report.all_succeeded(), "failures: {:?}", report.failed);

    let bundle = out.path().join("bundle.pdf");
    let merged = merge_pdfs(&report.succeeded, &bundle).await.unwrap();
    assert!(merged.page_count >= inputs.len());

    let info = inspect(&bundle).await.unwrap();
    assert_eq!(info.page_count, merged.page_count);
}
