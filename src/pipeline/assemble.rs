//! Page-level PDF assembly with `lopdf`: merge, split and inspect.
//!
//! Merge and split are the same operation seen from two sides. Both pick an
//! ordered list of pages out of one or more source documents and build a
//! fresh document around them: a new page tree whose `Kids` are exactly those
//! pages, and a new catalog. Everything else reachable from the chosen pages
//! (content streams, fonts, images) is carried over; unreachable objects are
//! pruned before saving. Links that jump to a page outside the selection are
//! dropped.
//!
//! All functions here are blocking. The async entry points in
//! [`crate::convert`] run them on `spawn_blocking`.

use crate::error::Docx2PdfError;
use crate::output::{MergeReport, PdfInfo, SplitReport};
use crate::pipeline::input::{split_page_file_name, validate_base_name, validate_readable_file};
use crate::pipeline::write::write_atomically;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used only when neither a page nor its ancestors declare a box.
const FALLBACK_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// One source document and the 1-indexed pages to take from it, in order.
struct Part {
    doc: Document,
    pages: Vec<u32>,
}

/// Open and parse a PDF.
pub fn load_pdf(path: &Path) -> Result<Document, Docx2PdfError> {
    validate_readable_file(path)?;
    let doc = Document::load(path).map_err(|e| Docx2PdfError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(Docx2PdfError::CorruptPdf {
            path: path.to_path_buf(),
            detail: "encrypted PDFs are not supported".into(),
        });
    }
    Ok(doc)
}

/// Concatenate `inputs` into `output`.
///
/// Missing inputs are skipped with a warning. An input that exists but does
/// not parse aborts the merge before anything is written.
pub fn merge_blocking(inputs: &[PathBuf], output: &Path) -> Result<MergeReport, Docx2PdfError> {
    let mut parts = Vec::with_capacity(inputs.len());
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for input in inputs {
        if !input.is_file() {
            warn!("Skipping missing PDF: {}", input.display());
            skipped.push(input.clone());
            continue;
        }
        let doc = load_pdf(input)?;
        let page_count = doc.get_pages().len() as u32;
        debug!("Appending {} ({} pages)", input.display(), page_count);
        parts.push(Part {
            doc,
            pages: (1..=page_count).collect(),
        });
        merged.push(input.clone());
    }

    if parts.is_empty() {
        return Err(Docx2PdfError::NoMergeInputs {
            requested: inputs.len(),
        });
    }

    let mut doc = assemble(parts).map_err(Docx2PdfError::Internal)?;
    let page_count = doc.get_pages().len();
    let bytes = save_to_file(&mut doc, output)?;
    if bytes == 0 {
        return Err(Docx2PdfError::Internal(format!(
            "merged output '{}' is empty",
            output.display()
        )));
    }

    info!(
        "Merged {} PDF(s) into {} ({} pages, {} bytes)",
        merged.len(),
        output.display(),
        page_count,
        bytes
    );
    Ok(MergeReport {
        output: output.to_path_buf(),
        merged,
        skipped,
        page_count,
        bytes,
    })
}

/// Write every page of `input` to its own file in `output_dir`.
///
/// Page `i` goes to `{base_name}_page_{i}.pdf`. The first page that cannot
/// be written aborts the split; pages already written are left in place.
pub fn split_blocking(
    input: &Path,
    output_dir: &Path,
    base_name: &str,
) -> Result<SplitReport, Docx2PdfError> {
    validate_base_name(base_name)?;
    let source = load_pdf(input)?;
    let page_count = source.get_pages().len();
    if page_count == 0 {
        return Err(Docx2PdfError::CorruptPdf {
            path: input.to_path_buf(),
            detail: "no pages".into(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(|e| Docx2PdfError::OutputWriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::with_capacity(page_count);
    for page in 1..=page_count {
        let path = output_dir.join(split_page_file_name(base_name, page));
        let page_failed = |detail: String| Docx2PdfError::PageWriteFailed {
            page,
            path: path.clone(),
            detail,
        };

        let mut single = assemble(vec![Part {
            doc: source.clone(),
            pages: vec![page as u32],
        }])
        .map_err(page_failed)?;
        save_to_file(&mut single, &path).map_err(|e| page_failed(e.to_string()))?;

        debug!("Wrote page {}/{} to {}", page, page_count, path.display());
        files.push(path);
    }

    info!(
        "Split {} into {} file(s) in {}",
        input.display(),
        files.len(),
        output_dir.display()
    );
    Ok(SplitReport {
        source: input.to_path_buf(),
        files,
        page_count,
    })
}

/// Read structural facts about a PDF without modifying it.
pub fn inspect_blocking(path: &Path) -> Result<PdfInfo, Docx2PdfError> {
    validate_readable_file(path)?;
    let file_size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let doc = Document::load(path).map_err(|e| Docx2PdfError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(PdfInfo {
        path: path.to_path_buf(),
        page_count: doc.get_pages().len(),
        pdf_version: doc.version.clone(),
        is_encrypted: doc.trailer.get(b"Encrypt").is_ok(),
        file_size_bytes,
    })
}

fn save_to_file(doc: &mut Document, path: &Path) -> Result<u64, Docx2PdfError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| Docx2PdfError::Internal(format!("serialising PDF: {e}")))?;
    write_atomically(path, &buf)
}

/// Build a new document from the selected pages of each part.
fn assemble(parts: Vec<Part>) -> Result<Document, String> {
    let version = parts
        .iter()
        .map(|p| p.doc.version.clone())
        .max()
        .unwrap_or_else(|| "1.5".to_string());
    let mut out = Document::with_version(version);
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut next_id = 1;

    for Part { mut doc, pages: wanted } in parts {
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let page_ids = doc.get_pages();
        let selected = wanted
            .iter()
            .map(|number| {
                page_ids
                    .get(number)
                    .map(|id| (*number, *id))
                    .ok_or_else(|| format!("page {number} not found"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let kept: HashSet<ObjectId> = selected.iter().map(|(_, id)| *id).collect();

        for (number, id) in selected {
            let mut dict = doc
                .get_object(id)
                .and_then(Object::as_dict)
                .map_err(|e| format!("page {number}: {e}"))?
                .clone();
            inherit_attributes(&doc, &mut dict);
            drop_dangling_links(&doc, &mut dict, &kept);
            pages.push((id, dict));
        }

        for (id, object) in doc.objects {
            if !is_tree_root(&object) {
                out.objects.insert(id, object);
            }
        }
    }

    out.max_id = out.objects.keys().map(|(n, _)| *n).max().unwrap_or(0);
    let pages_id = out.new_object_id();

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = kids.len() as i64;
    for (id, mut dict) in pages {
        dict.set("Parent", Object::Reference(pages_id));
        out.objects.insert(id, Object::Dictionary(dict));
    }

    out.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = out.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    out.trailer.set("Root", Object::Reference(catalog_id));

    out.prune_objects();
    Ok(out)
}

/// Catalog and page-tree nodes are rebuilt, never copied.
fn is_tree_root(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| name == b"Catalog" || name == b"Pages")
        .unwrap_or(false)
}

/// Copy inheritable attributes from the page's ancestors onto the page.
fn inherit_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth == MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_object(parent_id).and_then(Object::as_dict) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    if !page.has(b"MediaBox") {
        let media_box: Vec<Object> = FALLBACK_MEDIA_BOX.iter().map(|v| Object::Integer(*v)).collect();
        page.set("MediaBox", media_box);
    }
}

/// Remove link annotations whose explicit destination is a page outside
/// `kept`, so the target page is not carried along as an orphan.
fn drop_dangling_links(doc: &Document, page: &mut Dictionary, kept: &HashSet<ObjectId>) {
    let annots = match page.get(b"Annots") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id).and_then(Object::as_array) {
            Ok(items) => items.clone(),
            Err(_) => return,
        },
        _ => return,
    };

    let before = annots.len();
    let retained: Vec<Object> = annots
        .into_iter()
        .filter(|annot| link_target(doc, annot).map_or(true, |target| kept.contains(&target)))
        .collect();
    if retained.len() == before {
        return;
    }

    debug!("Dropped {} link(s) to pages outside the selection", before - retained.len());
    if retained.is_empty() {
        page.remove(b"Annots");
    } else {
        page.set("Annots", retained);
    }
}

/// The page an annotation jumps to through `/Dest` or a `/GoTo` action.
/// Named destinations and external links yield `None`.
fn link_target(doc: &Document, annot: &Object) -> Option<ObjectId> {
    let annot = resolve_dict(doc, annot)?;
    let dest = match annot.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = resolve_dict(doc, annot.get(b"A").ok()?)?;
            if action.get(b"S").and_then(Object::as_name).ok()? != b"GoTo" {
                return None;
            }
            action.get(b"D").ok()?
        }
    };
    let dest = match dest {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    dest.as_array().ok()?.first()?.as_reference().ok()
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_dict).ok(),
        other => other.as_dict().ok(),
    }
}
