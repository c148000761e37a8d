//! Shared lopdf plumbing for the adapters that write PDFs.
//!
//! [`PdfBuilder`] owns a fresh document and a flat list of page references.
//! Pages arrive either from other documents ([`PdfBuilder::import_pages`],
//! used by merge, split and protect) or are composed from scratch
//! ([`PdfBuilder::add_page`], used by the image and DOCX writers).
//! [`PdfBuilder::finish`] builds a single-level page tree, a catalog and the
//! trailer, then drops everything unreachable.

use crate::error::ConversionError;
use crate::upload::UploadedFile;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed trees whose Parent links form a cycle.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, the fallback MediaBox for pages that declare none.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Parse an uploaded PDF.
pub(crate) fn load(file: &UploadedFile) -> Result<Document, ConversionError> {
    let doc = Document::load_mem(file.bytes()).map_err(|e| ConversionError::ExternalTool {
        tool: "lopdf",
        detail: format!("could not parse '{}': {}", file.name(), e),
    })?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ConversionError::ExternalTool {
            tool: "lopdf",
            detail: format!("'{}' is encrypted; remove the password first", file.name()),
        });
    }
    Ok(doc)
}

/// Number of pages in a PDF.
pub fn page_count(bytes: &[u8]) -> Result<u32, ConversionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ConversionError::tool("lopdf", e))?;
    Ok(doc.get_pages().len() as u32)
}

/// Serialise a finished document.
pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>, ConversionError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ConversionError::tool("lopdf", format!("failed to save PDF: {e}")))?;
    Ok(buffer)
}

/// Give the document a file identifier derived from `seed` if it has none.
///
/// The standard security handler mixes the first ID string into the key.
pub(crate) fn ensure_file_id(doc: &mut Document, seed: &[u8]) {
    if doc.trailer.get(b"ID").is_ok() {
        return;
    }
    let digest = Sha256::digest(seed);
    let id = Object::String(digest[..16].to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
}

/// Accumulates pages for a new document.
pub(crate) struct PdfBuilder {
    doc: Document,
    kids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Append a page of `width` × `height` points with the given resources
    /// and content stream.
    pub fn add_page(
        &mut self,
        width: f32,
        height: f32,
        resources: Dictionary,
        content: Vec<u8>,
    ) -> ObjectId {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    width.into(),
                    height.into(),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
        page_id
    }

    /// Move every object of `source` into this document and append the
    /// pages numbered in `pages` (1-based, in the given order).
    ///
    /// Page numbers the source does not have are skipped. Returns the
    /// number of pages appended.
    pub fn import_pages(&mut self, mut source: Document, pages: &[u32]) -> Result<usize, ConversionError> {
        source.renumber_objects_with(self.doc.max_id + 1);

        let page_map = source.get_pages();
        let page_ids: Vec<ObjectId> = page_map.values().copied().collect();
        let tree_nodes = flatten_inherited(&mut source, &page_ids)?;
        let catalog = source
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .ok();

        for (id, object) in std::mem::take(&mut source.objects) {
            if Some(id) == catalog || tree_nodes.contains(&id) {
                continue;
            }
            self.doc.objects.insert(id, object);
        }
        self.doc.max_id = self.doc.max_id.max(source.max_id);

        let mut appended = 0;
        for number in pages {
            match page_map.get(number) {
                Some(&page_id) => {
                    self.kids.push(page_id);
                    appended += 1;
                }
                None => debug!("Page {} not in source ({} pages), skipped", number, page_map.len()),
            }
        }
        Ok(appended)
    }

    /// Build the page tree, catalog and trailer; drop unreachable objects.
    pub fn finish(mut self) -> Result<Document, ConversionError> {
        let pages_id = self.doc.new_object_id();

        for &kid in &self.kids {
            let page = self
                .doc
                .get_dictionary_mut(kid)
                .map_err(|e| ConversionError::tool("lopdf", format!("page {kid:?}: {e}")))?;
            page.set("Parent", Object::Reference(pages_id));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.kids.len() as i64)),
            (
                "Kids",
                Object::Array(self.kids.iter().map(|&id| Object::Reference(id)).collect()),
            ),
        ]);
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let pruned = self.doc.prune_objects();
        if !pruned.is_empty() {
            debug!("Pruned {} unreachable objects", pruned.len());
        }
        self.doc.compress();
        Ok(self.doc)
    }
}

/// Copy inherited attributes onto each page so pages survive being moved
/// out of their original tree. Returns the ids of the intermediate tree
/// nodes, which the caller discards.
fn flatten_inherited(
    doc: &mut Document,
    page_ids: &[ObjectId],
) -> Result<BTreeSet<ObjectId>, ConversionError> {
    let mut nodes = BTreeSet::new();

    for &page_id in page_ids {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| ConversionError::tool("lopdf", e))?;
        let mut missing: Vec<&[u8]> = INHERITABLE.iter().copied().filter(|k| !page.has(k)).collect();
        let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(node_id) = parent {
            nodes.insert(node_id);
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                warn!("Page tree deeper than {} levels; stopped walking", MAX_TREE_DEPTH);
                break;
            }
            let node = match doc.get_dictionary(node_id) {
                Ok(node) => node,
                Err(_) => break,
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        let needs_media_box = missing.contains(&b"MediaBox".as_slice());
        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| ConversionError::tool("lopdf", e))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        if needs_media_box {
            page.set(
                "MediaBox",
                Object::Array(DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect()),
            );
        }
    }

    Ok(nodes)
}
