//! Source and output document handling.
//!
//! [`SourceDocument`] is the parsed input and is never modified. The
//! pipeline clones it into an [`OutputDocument`], stamps pages in place and
//! collects them in source order; [`OutputDocument::finalize`] then rebuilds
//! a flat page tree holding exactly those pages.

use super::position::PageGeometry;
use super::WatermarkError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on reference chains and page-tree depth.
const MAX_DEPTH: usize = 64;

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// A parsed, read-only input PDF.
#[derive(Debug)]
pub struct SourceDocument {
    document: Document,
    path: PathBuf,
    byte_len: u64,
    page_ids: Vec<ObjectId>,
}

impl SourceDocument {
    /// Open and parse a PDF from disk.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::SourceOpen`] if the file is missing, is not
    /// a regular file, cannot be parsed, or is encrypted.
    pub fn open(path: &Path) -> Result<Self, WatermarkError> {
        let open_error = |message: String| WatermarkError::SourceOpen {
            path: path.to_path_buf(),
            message,
        };

        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => open_error("file not found".to_string()),
            _ => open_error(e.to_string()),
        })?;
        if !metadata.is_file() {
            return Err(open_error("not a regular file".to_string()));
        }

        let document =
            Document::load(path).map_err(|e| open_error(format!("not a readable PDF: {}", e)))?;

        Self::from_document(document, path, metadata.len())
    }

    /// Wrap an already parsed document.
    pub fn from_document(
        document: Document,
        path: &Path,
        byte_len: u64,
    ) -> Result<Self, WatermarkError> {
        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(WatermarkError::SourceOpen {
                path: path.to_path_buf(),
                message: "encrypted documents are not supported".to_string(),
            });
        }
        let page_ids = document.get_pages().into_values().collect();
        Ok(Self {
            document,
            path: path.to_path_buf(),
            byte_len,
            page_ids,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Page object ids in reading order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }
}

/// The document being assembled from stamped pages.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages: Vec<ObjectId>,
}

impl OutputDocument {
    /// Start from a private copy of the source.
    pub fn from_source(source: &SourceDocument) -> Self {
        Self {
            document: source.document().clone(),
            pages: Vec::with_capacity(source.page_count()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Append a page (already present in the working document).
    pub fn push_page(&mut self, page_id: ObjectId) {
        self.pages.push(page_id);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rebuild the page tree from the accepted pages and drop everything
    /// no longer reachable.
    ///
    /// Inherited attributes are copied onto each page first, since the
    /// intermediate page-tree nodes that carried them are discarded.
    pub fn finalize(mut self) -> Result<Document, WatermarkError> {
        let pages_id = self.document.new_object_id();

        for &page_id in &self.pages {
            let inherited: Vec<(&[u8], Object)> = INHERITABLE
                .iter()
                .filter(|key| !page_has(&self.document, page_id, key))
                .filter_map(|key| {
                    inherited_attribute(&self.document, page_id, key).map(|value| (*key, value))
                })
                .collect();

            let page = page_dict_mut(&mut self.document, page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", pages_id);
        }

        let kids: Vec<Object> = self.pages.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(self.pages.len() as i64),
            }),
        );

        let catalog_id = match self.document.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => {
                return Err(WatermarkError::composite(
                    "document has no catalog reference",
                ))
            }
        };
        self.document
            .get_object_mut(catalog_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| WatermarkError::composite(format!("invalid document catalog: {}", e)))?
            .set("Pages", pages_id);

        self.document.prune_objects();
        Ok(self.document)
    }
}

/// Follow a chain of indirect references to the direct object.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    let mut current = object;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => match document.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Look up `key` on a page or, failing that, on its nearest ancestor.
///
/// Returns the stored object, which may be an indirect reference.
pub(crate) fn inherited_attribute(
    document: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_DEPTH {
        let node = document.get_object(node_id).ok()?.as_dict().ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => node_id = *parent,
            _ => return None,
        }
    }
    None
}

/// Effective page geometry, honoring an inherited MediaBox.
pub fn page_geometry(document: &Document, page_id: ObjectId) -> Result<PageGeometry, String> {
    let media_box = inherited_attribute(document, page_id, b"MediaBox")
        .ok_or_else(|| "page has no MediaBox".to_string())?;
    let values = match resolve(document, &media_box) {
        Object::Array(values) if values.len() == 4 => values,
        _ => return Err("MediaBox is not a four-number array".to_string()),
    };

    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = number(resolve(document, value))
            .ok_or_else(|| "MediaBox contains a non-numeric entry".to_string())?;
    }
    PageGeometry::from_rect(rect).ok_or_else(|| format!("MediaBox {:?} has no area", rect))
}

pub(crate) fn page_dict_mut(
    document: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, WatermarkError> {
    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| {
            WatermarkError::composite(format!("page object {:?} is unusable: {}", page_id, e))
        })
}

fn page_has(document: &Document, page_id: ObjectId, key: &[u8]) -> bool {
    document
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map(|page| page.has(key))
        .unwrap_or(false)
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}
