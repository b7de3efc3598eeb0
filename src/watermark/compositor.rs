//! Merging a watermark overlay into a source page.
//!
//! The overlay page is imported into the target document as a Form XObject
//! and invoked from a small content stream added to the page. The page's
//! existing content streams are never rewritten; only the `Contents` array
//! and the page's own `Resources` change.
//!
//! # Placement
//!
//! - [`Placement::Below`] (default) draws the watermark first, so page
//!   content paints over it.
//! - [`Placement::Above`] wraps the existing content in `q`/`Q` and draws
//!   the watermark last, on top of everything.

use super::document::{inherited_attribute, page_dict_mut, page_geometry, resolve};
use super::overlay::OverlayDocument;
use super::position::{PageGeometry, Transform};
use super::WatermarkError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of the XObject resource names the compositor allocates.
const XOBJECT_PREFIX: &str = "PdfStampWm";

/// Where the watermark sits relative to the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Below,
    Above,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Below => "below",
            Self::Above => "above",
        }
    }
}

/// Merge `overlay` onto the page `page_id` of `document`.
///
/// Page geometry is left untouched: the overlay must already match the
/// page's MediaBox size, and is translated onto the MediaBox origin.
///
/// # Errors
///
/// Returns [`WatermarkError::Composite`] if the page is malformed, the sizes
/// disagree, or the overlay cannot be imported.
pub fn composite(
    document: &mut Document,
    page_id: ObjectId,
    overlay: &OverlayDocument,
    placement: Placement,
) -> Result<(), WatermarkError> {
    let geometry = page_geometry(document, page_id).map_err(WatermarkError::composite)?;
    let overlay_geometry = overlay.geometry();
    if !geometry.same_size(&overlay_geometry) {
        return Err(WatermarkError::composite(format!(
            "overlay is {} x {} but page is {} x {}",
            overlay_geometry.width, overlay_geometry.height, geometry.width, geometry.height
        )));
    }

    let form_id = import_overlay(document, overlay)?;
    let name = register_xobject(document, page_id, form_id)?;
    let invocation = document.add_object(Stream::new(
        Dictionary::new(),
        invocation_content(&name, &geometry)?,
    ));

    let mut contents = content_entries(document, page_id)?;
    match placement {
        Placement::Below => contents.insert(0, Object::Reference(invocation)),
        Placement::Above => {
            let save = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let restore = document.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            contents.insert(0, Object::Reference(save));
            contents.push(Object::Reference(restore));
            contents.push(Object::Reference(invocation));
        }
    }

    page_dict_mut(document, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

/// Copy the overlay page into `document` as a Form XObject.
fn import_overlay(
    document: &mut Document,
    overlay: &OverlayDocument,
) -> Result<ObjectId, WatermarkError> {
    let import_error =
        |e: lopdf::Error| WatermarkError::composite(format!("cannot import overlay: {}", e));

    let content = overlay.content().map_err(import_error)?;
    let resources = overlay.resources().map_err(import_error)?;
    let mut imported = BTreeMap::new();
    let resources = import_dictionary(document, overlay.document(), resources, &mut imported)
        .map_err(import_error)?;

    let geometry = overlay.geometry();
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => Object::Integer(1),
            "BBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.width),
                Object::Real(geometry.height),
            ],
            "Resources" => resources,
        },
        content,
    );
    Ok(document.add_object(form))
}

/// Deep-copy an object graph from `source` into `target`, renumbering
/// indirect objects. `imported` maps source ids to their copies so shared
/// objects are copied once.
fn import_object(
    target: &mut Document,
    source: &Document,
    object: &Object,
    imported: &mut BTreeMap<ObjectId, ObjectId>,
) -> Result<Object, lopdf::Error> {
    match object {
        Object::Reference(id) => {
            if let Some(copy) = imported.get(id) {
                return Ok(Object::Reference(*copy));
            }
            let copy_id = target.new_object_id();
            imported.insert(*id, copy_id);
            let copied = import_object(target, source, source.get_object(*id)?, imported)?;
            target.objects.insert(copy_id, copied);
            Ok(Object::Reference(copy_id))
        }
        Object::Array(items) => items
            .iter()
            .map(|item| import_object(target, source, item, imported))
            .collect::<Result<Vec<_>, _>>()
            .map(Object::Array),
        Object::Dictionary(dict) => {
            import_dictionary(target, source, dict, imported).map(Object::Dictionary)
        }
        Object::Stream(stream) => {
            let mut copy = stream.clone();
            copy.dict = import_dictionary(target, source, &stream.dict, imported)?;
            Ok(Object::Stream(copy))
        }
        other => Ok(other.clone()),
    }
}

fn import_dictionary(
    target: &mut Document,
    source: &Document,
    dict: &Dictionary,
    imported: &mut BTreeMap<ObjectId, ObjectId>,
) -> Result<Dictionary, lopdf::Error> {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        copy.set(key.clone(), import_object(target, source, value, imported)?);
    }
    Ok(copy)
}

/// Add the form to the page's own resources under an unused name.
///
/// Inherited or shared resource dictionaries are copied onto the page
/// rather than modified, so other pages are unaffected.
fn register_xobject(
    document: &mut Document,
    page_id: ObjectId,
    form_id: ObjectId,
) -> Result<String, WatermarkError> {
    let mut resources = match inherited_attribute(document, page_id, b"Resources") {
        Some(value) => match resolve(document, &value) {
            Object::Dictionary(dict) => dict.clone(),
            Object::Null => Dictionary::new(),
            _ => {
                return Err(WatermarkError::composite(
                    "page Resources is not a dictionary",
                ))
            }
        },
        None => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(value) => match resolve(document, value) {
            Object::Dictionary(dict) => dict.clone(),
            _ => {
                return Err(WatermarkError::composite(
                    "page XObject resources is not a dictionary",
                ))
            }
        },
        Err(_) => Dictionary::new(),
    };

    let name = (0..u32::MAX)
        .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .ok_or_else(|| WatermarkError::composite("no free XObject name"))?;

    xobjects.set(name.clone(), form_id);
    resources.set("XObject", xobjects);
    page_dict_mut(document, page_id)?.set("Resources", resources);
    Ok(name)
}

/// `q 1 0 0 1 x0 y0 cm /Name Do Q`
fn invocation_content(name: &str, geometry: &PageGeometry) -> Result<Vec<u8>, WatermarkError> {
    let matrix = Transform::translation(geometry.x0, geometry.y0);
    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            matrix
                .coefficients()
                .iter()
                .map(|v| Object::Real(*v))
                .collect(),
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ];
    let mut bytes = b"\n".to_vec();
    bytes.extend(
        Content { operations }
            .encode()
            .map_err(|e| WatermarkError::composite(format!("failed to encode invocation: {}", e)))?,
    );
    Ok(bytes)
}

/// Current content streams of a page as a list of references.
fn content_entries(
    document: &mut Document,
    page_id: ObjectId,
) -> Result<Vec<Object>, WatermarkError> {
    let contents = document
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| WatermarkError::composite(format!("page object is unusable: {}", e)))?
        .get(b"Contents")
        .ok()
        .cloned();

    Ok(match contents {
        None | Some(Object::Null) => Vec::new(),
        Some(Object::Reference(id)) => match document.get_object(id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(Object::Array(items)) => items,
        Some(Object::Stream(stream)) => vec![Object::Reference(document.add_object(stream))],
        Some(_) => {
            return Err(WatermarkError::composite(
                "page Contents is neither a stream nor an array",
            ))
        }
    })
}
