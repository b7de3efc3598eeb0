//! Watermark overlay generation.
//!
//! For each page size an overlay is built as a standalone single-page PDF
//! containing only the watermark text: Helvetica-Bold in the requested
//! color, centered on the page and rotated about the center. The overlay is
//! later merged onto the source page by the compositor.
//!
//! # Example
//!
//! ```
//! use pdfstamp::watermark::overlay::generate_overlay;
//! use pdfstamp::watermark::position::PageGeometry;
//! use pdfstamp::watermark::WatermarkSpec;
//!
//! let overlay = generate_overlay(&PageGeometry::new(612.0, 792.0), &WatermarkSpec::default()).unwrap();
//! assert_eq!(overlay.page_count(), 1);
//! ```

use super::config::WatermarkSpec;
use super::document::resolve;
use super::font::{encode_win_ansi, measure_text, FONT_ENCODING, FONT_NAME};
use super::position::{centered_text_origin, PageGeometry, Transform};
use super::WatermarkError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Resource name of the watermark font inside the overlay.
pub const FONT_RESOURCE: &str = "F1";

/// A one-page PDF holding only the watermark, sized to a source page.
#[derive(Debug, Clone)]
pub struct OverlayDocument {
    document: Document,
    page_id: ObjectId,
    geometry: PageGeometry,
}

impl OverlayDocument {
    /// Size of the overlay page. The MediaBox always starts at (0, 0).
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Decoded content stream of the overlay page.
    pub fn content(&self) -> Result<Vec<u8>, lopdf::Error> {
        self.document.get_page_content(self.page_id)
    }

    /// The overlay page's resource dictionary.
    pub fn resources(&self) -> Result<&Dictionary, lopdf::Error> {
        let page = self.document.get_object(self.page_id)?.as_dict()?;
        resolve(&self.document, page.get(b"Resources")?).as_dict()
    }
}

/// Build the content stream operations that draw the watermark.
///
/// The graphics state is saved and restored around the drawing, so the
/// operations can be placed before or after any other content.
pub fn watermark_operations(geometry: &PageGeometry, spec: &WatermarkSpec) -> Vec<Operation> {
    let transform = Transform::centered_rotation(geometry, spec.rotation_degrees());
    let text_width = measure_text(spec.text(), spec.font_size());
    let (tx, ty) = centered_text_origin(text_width);
    let color = spec.color();

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            transform
                .coefficients()
                .iter()
                .map(|v| Object::Real(*v))
                .collect(),
        ),
        Operation::new(
            "rg",
            vec![
                Object::Real(color.r),
                Object::Real(color.g),
                Object::Real(color.b),
            ],
        ),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                Object::Real(spec.font_size()),
            ],
        ),
        Operation::new("Td", vec![Object::Real(tx), Object::Real(ty)]),
        Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(spec.text()),
                StringFormat::Literal,
            )],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Produce a standalone one-page overlay PDF for a page of the given size.
///
/// # Errors
///
/// Returns [`WatermarkError::OverlayRender`] if the geometry is unusable or
/// the content stream cannot be encoded. The page number is attached by
/// the caller.
pub fn generate_overlay(
    geometry: &PageGeometry,
    spec: &WatermarkSpec,
) -> Result<OverlayDocument, WatermarkError> {
    if !(geometry.width.is_finite() && geometry.height.is_finite())
        || geometry.width <= 0.0
        || geometry.height <= 0.0
    {
        return Err(WatermarkError::overlay(format!(
            "invalid page size {} x {}",
            geometry.width, geometry.height
        )));
    }
    let geometry = PageGeometry::new(geometry.width, geometry.height);

    let content = Content {
        operations: watermark_operations(&geometry, spec),
    }
    .encode()
    .map_err(|e| WatermarkError::overlay(format!("failed to encode content stream: {}", e)))?;

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => FONT_NAME,
        "Encoding" => FONT_ENCODING,
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });
    let content_id = document.add_object(Stream::new(Dictionary::new(), content));
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.width),
            Object::Real(geometry.height),
        ],
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    Ok(OverlayDocument {
        document,
        page_id,
        geometry,
    })
}
