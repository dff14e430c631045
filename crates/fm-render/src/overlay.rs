//! Document → overlay boxes.
//!
//! Walks the fields of one page in paint order and computes where each
//! field's interactive element sits on the canvas. The host UI positions its
//! elements from these boxes; nothing here touches the PDF raster.

use fm_core::model::{Document, Field, FieldContent, FieldKind};
use fm_core::{FieldId, PageGeometry, Rect};

/// Z-index for an unselected field overlay.
pub const Z_FIELD: u32 = 10;
/// Z-index for the selected field, always above the others.
pub const Z_SELECTED: u32 = 100;

/// What the overlay element should display.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayLabel {
    Text(String),
    Checkbox { checked: bool },
    /// Image-backed field (signature or image), by source.
    Image(String),
}

/// Placement of one field's overlay element, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub id: FieldId,
    pub kind: FieldKind,
    pub rect: Rect,
    pub z_index: u32,
    /// Rotation in degrees, clockwise, about the box center.
    pub rotation: f64,
    /// Font size in canvas pixels (text fields only).
    pub font_px: Option<f64>,
    pub label: OverlayLabel,
}

/// Overlay boxes for every field on the document's current page.
pub fn overlay_current_page(
    doc: &Document,
    geometry: &PageGeometry,
    selected: Option<FieldId>,
) -> Vec<OverlayBox> {
    overlay_page(doc, doc.current_page.saturating_sub(1), geometry, selected)
}

/// Overlay boxes for the fields on a 0-based page, in paint order.
pub fn overlay_page(
    doc: &Document,
    page: u32,
    geometry: &PageGeometry,
    selected: Option<FieldId>,
) -> Vec<OverlayBox> {
    doc.fields_on_page(page)
        .map(|field| overlay_box(field, geometry, selected == Some(field.id)))
        .collect()
}

pub fn overlay_box(field: &Field, geometry: &PageGeometry, selected: bool) -> OverlayBox {
    let rect = geometry.field_rect(field);
    log::trace!(
        "OVERLAY {} {:?} at ({}, {}) {}x{}",
        field.id,
        field.kind(),
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );
    OverlayBox {
        id: field.id,
        kind: field.kind(),
        rect,
        z_index: if selected { Z_SELECTED } else { Z_FIELD },
        rotation: field.rotation.unwrap_or(0.0),
        font_px: field.font_size.map(|s| s * geometry.scale),
        label: label_for(&field.content),
    }
}

fn label_for(content: &FieldContent) -> OverlayLabel {
    match content {
        FieldContent::Text(text) => OverlayLabel::Text(text.clone()),
        FieldContent::Checkbox(checked) => OverlayLabel::Checkbox { checked: *checked },
        FieldContent::Signature(src) => OverlayLabel::Image(src.clone()),
        FieldContent::Image(sources) => {
            OverlayLabel::Image(sources.first().cloned().unwrap_or_default())
        }
    }
}
