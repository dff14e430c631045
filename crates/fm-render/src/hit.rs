//! Hit testing: point → field lookup.
//!
//! Walks the page's fields back-to-front (last painted = topmost) to find
//! which field is under a canvas position.

use fm_core::model::Document;
use fm_core::{FieldId, PageGeometry, Point};

/// Find the topmost field on the current page at canvas position `p`.
/// Returns `None` if the point is over bare page.
pub fn hit_test(doc: &Document, geometry: &PageGeometry, p: Point) -> Option<FieldId> {
    let page = doc.current_page.saturating_sub(1);
    let fields: Vec<_> = doc.fields_on_page(page).collect();

    for field in fields.iter().rev() {
        if geometry.field_rect(field).contains(p) {
            log::trace!("HIT {} at ({}, {})", field.id, p.x, p.y);
            return Some(field.id);
        }
    }
    None
}
