//! Coordinate transforms between the three frames a field lives in:
//!
//! - **viewport**: pointer client coordinates;
//! - **canvas**: pixels of the rendered page at the active zoom `scale`,
//!   origin top-left, y down;
//! - **PDF page**: unscaled page units, origin bottom-left, y up.
//!
//! A page height of 0 means nothing has been rendered yet. The UI can ask for
//! a transform before the first render completes, so in that case y passes
//! through unflipped instead of failing.

use crate::model::Field;
use serde::{Deserialize, Serialize};

/// Scales at or below zero are clamped to this.
pub const MIN_SCALE: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, origin top-left (screen/canvas frames).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

fn sane_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        MIN_SCALE
    }
}

/// Pointer client coordinates → PDF page point.
pub fn screen_to_pdf(client: Point, canvas_origin: Point, scale: f64, page_height_px: f64) -> Point {
    let scale = sane_scale(scale);
    let cx = (client.x - canvas_origin.x) / scale;
    let cy = (client.y - canvas_origin.y) / scale;
    if page_height_px <= 0.0 {
        return Point::new(cx, cy);
    }
    Point::new(cx, page_height_px / scale - cy)
}

/// PDF bottom-left anchor of a box with `height` → its canvas top-left.
pub fn pdf_to_screen(x: f64, y: f64, height: f64, page_height_px: f64, scale: f64) -> Point {
    let scale = sane_scale(scale);
    let left = x * scale;
    if page_height_px <= 0.0 {
        return Point::new(left, y * scale);
    }
    Point::new(left, page_height_px - y * scale - height * scale)
}

/// Canvas top-left of a box with `height` (PDF units) → its PDF bottom-left.
/// Inverse of [`pdf_to_screen`].
pub fn canvas_to_pdf(left: f64, top: f64, height: f64, page_height_px: f64, scale: f64) -> Point {
    let scale = sane_scale(scale);
    let x = left / scale;
    if page_height_px <= 0.0 {
        return Point::new(x, top / scale);
    }
    Point::new(x, (page_height_px - top) / scale - height)
}

// ─── Page geometry ───────────────────────────────────────────────────────

/// Everything needed to map between frames for the page on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub scale: f64,
    /// Rendered page size in canvas pixels (0 before the first render).
    pub page_width_px: f64,
    pub page_height_px: f64,
    /// Canvas top-left in client coordinates.
    pub canvas_origin: Point,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            scale: 1.5,
            page_width_px: 0.0,
            page_height_px: 0.0,
            canvas_origin: Point::ORIGIN,
        }
    }
}

impl PageGeometry {
    pub fn new(scale: f64) -> Self {
        Self {
            scale: sane_scale(scale),
            ..Self::default()
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.page_height_px > 0.0
    }

    /// Page size in PDF units.
    pub fn page_size_pt(&self) -> (f64, f64) {
        let scale = sane_scale(self.scale);
        (self.page_width_px / scale, self.page_height_px / scale)
    }

    /// The canvas in client coordinates.
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(
            self.canvas_origin.x,
            self.canvas_origin.y,
            self.page_width_px,
            self.page_height_px,
        )
    }

    pub fn screen_to_pdf(&self, client: Point) -> Point {
        screen_to_pdf(client, self.canvas_origin, self.scale, self.page_height_px)
    }

    /// Client coordinates → canvas pixels.
    pub fn screen_to_canvas(&self, client: Point) -> Point {
        Point::new(client.x - self.canvas_origin.x, client.y - self.canvas_origin.y)
    }

    pub fn pdf_to_canvas(&self, x: f64, y: f64, height: f64) -> Point {
        pdf_to_screen(x, y, height, self.page_height_px, self.scale)
    }

    pub fn canvas_to_pdf(&self, left: f64, top: f64, height: f64) -> Point {
        canvas_to_pdf(left, top, height, self.page_height_px, self.scale)
    }

    /// Canvas rectangle covered by a field's overlay.
    pub fn field_rect(&self, field: &Field) -> Rect {
        let scale = sane_scale(self.scale);
        let top_left = self.pdf_to_canvas(field.x, field.y, field.height);
        Rect::new(
            top_left.x,
            top_left.y,
            field.width * scale,
            field.height * scale,
        )
    }
}
