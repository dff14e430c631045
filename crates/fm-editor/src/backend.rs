//! PDF backend boundary.
//!
//! Parsing, rasterizing, and writing PDFs happen outside this crate. The
//! session drives a `PdfBackend` for those steps and only keeps the
//! results it needs for geometry and export.

use fm_core::model::Field;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("failed to load PDF: {0}")]
    Load(String),

    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    #[error("failed to draw field {field}: {reason}")]
    Draw { field: String, reason: String },

    #[error("failed to write PDF: {0}")]
    Export(String),
}

/// Size of a rendered page raster, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPage {
    pub width: f64,
    pub height: f64,
}

/// A parsed PDF ready to become the working document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPdf {
    /// Display name, usually the file name without extension.
    pub name: String,
    pub page_count: u32,
    /// First page size in PDF units.
    pub page_width: f64,
    pub page_height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub trait PdfBackend {
    fn page_count(&self) -> u32;

    /// Rasterize a 0-based page at `scale` canvas pixels per PDF unit.
    fn render_page(&mut self, page: u32, scale: f64) -> Result<RenderedPage, BackendError>;

    /// Burn one field into the output document.
    fn draw_field(&mut self, field: &Field) -> Result<(), BackendError>;

    /// Serialize the output document once `fields` have been drawn.
    fn export(&mut self, fields: &[Field], filename: &str) -> Result<Vec<u8>, BackendError>;
}

// ─── Load gating ─────────────────────────────────────────────────────────

/// Token identifying one PDF load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Orders overlapping asynchronous loads: only the most recently issued
/// ticket may complete, so a slow earlier load can't overwrite a newer one.
#[derive(Debug, Default, Clone)]
pub struct LoadGate {
    latest: u64,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut gate = LoadGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }
}
