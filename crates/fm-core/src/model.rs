//! Field and document data model.
//!
//! A `Document` is a plain value: every field is owned, so `Clone` yields a
//! fully independent snapshot. All editing operations take `&self` and return
//! a new document. The history manager relies on this to keep its stored
//! snapshots untouched by later edits of the live document.
//!
//! Field positions live in PDF page space (origin bottom-left, y up); see
//! `transform` for the mapping to canvas pixels.

use crate::color::Color;
use crate::error::FieldError;
use crate::id::{DocumentId, FieldId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Maximum number of undo snapshots kept in `History::past`.
pub const MAX_HISTORY: usize = 50;

// ─── Fields ──────────────────────────────────────────────────────────────

/// The closed set of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Checkbox,
    Signature,
    Image,
}

impl FieldKind {
    /// Prefix used when generating IDs for fields of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Signature => "signature",
            FieldKind::Image => "image",
        }
    }
}

/// A field's value, keyed by its type.
///
/// Serialized adjacently tagged, so a field reads as
/// `{ "type": "checkbox", "value": true, ... }` in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldContent {
    Text(String),
    Checkbox(bool),
    /// Signature image as a `data:` URL.
    Signature(String),
    /// One or more image sources.
    Image(SmallVec<[String; 2]>),
}

impl FieldContent {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldContent::Text(_) => FieldKind::Text,
            FieldContent::Checkbox(_) => FieldKind::Checkbox,
            FieldContent::Signature(_) => FieldKind::Signature,
            FieldContent::Image(_) => FieldKind::Image,
        }
    }

    /// Reject blank text and images the backend can't embed.
    pub fn validate(&self) -> Result<(), FieldError> {
        match self {
            FieldContent::Text(text) if text.trim().is_empty() => Err(FieldError::EmptyText),
            FieldContent::Text(_) | FieldContent::Checkbox(_) => Ok(()),
            FieldContent::Signature(src) => check_image_source(src),
            FieldContent::Image(sources) => sources.iter().try_for_each(|src| check_image_source(src)),
        }
    }
}

/// Image formats the PDF backend can embed.
const SUPPORTED_IMAGE_PREFIXES: &[&str] = &["data:image/png", "data:image/jpeg"];

fn check_finite(name: &'static str, value: f64) -> Result<(), FieldError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FieldError::InvalidNumber { name, value })
    }
}

fn check_size(width: f64, height: f64) -> Result<(), FieldError> {
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(FieldError::InvalidSize { width, height });
    }
    Ok(())
}

fn check_font_size(font_size: f64) -> Result<(), FieldError> {
    if font_size.is_finite() && font_size > 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidNumber {
            name: "font size",
            value: font_size,
        })
    }
}

fn check_color(color: &str) -> Result<(), FieldError> {
    match Color::parse(color) {
        Some(_) => Ok(()),
        None => Err(FieldError::InvalidColor(color.to_string())),
    }
}

fn check_page(page: u32, page_count: Option<u32>) -> Result<(), FieldError> {
    match page_count {
        Some(page_count) if page >= page_count => Err(FieldError::PageOutOfRange { page, page_count }),
        _ => Ok(()),
    }
}

fn check_image_source(src: &str) -> Result<(), FieldError> {
    if SUPPORTED_IMAGE_PREFIXES.iter().any(|p| src.starts_with(p)) {
        Ok(())
    } else {
        let shown: String = src.chars().take(24).collect();
        Err(FieldError::UnsupportedImage(shown))
    }
}

/// A user-placed field anchored to one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(flatten)]
    pub content: FieldContent,
    /// Bottom-left corner in PDF units.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 0-based page index.
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        self.content.kind()
    }

    /// Does the point (PDF space) fall inside this field's rectangle?
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    fn apply(&mut self, patch: &FieldPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = Some(rotation);
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = Some(font_size);
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
    }
}

/// A field that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub content: FieldContent,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page: u32,
    pub rotation: Option<f64>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

impl FieldSpec {
    pub fn new(content: FieldContent, page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            content,
            x,
            y,
            width,
            height,
            page,
            rotation: None,
            font_size: None,
            color: None,
        }
    }

    pub fn with_font(mut self, font_size: f64, color: impl Into<String>) -> Self {
        self.font_size = Some(font_size);
        self.color = Some(color.into());
        self
    }

    /// Reject specs that could never be placed: empty text, images the
    /// backend can't embed, unparseable colors, pages past the end.
    ///
    /// `page_count` is `None` when the page range is not known yet.
    pub fn validate(&self, page_count: Option<u32>) -> Result<(), FieldError> {
        self.content.validate()?;
        check_finite("x", self.x)?;
        check_finite("y", self.y)?;
        check_size(self.width, self.height)?;
        if let Some(rotation) = self.rotation {
            check_finite("rotation", rotation)?;
        }
        if let Some(font_size) = self.font_size {
            check_font_size(font_size)?;
        }
        if let Some(color) = &self.color {
            check_color(color)?;
        }
        check_page(self.page, page_count)
    }

    fn into_field(self, id: FieldId) -> Field {
        Field {
            id,
            content: self.content,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            page: self.page,
            rotation: self.rotation,
            font_size: self.font_size,
            color: self.color,
        }
    }
}

/// Partial update of a field. `None` leaves the attribute unchanged; the ID
/// is never patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub content: Option<FieldContent>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page: Option<u32>,
    pub rotation: Option<f64>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

impl FieldPatch {
    /// Move to a new bottom-left corner (PDF space).
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn content(content: FieldContent) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    /// Check every attribute the patch sets, as `FieldSpec::validate` does.
    /// Content must keep the kind of `field`.
    pub fn validate(&self, field: &Field, page_count: Option<u32>) -> Result<(), FieldError> {
        if let Some(content) = &self.content {
            if content.kind() != field.kind() {
                return Err(FieldError::KindMismatch {
                    expected: field.kind(),
                    found: content.kind(),
                });
            }
            content.validate()?;
        }
        if let Some(x) = self.x {
            check_finite("x", x)?;
        }
        if let Some(y) = self.y {
            check_finite("y", y)?;
        }
        check_size(
            self.width.unwrap_or(field.width),
            self.height.unwrap_or(field.height),
        )?;
        if let Some(rotation) = self.rotation {
            check_finite("rotation", rotation)?;
        }
        if let Some(font_size) = self.font_size {
            check_font_size(font_size)?;
        }
        if let Some(color) = &self.color {
            check_color(color)?;
        }
        match self.page {
            Some(page) => check_page(page, page_count),
            None => Ok(()),
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The working document: a named, ordered list of fields over a PDF.
///
/// Field order is paint order: later fields sit on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub fields: Vec<Field>,
    /// 1-based page shown in the viewer.
    pub current_page: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::generate(),
            name: name.into(),
            fields: Vec::new(),
            current_page: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Append a field with a freshly generated ID.
    pub fn add_field(&self, spec: FieldSpec) -> (Document, FieldId) {
        let id = FieldId::generate(spec.content.kind().prefix());
        let mut next = self.clone();
        next.fields.push(spec.into_field(id));
        next.touch();
        log::debug!("added field {id} to {}", self.id);
        (next, id)
    }

    /// Replace attributes of the field with `id`.
    ///
    /// An unknown ID returns an identical copy: drag events can land after
    /// the field was deleted, and that must not be an error.
    pub fn update_field(&self, id: FieldId, patch: &FieldPatch) -> Document {
        let Some(index) = self.fields.iter().position(|f| f.id == id) else {
            log::debug!("update of unknown field {id} ignored");
            return self.clone();
        };
        let mut next = self.clone();
        next.fields[index].apply(patch);
        next.touch();
        next
    }

    /// Remove the field with `id`. Unknown IDs are ignored.
    pub fn remove_field(&self, id: FieldId) -> Document {
        let mut next = self.clone();
        let before = next.fields.len();
        next.fields.retain(|f| f.id != id);
        if next.fields.len() != before {
            next.touch();
        }
        next
    }

    pub fn clear_fields(&self) -> Document {
        let mut next = self.clone();
        next.fields.clear();
        next.touch();
        next
    }

    /// Switch the viewer page (1-based; 0 is coerced to 1).
    pub fn with_current_page(&self, page: u32) -> Document {
        let mut next = self.clone();
        next.current_page = page.max(1);
        next.touch();
        next
    }

    pub fn renamed(&self, name: impl Into<String>) -> Document {
        let mut next = self.clone();
        next.name = name.into();
        next.touch();
        next
    }

    /// Fields on a 0-based page, in paint order.
    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    /// Fields on the page the viewer is showing.
    pub fn fields_on_current_page(&self) -> impl Iterator<Item = &Field> {
        self.fields_on_page(self.current_page.saturating_sub(1))
    }

    /// Do two documents differ in anything history tracks?
    ///
    /// Compares the field list (count, order, every attribute) and the
    /// current page. Name and timestamps are ignored.
    pub fn differs_from(&self, other: &Document) -> bool {
        self.current_page != other.current_page || self.fields != other.fields
    }
}

// ─── History ─────────────────────────────────────────────────────────────

/// Linear undo/redo history of document snapshots.
///
/// `past` is oldest-first, `future` is nearest-redo-first. Every entry is an
/// owned `Document`, so no two entries share field storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub past: VecDeque<Document>,
    pub present: Option<Document>,
    pub future: VecDeque<Document>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.present.is_none() && self.past.is_empty() && self.future.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
