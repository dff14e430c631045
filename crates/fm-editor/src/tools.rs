//! Placement tools.
//!
//! The active tool decides what a click on bare page creates. Each tool
//! turns a PDF-space anchor plus user input into a `FieldSpec`; sizing
//! rules live here so every entry point places fields the same way.

use crate::config::EditorConfig;
use fm_core::model::{FieldContent, FieldKind, FieldSpec};
use fm_core::{Color, FieldError, Point};
use smallvec::SmallVec;

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_EM: f64 = 0.6;
/// Line height as a fraction of the font size.
const LINE_HEIGHT_EM: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Text,
    Checkbox,
    Signature,
    Image,
}

impl ToolKind {
    pub fn field_kind(self) -> FieldKind {
        match self {
            ToolKind::Text => FieldKind::Text,
            ToolKind::Checkbox => FieldKind::Checkbox,
            ToolKind::Signature => FieldKind::Signature,
            ToolKind::Image => FieldKind::Image,
        }
    }
}

/// User data accompanying a click with the active tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// No extra data: checkboxes, or a tool that needs a follow-up call.
    None,
    Text(String),
}

/// Font settings applied to new text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProperties {
    pub font_size: f64,
    pub color: String,
}

impl TextProperties {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            font_size: config.default_font_size,
            color: config.default_color.clone(),
        }
    }

    /// Font size must be positive and the color parseable. Named colors are
    /// normalized to hex.
    pub fn validated(self) -> Result<Self, FieldError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(FieldError::InvalidSize {
                width: self.font_size,
                height: self.font_size,
            });
        }
        let color = Color::parse(&self.color).ok_or_else(|| FieldError::InvalidColor(self.color.clone()))?;
        Ok(Self {
            font_size: self.font_size,
            color: color.to_hex(),
        })
    }
}

impl Default for TextProperties {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Approximate box of a single line of text, in PDF units.
pub fn text_extent(text: &str, font_size: f64) -> (f64, f64) {
    let chars = text.chars().count() as f64;
    (chars * font_size * GLYPH_WIDTH_EM, font_size * LINE_HEIGHT_EM)
}

pub fn text_field(text: &str, at: Point, page: u32, props: &TextProperties) -> FieldSpec {
    let (width, height) = text_extent(text, props.font_size);
    FieldSpec::new(FieldContent::Text(text.to_string()), page, at.x, at.y, width, height)
        .with_font(props.font_size, props.color.clone())
}

pub fn checkbox_field(checked: bool, at: Point, page: u32, config: &EditorConfig) -> FieldSpec {
    let size = config.checkbox_size;
    FieldSpec::new(FieldContent::Checkbox(checked), page, at.x, at.y, size, size)
}

/// Signature at the configured default position and size.
pub fn signature_field(data_url: &str, page: u32, config: &EditorConfig) -> FieldSpec {
    let (x, y) = config.signature_origin;
    FieldSpec::new(
        FieldContent::Signature(data_url.to_string()),
        page,
        x,
        y,
        config.signature_width,
        config.signature_height,
    )
}

pub fn image_field<I, S>(sources: I, at: Point, page: u32, width: f64, height: f64) -> FieldSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sources: SmallVec<[String; 2]> = sources.into_iter().map(Into::into).collect();
    FieldSpec::new(FieldContent::Image(sources), page, at.x, at.y, width, height)
}
