use crate::model::FieldKind;
use thiserror::Error;

/// A field description rejected before it reaches a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("text field is empty")]
    EmptyText,

    #[error("unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("invalid field size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    #[error("invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: f64 },

    #[error("cannot store {found:?} content in a {expected:?} field")]
    KindMismatch { expected: FieldKind, found: FieldKind },
}
