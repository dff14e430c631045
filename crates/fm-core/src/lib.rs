pub mod color;
pub mod error;
pub mod id;
pub mod model;
pub mod transform;

pub use color::Color;
pub use error::FieldError;
pub use id::{DocumentId, FieldId};
pub use model::*;
pub use transform::{PageGeometry, Point, Rect};
