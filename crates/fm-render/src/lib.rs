pub mod hit;
pub mod overlay;

pub use hit::hit_test;
pub use overlay::{OverlayBox, OverlayLabel, overlay_current_page, overlay_page};
