//! Editor configuration.

use fm_core::MAX_HISTORY;
use fm_store::{GatewayConfig, MAX_SAVED_DOCUMENTS};
use serde::{Deserialize, Serialize};

/// Tunables for an `EditorSession`.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo depth. Default: **50**.
    pub max_history: usize,

    /// Saved documents kept in storage. Default: **10**.
    pub max_saved_documents: usize,

    /// Zoom applied when a PDF is opened. Default: **1.5**.
    pub default_scale: f64,

    /// Drag grid in canvas pixels; 1 disables snapping. Default: **1**.
    pub grid_size: u32,

    /// Keep dragged fields inside the page. Default: **true**.
    pub constrain_drag: bool,

    pub default_font_size: f64,
    pub default_color: String,

    /// Side of a new checkbox, in PDF units.
    pub checkbox_size: f64,

    pub signature_width: f64,
    pub signature_height: f64,
    /// Where a new signature lands (PDF units, bottom-left).
    pub signature_origin: (f64, f64),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            max_saved_documents: MAX_SAVED_DOCUMENTS,
            default_scale: 1.5,
            grid_size: 1,
            constrain_drag: true,
            default_font_size: 12.0,
            default_color: "#000000".to_string(),
            checkbox_size: 12.0,
            signature_width: 200.0,
            signature_height: 80.0,
            signature_origin: (100.0, 100.0),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Gateway settings matching this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            max_documents: self.max_saved_documents,
            ..GatewayConfig::default()
        }
    }
}
