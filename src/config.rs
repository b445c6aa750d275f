//! Renderer configuration.
//!
//! ```json
//! {
//!   "brand": "Leaflet",
//!   "layout": { "shrinkFactor": 0.92, "minFontSize": 34 },
//!   "exportFormat": { "format": "jpeg", "quality": 92 },
//!   "maxPixelRatio": 2
//! }
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::LeafletResult;
use crate::layout::LayoutConfig;
use crate::renderer::ExportFormat;
use crate::surface::MAX_PIXEL_RATIO;

/// Brand prefix of exported file names.
pub const DEFAULT_BRAND: &str = "Leaflet";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub brand: String,
    pub layout: LayoutConfig,
    pub export_format: ExportFormat,
    /// Upper bound on device pixels per logical pixel. Never above 2.
    pub max_pixel_ratio: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            layout: LayoutConfig::default(),
            export_format: ExportFormat::default(),
            max_pixel_ratio: MAX_PIXEL_RATIO,
        }
    }
}

impl RenderConfig {
    /// Effective pixel ratio ceiling, within `1..=MAX_PIXEL_RATIO`.
    pub fn pixel_ratio_cap(&self) -> u32 {
        self.max_pixel_ratio.clamp(1, MAX_PIXEL_RATIO)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> LeafletResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
