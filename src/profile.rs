//! Serializable render request for frontend/backend communication.
//!
//! A [`RenderProfile`] captures the user's form state with the preset by
//! id, so it can cross a process or storage boundary as JSON and be
//! resolved against a catalog on the other side.
//!
//! ```
//! use leaflet_renderer::{PresetCatalog, RenderProfile, TextAlign};
//!
//! let profile = RenderProfile::new("classic", "Hello world")
//!     .with_author("Ada")
//!     .with_quote_align(TextAlign::Center);
//!
//! let json = profile.to_json().unwrap();
//! let restored = RenderProfile::from_json(&json).unwrap();
//!
//! let input = restored.resolve(&PresetCatalog::builtin()).unwrap();
//! assert_eq!(input.quote, "\u{201C}Hello world\u{201D}");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LeafletResult;
use crate::layout::TextAlign;
use crate::preset::PresetCatalog;
use crate::renderer::RenderInput;
use crate::surface::AspectRatio;

/// Raw form state of one page.
///
/// # JSON Format
///
/// ```json
/// {
///   "presetId": "classic",
///   "quote": "Hello world",
///   "author": "Ada",
///   "showAuthor": true,
///   "quoteAlign": "left",
///   "authorAlign": "right",
///   "ratio": "4:5",
///   "styleStrength": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RenderProfile {
    pub preset_id: String,

    /// Quote as typed. Normalized on [`resolve`](Self::resolve).
    #[serde(default)]
    pub quote: String,

    /// Author as typed, without the dash prefix.
    #[serde(default)]
    pub author: String,

    #[serde(default = "default_show_author")]
    pub show_author: bool,

    #[serde(default)]
    pub quote_align: TextAlign,

    #[serde(default = "default_author_align")]
    pub author_align: TextAlign,

    #[serde(default)]
    pub ratio: AspectRatio,

    /// 0..100. `None` uses the preset's default strength.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_strength: Option<f32>,
}

fn default_show_author() -> bool {
    true
}

fn default_author_align() -> TextAlign {
    TextAlign::Right
}

impl RenderProfile {
    pub fn new(preset_id: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            preset_id: preset_id.into(),
            quote: quote.into(),
            author: String::new(),
            show_author: default_show_author(),
            quote_align: TextAlign::default(),
            author_align: default_author_align(),
            ratio: AspectRatio::default(),
            style_strength: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_show_author(mut self, show: bool) -> Self {
        self.show_author = show;
        self
    }

    pub fn with_quote_align(mut self, align: TextAlign) -> Self {
        self.quote_align = align;
        self
    }

    pub fn with_author_align(mut self, align: TextAlign) -> Self {
        self.author_align = align;
        self
    }

    pub fn with_ratio(mut self, ratio: AspectRatio) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_style_strength(mut self, strength: f32) -> Self {
        self.style_strength = Some(strength);
        self
    }

    /// Looks up the preset and normalizes the text into a [`RenderInput`].
    pub fn resolve(&self, catalog: &PresetCatalog) -> LeafletResult<RenderInput> {
        let preset = catalog.get(&self.preset_id)?.clone();
        let strength = self.style_strength.unwrap_or(preset.default_strength);
        Ok(RenderInput::new(preset)
            .with_quote(&self.quote)
            .with_author(&self.author)
            .with_show_author(self.show_author)
            .with_quote_align(self.quote_align)
            .with_author_align(self.author_align)
            .with_ratio(self.ratio)
            .with_strength(strength))
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

// ============================================================================
// Tests
// ============================================================================
