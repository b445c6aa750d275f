//! Preset data model and catalog.
//!
//! A [`Preset`] bundles typography with exactly one background strategy.
//! Catalogs serialize to JSON so a frontend can ship its own style table:
//!
//! ```json
//! [{
//!   "id": "classic",
//!   "label": "Classic",
//!   "typography": { ... },
//!   "background": {
//!     "kind": "procedural",
//!     "baseColor": "#F2EEE6",
//!     "noise": { "enabled": true, "alpha": 0.04, "density": 6200, "dotSize": 1 },
//!     "tone": { "base": { ... }, "delta": { ... } }
//!   }
//! }]
//! ```

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use palette::rgb::FromHexError;
use serde::{Deserialize, Serialize};

use crate::error::{LeafletError, LeafletResult};

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB color written as `#rrggbb` or `#rgb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Srgb<u8>);

impl HexColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.0.red, self.0.green, self.0.blue]
    }
}

impl FromStr for HexColor {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Srgb<u8>>().map(Self)
    }
}

impl TryFrom<String> for HexColor {
    type Error = FromHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0.red, self.0.green, self.0.blue)
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for HexColor {
    fn schema_name() -> String {
        "HexColor".into()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

// ============================================================================
// Tone
// ============================================================================

/// Global tone adjustment applied to procedural presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    /// 1 = no change.
    pub saturate: f32,
    /// 1 = no change.
    pub contrast: f32,
    /// 1 = no change.
    pub brightness: f32,
    /// -1..1, applied as a tinted overlay.
    pub warmth: f32,
    /// 0..1
    pub grain: f32,
}

impl Tone {
    /// A tone that leaves the frame untouched.
    pub const NEUTRAL: Self = Self {
        saturate: 1.0,
        contrast: 1.0,
        brightness: 1.0,
        warmth: 0.0,
        grain: 0.0,
    };
}

/// Tone at strength 0 (`base`) and the offset reached at strength 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ToneRange {
    pub base: Tone,
    pub delta: Tone,
}

impl ToneRange {
    /// Linearly interpolates the tone for a 0..100 style strength.
    pub fn at(&self, strength: f32) -> Tone {
        let t = strength_fraction(strength);
        let (b, d) = (&self.base, &self.delta);
        Tone {
            saturate: b.saturate + d.saturate * t,
            contrast: b.contrast + d.contrast * t,
            brightness: b.brightness + d.brightness * t,
            warmth: b.warmth + d.warmth * t,
            grain: b.grain + d.grain * t,
        }
    }
}

/// Maps a 0..100 strength onto `[0, 1]`.
pub fn strength_fraction(strength: f32) -> f32 {
    if strength.is_nan() {
        return 0.0;
    }
    (strength / 100.0).clamp(0.0, 1.0)
}

// ============================================================================
// Background strategies
// ============================================================================

/// Paper micro-noise settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct NoiseConfig {
    pub enabled: bool,
    /// 0..1
    pub alpha: f32,
    /// Dots per logical megapixel.
    pub density: f32,
    /// Dot edge length in logical pixels (1 or 2).
    pub dot_size: u32,
}

/// Procedurally generated paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProceduralBackground {
    pub base_color: HexColor,
    pub noise: NoiseConfig,
    pub tone: ToneRange,
}

/// Photographed paper plus a multiply filter texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImageBackground {
    /// Image cache key of the background texture.
    pub background_image: String,
    /// Image cache key of the filter drawn with multiply blend.
    pub filter_image: String,
    /// Thumbnail shown by preset pickers. Never rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
}

/// How a preset produces its background layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BackgroundStrategy {
    Procedural(ProceduralBackground),
    ImageBased(ImageBackground),
}

// ============================================================================
// Typography
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

/// Font and color for one text role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TextStyleSpec {
    /// CSS-style family list, e.g. `"Libre Baskerville", serif`.
    pub font_family: String,
    pub font_weight: u16,
    /// Falls back to the role default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    pub color: HexColor,
}

fn default_author_scale() -> f32 {
    0.82
}

/// Typography shared by both background strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TypographySpec {
    pub quote: TextStyleSpec,
    pub author: TextStyleSpec,
    /// Largest quote size in logical pixels on a 4:5 page.
    pub base_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Character budget bounding the wrap width.
    pub max_line_chars: u32,
    /// Author size as a fraction of the resolved quote size.
    #[serde(default = "default_author_scale")]
    pub author_scale: f32,
}

impl TypographySpec {
    pub fn quote_style(&self) -> FontStyle {
        self.quote.font_style.unwrap_or(FontStyle::Normal)
    }

    pub fn author_style(&self) -> FontStyle {
        self.author.font_style.unwrap_or(FontStyle::Italic)
    }
}

// ============================================================================
// Preset
// ============================================================================

fn default_strength() -> f32 {
    50.0
}

/// An immutable named style bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub label: String,
    /// Slider position selected when the preset is picked.
    #[serde(default = "default_strength")]
    pub default_strength: f32,
    pub typography: TypographySpec,
    pub background: BackgroundStrategy,
}

impl Preset {
    /// Image cache keys this preset needs resident before rendering.
    pub fn image_refs(&self) -> Vec<&str> {
        match &self.background {
            BackgroundStrategy::Procedural(_) => Vec::new(),
            BackgroundStrategy::ImageBased(bg) => {
                vec![bg.background_image.as_str(), bg.filter_image.as_str()]
            }
        }
    }
}

// ============================================================================
// PresetCatalog
// ============================================================================

/// Ordered, read-only table of presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Looks up a preset by id.
    ///
    /// An absent id is a caller bug and is never substituted.
    pub fn get(&self, id: &str) -> LeafletResult<&Preset> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LeafletError::UnknownPreset(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Serializes the catalog to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the catalog to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a catalog from a JSON array of presets.
    pub fn from_json(json: &str) -> LeafletResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The four procedural presets shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(vec![
            procedural(
                "editorial",
                "Editorial",
                serif_typography(
                    HexColor::new(0x1F, 0x1F, 0x1F),
                    HexColor::new(0x66, 0x66, 0x66),
                    1.45,
                    62,
                ),
                HexColor::new(0xF5, 0xF3, 0xEE),
                noise(0.035, 5200.0, 1),
                tone(0.94, 0.97, 1.00, 0.06, 0.10),
                tone(-0.06, -0.05, -0.02, 0.08, 0.10),
            ),
            procedural(
                "classic",
                "Classic",
                serif_typography(
                    HexColor::new(0x1E, 0x1E, 0x1E),
                    HexColor::new(0x6A, 0x6A, 0x6A),
                    1.48,
                    60,
                ),
                HexColor::new(0xF2, 0xEE, 0xE6),
                noise(0.04, 6200.0, 1),
                tone(0.95, 0.98, 1.00, 0.08, 0.12),
                tone(-0.06, -0.06, -0.02, 0.10, 0.12),
            ),
            procedural(
                "modern",
                "Modern",
                TypographySpec {
                    quote: style("Inter, system-ui, sans-serif", 500, None, HexColor::new(0x1A, 0x1A, 0x1A)),
                    author: style("Inter, system-ui, sans-serif", 400, None, HexColor::new(0x6B, 0x6B, 0x6B)),
                    base_size: 58.0,
                    line_height: 1.52,
                    max_line_chars: 56,
                    author_scale: default_author_scale(),
                },
                HexColor::new(0xF6, 0xF6, 0xF4),
                NoiseConfig {
                    enabled: false,
                    alpha: 0.0,
                    density: 0.0,
                    dot_size: 1,
                },
                tone(1.00, 1.00, 1.00, 0.00, 0.00),
                tone(-0.02, -0.02, 0.00, 0.02, 0.00),
            ),
            procedural(
                "newsprint",
                "Newsprint",
                TypographySpec {
                    quote: style("\"Source Serif 4\", serif", 400, None, HexColor::new(0x1B, 0x1B, 0x1B)),
                    author: style(
                        "\"Source Sans 3\", sans-serif",
                        400,
                        Some(FontStyle::Normal),
                        HexColor::new(0x58, 0x58, 0x58),
                    ),
                    base_size: 58.0,
                    line_height: 1.44,
                    max_line_chars: 66,
                    author_scale: 0.78,
                },
                HexColor::new(0xEC, 0xEA, 0xE3),
                noise(0.06, 9200.0, 2),
                tone(0.85, 1.02, 1.00, 0.04, 0.20),
                tone(-0.10, 0.02, -0.02, 0.06, 0.18),
            ),
        ])
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn procedural(
    id: &str,
    label: &str,
    typography: TypographySpec,
    base_color: HexColor,
    noise: NoiseConfig,
    base: Tone,
    delta: Tone,
) -> Preset {
    Preset {
        id: id.into(),
        label: label.into(),
        default_strength: default_strength(),
        typography,
        background: BackgroundStrategy::Procedural(ProceduralBackground {
            base_color,
            noise,
            tone: ToneRange { base, delta },
        }),
    }
}

fn style(family: &str, weight: u16, font_style: Option<FontStyle>, color: HexColor) -> TextStyleSpec {
    TextStyleSpec {
        font_family: family.into(),
        font_weight: weight,
        font_style,
        color,
    }
}

fn serif_typography(quote: HexColor, author: HexColor, line_height: f32, max_line_chars: u32) -> TypographySpec {
    const BASKERVILLE: &str = "\"Libre Baskerville\", serif";
    TypographySpec {
        quote: style(BASKERVILLE, 400, None, quote),
        author: style(BASKERVILLE, 400, None, author),
        base_size: 58.0,
        line_height,
        max_line_chars,
        author_scale: default_author_scale(),
    }
}

fn noise(alpha: f32, density: f32, dot_size: u32) -> NoiseConfig {
    NoiseConfig {
        enabled: true,
        alpha,
        density,
        dot_size,
    }
}

fn tone(saturate: f32, contrast: f32, brightness: f32, warmth: f32, grain: f32) -> Tone {
    Tone {
        saturate,
        contrast,
        brightness,
        warmth,
        grain,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get("classic").unwrap().label, "Classic");
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let catalog = PresetCatalog::builtin();
        let err = catalog.get("sepia").unwrap_err();
        assert!(matches!(err, LeafletError::UnknownPreset(id) if id == "sepia"));
    }

    #[test]
    fn tone_endpoints_are_exact() {
        for preset in PresetCatalog::builtin().iter() {
            let BackgroundStrategy::Procedural(bg) = &preset.background else {
                panic!("builtin presets are procedural");
            };
            let range = bg.tone;
            assert_eq!(range.at(0.0), range.base);

            let full = range.at(100.0);
            assert_eq!(full.saturate, range.base.saturate + range.delta.saturate);
            assert_eq!(full.contrast, range.base.contrast + range.delta.contrast);
            assert_eq!(full.brightness, range.base.brightness + range.delta.brightness);
            assert_eq!(full.warmth, range.base.warmth + range.delta.warmth);
            assert_eq!(full.grain, range.base.grain + range.delta.grain);
        }
    }

    #[test]
    fn tone_is_linear_and_clamped() {
        let range = ToneRange {
            base: Tone::NEUTRAL,
            delta: tone(-0.2, 0.4, 0.0, 1.0, 0.5),
        };
        let half = range.at(50.0);
        assert!((half.contrast - 1.2).abs() < 1e-6);
        assert!((half.warmth - 0.5).abs() < 1e-6);
        assert_eq!(range.at(-20.0), range.at(0.0));
        assert_eq!(range.at(250.0), range.at(100.0));
    }

    #[test]
    fn hex_color_parsing() {
        let color: HexColor = "#F5F3EE".parse().unwrap();
        assert_eq!(color.rgb(), [0xF5, 0xF3, 0xEE]);
        assert_eq!(color.to_string(), "#F5F3EE");
        assert!("not-a-color".parse::<HexColor>().is_err());
    }

    #[test]
    fn author_style_defaults_to_italic() {
        let catalog = PresetCatalog::builtin();
        let classic = catalog.get("classic").unwrap();
        assert_eq!(classic.typography.quote_style(), FontStyle::Normal);
        assert_eq!(classic.typography.author_style(), FontStyle::Italic);

        let newsprint = catalog.get("newsprint").unwrap();
        assert_eq!(newsprint.typography.author_style(), FontStyle::Normal);
    }

    #[test]
    fn catalog_json_format() {
        let json = PresetCatalog::builtin().to_json_pretty().unwrap();
        assert!(json.contains("\"kind\": \"procedural\""));
        assert!(json.contains("\"baseColor\": \"#F2EEE6\""));
        assert!(json.contains("\"maxLineChars\""));

        let restored = PresetCatalog::from_json(&json).unwrap();
        assert_eq!(restored, PresetCatalog::builtin());
    }

    #[test]
    fn image_based_preset_from_json() {
        let json = r##"[{
            "id": "film",
            "label": "Film",
            "typography": {
                "quote": { "fontFamily": "serif", "fontWeight": 400, "color": "#111" },
                "author": { "fontFamily": "serif", "fontWeight": 400, "color": "#555" },
                "baseSize": 56,
                "lineHeight": 1.5,
                "maxLineChars": 58
            },
            "background": {
                "kind": "image-based",
                "backgroundImage": "film/background.jpg",
                "filterImage": "film/filter.jpg"
            }
        }]"##;

        let catalog = PresetCatalog::from_json(json).unwrap();
        let film = catalog.get("film").unwrap();
        assert_eq!(film.default_strength, 50.0);
        assert_eq!(film.typography.author_scale, 0.82);
        assert_eq!(film.image_refs(), vec!["film/background.jpg", "film/filter.jpg"]);
    }

    #[test]
    fn malformed_catalog_is_rejected() {
        let err = PresetCatalog::from_json(r#"[{"id": "x"}]"#).unwrap_err();
        assert!(matches!(err, LeafletError::Catalog(_)));
    }
}
