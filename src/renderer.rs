//! Page rendering engine: sequences the layers for one frame and exports
//! the result.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::assets::ImageCache;
use crate::config::RenderConfig;
use crate::error::{LeafletError, LeafletResult};
use crate::fonts::FontBook;
use crate::layer::{
    BackdropConfig, BackgroundCache, BackgroundKey, FittedBackdrop, LayerEffect, PaperConfig,
    ToneFilter, TypesetConfig,
};
use crate::layer::backdrop::cover_fit;
use crate::layout::{LayoutRequest, PageLayout, TextAlign, layout_page};
use crate::preset::{BackgroundStrategy, ImageBackground, Preset, strength_fraction};
use crate::schedule::FrameScheduler;
use crate::surface::{AspectRatio, Surface, clamp_pixel_ratio};
use crate::text::{normalize_author, normalize_quote};

// ============================================================================
// RenderInput
// ============================================================================

/// Everything one frame depends on besides fonts and images.
///
/// The `with_quote` and `with_author` builders normalize raw input; the
/// fields themselves hold display-ready text.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub quote: String,
    /// Display author, dash included. Empty means no author line.
    pub author: String,
    pub show_author: bool,
    pub quote_align: TextAlign,
    pub author_align: TextAlign,
    pub ratio: AspectRatio,
    /// 0..100
    pub style_strength: f32,
    pub preset: Preset,
}

impl RenderInput {
    /// An empty page in `preset` at its default strength.
    pub fn new(preset: Preset) -> Self {
        Self {
            quote: normalize_quote(""),
            author: String::new(),
            show_author: true,
            quote_align: TextAlign::Left,
            author_align: TextAlign::Right,
            ratio: AspectRatio::Portrait,
            style_strength: preset.default_strength.clamp(0.0, 100.0),
            preset,
        }
    }

    pub fn with_quote(mut self, raw: &str) -> Self {
        self.quote = normalize_quote(raw);
        self
    }

    pub fn with_author(mut self, raw: &str) -> Self {
        self.author = normalize_author(raw);
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

    /// Sets the style strength, clamped to 0..100.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.style_strength = if strength.is_nan() { 0.0 } else { strength.clamp(0.0, 100.0) };
        self
    }

    fn layout_request(&self) -> LayoutRequest<'_> {
        LayoutRequest {
            quote: &self.quote,
            author: self.show_author.then_some(self.author.as_str()),
            quote_align: self.quote_align,
            author_align: self.author_align,
            ratio: self.ratio,
            typography: &self.preset.typography,
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg {
        /// 1..100
        quality: u8,
    },
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 92 }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// An encoded page ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub format: ExportFormat,
}

/// `{brand}_{presetId}_{ratio}.{ext}`, e.g. `Leaflet_classic_4x5.png`.
pub fn export_file_name(brand: &str, preset_id: &str, ratio: AspectRatio, format: ExportFormat) -> String {
    format!("{brand}_{preset_id}_{}.{}", ratio.slug(), format.extension())
}

/// Encodes the surface at device resolution.
#[instrument(skip(surface), fields(width = surface.data.width(), height = surface.data.height()))]
pub fn export(
    surface: &Surface,
    format: ExportFormat,
    preset_id: &str,
    ratio: AspectRatio,
    brand: &str,
) -> LeafletResult<ExportedImage> {
    if surface.is_empty() {
        return Err(LeafletError::export("surface has no pixels"));
    }
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => surface
            .data
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| LeafletError::export(err.to_string()))?,
        ExportFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(surface.data.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|err| LeafletError::export(err.to_string()))?
        }
    }
    if bytes.is_empty() {
        return Err(LeafletError::export("encoder produced no data"));
    }
    debug!(bytes = bytes.len(), "encoded page");
    Ok(ExportedImage {
        bytes,
        file_name: export_file_name(brand, preset_id, ratio, format),
        format,
    })
}

// ============================================================================
// Renderer
// ============================================================================

/// Result of running one scheduled frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered(PageLayout),
    /// A newer frame was requested while this one waited for images.
    Superseded,
    /// Nothing was scheduled.
    Idle,
}

/// Main page rendering engine.
///
/// Holds the font and image resources plus the background cache that
/// lets text edits skip regenerating the paper.
///
/// # Layer order
///
/// 1. **Background**: procedural paper (cached) then the tone pass, or
///    the image backdrop with its multiply filter.
/// 2. **Typeset**: quote and author lines laid out to fit the page.
#[derive(Debug)]
pub struct Renderer {
    fonts: FontBook,
    images: ImageCache,
    background: BackgroundCache,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(fonts: FontBook, images: ImageCache) -> Self {
        Self {
            fonts,
            images,
            background: BackgroundCache::new(),
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    pub fn background_cache(&self) -> &BackgroundCache {
        &self.background
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// A surface sized for `input`'s page at the platform's device pixel
    /// ratio, capped by the config.
    ///
    /// Rendering re-establishes the surface for the input's ratio, so a
    /// surface built here never changes size on its first frame.
    pub fn surface_for(&self, input: &RenderInput, device_pixel_ratio: f32) -> Surface {
        let pixel_ratio = clamp_pixel_ratio(device_pixel_ratio).min(self.config.pixel_ratio_cap());
        Surface::for_ratio(input.ratio, pixel_ratio)
    }

    /// Drops the cached background so the next frame regenerates it.
    pub fn clear_cache(&mut self) {
        self.background.clear();
    }

    /// Renders a frame, decoding any missing preset images first.
    #[instrument(skip_all, fields(preset = %input.preset.id, strength = input.style_strength))]
    pub fn render(&mut self, surface: &mut Surface, input: &RenderInput) -> LeafletResult<PageLayout> {
        self.images.load_preset(&input.preset)?;
        self.draw(surface, input)
    }

    /// Renders a frame only if every resource is already resident.
    ///
    /// Returns `Ok(false)` without touching the surface when an image-based
    /// preset still has images to load.
    #[instrument(skip_all, fields(preset = %input.preset.id))]
    pub fn render_cached(&mut self, surface: &mut Surface, input: &RenderInput) -> LeafletResult<bool> {
        if !self.images.is_resident(&input.preset) {
            debug!("images not resident");
            return Ok(false);
        }
        self.draw(surface, input)?;
        Ok(true)
    }

    /// Renders a frame, awaiting image loads off the async runtime's
    /// worker threads.
    #[instrument(skip_all, fields(preset = %input.preset.id))]
    pub async fn render_async(&mut self, surface: &mut Surface, input: &RenderInput) -> LeafletResult<PageLayout> {
        self.images.load_preset_async(&input.preset).await?;
        self.draw(surface, input)
    }

    /// Runs the latest scheduled frame. A frame superseded while its images
    /// load is dropped without drawing.
    #[instrument(skip_all)]
    pub async fn render_scheduled(
        &mut self,
        surface: &mut Surface,
        scheduler: &FrameScheduler<RenderInput>,
    ) -> LeafletResult<FrameOutcome> {
        let Some((token, input)) = scheduler.take() else {
            return Ok(FrameOutcome::Idle);
        };
        if !self.images.is_resident(&input.preset) {
            self.images.load_preset_async(&input.preset).await?;
        }
        if !token.is_current() {
            debug!(generation = token.generation(), "frame superseded");
            return Ok(FrameOutcome::Superseded);
        }
        self.draw(surface, &input).map(FrameOutcome::Rendered)
    }

    /// Encodes the surface with the configured format and brand.
    pub fn export(&self, surface: &Surface, input: &RenderInput) -> LeafletResult<ExportedImage> {
        self.export_as(surface, input, self.config.export_format)
    }

    pub fn export_as(
        &self,
        surface: &Surface,
        input: &RenderInput,
        format: ExportFormat,
    ) -> LeafletResult<ExportedImage> {
        export(surface, format, &input.preset.id, input.ratio, &self.config.brand)
    }

    fn draw(&mut self, surface: &mut Surface, input: &RenderInput) -> LeafletResult<PageLayout> {
        surface.establish(input.ratio.logical_size());

        match &input.preset.background {
            BackgroundStrategy::Procedural(background) => {
                let key = BackgroundKey::new(surface, &input.preset.id, input.style_strength);
                if self.background.restore_into(&key, surface) {
                    debug!(strength = key.strength, "background cache hit");
                } else {
                    debug!(strength = key.strength, "background cache miss");
                    PaperConfig::new(background, key.strength as f32).transform(surface);
                    self.background.store(key, surface.data.clone());
                }
                ToneFilter::from(background.tone.at(input.style_strength)).transform(surface);
            }
            BackgroundStrategy::ImageBased(background) => {
                let fitted = self.fitted_backdrop(&input.preset.id, background, surface)?;
                BackdropConfig::new(
                    fitted.background,
                    fitted.filter,
                    strength_fraction(input.style_strength),
                )
                .transform(surface);
            }
        }

        let layout = layout_page(&self.fonts, &input.layout_request(), &self.config.layout);
        TypesetConfig::new(&layout, &self.fonts).transform(surface);
        Ok(layout)
    }

    fn fitted_backdrop(
        &mut self,
        preset_id: &str,
        background: &ImageBackground,
        surface: &Surface,
    ) -> LeafletResult<FittedBackdrop> {
        let source = self.images.require(&background.background_image)?;
        let filter = self.images.require(&background.filter_image)?;
        let size = surface.dimensions();
        Ok(self.background.fitted_or_insert_with(preset_id, size, || FittedBackdrop {
            background: cover_fit(&source, size).into(),
            filter: cover_fit(&filter, size).into(),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
