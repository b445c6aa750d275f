//! leaflet-renderer: quote page image rendering
//!
//! This crate typesets a short quote and optional author line onto a
//! stylized paper background and exports the page as PNG or JPEG.
//!
//! # Example
//!
//! ```
//! use leaflet_renderer::{
//!     ExportFormat, FontBook, ImageCache, PresetCatalog, RenderInput, Renderer,
//! };
//!
//! let catalog = PresetCatalog::builtin();
//! let input = RenderInput::new(catalog.get("classic").unwrap().clone())
//!     .with_quote("Hello world")
//!     .with_author("Ada")
//!     .with_strength(50.0);
//!
//! let mut renderer = Renderer::new(FontBook::system(), ImageCache::new("assets"));
//! let mut surface = renderer.surface_for(&input, 1.0);
//! renderer.render(&mut surface, &input).unwrap();
//!
//! let exported = renderer.export_as(&surface, &input, ExportFormat::Png).unwrap();
//! assert_eq!(exported.file_name, "Leaflet_classic_4x5.png");
//! ```
//!
//! # Serializable Requests
//!
//! Form state crosses process boundaries as a [`RenderProfile`]:
//!
//! ```
//! use leaflet_renderer::{PresetCatalog, RenderProfile};
//!
//! let json = r#"{ "presetId": "modern", "quote": "Less is more", "showAuthor": false }"#;
//! let input = RenderProfile::from_json(json)
//!     .unwrap()
//!     .resolve(&PresetCatalog::builtin())
//!     .unwrap();
//! assert!(!input.show_author);
//! ```

mod assets;
mod config;
mod error;
mod fonts;
mod layer;
mod layout;
mod preset;
mod profile;
mod renderer;
mod schedule;
mod shaper;
mod surface;
pub mod text;

pub use assets::ImageCache;
pub use config::{DEFAULT_BRAND, RenderConfig};
pub use error::{LeafletError, LeafletResult};
pub use fonts::FontBook;
pub use layer::{
    BackdropConfig, BackgroundCache, BackgroundKey, FittedBackdrop, LayerEffect, PaperConfig,
    ToneFilter, TypesetConfig, quantize_strength,
};
pub use layout::{
    Column, LayoutBlock, LayoutConfig, LayoutRequest, PageLayout, TextAlign, initial_font_size,
    layout_page,
};
pub use preset::{
    BackgroundStrategy, FontStyle, HexColor, ImageBackground, NoiseConfig, Preset, PresetCatalog,
    ProceduralBackground, TextStyleSpec, Tone, ToneRange, TypographySpec, strength_fraction,
};
pub use profile::RenderProfile;
pub use renderer::{
    ExportFormat, ExportedImage, FrameOutcome, RenderInput, Renderer, export, export_file_name,
};
pub use schedule::{FrameScheduler, FrameToken};
pub use shaper::{FontSpec, TextMeasure, measure_max_line_width_by_chars, wrap_text_by_width};
pub use surface::{
    AspectRatio, MAX_PIXEL_RATIO, RectPx, SizePx, Surface, clamp_pixel_ratio,
};
