//! Raster surface and geometry types.
//!
//! A [`Surface`] is the device-pixel RGBA buffer every layer paints into.
//! Layout happens in logical pixels; the surface's pixel ratio maps logical
//! coordinates onto device pixels.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Highest pixel ratio a surface accepts.
pub const MAX_PIXEL_RATIO: u32 = 2;

/// A rectangle defined in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the image
    pub x: u32,
    /// Y offset from the top edge of the image
    pub y: u32,
    /// Width of the rectangle
    pub width: u32,
    /// Height of the rectangle
    pub height: u32,
}

impl RectPx {
    /// Creates a new rectangle with the given position and dimensions.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

// ============================================================================
// AspectRatio
// ============================================================================

/// Output aspect ratio; each maps to a fixed logical page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum AspectRatio {
    /// 1080×1350 portrait page.
    #[default]
    #[serde(rename = "4:5")]
    Portrait,
    /// 1080×1080 square page.
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Logical page size for this ratio.
    pub fn logical_size(self) -> SizePx {
        match self {
            Self::Portrait => SizePx::new(1080, 1350),
            Self::Square => SizePx::new(1080, 1080),
        }
    }

    /// File-name friendly form, e.g. `4x5`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Portrait => "4x5",
            Self::Square => "1x1",
        }
    }
}

/// Clamps a platform device-pixel-ratio to a whole surface scale in
/// `1..=MAX_PIXEL_RATIO`.
pub fn clamp_pixel_ratio(raw: f32) -> u32 {
    if !raw.is_finite() {
        return 1;
    }
    (raw.floor().max(1.0) as u32).min(MAX_PIXEL_RATIO)
}

// ============================================================================
// Surface
// ============================================================================

/// A pixel-ratio aware drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// The device-pixel buffer in RGBA format.
    pub data: RgbaImage,

    /// Device pixels per logical pixel.
    pub pixel_ratio: u32,

    /// Logical page size the layout works in.
    pub logical: SizePx,
}

impl Surface {
    /// Creates a transparent surface of the given logical size.
    pub fn new(logical: SizePx, pixel_ratio: u32) -> Self {
        let pixel_ratio = pixel_ratio.clamp(1, MAX_PIXEL_RATIO);
        Self {
            data: RgbaImage::new(logical.width * pixel_ratio, logical.height * pixel_ratio),
            pixel_ratio,
            logical,
        }
    }

    /// Creates a surface sized for an aspect ratio.
    pub fn for_ratio(ratio: AspectRatio, pixel_ratio: u32) -> Self {
        Self::new(ratio.logical_size(), pixel_ratio)
    }

    /// Resizes the backing buffer when the logical size changed.
    ///
    /// Returns true if the buffer was reallocated.
    pub fn establish(&mut self, logical: SizePx) -> bool {
        if self.logical == logical && self.dimensions() == self.device_size() {
            return false;
        }
        self.logical = logical;
        let device = self.device_size();
        self.data = RgbaImage::new(device.width, device.height);
        true
    }

    /// Device size implied by the logical size and pixel ratio.
    pub fn device_size(&self) -> SizePx {
        SizePx::new(
            self.logical.width * self.pixel_ratio,
            self.logical.height * self.pixel_ratio,
        )
    }

    /// Returns the pixel dimensions of the backing buffer.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Returns true if the surface holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.width() == 0 || self.data.height() == 0
    }

    /// Fills every pixel with an opaque color.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        let px = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        for pixel in self.data.pixels_mut() {
            *pixel = px;
        }
    }
}
