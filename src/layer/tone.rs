//! Contrast, saturation and brightness filter for procedural presets.

use palette::Srgb;

use super::LayerEffect;
use crate::preset::Tone;
use crate::surface::Surface;

/// Luminance weights used by the saturate matrix.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

/// The color-matrix part of a [`Tone`]. Warmth and grain are painted by
/// the paper layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneFilter {
    pub contrast: f32,
    pub saturate: f32,
    pub brightness: f32,
}

impl From<Tone> for ToneFilter {
    fn from(tone: Tone) -> Self {
        Self {
            contrast: tone.contrast,
            saturate: tone.saturate,
            brightness: tone.brightness,
        }
    }
}

impl ToneFilter {
    pub fn is_identity(&self) -> bool {
        self.contrast == 1.0 && self.saturate == 1.0 && self.brightness == 1.0
    }

    /// Applies contrast, then saturate, then brightness to one color,
    /// clamping after each step.
    pub fn apply(&self, color: Srgb<f32>) -> Srgb<f32> {
        let contrast = |c: f32| ((c - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0);
        let (r, g, b) = (contrast(color.red), contrast(color.green), contrast(color.blue));

        let s = self.saturate;
        let (r, g, b) = (
            (r * (LUMA_R + (1.0 - LUMA_R) * s) + g * (LUMA_G - LUMA_G * s) + b * (LUMA_B - LUMA_B * s))
                .clamp(0.0, 1.0),
            (r * (LUMA_R - LUMA_R * s) + g * (LUMA_G + (1.0 - LUMA_G) * s) + b * (LUMA_B - LUMA_B * s))
                .clamp(0.0, 1.0),
            (r * (LUMA_R - LUMA_R * s) + g * (LUMA_G - LUMA_G * s) + b * (LUMA_B + (1.0 - LUMA_B) * s))
                .clamp(0.0, 1.0),
        );

        let brightness = |c: f32| (c * self.brightness).clamp(0.0, 1.0);
        Srgb::new(brightness(r), brightness(g), brightness(b))
    }
}

impl LayerEffect for ToneFilter {
    fn transform(&self, surface: &mut Surface) {
        if self.is_identity() {
            return;
        }
        for pixel in surface.data.pixels_mut() {
            let color: Srgb<f32> = Srgb::new(pixel[0], pixel[1], pixel[2]).into_format();
            let out: Srgb<u8> = self.apply(color).into_format();
            pixel[0] = out.red;
            pixel[1] = out.green;
            pixel[2] = out.blue;
        }
    }
}
