//! Procedural paper: base fill, micro-noise, warmth tint and grain.

use image::RgbaImage;
use rand::Rng;

use super::{LayerEffect, blend_channel};
use crate::preset::{HexColor, ProceduralBackground, strength_fraction};
use crate::surface::{SizePx, Surface};

/// Overlay tint for positive warmth.
pub const WARM_TINT: HexColor = HexColor::new(0xF2, 0xD3, 0xA1);
/// Overlay tint for negative warmth.
pub const COOL_TINT: HexColor = HexColor::new(0xB9, 0xD9, 0xFF);

const MAX_WARMTH_OPACITY: f32 = 0.18;
const MAX_GRAIN_OPACITY: f32 = 0.08;
const NOISE_ALPHA_SCALE: f32 = 0.55;
const GRAIN_ALPHA_SCALE: f32 = 0.6;
/// Grain dots per logical megapixel at amount 1.
const GRAIN_DENSITY: f32 = 22_000.0;

/// Paper micro-noise resolved for one strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLayer {
    pub alpha: f32,
    /// Dots per logical megapixel.
    pub density: f32,
    pub dot_size: u32,
}

/// The procedural background for one preset and strength.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperConfig {
    pub base_color: HexColor,
    pub noise: Option<NoiseLayer>,
    /// -1..1
    pub warmth: f32,
    /// 0..1
    pub grain: f32,
}

impl PaperConfig {
    /// Resolves a procedural background at a 0..100 strength.
    ///
    /// Strength nudges noise density between 90% and 115% and drives the
    /// warmth and grain tone fields.
    pub fn new(background: &ProceduralBackground, strength: f32) -> Self {
        let t = strength_fraction(strength);
        let tone = background.tone.at(strength);
        let noise = background.noise;
        Self {
            base_color: background.base_color,
            noise: noise.enabled.then(|| NoiseLayer {
                alpha: noise.alpha,
                density: (noise.density * mix(0.9, 1.15, t)).round(),
                dot_size: noise.dot_size.max(1),
            }),
            warmth: tone.warmth,
            grain: tone.grain,
        }
    }

    /// Paints the paper with an explicit random source.
    pub fn paint_with<R: Rng + ?Sized>(&self, surface: &mut Surface, rng: &mut R) {
        let ratio = surface.pixel_ratio;
        let logical = surface.logical;
        surface.fill(self.base_color.rgb());

        if let Some(noise) = self.noise {
            if noise.alpha > 0.0 && noise.density > 0.0 {
                let alpha = quantize_alpha(noise.alpha * NOISE_ALPHA_SCALE);
                let dots = dot_count(logical, noise.density);
                scatter_dots(&mut surface.data, rng, dots, noise.dot_size * ratio, alpha);
            }
        }

        apply_warmth(&mut surface.data, self.warmth);

        if self.grain > 0.0 {
            let alpha = quantize_alpha((self.grain * MAX_GRAIN_OPACITY).min(MAX_GRAIN_OPACITY) * GRAIN_ALPHA_SCALE);
            let dots = dot_count(logical, GRAIN_DENSITY * self.grain);
            scatter_dots(&mut surface.data, rng, dots, ratio, alpha);
        }
    }
}

impl LayerEffect for PaperConfig {
    fn transform(&self, surface: &mut Surface) {
        self.paint_with(surface, &mut rand::thread_rng());
    }
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rounds an opacity to the nearest 8-bit step.
fn quantize_alpha(alpha: f32) -> f32 {
    (alpha * 255.0).round() / 255.0
}

/// Number of dots for a density given per logical megapixel.
pub fn dot_count(logical: SizePx, density: f32) -> u64 {
    if density <= 0.0 {
        return 0;
    }
    (logical.area() as f64 / 1_000_000.0 * density as f64).floor() as u64
}

/// Scatters square dots, each randomly black or white, blended at `alpha`
/// into the existing pixels. Dots are clipped at the image edge.
pub fn scatter_dots<R: Rng + ?Sized>(
    image: &mut RgbaImage,
    rng: &mut R,
    count: u64,
    size_px: u32,
    alpha: f32,
) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || alpha <= 0.0 {
        return;
    }
    for _ in 0..count {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        let target = if rng.gen_bool(0.5) { 0 } else { 255 };

        for dy in y..(y + size_px).min(height) {
            for dx in x..(x + size_px).min(width) {
                let pixel = image.get_pixel_mut(dx, dy);
                for c in 0..3 {
                    pixel[c] = blend_channel(pixel[c], target, alpha);
                }
            }
        }
    }
}

/// Tints the whole image warm (positive) or cool (negative).
pub fn apply_warmth(image: &mut RgbaImage, warmth: f32) {
    if warmth == 0.0 || warmth.is_nan() {
        return;
    }
    let alpha = (warmth.abs() * MAX_WARMTH_OPACITY).min(MAX_WARMTH_OPACITY);
    let tint = if warmth > 0.0 { WARM_TINT } else { COOL_TINT }.rgb();
    for pixel in image.pixels_mut() {
        for c in 0..3 {
            pixel[c] = blend_channel(pixel[c], tint[c], alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{BackgroundStrategy, PresetCatalog};
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn gray(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    fn mean_luma(image: &RgbaImage) -> f64 {
        let sum: u64 = image
            .pixels()
            .map(|p| (p[0] as u64 + p[1] as u64 + p[2] as u64) / 3)
            .sum();
        sum as f64 / (image.width() * image.height()) as f64
    }

    fn classic() -> ProceduralBackground {
        let catalog = PresetCatalog::builtin();
        match &catalog.get("classic").unwrap().background {
            BackgroundStrategy::Procedural(bg) => bg.clone(),
            BackgroundStrategy::ImageBased(_) => unreachable!(),
        }
    }

    #[test]
    fn dot_count_scales_with_area_and_density() {
        assert_eq!(dot_count(SizePx::new(1000, 1000), 5200.0), 5200);
        assert_eq!(dot_count(SizePx::new(1080, 1350), 6200.0), 9039);
        assert_eq!(dot_count(SizePx::new(1080, 1350), 0.0), 0);
    }

    #[test]
    fn scatter_touches_about_one_pixel_per_dot() {
        let mut image = gray(1000, 1000);
        let mut rng = StdRng::seed_from_u64(7);
        scatter_dots(&mut image, &mut rng, 1000, 1, 1.0);

        let changed = image.pixels().filter(|p| p[0] != 128).count();
        assert!(changed <= 1000);
        assert!(changed >= 950, "only {changed} pixels changed");
    }

    #[test]
    fn scatter_is_balanced_between_dark_and_light() {
        let mut image = gray(400, 400);
        let mut rng = StdRng::seed_from_u64(11);
        scatter_dots(&mut image, &mut rng, 40_000, 1, 0.5);

        let dark = image.pixels().filter(|p| p[0] < 128).count() as f64;
        let light = image.pixels().filter(|p| p[0] > 128).count() as f64;
        assert!((dark / light - 1.0).abs() < 0.1);
        assert!((mean_luma(&image) - 128.0).abs() < 2.0);
    }

    #[test]
    fn dots_are_clipped_at_edges() {
        let mut image = gray(3, 3);
        let mut rng = StdRng::seed_from_u64(3);
        scatter_dots(&mut image, &mut rng, 50, 4, 1.0);
        assert_eq!(image.dimensions(), (3, 3));
    }

    #[test]
    fn warmth_tints_toward_amber_or_blue() {
        let mut warm = gray(4, 4);
        apply_warmth(&mut warm, 1.0);
        let p = warm.get_pixel(0, 0);
        assert!(p[0] > p[2], "warm overlay should favor red");

        let mut cool = gray(4, 4);
        apply_warmth(&mut cool, -1.0);
        let p = cool.get_pixel(0, 0);
        assert!(p[2] > p[0], "cool overlay should favor blue");
    }

    #[test]
    fn warmth_opacity_is_capped() {
        let mut capped = gray(2, 2);
        apply_warmth(&mut capped, 1.0);
        let mut extreme = gray(2, 2);
        apply_warmth(&mut extreme, 8.0);
        assert_eq!(capped, extreme);

        let mut neutral = gray(2, 2);
        apply_warmth(&mut neutral, 0.0);
        assert_eq!(neutral, gray(2, 2));
    }

    #[test]
    fn strength_modulates_noise_density() {
        let bg = classic();
        let low = PaperConfig::new(&bg, 0.0).noise.unwrap();
        let high = PaperConfig::new(&bg, 100.0).noise.unwrap();
        assert_eq!(low.density, (6200.0f32 * 0.9).round());
        assert_eq!(high.density, (6200.0f32 * 1.15).round());
    }

    #[test]
    fn grain_shifts_luminance_only_slightly() {
        let bg = classic();
        let config = PaperConfig {
            noise: None,
            warmth: 0.0,
            ..PaperConfig::new(&bg, 100.0)
        };
        let mut surface = Surface::new(SizePx::new(300, 300), 1);
        config.paint_with(&mut surface, &mut StdRng::seed_from_u64(5));

        let base = bg.base_color.rgb();
        let base_luma = (base[0] as f64 + base[1] as f64 + base[2] as f64) / 3.0;
        assert!((mean_luma(&surface.data) - base_luma).abs() < 2.0);
        assert!(surface.data.pixels().any(|p| p[0] != base[0]));
    }

    #[test]
    fn disabled_noise_and_zero_tone_give_flat_paper() {
        let catalog = PresetCatalog::builtin();
        let BackgroundStrategy::Procedural(modern) = &catalog.get("modern").unwrap().background else {
            unreachable!();
        };
        let config = PaperConfig::new(modern, 0.0);
        assert!(config.noise.is_none());

        let mut surface = Surface::new(SizePx::new(50, 40), 2);
        config.transform(&mut surface);
        let first = *surface.data.get_pixel(0, 0);
        assert_eq!(first.0, [0xF6, 0xF6, 0xF4, 255]);
        assert!(surface.data.pixels().all(|p| *p == first));
    }
}
