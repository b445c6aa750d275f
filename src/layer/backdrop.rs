//! Image-based backgrounds: a cover-fitted paper photo with a filter
//! texture multiplied over it.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::LayerEffect;
use super::svg::composite_over;
use crate::surface::{RectPx, SizePx, Surface};

/// Source rectangle that covers `target` with a centered crop, preserving
/// the source aspect ratio.
pub fn cover_crop(source: SizePx, target: SizePx) -> RectPx {
    if source.width == 0 || source.height == 0 || target.width == 0 || target.height == 0 {
        return RectPx::new(0, 0, source.width, source.height);
    }
    let scale = f64::max(
        target.width as f64 / source.width as f64,
        target.height as f64 / source.height as f64,
    );
    let width = ((target.width as f64 / scale).round() as u32).clamp(1, source.width);
    let height = ((target.height as f64 / scale).round() as u32).clamp(1, source.height);
    RectPx::new(
        (source.width - width) / 2,
        (source.height - height) / 2,
        width,
        height,
    )
}

/// Scales and crops `source` so it fills `target` exactly.
pub fn cover_fit(source: &RgbaImage, target: SizePx) -> RgbaImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return RgbaImage::new(target.width, target.height);
    }
    let crop = cover_crop(SizePx::new(width, height), target);
    let cropped = imageops::crop_imm(source, crop.x, crop.y, crop.width, crop.height).to_image();
    if cropped.dimensions() == (target.width, target.height) {
        return cropped;
    }
    imageops::resize(&cropped, target.width, target.height, FilterType::Triangle)
}

/// Multiplies `src` into `dest` at `opacity`. Never lightens.
pub fn multiply_blend(dest: &mut RgbaImage, src: &RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return;
    }
    for (dst, src) in dest.pixels_mut().zip(src.pixels()) {
        let a = src[3] as f32 / 255.0 * opacity;
        if a == 0.0 {
            continue;
        }
        for c in 0..3 {
            let d = dst[c] as f32;
            let multiplied = d * src[c] as f32 / 255.0;
            dst[c] = (d * (1.0 - a) + multiplied * a).round() as u8;
        }
    }
}

/// A cover-fitted background and filter pair for one device size.
#[derive(Debug, Clone)]
pub struct BackdropConfig {
    pub background: Arc<RgbaImage>,
    pub filter: Arc<RgbaImage>,
    /// Filter opacity, 0..1.
    pub opacity: f32,
}

impl BackdropConfig {
    pub fn new(background: Arc<RgbaImage>, filter: Arc<RgbaImage>, opacity: f32) -> Self {
        Self {
            background,
            filter,
            opacity,
        }
    }
}

impl LayerEffect for BackdropConfig {
    fn transform(&self, surface: &mut Surface) {
        for pixel in surface.data.pixels_mut() {
            *pixel = Rgba([255, 255, 255, 255]);
        }
        let size = surface.dimensions();
        if self.background.dimensions() == (size.width, size.height) {
            composite_over(&mut surface.data, &self.background);
        } else {
            composite_over(&mut surface.data, &cover_fit(&self.background, size));
        }
        if self.filter.dimensions() == (size.width, size.height) {
            multiply_blend(&mut surface.data, &self.filter, self.opacity);
        } else {
            multiply_blend(&mut surface.data, &cover_fit(&self.filter, size), self.opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_wide_source_to_square() {
        let crop = cover_crop(SizePx::new(200, 100), SizePx::new(100, 100));
        assert_eq!(crop, RectPx::new(50, 0, 100, 100));
    }

    #[test]
    fn crop_tall_source_to_portrait() {
        let crop = cover_crop(SizePx::new(1000, 3000), SizePx::new(1080, 1350));
        assert_eq!(crop.width, 1000);
        assert_eq!(crop.height, 1250);
        assert_eq!(crop.y, 875);
        assert_eq!(crop.x, 0);
    }

    #[test]
    fn cover_fit_hits_target_size() {
        let source = RgbaImage::from_pixel(37, 91, Rgba([10, 20, 30, 255]));
        let fitted = cover_fit(&source, SizePx::new(60, 75));
        assert_eq!(fitted.dimensions(), (60, 75));
        assert_eq!(*fitted.get_pixel(30, 30), Rgba([10, 20, 30, 255]));

        let empty = cover_fit(&RgbaImage::new(0, 0), SizePx::new(4, 4));
        assert_eq!(empty.dimensions(), (4, 4));
    }

    #[test]
    fn multiply_with_white_is_identity() {
        let mut dest = RgbaImage::from_pixel(2, 2, Rgba([120, 60, 200, 255]));
        let before = dest.clone();
        multiply_blend(&mut dest, &RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])), 1.0);
        assert_eq!(dest, before);
    }

    #[test]
    fn multiply_opacity_scales_effect() {
        let black = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));

        let mut full = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        multiply_blend(&mut full, &black, 1.0);
        assert_eq!(full.get_pixel(0, 0).0, [0, 0, 0, 255]);

        let mut half = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        multiply_blend(&mut half, &black, 0.5);
        assert_eq!(half.get_pixel(0, 0).0, [100, 100, 100, 255]);

        let mut none = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        multiply_blend(&mut none, &black, 0.0);
        assert_eq!(none.get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn multiply_never_lightens() {
        let mut dest = RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255]));
        let before = dest.clone();
        let filter = RgbaImage::from_fn(16, 16, |x, y| Rgba([(y * 15) as u8, 255, (x * 15) as u8, 200]));
        multiply_blend(&mut dest, &filter, 0.8);
        for (after, before) in dest.pixels().zip(before.pixels()) {
            for c in 0..3 {
                assert!(after[c] <= before[c]);
            }
        }
    }

    #[test]
    fn backdrop_paints_opaque_frame() {
        let bg = Arc::new(RgbaImage::from_pixel(8, 10, Rgba([200, 180, 160, 255])));
        let filter = Arc::new(RgbaImage::from_pixel(8, 10, Rgba([128, 128, 128, 255])));
        let mut surface = Surface::new(SizePx::new(4, 5), 2);

        BackdropConfig::new(bg, filter, 0.0).transform(&mut surface);
        assert!(surface.data.pixels().all(|p| p.0 == [200, 180, 160, 255]));

        let bg = Arc::new(RgbaImage::from_pixel(3, 3, Rgba([200, 200, 200, 255])));
        let filter = Arc::new(RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255])));
        BackdropConfig::new(bg, filter, 1.0).transform(&mut surface);
        assert!(surface.data.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}
