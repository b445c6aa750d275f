//! Single-slot caches for rendered backgrounds.
//!
//! Procedural paper is the expensive part of a frame, and while a user
//! types only the text layer changes. The last background buffer is kept
//! and copied back as long as its key matches.

use std::sync::Arc;

use image::RgbaImage;

use crate::surface::{SizePx, Surface};

/// Strength granularity of the background cache.
pub const STRENGTH_BUCKET: f32 = 5.0;

/// Rounds a 0..100 strength to the nearest cache bucket.
pub fn quantize_strength(strength: f32) -> u32 {
    if strength.is_nan() {
        return 0;
    }
    ((strength.clamp(0.0, 100.0) / STRENGTH_BUCKET).round() * STRENGTH_BUCKET) as u32
}

/// Everything a procedural background depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackgroundKey {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: u32,
    pub preset_id: String,
    /// Quantized strength, a multiple of [`STRENGTH_BUCKET`].
    pub strength: u32,
}

impl BackgroundKey {
    pub fn new(surface: &Surface, preset_id: &str, strength: f32) -> Self {
        Self {
            width: surface.logical.width,
            height: surface.logical.height,
            pixel_ratio: surface.pixel_ratio,
            preset_id: preset_id.to_string(),
            strength: quantize_strength(strength),
        }
    }
}

/// Cover-fitted textures for an image-based preset.
#[derive(Debug, Clone)]
pub struct FittedBackdrop {
    pub background: Arc<RgbaImage>,
    pub filter: Arc<RgbaImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FitKey {
    preset_id: String,
    size: SizePx,
}

#[derive(Debug, Default)]
pub struct BackgroundCache {
    slot: Option<(BackgroundKey, RgbaImage)>,
    fitted: Option<(FitKey, FittedBackdrop)>,
    generations: u64,
    hits: u64,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached buffer, if its key matches.
    pub fn get(&self, key: &BackgroundKey) -> Option<&RgbaImage> {
        self.slot
            .as_ref()
            .filter(|(cached, _)| cached == key)
            .map(|(_, image)| image)
    }

    /// Copies the cached buffer into `surface` on a key match.
    pub fn restore_into(&mut self, key: &BackgroundKey, surface: &mut Surface) -> bool {
        let Some(image) = self.get(key) else {
            return false;
        };
        if image.dimensions() != surface.data.dimensions() {
            return false;
        }
        surface.data.copy_from_slice(image);
        self.hits += 1;
        true
    }

    /// Replaces the slot with a freshly generated background.
    pub fn store(&mut self, key: BackgroundKey, image: RgbaImage) {
        self.generations += 1;
        self.slot = Some((key, image));
    }

    /// Cover-fitted textures for `preset_id` at `size`, computed by `fit`
    /// on a miss.
    pub fn fitted_or_insert_with(
        &mut self,
        preset_id: &str,
        size: SizePx,
        fit: impl FnOnce() -> FittedBackdrop,
    ) -> FittedBackdrop {
        let key = FitKey {
            preset_id: preset_id.to_string(),
            size,
        };
        if let Some((cached, fitted)) = &self.fitted {
            if *cached == key {
                return fitted.clone();
            }
        }
        let fitted = fit();
        self.fitted = Some((key, fitted.clone()));
        fitted
    }

    /// Number of backgrounds generated since creation.
    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// Number of frames served from the slot.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.slot = None;
        self.fitted = None;
    }
}
