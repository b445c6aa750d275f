//! Layer infrastructure for page rendering.
//!
//! Each layer is a small config value implementing [`LayerEffect`]. The
//! renderer sequences them over one [`Surface`]:
//!
//! ```text
//! Procedural preset               Image-based preset
//!
//! ┌───────────┐                   ┌────────────┐
//! │   Paper   │ ◄── cached        │  Backdrop  │ ◄── cover-fit + multiply
//! └─────┬─────┘                   └─────┬──────┘
//!       ▼                               │
//! ┌───────────┐                         │
//! │   Tone    │                         │
//! └─────┬─────┘                         │
//!       ▼                               ▼
//! ┌─────────────────────────────────────────────┐
//! │                  Typeset                    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod backdrop;
pub mod cache;
pub mod paper;
pub mod svg;
pub mod tone;
pub mod typeset;

pub use backdrop::BackdropConfig;
pub use cache::{BackgroundCache, BackgroundKey, FittedBackdrop, quantize_strength};
pub use paper::PaperConfig;
pub use tone::ToneFilter;
pub use typeset::TypesetConfig;

use crate::surface::Surface;

/// Trait for layer configurations that know how to paint themselves.
pub trait LayerEffect {
    /// Paint this layer onto the surface, in device pixels.
    fn transform(&self, surface: &mut Surface);
}

/// Blends one channel toward `target` at opacity `a`.
#[inline]
pub(crate) fn blend_channel(value: u8, target: u8, a: f32) -> u8 {
    (value as f32 * (1.0 - a) + target as f32 * a).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_channel_endpoints() {
        assert_eq!(blend_channel(200, 0, 0.0), 200);
        assert_eq!(blend_channel(200, 0, 1.0), 0);
        assert_eq!(blend_channel(100, 255, 0.5), 178);
    }
}
