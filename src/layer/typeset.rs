//! Draws a laid-out page of text onto the surface.

use super::LayerEffect;
use super::svg::{composite_over, parse, render_tree, text_document};
use crate::fonts::FontBook;
use crate::layout::PageLayout;
use crate::surface::Surface;

/// Text layer: the quote and author runs of a [`PageLayout`].
#[derive(Debug, Clone, Copy)]
pub struct TypesetConfig<'a> {
    pub layout: &'a PageLayout,
    pub fonts: &'a FontBook,
}

impl<'a> TypesetConfig<'a> {
    pub fn new(layout: &'a PageLayout, fonts: &'a FontBook) -> Self {
        Self { layout, fonts }
    }
}

impl LayerEffect for TypesetConfig<'_> {
    fn transform(&self, surface: &mut Surface) {
        let runs = self.layout.runs();
        if runs.is_empty() || surface.is_empty() {
            return;
        }
        let doc = text_document(surface.logical, surface.dimensions(), &runs);
        let Some(tree) = parse(&doc, &self.fonts.options()) else {
            return;
        };
        let Some(text) = render_tree(&tree) else {
            return;
        };
        if text.dimensions() != surface.data.dimensions() {
            tracing::warn!(
                rendered = ?text.dimensions(),
                surface = ?surface.data.dimensions(),
                "text layer size mismatch"
            );
            return;
        }
        composite_over(&mut surface.data, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, LayoutRequest, TextAlign, layout_page};
    use crate::preset::PresetCatalog;
    use crate::shaper::TextMeasure;
    use crate::surface::AspectRatio;

    fn layout_with(fonts: &FontBook, ratio: AspectRatio) -> PageLayout {
        let catalog = PresetCatalog::builtin();
        let preset = catalog.get("classic").unwrap();
        let request = LayoutRequest {
            quote: "\u{201C}Hello world\u{201D}",
            author: Some("\u{2014} Ada"),
            quote_align: TextAlign::Center,
            author_align: TextAlign::Right,
            ratio,
            typography: &preset.typography,
        };
        layout_page(fonts, &request, &LayoutConfig::default())
    }

    #[test]
    fn no_fonts_leaves_surface_untouched() {
        let fonts = FontBook::empty();
        let layout = layout_with(&fonts, AspectRatio::Square);
        let mut surface = Surface::for_ratio(AspectRatio::Square, 1);
        surface.fill([240, 240, 240]);
        let before = surface.clone();

        TypesetConfig::new(&layout, &fonts).transform(&mut surface);
        assert_eq!(surface, before);
    }

    #[test]
    fn system_fonts_draw_dark_ink() {
        let fonts = FontBook::system();
        if fonts.face_count() == 0 {
            return;
        }
        let layout = layout_with(&fonts, AspectRatio::Portrait);
        assert!(fonts.measure(&layout.quote.font, "Hello") > 0.0);
        let mut surface = Surface::for_ratio(AspectRatio::Portrait, 1);
        surface.fill([255, 255, 255]);

        TypesetConfig::new(&layout, &fonts).transform(&mut surface);
        assert!(surface.data.pixels().any(|p| p[0] < 128));
        assert!(surface.data.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn preset_families_wrap_and_draw_with_system_fonts() {
        let fonts = FontBook::system();
        if fonts.face_count() == 0 {
            return;
        }
        let catalog = PresetCatalog::builtin();
        let preset = catalog.get("classic").unwrap();
        let request = LayoutRequest {
            quote: "\u{201C}The best way to predict the future is to invent it, one small careful step after another.\u{201D}",
            author: Some("\u{2014} Alan Kay"),
            quote_align: TextAlign::Left,
            author_align: TextAlign::Right,
            ratio: AspectRatio::Portrait,
            typography: &preset.typography,
        };
        let layout = layout_page(&fonts, &request, &LayoutConfig::default());
        assert!(layout.quote.lines.len() > 1, "{:?}", layout.quote.lines);

        let mut surface = Surface::for_ratio(AspectRatio::Portrait, 1);
        surface.fill([255, 255, 255]);
        TypesetConfig::new(&layout, &fonts).transform(&mut surface);
        let dark = surface.data.pixels().filter(|p| p[0] < 100).count();
        assert!(dark > 100, "{dark} dark pixels");
    }
}
