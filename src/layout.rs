//! Typography layout: font sizing, shrink-to-fit and placement.
//!
//! The engine works in logical pixels. Given the quote, an optional author
//! line and a preset's typography it produces a [`PageLayout`]: wrapped
//! lines, the resolved font sizes, anchor x-coordinates and baselines.

use serde::{Deserialize, Serialize};

use crate::layer::svg::TextRun;
use crate::preset::{HexColor, TypographySpec};
use crate::shaper::{FontSpec, TextMeasure, measure_max_line_width_by_chars, wrap_text_by_width};
use crate::surface::{AspectRatio, SizePx};

// ============================================================================
// TextAlign
// ============================================================================

/// Horizontal anchor for a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

// ============================================================================
// LayoutConfig
// ============================================================================

/// Tunable constants of the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Content column width as a fraction of page width.
    pub content_width_ratio: f32,
    /// Top safety margin as a fraction of page height.
    pub top_padding_ratio: f32,
    /// Bottom safety margin as a fraction of page height.
    pub bottom_padding_ratio: f32,
    /// Share of the spare band height placed above the text block.
    pub vertical_bias: f32,
    /// Per-iteration font size multiplier while shrinking.
    pub shrink_factor: f32,
    pub max_shrink_iterations: u32,
    /// Shrinking never goes below this size.
    pub min_font_size: f32,
    /// Distance between a preset's largest and smallest initial size.
    pub size_range: f32,
    /// Initial sizes are this much smaller on square pages.
    pub square_size_offset: f32,
    /// Quote characters that cost one pixel of initial size.
    pub chars_per_px: f32,
    /// Gap above the author line, in quote line heights.
    pub author_gap_ratio: f32,
    /// Author line height as a multiple of its font size.
    pub author_line_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_width_ratio: 0.68,
            top_padding_ratio: 0.16,
            bottom_padding_ratio: 0.14,
            vertical_bias: 0.38,
            shrink_factor: 0.92,
            max_shrink_iterations: 6,
            min_font_size: 34.0,
            size_range: 14.0,
            square_size_offset: 2.0,
            chars_per_px: 22.0,
            author_gap_ratio: 1.5,
            author_line_height: 1.25,
        }
    }
}

// ============================================================================
// Layout output
// ============================================================================

/// A positioned block of lines sharing one font.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub lines: Vec<String>,
    pub font: FontSpec,
    pub line_height_px: f32,
    pub color: HexColor,
    pub align: TextAlign,
    /// Anchor x in logical pixels.
    pub x: f32,
    /// Baseline of the first line in logical pixels.
    pub baseline_y: f32,
}

impl LayoutBlock {
    /// Height taken by the lines of this block.
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height_px
    }

    /// Drawable runs, one per line.
    pub fn runs(&self) -> impl Iterator<Item = TextRun<'_>> {
        self.lines.iter().enumerate().map(move |(i, line)| TextRun {
            text: line,
            x: self.x,
            y: self.baseline_y + i as f32 * self.line_height_px,
            font: &self.font,
            color: self.color,
            align: self.align,
        })
    }
}

/// Result of laying out one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub quote: LayoutBlock,
    pub author: Option<LayoutBlock>,
    /// Quote block plus author gap and line, when shown.
    pub total_height: f32,
    pub band_top: f32,
    pub band_bottom: f32,
    /// Quote font size at every shrink step, starting with the initial size.
    pub size_trace: Vec<f32>,
}

impl PageLayout {
    /// Returns true if the text is taller than the safety band.
    pub fn overflows(&self) -> bool {
        self.total_height > self.band_bottom - self.band_top
    }

    /// All drawable runs, quote first.
    pub fn runs(&self) -> Vec<TextRun<'_>> {
        self.quote
            .runs()
            .chain(self.author.iter().flat_map(|author| author.runs()))
            .collect()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// What the engine lays out.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    pub quote: &'a str,
    /// `None` when the author is hidden or blank.
    pub author: Option<&'a str>,
    pub quote_align: TextAlign,
    pub author_align: TextAlign,
    pub ratio: AspectRatio,
    pub typography: &'a TypographySpec,
}

/// Initial quote size: longer quotes start smaller, within the preset range.
pub fn initial_font_size(
    typography: &TypographySpec,
    ratio: AspectRatio,
    quote_chars: usize,
    config: &LayoutConfig,
) -> f32 {
    let offset = match ratio {
        AspectRatio::Square => config.square_size_offset,
        AspectRatio::Portrait => 0.0,
    };
    let max = typography.base_size - offset;
    let min = max - config.size_range;
    (max - quote_chars as f32 / config.chars_per_px)
        .max(min)
        .min(max)
        .round()
}

/// Metrics of the text block at one quote size.
struct Fit {
    size: f32,
    lines: Vec<String>,
    line_height: f32,
    author_gap: f32,
    author_size: f32,
    total: f32,
}

/// Horizontal anchors of the centered content column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub left: f32,
    pub center: f32,
    pub right: f32,
    pub width: f32,
}

impl Column {
    pub fn for_page(page: SizePx, config: &LayoutConfig) -> Self {
        let page_width = page.width as f32;
        let width = (page_width * config.content_width_ratio).round();
        let left = ((page_width - width) / 2.0).round();
        Self {
            left,
            center: (page_width / 2.0).round(),
            right: left + width,
            width,
        }
    }

    pub fn anchor(&self, align: TextAlign) -> f32 {
        match align {
            TextAlign::Left => self.left,
            TextAlign::Center => self.center,
            TextAlign::Right => self.right,
        }
    }
}

/// Lays out a page, shrinking the quote until it fits the safety band or
/// the iteration budget runs out. Remaining overflow is accepted.
pub fn layout_page<M: TextMeasure + ?Sized>(
    measure: &M,
    request: &LayoutRequest<'_>,
    config: &LayoutConfig,
) -> PageLayout {
    let page = request.ratio.logical_size();
    let page_height = page.height as f32;
    let column = Column::for_page(page, config);
    let typography = request.typography;
    let author = request.author.filter(|a| !a.trim().is_empty());

    let quote_font = FontSpec::new(
        typography.quote.font_family.clone(),
        typography.quote.font_weight,
        typography.quote_style(),
        0.0,
    );

    let fit_at = |size: f32| -> Fit {
        let font = quote_font.with_size(size);
        let char_budget = measure_max_line_width_by_chars(measure, &font, typography.max_line_chars);
        let lines = wrap_text_by_width(measure, &font, request.quote, column.width.min(char_budget));
        let line_height = size * typography.line_height;
        let author_gap = (line_height * config.author_gap_ratio).round();
        let author_size = (size * typography.author_scale).round();
        let quote_height = lines.len() as f32 * line_height;
        let total = match author {
            Some(_) => quote_height + author_gap + author_size * config.author_line_height,
            None => quote_height,
        };
        Fit {
            size,
            lines,
            line_height,
            author_gap,
            author_size,
            total,
        }
    };

    let band_top = (page_height * config.top_padding_ratio).round();
    let band_bottom = page_height - (page_height * config.bottom_padding_ratio).round();
    let band = band_bottom - band_top;

    let mut fit = fit_at(initial_font_size(
        typography,
        request.ratio,
        request.quote.chars().count(),
        config,
    ));
    let mut size_trace = vec![fit.size];
    for _ in 0..config.max_shrink_iterations {
        if fit.total <= band {
            break;
        }
        let next = (fit.size * config.shrink_factor)
            .round()
            .max(config.min_font_size)
            .min(fit.size);
        if next >= fit.size {
            break;
        }
        fit = fit_at(next);
        size_trace.push(fit.size);
    }
    if fit.total > band {
        tracing::debug!(total = fit.total, band, "text overflows safety band");
    }

    let start_y = (band_top + (band - fit.total) * config.vertical_bias).round();
    let quote_block = LayoutBlock {
        font: quote_font.with_size(fit.size),
        line_height_px: fit.line_height,
        color: typography.quote.color,
        align: request.quote_align,
        x: column.anchor(request.quote_align),
        baseline_y: start_y,
        lines: fit.lines,
    };

    let author_block = author.map(|text| LayoutBlock {
        baseline_y: start_y + quote_block.height() + fit.author_gap,
        lines: vec![text.to_string()],
        font: FontSpec::new(
            typography.author.font_family.clone(),
            typography.author.font_weight,
            typography.author_style(),
            fit.author_size,
        ),
        line_height_px: fit.author_size * config.author_line_height,
        color: typography.author.color,
        align: request.author_align,
        x: column.anchor(request.author_align),
    });

    PageLayout {
        quote: quote_block,
        author: author_block,
        total_height: fit.total,
        band_top,
        band_bottom,
        size_trace,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{FontStyle, PresetCatalog};
    use crate::shaper::tests::HalfEm;

    fn typography() -> TypographySpec {
        PresetCatalog::builtin().get("classic").unwrap().typography.clone()
    }

    fn request<'a>(quote: &'a str, author: Option<&'a str>, typo: &'a TypographySpec) -> LayoutRequest<'a> {
        LayoutRequest {
            quote,
            author,
            quote_align: TextAlign::Left,
            author_align: TextAlign::Right,
            ratio: AspectRatio::Portrait,
            typography: typo,
        }
    }

    #[test]
    fn initial_size_follows_length_and_ratio() {
        let typo = typography();
        let config = LayoutConfig::default();
        assert_eq!(initial_font_size(&typo, AspectRatio::Portrait, 11, &config), 58.0);
        assert_eq!(initial_font_size(&typo, AspectRatio::Square, 11, &config), 56.0);
        assert_eq!(initial_font_size(&typo, AspectRatio::Portrait, 110, &config), 53.0);
        assert_eq!(initial_font_size(&typo, AspectRatio::Portrait, 400, &config), 44.0);
    }

    #[test]
    fn column_anchors() {
        let column = Column::for_page(SizePx::new(1080, 1350), &LayoutConfig::default());
        assert_eq!(column.width, 734.0);
        assert_eq!(column.anchor(TextAlign::Left), 173.0);
        assert_eq!(column.anchor(TextAlign::Center), 540.0);
        assert_eq!(column.anchor(TextAlign::Right), 907.0);
    }

    #[test]
    fn short_quote_fits_without_shrinking() {
        let typo = typography();
        let layout = layout_page(&HalfEm, &request("Hello world", Some("Ada"), &typo), &LayoutConfig::default());

        assert_eq!(layout.size_trace, vec![58.0]);
        assert_eq!(layout.quote.lines, vec!["Hello world"]);
        assert!(!layout.overflows());

        let author = layout.author.as_ref().unwrap();
        assert_eq!(author.font.style, FontStyle::Italic);
        assert_eq!(author.font.size, (58.0f32 * 0.82).round());
        assert_eq!(author.x, 907.0);
        assert_eq!(author.align, TextAlign::Right);
    }

    #[test]
    fn vertical_start_uses_upper_bias() {
        let typo = typography();
        let config = LayoutConfig::default();
        let layout = layout_page(&HalfEm, &request("Hello world", None, &typo), &config);

        assert_eq!(layout.band_top, 216.0);
        assert_eq!(layout.band_bottom, 1350.0 - 189.0);
        let band = layout.band_bottom - layout.band_top;
        let expected = (layout.band_top + (band - layout.total_height) * 0.38).round();
        assert_eq!(layout.quote.baseline_y, expected);
    }

    #[test]
    fn author_sits_below_quote_block() {
        let typo = typography();
        let layout = layout_page(&HalfEm, &request("Hello world", Some("— Ada"), &typo), &LayoutConfig::default());
        let author = layout.author.as_ref().unwrap();
        let gap = (layout.quote.line_height_px * 1.5).round();
        assert_eq!(author.baseline_y, layout.quote.baseline_y + layout.quote.height() + gap);
        assert_eq!(
            layout.total_height,
            layout.quote.height() + gap + author.font.size * 1.25
        );
    }

    #[test]
    fn hidden_author_excludes_gap() {
        let typo = typography();
        let layout = layout_page(&HalfEm, &request("Hello world", None, &typo), &LayoutConfig::default());
        assert!(layout.author.is_none());
        assert_eq!(layout.total_height, layout.quote.height());

        let blank = layout_page(&HalfEm, &request("Hello world", Some("  "), &typo), &LayoutConfig::default());
        assert!(blank.author.is_none());
        assert_eq!(blank.total_height, blank.quote.height());
    }

    #[test]
    fn shrink_is_monotonic_and_bounded() {
        let typo = typography();
        let config = LayoutConfig::default();
        let quote = "words ".repeat(3000);
        let layout = layout_page(&HalfEm, &request(&quote, Some("Ada"), &typo), &config);

        assert!(layout.size_trace.len() <= config.max_shrink_iterations as usize + 1);
        for pair in layout.size_trace.windows(2) {
            assert!(pair[1] < pair[0], "{:?} is not decreasing", layout.size_trace);
        }
        assert!(layout.quote.font.size >= config.min_font_size);
        assert!(layout.overflows());
    }

    #[test]
    fn shrink_never_grows_small_fonts() {
        let mut typo = typography();
        typo.base_size = 20.0;
        let quote = "words ".repeat(3000);
        let layout = layout_page(&HalfEm, &request(&quote, None, &typo), &LayoutConfig::default());
        assert!(layout.size_trace.iter().all(|&s| s <= layout.size_trace[0]));
    }

    #[test]
    fn medium_quote_shrinks_until_it_fits() {
        let typo = typography();
        let config = LayoutConfig::default();
        let quote = "lorem ipsum dolor ".repeat(22);
        let layout = layout_page(&HalfEm, &request(&quote, Some("Ada"), &typo), &config);

        assert!(layout.size_trace.len() > 1);
        assert!(!layout.overflows());
    }

    #[test]
    fn lines_fit_the_column() {
        let typo = typography();
        let quote = "The most powerful way to change the world is to change the way you see it.";
        let layout = layout_page(&HalfEm, &request(quote, None, &typo), &LayoutConfig::default());
        for line in &layout.quote.lines {
            assert!(HalfEm.measure(&layout.quote.font, line) <= 734.0);
        }
    }

    #[test]
    fn empty_curly_pair_is_one_line() {
        let typo = typography();
        let layout = layout_page(&HalfEm, &request("\u{201C}\u{201D}", None, &typo), &LayoutConfig::default());
        assert_eq!(layout.quote.lines.len(), 1);

        let bare = layout_page(&HalfEm, &request("", None, &typo), &LayoutConfig::default());
        assert!(bare.quote.lines.is_empty());
        assert_eq!(bare.total_height, 0.0);
    }

    #[test]
    fn runs_advance_by_line_height() {
        let typo = typography();
        let quote = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron";
        let layout = layout_page(&HalfEm, &request(quote, Some("Ada"), &typo), &LayoutConfig::default());
        let runs = layout.runs();
        assert_eq!(runs.len(), layout.quote.lines.len() + 1);
        assert!((runs[1].y - runs[0].y - layout.quote.line_height_px).abs() < 1e-3);
        assert_eq!(runs.last().unwrap().text, "Ada");
    }
}
