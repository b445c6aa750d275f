//! Text measurement and greedy line wrapping.

use crate::preset::FontStyle;

/// Sample used to estimate an average glyph advance.
const WIDTH_SAMPLE: &str = "abcdefghijklmnopqrstuvwxyz";

/// A resolved font for one text role.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    /// Size in logical pixels.
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, style: FontStyle, size: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            style,
            size,
        }
    }

    /// Returns a copy at another size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Canvas-style shorthand, e.g. `italic 400 47px serif`.
    pub fn css(&self) -> String {
        match self.style {
            FontStyle::Normal => format!("{} {}px {}", self.weight, self.size, self.family),
            FontStyle::Italic => format!("italic {} {}px {}", self.weight, self.size, self.family),
        }
    }
}

/// Measures the advance width of a run of text.
pub trait TextMeasure {
    /// Width in logical pixels of `text` set in `font`.
    fn measure(&self, font: &FontSpec, text: &str) -> f32;
}

/// Greedily packs whitespace-separated words into lines no wider than
/// `max_width`.
///
/// A word wider than `max_width` is never split; it gets a line of its own.
pub fn wrap_text_by_width<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec,
    text: &str,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && measure.measure(font, &candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Width budget for `max_chars` characters of average lowercase text.
pub fn measure_max_line_width_by_chars<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec,
    max_chars: u32,
) -> f32 {
    let sample_width = measure.measure(font, WIDTH_SAMPLE);
    sample_width / WIDTH_SAMPLE.len() as f32 * max_chars as f32
}
