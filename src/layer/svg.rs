//! SVG text rendering utilities using resvg/usvg.
//!
//! Text is typeset by emitting a small SVG document of `<text>` runs and
//! letting usvg shape it against the shared font database. The same
//! documents back both measurement and drawing.

use std::fmt::Write as _;

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Node, Options, Tree};

use crate::layout::TextAlign;
use crate::preset::HexColor;
use crate::shaper::FontSpec;
use crate::surface::SizePx;

// ============================================================================
// Document building
// ============================================================================

/// One positioned line of text.
#[derive(Debug, Clone)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Anchor x in logical pixels.
    pub x: f32,
    /// Alphabetic baseline in logical pixels.
    pub y: f32,
    pub font: &'a FontSpec,
    pub color: HexColor,
    pub align: TextAlign,
}

/// Escapes text for use in XML content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn text_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    }
}

/// Builds an SVG document whose viewBox is the logical page and whose
/// pixel size is `device`.
pub fn text_document(logical: SizePx, device: SizePx, runs: &[TextRun<'_>]) -> String {
    let mut doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        device.width, device.height, logical.width, logical.height
    );
    for run in runs {
        // Writing to a String cannot fail.
        let _ = write!(
            doc,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" font-style="{}" fill="{}" text-anchor="{}" xml:space="preserve">{}</text>"#,
            run.x,
            run.y,
            escape_xml(&run.font.family),
            run.font.size,
            run.font.weight,
            run.font.style.as_str(),
            run.color,
            text_anchor(run.align),
            escape_xml(run.text),
        );
    }
    doc.push_str("</svg>");
    doc
}

// ============================================================================
// Parsing and rendering
// ============================================================================

/// Parses an SVG document, logging and discarding malformed input.
pub fn parse(svg_data: &str, opts: &Options<'_>) -> Option<Tree> {
    match Tree::from_str(svg_data, opts) {
        Ok(tree) => Some(tree),
        Err(err) => {
            tracing::warn!(%err, "failed to parse text document");
            None
        }
    }
}

/// Widest text node in a parsed document, in user units.
///
/// usvg builds the text bounding box from glyph advances and font
/// metrics rather than outlines, so side bearings and spaces count the
/// same way canvas `measureText` counts them.
pub fn text_extent(tree: &Tree) -> f32 {
    tree.root()
        .children()
        .iter()
        .filter_map(|node| match node {
            Node::Text(text) => Some(text.bounding_box().width()),
            _ => None,
        })
        .fold(0.0, f32::max)
}

/// Renders a parsed tree to an RGBA image at the tree's pixel size.
///
/// Returns `None` if the tree has a zero-sized canvas.
pub fn render_tree(tree: &Tree) -> Option<RgbaImage> {
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())?;
    resvg::render(tree, Transform::identity(), &mut pixmap.as_mut());
    straight_alpha_image(&pixmap)
}

/// Copies a premultiplied pixmap into a straight-alpha image.
fn straight_alpha_image(pixmap: &Pixmap) -> Option<RgbaImage> {
    let raw = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
}

// ============================================================================
// Compositing
// ============================================================================

/// Draws `src` over a same-sized `dest`. Extra pixels in either image are
/// ignored.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage) {
    for (dst, &src) in dest.pixels_mut().zip(src.pixels()) {
        match src[3] {
            0 => {}
            255 => *dst = src,
            _ => *dst = alpha_blend(src, *dst),
        }
    }
}

/// Source-over blend of two straight-alpha pixels.
pub fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0 * (1.0 - sa);
    let out_a = sa + da;
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = ((src[c] as f32 * sa + dst[c] as f32 * da) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::FontStyle;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_xml(r#"<b> & "it's""#),
            "&lt;b&gt; &amp; &quot;it&apos;s&quot;"
        );
    }

    #[test]
    fn document_maps_logical_to_device() {
        let font = FontSpec::new("\"Libre Baskerville\", serif", 400, FontStyle::Italic, 40.0);
        let runs = [TextRun {
            text: "A & B",
            x: 540.0,
            y: 300.0,
            font: &font,
            color: HexColor::new(0x1E, 0x1E, 0x1E),
            align: TextAlign::Center,
        }];
        let doc = text_document(SizePx::new(1080, 1350), SizePx::new(2160, 2700), &runs);

        assert!(doc.contains(r#"width="2160" height="2700" viewBox="0 0 1080 1350""#));
        assert!(doc.contains(r#"text-anchor="middle""#));
        assert!(doc.contains(r#"font-style="italic""#));
        assert!(doc.contains("&quot;Libre Baskerville&quot;, serif"));
        assert!(doc.contains(">A &amp; B</text>"));
        assert!(doc.contains("#1E1E1E"));
    }

    #[test]
    fn empty_document_renders_transparent() {
        let doc = text_document(SizePx::new(20, 10), SizePx::new(40, 20), &[]);
        let tree = parse(&doc, &Options::default()).unwrap();
        assert_eq!(text_extent(&tree), 0.0);

        let img = render_tree(&tree).unwrap();
        assert_eq!(img.dimensions(), (40, 20));
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn opaque_and_clear_sources() {
        let mut dest = RgbaImage::from_pixel(3, 1, Rgba([255, 0, 0, 255]));
        let mut src = RgbaImage::new(3, 1);
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        composite_over(&mut dest, &src);

        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(dest.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn half_ink_on_opaque_paper() {
        let blended = alpha_blend(Rgba([0, 0, 0, 128]), Rgba([200, 100, 50, 255]));
        assert_eq!(blended[3], 255);
        assert_eq!(blended[0], 100);
        assert!(blended[1] < 100 && blended[2] < 50);

        assert_eq!(alpha_blend(Rgba([9, 9, 9, 0]), Rgba([0, 0, 0, 0])).0, [0, 0, 0, 0]);
    }
}
