//! Font database shared by measurement and drawing.

use std::path::Path;
use std::sync::Arc;

use resvg::usvg::{self, FontResolver, Options, fontdb};

use crate::error::{LeafletError, LeafletResult};
use crate::layer::svg::{self, TextRun};
use crate::layout::TextAlign;
use crate::preset::HexColor;
use crate::shaper::{FontSpec, TextMeasure};
use crate::surface::SizePx;

/// Page used for measurement documents; wide enough for any single line.
const MEASURE_PAGE: SizePx = SizePx::new(16_384, 1_024);

/// Installed families tried, in order, for each CSS generic keyword.
const SERIF_CANDIDATES: &[&str] = &[
    "Times New Roman",
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "FreeSerif",
    "Georgia",
];
const SANS_CANDIDATES: &[&str] = &[
    "Arial",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "FreeSans",
    "Helvetica",
];
const MONO_CANDIDATES: &[&str] = &[
    "Courier New",
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Noto Sans Mono",
    "FreeMono",
];

/// A cheaply clonable handle to a loaded font database.
#[derive(Debug, Clone)]
pub struct FontBook {
    db: Arc<fontdb::Database>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }
}

impl FontBook {
    /// A font book with no faces. Text measures as zero width.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every font installed on the system.
    #[tracing::instrument]
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        bind_generic_families(&mut db);
        tracing::info!(faces = db.len(), "loaded system fonts");
        Self { db: Arc::new(db) }
    }

    /// Adds a font from raw TTF/OTF/TTC bytes.
    pub fn with_font_data(mut self, data: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.db).load_font_data(data);
        self
    }

    /// Adds a single font file.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> LeafletResult<()> {
        let path = path.as_ref();
        Arc::make_mut(&mut self.db)
            .load_font_file(path)
            .map_err(|source| LeafletError::FontLoad {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Adds every font found under a directory, recursively.
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        Arc::make_mut(&mut self.db).load_fonts_dir(dir);
    }

    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// usvg options wired to this font database.
    ///
    /// Any run resolves to some loaded face as long as the book is not
    /// empty, so a family list naming only uninstalled fonts still measures
    /// and draws.
    pub(crate) fn options(&self) -> Options<'static> {
        let mut opts = Options::default();
        opts.fontdb = Arc::clone(&self.db);
        opts.font_resolver = font_resolver();
        opts
    }
}

/// Points `serif`, `sans-serif` and `monospace` at families that are
/// actually installed. fontdb defaults them to Windows family names.
fn bind_generic_families(db: &mut fontdb::Database) {
    let installed = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    let serif = SERIF_CANDIDATES.iter().copied().find(|name| installed(name));
    let sans = SANS_CANDIDATES.iter().copied().find(|name| installed(name));
    let mono = MONO_CANDIDATES.iter().copied().find(|name| installed(name));

    if let Some(name) = serif {
        db.set_serif_family(name);
    }
    if let Some(name) = sans {
        db.set_sans_serif_family(name);
    }
    if let Some(name) = mono {
        db.set_monospace_family(name);
    }
    tracing::debug!(?serif, ?sans, ?mono, "bound generic font families");
}

/// Face selection that walks the requested families, then every generic
/// family, then the first loaded face.
fn font_resolver() -> FontResolver<'static> {
    FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(name) => fontdb::Family::Name(name),
                })
                .collect();
            families.extend([
                fontdb::Family::Serif,
                fontdb::Family::SansSerif,
                fontdb::Family::Monospace,
            ]);

            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: stretch_of(font.stretch()),
                style: match font.style() {
                    usvg::FontStyle::Normal => fontdb::Style::Normal,
                    usvg::FontStyle::Italic => fontdb::Style::Italic,
                    usvg::FontStyle::Oblique => fontdb::Style::Oblique,
                },
            };
            db.query(&query).or_else(|| db.faces().next().map(|face| face.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

fn stretch_of(stretch: usvg::FontStretch) -> fontdb::Stretch {
    match stretch {
        usvg::FontStretch::UltraCondensed => fontdb::Stretch::UltraCondensed,
        usvg::FontStretch::ExtraCondensed => fontdb::Stretch::ExtraCondensed,
        usvg::FontStretch::Condensed => fontdb::Stretch::Condensed,
        usvg::FontStretch::SemiCondensed => fontdb::Stretch::SemiCondensed,
        usvg::FontStretch::Normal => fontdb::Stretch::Normal,
        usvg::FontStretch::SemiExpanded => fontdb::Stretch::SemiExpanded,
        usvg::FontStretch::Expanded => fontdb::Stretch::Expanded,
        usvg::FontStretch::ExtraExpanded => fontdb::Stretch::ExtraExpanded,
        usvg::FontStretch::UltraExpanded => fontdb::Stretch::UltraExpanded,
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        if text.trim().is_empty() || self.db.len() == 0 {
            return 0.0;
        }
        let run = TextRun {
            text,
            x: 0.0,
            y: MEASURE_PAGE.height as f32 / 2.0,
            font,
            color: HexColor::new(0, 0, 0),
            align: TextAlign::Left,
        };
        let doc = svg::text_document(MEASURE_PAGE, MEASURE_PAGE, &[run]);
        svg::parse(&doc, &self.options())
            .map(|tree| svg::text_extent(&tree))
            .unwrap_or(0.0)
    }
}
