//! Font lookup and raw glyph outline extraction.
//!
//! Outline extraction sits behind the [`OutlineSource`] trait so the glyph
//! builder never touches global font state. [`SystemFontSource`] resolves
//! installed faces through `fontdb` and flattens their outlines with `lyon`;
//! [`StaticOutlineSource`] serves fixed block glyphs for offline use and tests.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use geo::Coord;
use lyon::math::point;
use lyon::path::iterator::PathIterator;
use lyon::path::Path;
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use spiralband_core::{ResourceError, Result, TextStyle};
use std::{
    collections::HashMap,
    fs,
    sync::{Arc, Mutex},
};
use tracing::debug;

/// One closed polygonal contour in the text plane (y up). The closing vertex
/// is implicit.
pub type Contour = Vec<Coord<f64>>;

/// Curve flattening tolerance in mm.
const DEFAULT_TOLERANCE: f32 = 0.01;

/// Font family plus weight.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, bold: bool) -> Self {
        Self {
            family: family.into(),
            bold,
        }
    }
}

impl From<&TextStyle> for FontSpec {
    fn from(style: &TextStyle) -> Self {
        Self::new(style.font_family.clone(), style.bold)
    }
}

/// Turns a text string into raw outline contours.
pub trait OutlineSource {
    /// Contours of `text` laid out on a baseline through the origin with an
    /// em height of `size`. Orientation and nesting are not normalised.
    fn outline(&self, text: &str, font: &FontSpec, size: f64) -> Result<Vec<Contour>>;
}

/// Outline source backed by the fonts installed on this machine.
pub struct SystemFontSource {
    db: Database,
    cache: Mutex<HashMap<FontSpec, Arc<Font<'static>>>>,
    tolerance: f32,
}

impl SystemFontSource {
    /// Scans the system font directories.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::with_database(db)
    }

    /// Uses a caller-populated database, e.g. one holding only bundled fonts.
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            cache: Mutex::new(HashMap::new()),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn list_font_families(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn font_for(&self, spec: &FontSpec) -> Result<Arc<Font<'static>>> {
        if let Some(font) = self
            .cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(spec)
        {
            return Ok(Arc::clone(font));
        }

        let font = Arc::new(self.load_font(spec)?);
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(spec.clone(), Arc::clone(&font));
        Ok(font)
    }

    fn load_font(&self, spec: &FontSpec) -> Result<Font<'static>> {
        let families: Vec<Family<'_>> = match spec.family.trim() {
            "" | "Sans" => vec![Family::SansSerif],
            "Serif" => vec![Family::Serif],
            "Monospace" => vec![Family::Monospace],
            other => vec![Family::Name(other)],
        };

        let query = Query {
            families: &families,
            weight: if spec.bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let unavailable = || ResourceError::FontUnavailable {
            family: spec.family.clone(),
            bold: spec.bold,
        };
        let id = self.db.query(&query).ok_or_else(unavailable)?;
        let face = self.db.face(id).ok_or_else(unavailable)?;

        let load_error = |reason: String| ResourceError::FontLoad {
            family: spec.family.clone(),
            reason,
        };
        let bytes = match &face.source {
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                fs::read(path).map_err(|e| load_error(format!("{}: {e}", path.display())))?
            }
            fontdb::Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        };

        debug!(family = %spec.family, bold = spec.bold, index = face.index, "loaded font face");
        Font::try_from_vec_and_index(bytes, face.index)
            .ok_or_else(|| load_error("unparseable font data".to_string()).into())
    }
}

impl Default for SystemFontSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineSource for SystemFontSource {
    fn outline(&self, text: &str, font: &FontSpec, size: f64) -> Result<Vec<Contour>> {
        let face = self.font_for(font)?;
        let scale = Scale::uniform(em_to_pixel_height(&face, size));

        let mut collector = ContourCollector::new();
        for glyph in face.layout(text, scale, rt_point(0.0, 0.0)) {
            // Positioned outlines are relative to the glyph's pixel box, so
            // place the unpositioned outline at the pen position instead.
            let pen = glyph.position();
            collector.set_origin(pen.x, pen.y);
            // Whitespace and unmapped glyphs have no outline
            glyph.unpositioned().build_outline(&mut collector);
        }
        Ok(collector.into_contours(self.tolerance))
    }
}

/// rusttype scales by ascent-to-descent height; convert an em size to that.
fn em_to_pixel_height(font: &Font<'_>, size: f64) -> f32 {
    let units_per_em = f64::from(font.units_per_em());
    let metrics = font.v_metrics_unscaled();
    let extent = f64::from(metrics.ascent - metrics.descent);
    if units_per_em > 0.0 && extent > 0.0 {
        (size * extent / units_per_em) as f32
    } else {
        size as f32
    }
}

/// Receives rusttype outline callbacks into a lyon path.
struct ContourCollector {
    builder: lyon::path::path::Builder,
    open: bool,
    origin: (f32, f32),
}

impl ContourCollector {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
            open: false,
            origin: (0.0, 0.0),
        }
    }

    /// Offset added to every following outline point.
    fn set_origin(&mut self, x: f32, y: f32) {
        self.origin = (x, y);
    }

    fn at(&self, x: f32, y: f32) -> lyon::math::Point {
        point(x + self.origin.0, y + self.origin.1)
    }

    fn into_contours(mut self, tolerance: f32) -> Vec<Contour> {
        if self.open {
            self.builder.end(true);
        }
        let path = self.builder.build();

        let mut contours = Vec::new();
        let mut current: Contour = Vec::new();
        for event in path.iter().flattened(tolerance) {
            match event {
                lyon::path::Event::Begin { at } => {
                    current.clear();
                    current.push(flip(at.x, at.y));
                }
                lyon::path::Event::Line { to, .. } => {
                    current.push(flip(to.x, to.y));
                }
                lyon::path::Event::End { .. } => {
                    if current.len() > 1 && current.first() == current.last() {
                        current.pop();
                    }
                    if !current.is_empty() {
                        contours.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            }
        }
        contours
    }
}

/// rusttype lays glyphs out y-down; the text plane is y-up.
fn flip(x: f32, y: f32) -> Coord<f64> {
    Coord {
        x: x as f64,
        y: -(y as f64),
    }
}

impl OutlineBuilder for ContourCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.open {
            self.builder.end(true);
        }
        let at = self.at(x, y);
        self.builder.begin(at);
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = self.at(x, y);
        self.builder.line_to(to);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (ctrl, to) = (self.at(x1, y1), self.at(x, y));
        self.builder.quadratic_bezier_to(ctrl, to);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (ctrl1, ctrl2, to) = (self.at(x1, y1), self.at(x2, y2), self.at(x, y));
        self.builder.cubic_bezier_to(ctrl1, ctrl2, to);
    }

    fn close(&mut self) {
        if self.open {
            self.builder.end(true);
            self.open = false;
        }
    }
}

/// Fixed glyph table in em units, laid out with a constant advance.
///
/// Any family is accepted. Characters without an entry use the fallback
/// glyph, or produce nothing when there is none.
#[derive(Debug, Clone)]
pub struct StaticOutlineSource {
    glyphs: HashMap<char, Vec<Contour>>,
    fallback: Option<Vec<Contour>>,
    advance: f64,
}

impl StaticOutlineSource {
    pub fn new(advance: f64) -> Self {
        Self {
            glyphs: HashMap::new(),
            fallback: None,
            advance,
        }
    }

    pub fn with_glyph(mut self, ch: char, contours: Vec<Contour>) -> Self {
        self.glyphs.insert(ch, contours);
        self
    }

    pub fn with_fallback(mut self, contours: Vec<Contour>) -> Self {
        self.fallback = Some(contours);
        self
    }

    /// Rectilinear block letters, 0.6 em wide and 0.7 em tall.
    ///
    /// Enclosed counters are modelled for `O 0 D Q` (one) and `B 8` (two);
    /// `I 1 l i |` are bars, `-` and `.` are small bars, space is empty and
    /// everything else is a solid block.
    pub fn block_letters() -> Self {
        let solid = rect(0.0, 0.0, 0.6, 0.7);
        let ring = vec![solid.clone(), rect(0.15, 0.15, 0.45, 0.55)];
        let double_ring = vec![
            solid.clone(),
            rect(0.15, 0.1, 0.45, 0.3),
            rect(0.15, 0.4, 0.45, 0.6),
        ];
        let bar = vec![rect(0.2, 0.0, 0.4, 0.7)];

        let mut source = Self::new(0.7).with_fallback(vec![solid]);
        for ch in ['O', '0', 'D', 'Q'] {
            source = source.with_glyph(ch, ring.clone());
        }
        for ch in ['B', '8'] {
            source = source.with_glyph(ch, double_ring.clone());
        }
        for ch in ['I', '1', 'l', 'i', '|'] {
            source = source.with_glyph(ch, bar.clone());
        }
        source
            .with_glyph('-', vec![rect(0.0, 0.3, 0.6, 0.4)])
            .with_glyph('.', vec![rect(0.2, 0.0, 0.4, 0.1)])
            .with_glyph(' ', Vec::new())
    }
}

impl OutlineSource for StaticOutlineSource {
    fn outline(&self, text: &str, _font: &FontSpec, size: f64) -> Result<Vec<Contour>> {
        let mut contours = Vec::new();
        for (index, ch) in text.chars().enumerate() {
            let Some(glyph) = self.glyphs.get(&ch).or(self.fallback.as_ref()) else {
                continue;
            };
            let offset = index as f64 * self.advance;
            contours.extend(glyph.iter().map(|contour| {
                contour
                    .iter()
                    .map(|c| Coord {
                        x: (c.x + offset) * size,
                        y: c.y * size,
                    })
                    .collect::<Contour>()
            }));
        }
        Ok(contours)
    }
}

/// Counter-clockwise axis-aligned rectangle contour.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
    vec![
        Coord { x: x0, y: y0 },
        Coord { x: x1, y: y0 },
        Coord { x: x1, y: y1 },
        Coord { x: x0, y: y1 },
    ]
}
