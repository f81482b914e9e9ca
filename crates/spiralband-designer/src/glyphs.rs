//! Text to emboss-mask polygons.
//!
//! Raw outline contours from an [`OutlineSource`] are filtered, centred on the
//! text anchor, paired into outer rings with their holes and passed through a
//! boolean cleanup before being used as containment masks in the band's local
//! (y, z) plane.

use crate::font_manager::{Contour, FontSpec, OutlineSource};
use geo::{
    Area, BooleanOps, BoundingRect, Contains, Coord, EuclideanDistance, Intersects, Line,
    LineString, MapCoords, MultiPolygon, Point, Polygon, Rect, Winding,
};
use spiralband_core::{Result, TextStyle};
use std::panic;
use tracing::{debug, warn};

/// Rings with a smaller area are treated as degenerate.
pub const MIN_RING_AREA: f64 = 1e-9;

/// Distance within which a smaller contour still counts as lying inside an
/// outer ring.
pub const HOLE_TOLERANCE: f64 = 1e-4;

/// Immutable set of polygons-with-holes for one piece of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphPolygonSet {
    polygons: Vec<Polygon<f64>>,
    bounds: Vec<Rect<f64>>,
}

impl GlyphPolygonSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon<f64>>) -> Self {
        let (polygons, bounds) = polygons
            .into_iter()
            .filter_map(|p| p.bounding_rect().map(|r| (p, r)))
            .unzip();
        Self { polygons, bounds }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Total filled area (holes excluded)
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let mut iter = self.bounds.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| {
            Rect::new(
                Coord {
                    x: acc.min().x.min(r.min().x),
                    y: acc.min().y.min(r.min().y),
                },
                Coord {
                    x: acc.max().x.max(r.max().x),
                    y: acc.max().y.max(r.max().y),
                },
            )
        }))
    }

    /// Whether the local point (`y`, `z`) is inside an outer ring and outside
    /// all of that ring's holes.
    pub fn contains(&self, y: f64, z: f64) -> bool {
        let c = Coord { x: y, y: z };
        self.polygons.iter().zip(&self.bounds).any(|(polygon, r)| {
            c.x >= r.min().x
                && c.x <= r.max().x
                && c.y >= r.min().y
                && c.y <= r.max().y
                && polygon.contains(&c)
        })
    }

    /// Reflection about the vertical centreline of the set's bounding box.
    pub fn mirrored(&self) -> Self {
        let Some(r) = self.bounding_rect() else {
            return Self::empty();
        };
        let axis_sum = r.min().x + r.max().x;
        Self::from_polygons(
            self.polygons
                .iter()
                .map(|p| {
                    p.map_coords(|c| Coord {
                        x: axis_sum - c.x,
                        y: c.y,
                    })
                })
                .collect(),
        )
    }
}

/// Builds [`GlyphPolygonSet`]s from text using an injected outline source.
pub struct GlyphPolygonBuilder<'a> {
    source: &'a dyn OutlineSource,
}

impl<'a> GlyphPolygonBuilder<'a> {
    pub fn new(source: &'a dyn OutlineSource) -> Self {
        Self { source }
    }

    /// Polygon set for `text`, centred on `style.anchor` and optionally
    /// mirrored. Blank text gives an empty set.
    pub fn build(&self, text: &str, style: &TextStyle, mirror: bool) -> Result<GlyphPolygonSet> {
        if text.trim().is_empty() {
            return Ok(GlyphPolygonSet::empty());
        }

        let raw = self
            .source
            .outline(text, &FontSpec::from(style), style.size)?;
        let raw_count = raw.len();

        let mut rings: Vec<(LineString<f64>, f64)> = raw
            .into_iter()
            .filter_map(usable_ring)
            .map(|ring| {
                let area = Polygon::new(ring.clone(), vec![]).unsigned_area();
                (ring, area)
            })
            .collect();
        if rings.len() < raw_count {
            debug!(
                text,
                dropped = raw_count - rings.len(),
                "dropped degenerate glyph contours"
            );
        }

        let Some(extent) = rings_extent(rings.iter().map(|(r, _)| r)) else {
            return Ok(GlyphPolygonSet::empty());
        };
        let center = extent.center();
        let (dx, dy) = (style.anchor[0] - center.x, style.anchor[1] - center.y);
        for (ring, _) in rings.iter_mut() {
            ring.0.iter_mut().for_each(|c| {
                c.x += dx;
                c.y += dy;
            });
        }

        rings.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut polygons = Vec::new();
        for (outer, holes) in nest_rings(rings.into_iter().map(|(r, _)| r).collect()) {
            polygons.extend(cleanup(outer, holes));
        }

        let set = GlyphPolygonSet::from_polygons(polygons);
        debug!(text, polygons = set.len(), mirror, "built glyph polygons");
        Ok(if mirror { set.mirrored() } else { set })
    }
}

/// Closed ring from a raw contour, or `None` if it is degenerate or
/// self-intersecting.
fn usable_ring(mut contour: Contour) -> Option<LineString<f64>> {
    contour.dedup();
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    if contour.len() < 3 || contour.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return None;
    }
    if self_intersects(&contour) {
        return None;
    }

    let ring = LineString::from(contour);
    if Polygon::new(ring.clone(), vec![]).unsigned_area() <= MIN_RING_AREA {
        return None;
    }
    Some(ring)
}

/// Whether any two non-adjacent edges of the implicitly closed `contour` touch.
fn self_intersects(contour: &[Coord<f64>]) -> bool {
    let n = contour.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(contour[i], contour[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return true;
            }
        }
    }
    false
}

fn rings_extent<'r>(rings: impl Iterator<Item = &'r LineString<f64>>) -> Option<Rect<f64>> {
    let mut min = Coord {
        x: f64::INFINITY,
        y: f64::INFINITY,
    };
    let mut max = Coord {
        x: f64::NEG_INFINITY,
        y: f64::NEG_INFINITY,
    };
    for c in rings.flat_map(|r| r.0.iter()) {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
    }
    (min.x <= max.x && min.y <= max.y).then(|| Rect::new(min, max))
}

/// Pairs rings (sorted by descending area) into outers and their holes.
///
/// A ring becomes a hole of the first larger outer it lies within, unless it
/// also lies within one of that outer's holes, in which case it is left to
/// form an island of its own.
fn nest_rings(rings: Vec<LineString<f64>>) -> Vec<(LineString<f64>, Vec<LineString<f64>>)> {
    let mut taken = vec![false; rings.len()];
    let mut out = Vec::new();

    for i in 0..rings.len() {
        if taken[i] {
            continue;
        }
        taken[i] = true;

        let mut outer = rings[i].clone();
        outer.make_ccw_winding();
        let outer_polygon = Polygon::new(outer.clone(), vec![]);

        let mut holes: Vec<LineString<f64>> = Vec::new();
        for j in (i + 1)..rings.len() {
            if taken[j] || !within_ring(&rings[j], &outer_polygon) {
                continue;
            }
            let nested_in_hole = holes
                .iter()
                .any(|h| within_ring(&rings[j], &Polygon::new(h.clone(), vec![])));
            if nested_in_hole {
                continue;
            }

            taken[j] = true;
            let mut hole = rings[j].clone();
            hole.make_cw_winding();
            holes.push(hole);
        }
        out.push((outer, holes));
    }
    out
}

/// Every vertex of `ring` inside `outer` or within [`HOLE_TOLERANCE`] of its
/// boundary.
fn within_ring(ring: &LineString<f64>, outer: &Polygon<f64>) -> bool {
    ring.0.iter().all(|c| {
        outer.contains(c) || Point::from(*c).euclidean_distance(outer.exterior()) <= HOLE_TOLERANCE
    })
}

/// Fuses an outer ring and its holes through a union pass, discarding
/// degenerate output. Falls back to the bare outer ring if the pass fails.
fn cleanup(outer: LineString<f64>, holes: Vec<LineString<f64>>) -> Vec<Polygon<f64>> {
    let hole_count = holes.len();
    if let Some(cleaned) = union_pass(Polygon::new(outer.clone(), holes)) {
        return cleaned;
    }

    warn!(hole_count, "glyph cleanup failed, retrying without holes");
    match union_pass(Polygon::new(outer, vec![])) {
        Some(cleaned) => cleaned,
        None => {
            warn!("dropping glyph contour that could not be cleaned");
            Vec::new()
        }
    }
}

fn union_pass(polygon: Polygon<f64>) -> Option<Vec<Polygon<f64>>> {
    let subject = MultiPolygon::new(vec![polygon]);
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        subject.union(&MultiPolygon::new(Vec::new()))
    }));

    match result {
        Ok(merged) => Some(
            merged
                .0
                .into_iter()
                .filter(|p| p.unsigned_area() > MIN_RING_AREA)
                .collect(),
        ),
        Err(_) => {
            warn!("Panic during glyph union cleanup");
            None
        }
    }
}
