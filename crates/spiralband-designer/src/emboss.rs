//! Text emboss classification.
//!
//! Samples on the +X half of the band are tested against the front text and
//! samples on the -X half against the (mirrored) back text, both in the local
//! (y, z) plane. Samples on x = 0 belong to both halves.

use crate::glyphs::GlyphPolygonSet;
use crate::spiral::SpiralPath;
use spiralband_core::Point3;
use tracing::debug;

/// Multiplier applied to the radial deviation of samples inside the text.
pub const EMBOSS_FACTOR: f64 = 1.6;

/// Per-sample result of [`EmbossClassifier::classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbossClassification {
    pub in_text: Vec<bool>,
    /// Deviation after amplification
    pub deviation: Vec<f64>,
}

impl EmbossClassification {
    pub fn embossed_count(&self) -> usize {
        self.in_text.iter().filter(|b| **b).count()
    }
}

pub struct EmbossClassifier<'a> {
    front: Option<&'a GlyphPolygonSet>,
    back: Option<&'a GlyphPolygonSet>,
}

impl<'a> EmbossClassifier<'a> {
    /// Empty sets are treated the same as absent ones.
    pub fn new(front: Option<&'a GlyphPolygonSet>, back: Option<&'a GlyphPolygonSet>) -> Self {
        Self {
            front: front.filter(|s| !s.is_empty()),
            back: back.filter(|s| !s.is_empty()),
        }
    }

    /// Whether a sample at local position (`x`, `y`, `z`) lies inside text.
    pub fn is_in_text(&self, x: f64, y: f64, z: f64) -> bool {
        let front = x >= 0.0 && self.front.is_some_and(|s| s.contains(y, z));
        let back = x <= 0.0 && self.back.is_some_and(|s| s.contains(y, z));
        front || back
    }

    pub fn classify(&self, path: &SpiralPath) -> EmbossClassification {
        if self.front.is_none() && self.back.is_none() {
            return EmbossClassification {
                in_text: vec![false; path.len()],
                deviation: path.deviation.clone(),
            };
        }

        let (in_text, deviation): (Vec<bool>, Vec<f64>) = path
            .deviation
            .iter()
            .zip(&path.z)
            .enumerate()
            .map(|(i, (d, z))| {
                let (x, y) = path.local_xy(i, *d);
                let inside = self.is_in_text(x, y, *z);
                (inside, if inside { d * EMBOSS_FACTOR } else { *d })
            })
            .unzip();

        let classification = EmbossClassification { in_text, deviation };
        debug!(
            embossed = classification.embossed_count(),
            samples = path.len(),
            "classified emboss samples"
        );
        classification
    }

    /// Final world positions with emboss applied.
    pub fn apply(&self, path: &SpiralPath) -> Vec<Point3> {
        path.positions_with(&self.classify(path).deviation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_manager::rect;
    use geo::{LineString, Polygon};

    fn square(y0: f64, z0: f64, y1: f64, z1: f64) -> Polygon<f64> {
        Polygon::new(LineString::from(rect(y0, z0, y1, z1)), vec![])
    }

    #[test]
    fn test_sides_split_by_sign_of_x() {
        let front = GlyphPolygonSet::from_polygons(vec![square(-1.0, 0.0, 1.0, 1.0)]);
        let classifier = EmbossClassifier::new(Some(&front), None);

        assert!(classifier.is_in_text(5.0, 0.0, 0.5));
        assert!(!classifier.is_in_text(-5.0, 0.0, 0.5));
        assert!(!classifier.is_in_text(5.0, 0.0, 2.0));
    }

    #[test]
    fn test_x_zero_tested_against_both_sides() {
        let front = GlyphPolygonSet::from_polygons(vec![square(-1.0, 0.0, 0.0, 1.0)]);
        let back = GlyphPolygonSet::from_polygons(vec![square(0.0, 0.0, 1.0, 1.0)]);
        let classifier = EmbossClassifier::new(Some(&front), Some(&back));

        assert!(classifier.is_in_text(0.0, -0.5, 0.5));
        assert!(classifier.is_in_text(0.0, 0.5, 0.5));
        assert!(!classifier.is_in_text(1.0, 0.5, 0.5));
        assert!(!classifier.is_in_text(-1.0, -0.5, 0.5));
    }

    #[test]
    fn test_empty_sets_are_absent() {
        let empty = GlyphPolygonSet::empty();
        let classifier = EmbossClassifier::new(Some(&empty), Some(&empty));
        assert!(!classifier.is_in_text(0.0, 0.0, 0.0));
    }
}
