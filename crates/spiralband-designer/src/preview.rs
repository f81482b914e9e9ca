//! Geometry extraction for external 3D viewers.

use serde::{Deserialize, Serialize};
use spiralband_core::{Instruction, Point3};

/// Axis-aligned bounds of every move in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamBounds {
    pub min: Point3,
    pub max: Point3,
}

impl StreamBounds {
    pub fn size(&self) -> Point3 {
        Point3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

/// Polylines printed while extrusion is on. Each polyline starts at the
/// position the extruder was switched on at; travel moves are dropped.
pub fn extrusion_paths(instructions: &[Instruction]) -> Vec<Vec<Point3>> {
    let mut paths = Vec::new();
    let mut current: Vec<Point3> = Vec::new();
    let mut position: Option<Point3> = None;
    let mut extruding = false;

    for instruction in instructions {
        match *instruction {
            Instruction::Extruder { on } if on != extruding => {
                extruding = on;
                if on {
                    current.extend(position);
                } else if current.len() > 1 {
                    paths.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            Instruction::MoveTo { x, y, z } => {
                let p = Point3::new(x, y, z);
                if extruding {
                    current.push(p);
                }
                position = Some(p);
            }
            _ => {}
        }
    }
    if current.len() > 1 {
        paths.push(current);
    }
    paths
}

/// Bounds of all move targets, `None` for a stream without moves.
pub fn stream_bounds(instructions: &[Instruction]) -> Option<StreamBounds> {
    let mut moves = instructions.iter().filter_map(Instruction::position);
    let first = moves.next()?;
    Some(moves.fold(
        StreamBounds {
            min: first,
            max: first,
        },
        |b, p| StreamBounds {
            min: Point3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
            max: Point3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
        },
    ))
}
