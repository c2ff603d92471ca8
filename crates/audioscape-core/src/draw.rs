//! In-progress freehand gesture.
//!
//! A session lives from pointer-down to pointer-up and only buffers raw
//! points. Finishing it simplifies the gesture and decides what it becomes.

use crate::constants::{MIN_PATH_POINTS, SIMPLIFY_TOLERANCE};
use crate::geometry::Point3;
use crate::scene::ObjectId;
use crate::simplify::simplify;

/// What a finished gesture turned into.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    /// Drawn from an object: a movement path for it.
    Trajectory { parent: ObjectId, points: Vec<Point3> },
    /// Drawn on empty space: a trigger zone.
    Zone { points: Vec<Point3> },
    /// Too short to be a path: place a point object instead.
    PointObject { position: Point3 },
    /// Too short to be a trajectory for its parent object; nothing to create.
    Discarded,
}

#[derive(Clone, Debug)]
pub struct PathDrawSession {
    parent: Option<ObjectId>,
    points: Vec<Point3>,
}

impl PathDrawSession {
    /// Start a gesture at `point`, drawing a trajectory for `parent` if given.
    pub fn begin(point: Point3, parent: Option<ObjectId>) -> Self {
        Self {
            parent,
            points: vec![point],
        }
    }

    pub fn add_point(&mut self, point: Point3) {
        self.points.push(point);
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Raw points captured so far (for drawing the guide line).
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// End the gesture.
    pub fn finish(self) -> DrawOutcome {
        // Never empty: `begin` records the first point.
        let end = self.points[self.points.len() - 1];
        let simplified = simplify(&self.points, SIMPLIFY_TOLERANCE, true);
        log::debug!(
            "[draw] gesture of {} points simplified to {}",
            self.points.len(),
            simplified.len()
        );
        let is_path = simplified.len() >= MIN_PATH_POINTS;
        match (self.parent, is_path) {
            (Some(parent), true) => DrawOutcome::Trajectory {
                parent,
                points: simplified,
            },
            (Some(_), false) => DrawOutcome::Discarded,
            (None, true) => DrawOutcome::Zone { points: simplified },
            (None, false) => DrawOutcome::PointObject { position: end },
        }
    }
}
