//! Editable control-point paths with a derived centripetal Catmull-Rom curve.
//!
//! A [`SplinePath`] owns its control points exclusively. Every mutator ends in
//! [`SplinePath::rebuild`], so the closed flag, the per-segment cubic
//! coefficients and the arc-length table are never observed out of date.

use glam::DVec3;

use crate::constants::{
    ARC_LENGTH_DIVISIONS, CLOSURE_THRESHOLD, CURVE_SAMPLES, KNOT_EPSILON, MIN_PATH_POINTS,
};
use crate::error::PathError;
use crate::geometry::{centroid, Point3};

/// Cubic `c0 + c1 t + c2 t² + c3 t³` per axis for one curve segment.
#[derive(Clone, Copy, Debug)]
struct Segment {
    c0: DVec3,
    c1: DVec3,
    c2: DVec3,
    c3: DVec3,
}

impl Segment {
    #[inline]
    fn eval(&self, t: f64) -> DVec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }

    /// Non-uniform Catmull-Rom segment from `p1` to `p2` with knot spacings
    /// `dt0`, `dt1`, `dt2` (component-wise, as in the centripetal form).
    fn nonuniform(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, dt0: f64, dt1: f64, dt2: f64) -> Self {
        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;
        Self {
            c0: p1,
            c1: t1,
            c2: -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2,
            c3: 2.0 * p1 - 2.0 * p2 + t1 + t2,
        }
    }
}

/// How a path decides whether its curve joins the last point to the first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Closure {
    /// Closed while the end points are within [`CLOSURE_THRESHOLD`].
    #[default]
    Derived,
    /// Always closed (zone outlines).
    Always,
}

/// Ordered control points plus the curve derived from them.
#[derive(Clone, Debug)]
pub struct SplinePath {
    points: Vec<Point3>,
    closure: Closure,
    closed: bool,
    segments: Vec<Segment>,
    arc_lengths: Vec<f64>,
}

impl SplinePath {
    pub fn new(points: Vec<Point3>) -> Result<Self, PathError> {
        Self::with_closure(points, Closure::Derived)
    }

    /// A path whose curve is closed regardless of how far apart its ends are.
    pub fn closed_loop(points: Vec<Point3>) -> Result<Self, PathError> {
        Self::with_closure(points, Closure::Always)
    }

    pub fn with_closure(points: Vec<Point3>, closure: Closure) -> Result<Self, PathError> {
        if points.len() < MIN_PATH_POINTS {
            return Err(PathError::TooFewPoints { got: points.len() });
        }
        let mut path = Self {
            points,
            closure,
            closed: false,
            segments: Vec::new(),
            arc_lengths: Vec::new(),
        };
        path.rebuild();
        Ok(path)
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a path cannot exist with fewer than 3 points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True for [`Closure::Always`] paths, otherwise when the first and last
    /// control points are within [`CLOSURE_THRESHOLD`] of each other.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn centroid(&self) -> Point3 {
        centroid(&self.points)
    }

    /// Insert `world` next to the control point the nearest curve sample
    /// belongs to. Returns the index of the new point.
    ///
    /// Curve samples are assigned to control points with a pointer that only
    /// moves forward as the curve parameter grows, so a self-intersecting path
    /// still maps each sample to the span it was drawn in.
    pub fn insert_point(&mut self, world: Point3) -> usize {
        let n = self.points.len();
        let mut min_distance = f64::MAX;
        let mut min_point = 1;
        let mut prev_distance = -1.0;
        let mut closest = 0;

        for s in 0..CURVE_SAMPLES {
            let t = s as f64 / CURVE_SAMPLES as f64;
            let sample = self.point(t);
            if self.points[closest].distance_squared(sample) > prev_distance {
                closest += 1;
                if closest >= n {
                    closest = 0;
                }
            }
            prev_distance = self.points[closest].distance_squared(sample);

            let distance = sample.distance_squared(world);
            if distance < min_distance {
                min_distance = distance;
                min_point = closest;
            }
        }

        // On an open path a wrapped pointer means "past the last point".
        let index = if min_point == 0 && !self.closed { n } else { min_point };
        self.points.insert(index, world);
        self.rebuild();
        log::debug!("[path] inserted point at {} ({} points)", index, self.points.len());
        index
    }

    /// Remove a control point. Refused (returns false) when the path would
    /// drop below 3 points or `index` is out of range.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if self.points.len() <= MIN_PATH_POINTS || index >= self.points.len() {
            log::warn!(
                "[path] refusing to remove point {} of {}",
                index,
                self.points.len()
            );
            return false;
        }
        self.points.remove(index);
        self.rebuild();
        true
    }

    pub fn move_point(&mut self, index: usize, position: Point3) -> Result<(), PathError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(PathError::IndexOutOfRange { index, len })?;
        *point = position;
        self.rebuild();
        Ok(())
    }

    pub fn translate_all(&mut self, delta: DVec3) {
        for p in &mut self.points {
            *p += delta;
        }
        self.rebuild();
    }

    pub fn closure(&self) -> Closure {
        self.closure
    }

    /// Chord-length approximation of the curve length over `samples`
    /// subdivisions.
    pub fn arc_length(&self, samples: usize) -> f64 {
        let samples = samples.max(1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        for i in 1..=samples {
            let current = self.point(i as f64 / samples as f64);
            sum += current.distance(last);
            last = current;
        }
        sum
    }

    /// Evaluate the curve at raw parameter `t` in \[0, 1\].
    ///
    /// Closed curves wrap; open curves expect the caller to clamp.
    pub fn point(&self, t: f64) -> Point3 {
        let count = self.segments.len();
        let p = count as f64 * t;
        let mut index = p.floor();
        let mut weight = p - index;
        if self.closed {
            index = index.rem_euclid(count as f64);
        } else if index >= count as f64 {
            index = count as f64 - 1.0;
            weight = 1.0;
        } else if index < 0.0 {
            index = 0.0;
            weight = 0.0;
        }
        self.segments[index as usize].eval(weight)
    }

    /// Evaluate the curve at `u`, a fraction of its arc length. Used for
    /// playback so that speed is uniform along uneven control-point spacing.
    /// Closed curves wrap `u` into \[0, 1); open curves clamp it.
    pub fn point_at(&self, u: f64) -> Point3 {
        self.point(self.u_to_t(u))
    }

    /// Total curve length from the cached arc-length table.
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// `divisions + 1` evenly parameterised samples for drawing.
    pub fn polyline(&self, divisions: usize) -> Vec<Point3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point(i as f64 / divisions as f64))
            .collect()
    }

    /// Index and distance of the control point closest to `world`.
    pub fn nearest_control_point(&self, world: Point3) -> (usize, f64) {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(world)))
            .fold((0, f64::MAX), |best, cur| if cur.1 < best.1 { cur } else { best })
    }

    fn u_to_t(&self, u: f64) -> f64 {
        let u = if self.closed {
            u.rem_euclid(1.0)
        } else {
            u.clamp(0.0, 1.0)
        };
        let lengths = &self.arc_lengths;
        let total = self.length();
        if lengths.len() < 2 || total <= 0.0 {
            return u;
        }
        let target = u * total;
        let divisions = (lengths.len() - 1) as f64;
        let i = lengths.partition_point(|&l| l < target);
        if i == 0 {
            return 0.0;
        }
        if i >= lengths.len() {
            return 1.0;
        }
        if lengths[i] == target {
            return i as f64 / divisions;
        }
        let before = lengths[i - 1];
        let segment = lengths[i] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        ((i - 1) as f64 + fraction) / divisions
    }

    /// Recompute every derived property from `points`.
    fn rebuild(&mut self) {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        let was_closed = self.closed;
        self.closed = match self.closure {
            Closure::Always => true,
            Closure::Derived => first.distance(last) < CLOSURE_THRESHOLD,
        };
        if was_closed != self.closed && !self.segments.is_empty() {
            log::debug!("[path] closed -> {}", self.closed);
        }
        self.segments = build_segments(&self.points, self.closed);

        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        lengths.push(0.0);
        let mut last_point = self.point(0.0);
        let mut sum = 0.0;
        for i in 1..=ARC_LENGTH_DIVISIONS {
            let current = self.point(i as f64 / ARC_LENGTH_DIVISIONS as f64);
            sum += current.distance(last_point);
            lengths.push(sum);
            last_point = current;
        }
        self.arc_lengths = lengths;
    }
}

fn build_segments(points: &[Point3], closed: bool) -> Vec<Segment> {
    let l = points.len();
    let count = if closed { l } else { l - 1 };
    (0..count)
        .map(|i| {
            let p0 = if closed || i > 0 {
                points[(i + l - 1) % l]
            } else {
                2.0 * points[0] - points[1]
            };
            let p1 = points[i % l];
            let p2 = points[(i + 1) % l];
            let p3 = if closed || i + 2 < l {
                points[(i + 2) % l]
            } else {
                2.0 * points[l - 1] - points[l - 2]
            };

            // Centripetal: knot spacing is sqrt of the chord length.
            let mut dt0 = p0.distance_squared(p1).powf(0.25);
            let mut dt1 = p1.distance_squared(p2).powf(0.25);
            let mut dt2 = p2.distance_squared(p3).powf(0.25);
            if dt1 < KNOT_EPSILON {
                dt1 = 1.0;
            }
            if dt0 < KNOT_EPSILON {
                dt0 = dt1;
            }
            if dt2 < KNOT_EPSILON {
                dt2 = dt1;
            }
            Segment::nonuniform(p0, p1, p2, p3, dt0, dt1, dt2)
        })
        .collect()
}
