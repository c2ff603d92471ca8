//! Ray picking against objects, control points, curves and zone areas.

use glam::DVec3;

use crate::constants::{CURVE_SAMPLES, PICK_CURVE_RADIUS};
use crate::geometry::{point_in_polygon_xz, ray_segment_closest, ray_sphere, Point3};
use crate::scene::{ObjectId, ZoneId};
use crate::spline::SplinePath;

/// A world-space picking ray. `dir` is expected to be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, dir: DVec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }

    /// Hit distance against the horizontal plane at height `y`.
    pub fn intersect_horizontal(&self, y: f64) -> Option<f64> {
        if self.dir.y.abs() < 1e-9 {
            return None;
        }
        let t = (y - self.origin.y) / self.dir.y;
        (t >= 0.0).then_some(t)
    }
}

/// What part of a path a ray touched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathHit {
    ControlPoint(usize),
    /// On the curve between control points; a click here inserts a point.
    Curve(Point3),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pick {
    Object(ObjectId),
    Trajectory(ObjectId, PathHit),
    Zone(ZoneId, PathHit),
    ZoneArea(ZoneId),
}

/// Control points win over the curve, as they sit on top of it.
pub fn hit_path(path: &SplinePath, ray: &Ray, point_radius: f64) -> Option<(f64, PathHit)> {
    let point_hit = path
        .points()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| ray_sphere(ray.origin, ray.dir, *p, point_radius).map(|t| (t, i)))
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((t, i)) = point_hit {
        return Some((t, PathHit::ControlPoint(i)));
    }

    let polyline = path.polyline(CURVE_SAMPLES);
    polyline
        .windows(2)
        .filter_map(|w| {
            let (distance, on_curve) = ray_segment_closest(ray.origin, ray.dir, w[0], w[1]);
            (distance < PICK_CURVE_RADIUS).then(|| ((on_curve - ray.origin).dot(ray.dir), on_curve))
        })
        .filter(|(t, _)| *t >= 0.0)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(t, on_curve)| (t, PathHit::Curve(on_curve)))
}

/// Hit distance against the filled area enclosed by a path, on the plane at
/// the path's mean height.
pub fn hit_area(path: &SplinePath, ray: &Ray) -> Option<f64> {
    let t = ray.intersect_horizontal(path.centroid().y)?;
    point_in_polygon_xz(ray.at(t), &path.polyline(CURVE_SAMPLES)).then_some(t)
}
