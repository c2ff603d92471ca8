//! Small vector helpers shared by paths, picking and zones.
//!
//! Everything works in `f64` world units: scene coordinates are hundreds of
//! units across and are persisted as plain JSON numbers.

use glam::DVec3;

/// A control point or any other world-space position.
pub type Point3 = DVec3;

/// Nearest positive hit distance of a normalized ray against a sphere.
#[inline]
pub fn ray_sphere(ray_origin: DVec3, ray_dir: DVec3, center: DVec3, radius: f64) -> Option<f64> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Closest approach between a ray and a segment.
///
/// Returns the distance and the closest point on the segment.
pub fn ray_segment_closest(ray_origin: DVec3, ray_dir: DVec3, a: DVec3, b: DVec3) -> (f64, DVec3) {
    let seg = b - a;
    let seg_len_sq = seg.length_squared();
    let dir_len_sq = ray_dir.length_squared().max(f64::EPSILON);
    if seg_len_sq <= f64::EPSILON {
        let s = ((a - ray_origin).dot(ray_dir) / dir_len_sq).max(0.0);
        return ((ray_origin + ray_dir * s).distance(a), a);
    }

    let w0 = ray_origin - a;
    let b_ = ray_dir.dot(seg);
    let d_ = ray_dir.dot(w0);
    let e_ = seg.dot(w0);
    let denom = dir_len_sq * seg_len_sq - b_ * b_;
    let mut t = if denom.abs() < 1e-12 {
        e_ / seg_len_sq
    } else {
        (dir_len_sq * e_ - b_ * d_) / denom
    };
    t = t.clamp(0.0, 1.0);
    // Re-project twice so both clamps are honored.
    let s = ((a + seg * t - ray_origin).dot(ray_dir) / dir_len_sq).max(0.0);
    let ray_point = ray_origin + ray_dir * s;
    let t = ((ray_point - a).dot(seg) / seg_len_sq).clamp(0.0, 1.0);
    let seg_point = a + seg * t;
    (ray_point.distance(seg_point), seg_point)
}

/// Even-odd containment test on the XZ plane. Y is ignored.
pub fn point_in_polygon_xz(point: DVec3, polygon: &[DVec3]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.z > point.z) != (pj.z > point.z) {
            let x_cross = (pj.x - pi.x) * (point.z - pi.z) / (pj.z - pi.z) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Mean of a point set, or the origin for an empty slice.
pub fn centroid(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}
