//! Tolerance-based reduction of freehand point sequences.
//!
//! Gestures are captured at input-sampling rate and are far too dense to be
//! used as spline control points. The reduction runs an optional radial
//! distance pass followed by Ramer-Douglas-Peucker in 3D, so drawings made on
//! the XZ plane and elevated paths are treated alike.

use glam::DVec3;

/// Reduce `points` to a sparse subsequence within `tolerance` world units.
///
/// The first and last input points are always kept and order is preserved.
/// With `high_quality` the radial pre-pass is skipped, which makes the result
/// stable under repeated application.
pub fn simplify(points: &[DVec3], tolerance: f64, high_quality: bool) -> Vec<DVec3> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let sq_tolerance = tolerance * tolerance;
    if high_quality {
        douglas_peucker(points, sq_tolerance)
    } else {
        let reduced = radial_distance(points, sq_tolerance);
        douglas_peucker(&reduced, sq_tolerance)
    }
}

fn radial_distance(points: &[DVec3], sq_tolerance: f64) -> Vec<DVec3> {
    let mut prev = points[0];
    let mut kept = vec![prev];
    for &point in &points[1..] {
        if point.distance_squared(prev) > sq_tolerance {
            kept.push(point);
            prev = point;
        }
    }
    if let Some(&last) = points.last() {
        if last != prev {
            kept.push(last);
        }
    }
    kept
}

fn douglas_peucker(points: &[DVec3], sq_tolerance: f64) -> Vec<DVec3> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut simplified = vec![points[0]];
    dp_step(points, 0, last, sq_tolerance, &mut simplified);
    simplified.push(points[last]);
    simplified
}

fn dp_step(points: &[DVec3], first: usize, last: usize, sq_tolerance: f64, out: &mut Vec<DVec3>) {
    let mut max_sq_dist = sq_tolerance;
    let mut index = None;
    for i in first + 1..last {
        let sq_dist = sq_segment_distance(points[i], points[first], points[last]);
        if sq_dist > max_sq_dist {
            index = Some(i);
            max_sq_dist = sq_dist;
        }
    }
    if let Some(index) = index {
        if index - first > 1 {
            dp_step(points, first, index, sq_tolerance, out);
        }
        out.push(points[index]);
        if last - index > 1 {
            dp_step(points, index, last, sq_tolerance, out);
        }
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn sq_segment_distance(p: DVec3, a: DVec3, b: DVec3) -> f64 {
    let d = b - a;
    let len_sq = d.length_squared();
    let closest = if len_sq > 0.0 {
        let t = (p - a).dot(d) / len_sq;
        if t > 1.0 {
            b
        } else if t > 0.0 {
            a + d * t
        } else {
            a
        }
    } else {
        a
    };
    p.distance_squared(closest)
}
