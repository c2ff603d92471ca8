// Sanity checks for tuning constants.

use audioscape_core::constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn path_constants_are_consistent() {
    assert!(MIN_PATH_POINTS >= 3);
    assert!(CLOSURE_THRESHOLD > 0.0);
    assert!(SIMPLIFY_TOLERANCE > 0.0);
    // Closure must be coarser than the simplifier so a gesture ending near
    // its start still closes after simplification.
    assert!(CLOSURE_THRESHOLD > SIMPLIFY_TOLERANCE);
    assert!(CURVE_SAMPLES >= 2);
    assert!(ARC_LENGTH_DIVISIONS >= SPEED_ARC_SAMPLES);
    assert!(KNOT_EPSILON > 0.0 && KNOT_EPSILON < 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn playback_defaults_are_valid() {
    assert!(DEFAULT_MOVEMENT_SPEED > 0.0);
    assert!((0.0..=1.0).contains(&DEFAULT_TRAJECTORY_CLOCK));
    assert!(DEFAULT_MOVEMENT_DIRECTION == 1.0 || DEFAULT_MOVEMENT_DIRECTION == -1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn cone_constants_are_within_reasonable_bounds() {
    assert!(CONE_OUTER_ANGLE_MULTIPLIER >= 1.0);
    assert!((0.0..=1.0).contains(&CONE_OUTER_GAIN));
    assert!(CONE_BASE_LENGTH > 0.0);
    assert!(PANNER_REF_DISTANCE > 0.0);
    assert!((0.0..=1.0).contains(&ZONE_PLAYING_GAIN));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn pick_radii_nest() {
    // Control points sit on the curve and must stay clickable over it.
    assert!(PICK_TRAJECTORY_POINT_RADIUS > PICK_CURVE_RADIUS);
    assert!(PICK_ZONE_POINT_RADIUS > PICK_CURVE_RADIUS);
    assert!(PICK_OBJECT_RADIUS > PICK_TRAJECTORY_POINT_RADIUS);
}

#[test]
fn listener_axes_are_orthonormal() {
    let f = glam::DVec3::from_array(LISTENER_FORWARD);
    let u = glam::DVec3::from_array(LISTENER_UP);
    assert!((f.length() - 1.0).abs() < 1e-12);
    assert!((u.length() - 1.0).abs() < 1e-12);
    assert!(f.dot(u).abs() < 1e-12);
}
