// Spherical conversion and cone geometry.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use audioscape_core::constants::{CONE_OUTER_ANGLE_MULTIPLIER, CONE_OUTER_GAIN};
use audioscape_core::emitter::{to_direction, to_spherical, wrap_angle, Cone, ConeShape};
use audioscape_core::sync::{oriented_axis, EMITTER_FORWARD};
use audioscape_core::ConeId;
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_unit(rng: &mut StdRng) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if let Some(n) = v.try_normalize() {
            return n;
        }
    }
}

#[test]
fn spherical_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2_000 {
        let d = random_unit(&mut rng);
        if d.x.abs() < 1e-3 {
            continue;
        }
        let (longitude, latitude) = to_spherical(d);
        let back = to_direction(longitude, latitude);
        assert!((back - d).length() < 1e-6, "{d:?} -> {back:?}");
        assert!((-PI..=PI).contains(&longitude));
        assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&latitude));
    }
}

#[test]
fn spherical_round_trip_near_x_zero() {
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..500 {
        let d = DVec3::new(
            rng.gen_range(-1e-4..1e-4),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize();
        let (longitude, latitude) = to_spherical(d);
        assert!((to_direction(longitude, latitude) - d).length() < 1e-3);
    }
}

#[test]
fn poles_and_zero_vector() {
    assert_eq!(to_spherical(DVec3::Y), (0.0, FRAC_PI_2));
    assert_eq!(to_spherical(-DVec3::Y), (0.0, -FRAC_PI_2));
    assert_eq!(to_spherical(DVec3::ZERO), (0.0, 0.0));
    assert!((to_direction(0.0, FRAC_PI_2) - DVec3::Y).length() < 1e-12);
}

#[test]
fn zero_angles_face_positive_z() {
    assert!((to_direction(0.0, 0.0) - DVec3::Z).length() < 1e-12);
    assert!((to_direction(FRAC_PI_2, 0.0) - DVec3::X).length() < 1e-12);
}

#[test]
fn wrap_angle_stays_in_range() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1_000 {
        let a = rng.gen_range(-50.0..50.0);
        let w = wrap_angle(a);
        assert!((-PI..=PI).contains(&w));
        let turns = (a - w) / TAU;
        assert!((turns - turns.round()).abs() < 1e-9);
    }
}

#[test]
fn wrap_angle_handles_huge_angles() {
    for a in [1e9, -1e12, 4e16, 1e17, -1e300] {
        let w = wrap_angle(a);
        assert!((-PI..=PI).contains(&w), "{a} wrapped to {w}");
    }
    assert!(wrap_angle(f64::NAN).is_nan());
}

#[test]
fn cone_shape_follows_volume_and_spread() {
    let shape = ConeShape::from_params(1.0, 0.5);
    assert_eq!(shape.radius, 45.0);
    assert_eq!(shape.length, 100.0);
    let inner = (45.0f64 / 100.0).atan().to_degrees();
    assert!((shape.inner_angle_deg - inner).abs() < 1e-12);
    assert!((shape.outer_angle_deg - inner * CONE_OUTER_ANGLE_MULTIPLIER).abs() < 1e-12);
    assert_eq!(shape.outer_gain, CONE_OUTER_GAIN);

    let wider = ConeShape::from_params(1.0, 1.0);
    assert!(wider.inner_angle_deg > shape.inner_angle_deg);
    let louder = ConeShape::from_params(3.0, 0.5);
    assert!(louder.inner_angle_deg < shape.inner_angle_deg);
}

#[test]
fn cone_setters_refresh_the_shape() {
    let mut cone = Cone::new(ConeId(1));
    cone.set_spread(1.0);
    assert_eq!(cone.shape(), ConeShape::from_params(cone.volume(), 1.0));
    cone.set_volume(2.0);
    assert_eq!(cone.shape(), ConeShape::from_params(2.0, 1.0));
}

#[test]
fn cone_transform_points_local_z_along_direction() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut cone = Cone::new(ConeId(1));
    for _ in 0..200 {
        let target = random_unit(&mut rng);
        cone.set_direction_from(target);
        let center = DVec3::new(100.0, 5.0, -40.0);
        let transform = cone.world_transform(center);
        assert!((transform.w_axis.truncate() - center).length() < 1e-12);
        let axis = oriented_axis(&transform, EMITTER_FORWARD);
        assert!((axis - cone.direction()).length() < 1e-9);
        if target.x.abs() > 1e-3 {
            assert!((axis - target).length() < 1e-6);
        }
    }
}

#[test]
fn default_cone_color_is_a_pastel_hex() {
    let cone = Cone::new(ConeId(3));
    assert_eq!(cone.color.len(), 7);
    assert!(cone.color.starts_with("#80"));
    assert!(cone.color.ends_with("e6"));
}
