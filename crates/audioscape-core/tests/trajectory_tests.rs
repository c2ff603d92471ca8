// Trajectory playback state machine.

use audioscape_core::constants::SPEED_ARC_SAMPLES;
use audioscape_core::spline::SplinePath;
use audioscape_core::trajectory::{follow, TrajectoryState};
use audioscape_core::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn open_path() -> SplinePath {
    SplinePath::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 100.0),
        Point3::new(400.0, 0.0, 0.0),
    ])
    .unwrap()
}

fn closed_path() -> SplinePath {
    SplinePath::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 200.0),
        Point3::new(0.0, 0.0, 200.0),
        Point3::new(0.0, 0.0, 10.0),
    ])
    .unwrap()
}

fn state(clock: f64, direction: f64, increment: f64) -> TrajectoryState {
    TrajectoryState {
        clock,
        direction,
        speed: 1.0,
        speed_increment: increment,
    }
}

#[test]
fn open_path_bounces_at_the_end() {
    let mut s = state(0.98, 1.0, 0.05);
    s.advance(false);
    assert_eq!(s.clock, 1.0);
    assert_eq!(s.direction, -1.0);
}

#[test]
fn open_path_bounces_at_the_start() {
    let mut s = state(0.02, -1.0, 0.05);
    s.advance(false);
    assert_eq!(s.clock, 0.0);
    assert_eq!(s.direction, 1.0);
}

#[test]
fn closed_path_wraps_without_turning() {
    let mut s = state(0.98, 1.0, 0.05);
    s.advance(true);
    assert_eq!(s.clock, 0.0);
    assert_eq!(s.direction, 1.0);

    let mut s = state(0.02, -1.0, 0.05);
    s.advance(true);
    assert_eq!(s.clock, 1.0);
    assert_eq!(s.direction, -1.0);
}

#[test]
fn clock_stays_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(17);
    for closed in [false, true] {
        let mut s = state(rng.gen_range(0.0..1.0), 1.0, 0.0);
        for _ in 0..5_000 {
            s.speed_increment = rng.gen_range(0.0..0.3);
            if rng.gen_bool(0.01) {
                s.direction = -s.direction;
            }
            s.advance(closed);
            assert!((0.0..=1.0).contains(&s.clock), "clock {}", s.clock);
            assert!(s.direction == 1.0 || s.direction == -1.0);
        }
    }
}

#[test]
fn increment_is_speed_over_arc_length() {
    let path = open_path();
    let s = {
        let mut s = TrajectoryState::with_speed(8.0);
        s.recompute_increment(&path);
        s
    };
    let expected = 8.0 / path.arc_length(SPEED_ARC_SAMPLES);
    assert!((s.speed_increment - expected).abs() < 1e-12);

    let mut s = s;
    s.set_speed(16.0, &path);
    assert!((s.speed_increment - 2.0 * expected).abs() < 1e-12);
}

#[test]
fn zero_length_path_holds_still() {
    let p = Point3::new(10.0, 0.0, 10.0);
    let path = SplinePath::new(vec![p, p, p]).unwrap();
    let mut s = TrajectoryState::default();
    s.recompute_increment(&path);
    assert_eq!(s.speed_increment, 0.0);
    for _ in 0..10 {
        let position = s.tick(&path);
        assert!(position.is_finite());
        assert!(position.distance(p) < 1e-9);
    }
}

#[test]
fn default_state_starts_at_the_end_heading_back() {
    let path = open_path();
    let mut s = TrajectoryState::default();
    s.recompute_increment(&path);
    let increment = s.speed_increment;
    assert!(increment > 0.0);
    s.tick(&path);
    assert!((s.clock - (1.0 - increment)).abs() < 1e-12);
    assert_eq!(s.direction, -1.0);
}

#[test]
fn tick_follows_the_curve() {
    let path = closed_path();
    assert!(path.is_closed());
    let mut s = TrajectoryState::with_speed(20.0);
    s.recompute_increment(&path);
    for _ in 0..200 {
        let position = s.tick(&path);
        assert!(position.distance(path.point_at(s.clock)) < 1e-9);
    }
}

#[test]
fn no_path_means_no_movement() {
    let mut s = TrajectoryState::default();
    assert_eq!(follow(&mut s, None), None);
    assert_eq!(s, TrajectoryState::default());

    let path = open_path();
    s.recompute_increment(&path);
    assert!(follow(&mut s, Some(&path)).is_some());
}
