// Control-point paths: construction, closure, insertion and deletion.

use audioscape_core::constants::CLOSURE_THRESHOLD;
use audioscape_core::spline::{Closure, SplinePath};
use audioscape_core::{PathError, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point3> {
    (0..n)
        .map(|_| {
            Point3::new(
                rng.gen_range(-500.0..500.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-500.0..500.0),
            )
        })
        .collect()
}

fn line(n: usize) -> Vec<Point3> {
    (0..n).map(|i| Point3::new(i as f64 * 100.0, 0.0, 0.0)).collect()
}

#[test]
fn construction_keeps_points_and_derives_closure() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let n = rng.gen_range(3..12);
        let mut points = random_points(&mut rng, n);
        if rng.gen_bool(0.5) {
            // Pull the last point near the first to exercise the closed branch.
            let offset = Point3::new(rng.gen_range(-30.0..30.0), 0.0, 0.0);
            points[n - 1] = points[0] + offset;
        }
        let path = SplinePath::new(points.clone()).unwrap();
        assert_eq!(path.points(), points.as_slice());
        assert_eq!(
            path.is_closed(),
            points[0].distance(points[n - 1]) < CLOSURE_THRESHOLD
        );
    }
}

#[test]
fn fewer_than_three_points_is_rejected() {
    for n in 0..3 {
        let err = SplinePath::new(line(n)).unwrap_err();
        assert_eq!(err, PathError::TooFewPoints { got: n });
    }
}

#[test]
fn open_curve_passes_through_its_end_points() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(120.0, 0.0, 40.0),
        Point3::new(260.0, 10.0, -30.0),
        Point3::new(400.0, 0.0, 0.0),
    ];
    let path = SplinePath::new(points.clone()).unwrap();
    assert!(!path.is_closed());
    assert!(path.point(0.0).distance(points[0]) < 1e-9);
    assert!(path.point(1.0).distance(points[3]) < 1e-9);
    assert!(path.point_at(0.0).distance(points[0]) < 1e-9);
    assert!(path.point_at(1.0).distance(points[3]) < 1e-6);
}

#[test]
fn moving_an_end_point_recomputes_closure() {
    let mut path = SplinePath::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(100.0, 0.0, 0.0),
        Point3::new(100.0, 0.0, 100.0),
        Point3::new(0.0, 0.0, 100.0),
    ])
    .unwrap();
    assert!(!path.is_closed());

    path.move_point(3, Point3::new(0.0, 0.0, 20.0)).unwrap();
    assert!(path.is_closed());

    path.move_point(3, Point3::new(0.0, 0.0, 100.0)).unwrap();
    assert!(!path.is_closed());

    let err = path.move_point(9, Point3::ZERO).unwrap_err();
    assert_eq!(err, PathError::IndexOutOfRange { index: 9, len: 4 });
}

#[test]
fn insertion_lands_between_the_neighbouring_control_points() {
    let mut path = SplinePath::new(line(4)).unwrap();
    let new_point = Point3::new(150.0, 0.0, 10.0);
    let index = path.insert_point(new_point);
    assert_eq!(index, 2);
    assert_eq!(path.len(), 5);
    assert_eq!(path.points()[2], new_point);
}

#[test]
fn insertion_preserves_relative_order() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let n = rng.gen_range(3..10);
        let original = random_points(&mut rng, n);
        let mut path = SplinePath::new(original.clone()).unwrap();
        let world = random_points(&mut rng, 1)[0];

        let index = path.insert_point(world);
        assert_eq!(path.len(), n + 1);
        assert_eq!(path.points()[index], world);

        let mut without: Vec<Point3> = path.points().to_vec();
        without.remove(index);
        assert_eq!(without, original);
    }
}

#[test]
fn removal_never_goes_below_three_points() {
    let original = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(100.0, 0.0, 0.0),
        Point3::new(100.0, 0.0, 100.0),
    ];
    let mut path = SplinePath::new(original.clone()).unwrap();
    for i in 0..3 {
        assert!(!path.remove_point(i));
        assert_eq!(path.points(), original.as_slice());
    }

    let mut path = SplinePath::new(line(4)).unwrap();
    assert!(!path.remove_point(4));
    assert!(path.remove_point(1));
    assert_eq!(path.len(), 3);
    assert!(!path.remove_point(0));
    assert_eq!(path.len(), 3);
}

#[test]
fn arc_length_is_positive_for_distinct_points() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let n = rng.gen_range(3..8);
        let mut points = random_points(&mut rng, n);
        if rng.gen_bool(0.5) {
            points[n - 1] = points[0] + Point3::new(10.0, 0.0, 0.0);
        }
        let path = SplinePath::new(points).unwrap();
        for samples in 2..40 {
            assert!(path.arc_length(samples) > 0.0);
        }
        assert!(path.length() > 0.0);
    }
}

#[test]
fn translation_moves_every_point_and_the_curve() {
    let mut path = SplinePath::new(line(3)).unwrap();
    let before = path.point(0.5);
    let delta = Point3::new(5.0, 1.0, -3.0);
    path.translate_all(delta);
    assert_eq!(path.points()[0], delta);
    assert!((path.point(0.5) - (before + delta)).length() < 1e-9);
}

#[test]
fn nearest_control_point_reports_index_and_distance() {
    let path = SplinePath::new(line(4)).unwrap();
    let (index, distance) = path.nearest_control_point(Point3::new(210.0, 0.0, 0.0));
    assert_eq!(index, 2);
    assert!((distance - 10.0).abs() < 1e-9);
}

fn square_loop() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 200.0),
        Point3::new(0.0, 0.0, 200.0),
        Point3::new(0.0, 0.0, 10.0),
    ]
}

#[test]
fn closed_point_at_wraps_around() {
    let path = SplinePath::new(square_loop()).unwrap();
    assert!(path.is_closed());
    for u in [0.1, 0.25, 0.5, 0.9] {
        let p = path.point_at(u);
        assert!(path.point_at(u + 1.0).distance(p) < 1e-6);
        assert!(path.point_at(u - 1.0).distance(p) < 1e-6);
        assert!(path.point_at(u + 3.0).distance(p) < 1e-6);
    }
}

#[test]
fn open_point_at_clamps_to_the_ends() {
    let path = SplinePath::new(line(4)).unwrap();
    assert!(!path.is_closed());
    assert!(path.point_at(1.5).distance(path.point_at(1.0)) < 1e-9);
    assert!(path.point_at(-0.5).distance(path.point_at(0.0)) < 1e-9);
}

#[test]
fn closed_loop_ignores_end_distance() {
    let mut path = SplinePath::closed_loop(line(3)).unwrap();
    assert_eq!(path.closure(), Closure::Always);
    assert!(path.is_closed());
    // The curve returns to its start.
    assert!(path.point(1.0).distance(path.points()[0]) < 1e-9);

    path.move_point(2, Point3::new(5_000.0, 0.0, 0.0)).unwrap();
    assert!(path.is_closed());
    path.insert_point(Point3::new(100.0, 0.0, 300.0));
    assert!(path.is_closed());
    assert_eq!(SplinePath::new(line(3)).unwrap().closure(), Closure::Derived);
}
