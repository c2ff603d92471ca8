// Gesture simplification.

use audioscape_core::simplify::simplify;
use audioscape_core::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_walk(rng: &mut StdRng, n: usize) -> Vec<Point3> {
    let mut p = Point3::ZERO;
    (0..n)
        .map(|_| {
            p += Point3::new(
                rng.gen_range(-4.0..8.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-6.0..6.0),
            );
            p
        })
        .collect()
}

#[test]
fn keeps_first_and_last_points() {
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..50 {
        let n = rng.gen_range(2..300);
        let points = noisy_walk(&mut rng, n);
        for high_quality in [false, true] {
            let out = simplify(&points, 10.0, high_quality);
            assert_eq!(out.first(), points.first());
            assert_eq!(out.last(), points.last());
        }
    }
}

#[test]
fn output_is_an_ordered_subsequence() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let points = noisy_walk(&mut rng, 200);
        let out = simplify(&points, 10.0, true);
        let mut cursor = points.iter();
        for p in &out {
            assert!(cursor.any(|q| q == p), "point {p:?} out of order");
        }
    }
}

#[test]
fn simplifying_twice_changes_nothing() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let n = rng.gen_range(3..400);
        let points = noisy_walk(&mut rng, n);
        let tolerance = rng.gen_range(0.5..40.0);
        let once = simplify(&points, tolerance, true);
        let twice = simplify(&once, tolerance, true);
        assert_eq!(once, twice);
    }
}

#[test]
fn collinear_points_collapse_to_end_points() {
    let points: Vec<Point3> = (0..50).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
    let out = simplify(&points, 1.0, false);
    assert_eq!(out, vec![points[0], points[49]]);
}

#[test]
fn elevated_detours_are_kept() {
    // A spike in Y only; a planar simplifier would drop it.
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(50.0, 0.0, 0.0),
        Point3::new(100.0, 80.0, 0.0),
        Point3::new(150.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 0.0),
    ];
    let out = simplify(&points, 10.0, true);
    assert!(out.contains(&points[2]));
}

#[test]
fn tiny_inputs_pass_through() {
    assert!(simplify(&[], 10.0, true).is_empty());
    let one = [Point3::new(1.0, 2.0, 3.0)];
    assert_eq!(simplify(&one, 10.0, false), one.to_vec());
}
