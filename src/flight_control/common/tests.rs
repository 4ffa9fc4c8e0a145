use super::geo_math::{bearing, destination, distance};
use super::location::Location;
use super::math::{interpolate, normalize_bearing, normalize_longitude, signed_angle_diff};
use rand::Rng;

fn get_rand_location() -> Location {
    let mut rng = rand::rng();
    Location::new(
        rng.random_range(-80.0..80.0),
        rng.random_range(-180.0..180.0),
        rng.random_range(0.0..3000.0),
    )
}

#[test]
fn test_distance_zero_and_symmetric() {
    for _ in 0..100 {
        let a = get_rand_location();
        let b = get_rand_location();
        assert!(distance(&a, &a).abs() < 1e-9);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-6);
    }
}

#[test]
fn test_distance_known_value() {
    // one degree of latitude on the mean sphere
    let a = Location::new(0.0, 0.0, 0.0);
    let b = Location::new(1.0, 0.0, 0.0);
    let expected = std::f64::consts::PI * 6_371_000.0 / 180.0;
    assert!((distance(&a, &b) - expected).abs() < 1e-3);
}

#[test]
fn test_destination_inverts_bearing_and_distance() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let a = get_rand_location();
        let brg = rng.random_range(0.0..360.0);
        let dist = rng.random_range(10.0..200_000.0);
        let b = destination(&a, brg, dist);
        let back = destination(&a, bearing(&a, &b), distance(&a, &b));
        assert!(distance(&back, &b) < 3.0, "{a} -> {b} came back as {back}");
        assert_eq!(b.altitude(), a.altitude());
    }
}

#[test]
fn test_cardinal_bearings() {
    let origin = Location::new(10.0, 20.0, 0.0);
    let north = Location::new(11.0, 20.0, 0.0);
    let east = Location::new(10.0, 20.5, 0.0);
    let south = Location::new(9.0, 20.0, 0.0);
    assert!(bearing(&origin, &north).abs() < 1e-9);
    assert!((bearing(&origin, &east) - 90.0).abs() < 0.1);
    assert!((bearing(&origin, &south) - 180.0).abs() < 1e-9);
    assert_eq!(bearing(&origin, &origin), 0.0);
}

#[test]
fn test_antimeridian_wraps() {
    let origin = Location::new(0.0, 179.9, 100.0);
    let moved = destination(&origin, 90.0, 50_000.0);
    assert!(moved.longitude() < -179.0, "{moved}");
    let d = distance(&origin, &moved);
    assert!((d - 50_000.0).abs() < 1.0);
    let brg = bearing(&origin, &moved);
    assert!((brg - 90.0).abs() < 0.1, "{brg}");
}

#[test]
fn test_poles_stay_finite() {
    let pole = Location::new(90.0, 0.0, 0.0);
    let moved = destination(&pole, 45.0, 1000.0);
    assert!(moved.latitude().is_finite() && moved.longitude().is_finite());
    assert!(bearing(&pole, &moved).is_finite());
    let antipode = Location::new(-90.0, 0.0, 0.0);
    assert!(distance(&pole, &antipode).is_finite());
}

#[test]
fn test_angle_helpers() {
    assert_eq!(normalize_bearing(-90.0), 270.0);
    assert_eq!(normalize_bearing(720.0), 0.0);
    assert_eq!(normalize_longitude(190.0), -170.0);
    assert_eq!(normalize_longitude(180.0), -180.0);
    assert_eq!(signed_angle_diff(350.0, 10.0), 20.0);
    assert_eq!(signed_angle_diff(10.0, 350.0), -20.0);
    assert_eq!(interpolate(0.0, 1000.0, 50.0, 150.0, 500.0), 100.0);
    assert_eq!(interpolate(0.0, 1000.0, 50.0, 150.0, 5000.0), 150.0);
}
