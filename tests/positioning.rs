//! Tests for the hole locator, position classifier and boundary monitor.

use linksight::positioning::{classify_position, locate_hole, within_course, PositioningConfig};
use linksight::synthetic::{generate_course, SyntheticCourseConfig};
use linksight::{Coordinate, CourseGeometry, PositionZone};

fn offset_m(c: &Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let lat = c.latitude + north_m / 111_320.0;
    let lng = c.longitude + east_m / (111_320.0 * c.latitude.to_radians().cos());
    Coordinate::new(lat, lng)
}

fn course() -> CourseGeometry {
    generate_course("test-links", &SyntheticCourseConfig::default())
}

// ============================================================================
// Hole Locator
// ============================================================================

#[test]
fn test_locate_hole_at_each_tee() {
    let course = course();
    for hole in &course.holes {
        assert_eq!(
            locate_hole(&hole.tee_point, &course),
            Some(hole.hole_number),
            "fix at tee {} should locate that hole",
            hole.hole_number
        );
    }
}

#[test]
fn test_locate_hole_deterministic() {
    let course = course();
    let fix = offset_m(&course.holes[4].tee_point, 12.0, -8.0);
    let first = locate_hole(&fix, &course);
    for _ in 0..10 {
        assert_eq!(locate_hole(&fix, &course), first);
    }
}

#[test]
fn test_locate_hole_no_holes_is_none() {
    let mut course = course();
    course.holes.clear();
    let fix = course.center_point;
    // Never defaults to hole 1
    assert_eq!(locate_hole(&fix, &course), None);
}

#[test]
fn test_locate_hole_tie_breaks_to_lowest_number() {
    let mut course = course();
    // Give holes 3 and 9 the same tee point
    let shared_tee = course.holes[2].tee_point;
    course.holes[8].tee_point = shared_tee;
    assert_eq!(locate_hole(&shared_tee, &course), Some(3));
}

// ============================================================================
// Position Classifier
// ============================================================================

#[test]
fn test_classify_at_tee() {
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();

    assert_eq!(
        classify_position(&hole.tee_point, hole, &config),
        PositionZone::Tee
    );
    // Still tee just inside the radius
    let near = offset_m(&hole.tee_point, 25.0, 0.0);
    assert_eq!(classify_position(&near, hole, &config), PositionZone::Tee);
}

#[test]
fn test_classify_at_pin_is_green() {
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();

    assert_eq!(
        classify_position(&hole.pin_point, hole, &config),
        PositionZone::Green
    );
}

#[test]
fn test_classify_mid_fairway() {
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();

    // Halfway down the hole, 10 m off the center line
    let mid = offset_m(&hole.tee_point, 180.0, 10.0);
    assert_eq!(classify_position(&mid, hole, &config), PositionZone::Fairway);
}

#[test]
fn test_classify_off_fairway_is_rough() {
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();

    // 50 m perpendicular to the fairway, past the 30 m half-width
    let wide = offset_m(&hole.tee_point, 180.0, -50.0);
    assert_eq!(classify_position(&wide, hole, &config), PositionZone::Rough);
}

#[test]
fn test_classify_inside_hazard() {
    let course = course();
    // Synthetic courses put a pond beside every 5th hole (2, 7, ...)
    let hole = course.hole(2).expect("hole 2 exists");
    assert!(!hole.hazards.is_empty());
    let config = PositioningConfig::default();

    let mid = Coordinate::new(
        (hole.tee_point.latitude + hole.pin_point.latitude) / 2.0,
        (hole.tee_point.longitude + hole.pin_point.longitude) / 2.0,
    );
    let in_pond = offset_m(&mid, 0.0, 45.0);
    assert_eq!(
        classify_position(&in_pond, hole, &config),
        PositionZone::Hazard
    );
}

#[test]
fn test_classify_never_tee_beyond_twice_radius() {
    // Regression guard against threshold drift
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();

    for distance in [61.0, 80.0, 120.0, 250.0] {
        let fix = offset_m(&hole.tee_point, distance, 0.0);
        assert_ne!(
            classify_position(&fix, hole, &config),
            PositionZone::Tee,
            "fix {} m from the tee must not classify as tee",
            distance
        );
    }
}

#[test]
fn test_classify_ordered_rules_tee_wins_over_fairway() {
    // The tee point sits on the fairway center line; rule order must
    // still classify it as tee.
    let course = course();
    let hole = &course.holes[0];
    let config = PositioningConfig::default();
    assert_eq!(
        classify_position(&hole.tee_point, hole, &config),
        PositionZone::Tee
    );
}

// ============================================================================
// Boundary Monitor
// ============================================================================

#[test]
fn test_center_always_within_course_both_policies() {
    let config = PositioningConfig::default();

    let with_polygon = course();
    assert!(with_polygon.boundary_polygon.is_some());
    assert!(within_course(
        &with_polygon.center_point,
        &with_polygon,
        &config
    ));

    let mut radius_only = course();
    radius_only.boundary_polygon = None;
    assert!(within_course(
        &radius_only.center_point,
        &radius_only,
        &config
    ));
}

#[test]
fn test_polygon_containment_boundary() {
    let course = course();
    let config = PositioningConfig::default();

    let inside = offset_m(&course.center_point, 100.0, 100.0);
    assert!(within_course(&inside, &course, &config));

    // Just past the boundary margin
    let outside = offset_m(&course.holes[0].tee_point, -300.0, -300.0);
    assert!(!within_course(&outside, &course, &config));
}

#[test]
fn test_fallback_radius_policy() {
    let mut course = course();
    course.boundary_polygon = None;
    let config = PositioningConfig::default();

    let near = offset_m(&course.center_point, 1500.0, 0.0);
    assert!(within_course(&near, &course, &config));

    let far = offset_m(&course.center_point, 5000.0, 0.0);
    assert!(!within_course(&far, &course, &config));
}

#[test]
fn test_degenerate_boundary_falls_back_to_radius() {
    let mut course = course();
    // Two-vertex ring cannot be a polygon
    course.boundary_polygon = Some(vec![
        course.center_point,
        offset_m(&course.center_point, 10.0, 0.0),
    ]);
    let config = PositioningConfig::default();

    assert!(within_course(&course.center_point, &course, &config));
    let far = offset_m(&course.center_point, 5000.0, 0.0);
    assert!(!within_course(&far, &course, &config));
}
