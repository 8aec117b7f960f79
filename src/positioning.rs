//! Stateless positioning algorithms: hole locator, position classifier
//! and course boundary monitor.
//!
//! These are pure functions over a fix coordinate, static course
//! geometry and a [`PositioningConfig`]. Per-round state lives in the
//! engine, not here.

use log::debug;

use crate::course::{CourseGeometry, HoleGeometry};
use crate::geo_utils::{planar_distance, point_in_polygon, point_to_polyline_distance};
use crate::{Coordinate, PositionZone};

/// Configuration for the positioning pipeline.
///
/// All radii are per-course tuning inputs, not hard-coded constants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PositioningConfig {
    /// Radius around the tee point classified as `tee`.
    /// Default: 30.0 meters
    pub tee_radius_m: f64,

    /// Radius around the pin point classified as `green`.
    /// Default: 20.0 meters
    pub green_radius_m: f64,

    /// Half-width of the fairway corridor around the center line.
    /// Default: 30.0 meters
    pub fairway_half_width_m: f64,

    /// Fallback containment radius around the course center, used when
    /// no boundary polygon has been digitized.
    /// Default: 2000.0 meters
    pub course_fallback_radius_m: f64,

    /// Minimum displacement from the shot anchor for a fix to count as
    /// a new shot. Suppresses GPS jitter while the player is stationary.
    /// Default: 9.144 meters (10 yards)
    pub min_shot_distance_m: f64,

    /// Maximum distance from a course center for proximity-based course
    /// resolution when a fix carries no `course_id`.
    /// Default: 3000.0 meters
    pub course_resolution_radius_m: f64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            tee_radius_m: 30.0,
            green_radius_m: 20.0,
            fairway_half_width_m: 30.0,
            course_fallback_radius_m: 2000.0,
            min_shot_distance_m: 9.144,
            course_resolution_radius_m: 3000.0,
        }
    }
}

/// Locate the current hole for a fix: nearest tee point wins, ties
/// broken by lowest hole number.
///
/// Tee proximity is the most reliable single discriminator between
/// holes: adjacent holes often run parallel and share fairway corridors
/// but never share a tee box. Returns `None` when the course has no
/// usable hole geometry; callers must treat that as unknown, never
/// default to hole 1.
pub fn locate_hole(position: &Coordinate, course: &CourseGeometry) -> Option<u32> {
    course
        .holes
        .iter()
        .filter_map(|hole| {
            planar_distance(position, &hole.tee_point)
                .ok()
                .map(|d| (d, hole.hole_number))
        })
        .min_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        })
        .map(|(_, hole_number)| hole_number)
}

/// Classify a fix into an on-hole zone. Ordered rule evaluation, first
/// match wins:
///
/// 1. Within `tee_radius_m` of the tee point -> `Tee`
/// 2. Within `green_radius_m` of the pin point -> `Green`
/// 3. Inside a digitized hazard polygon -> `Hazard`
/// 4. Within `fairway_half_width_m` of the fairway center line -> `Fairway`
/// 5. Otherwise -> `Rough` (inside the layout or outside its boundary)
///
/// A rule whose geometry is degenerate is skipped, degrading that rule
/// rather than the whole classification.
pub fn classify_position(
    position: &Coordinate,
    hole: &HoleGeometry,
    config: &PositioningConfig,
) -> PositionZone {
    if let Ok(d) = planar_distance(position, &hole.tee_point) {
        if d <= config.tee_radius_m {
            return PositionZone::Tee;
        }
    }

    if let Ok(d) = planar_distance(position, &hole.pin_point) {
        if d <= config.green_radius_m {
            return PositionZone::Green;
        }
    }

    for hazard in &hole.hazards {
        match point_in_polygon(position, hazard) {
            Ok(true) => return PositionZone::Hazard,
            Ok(false) => {}
            Err(e) => debug!(
                "skipping hazard on hole {} of '{}': {}",
                hole.hole_number, hole.course_id, e
            ),
        }
    }

    if let Some(centerline) = &hole.fairway_centerline {
        match point_to_polyline_distance(position, centerline) {
            Ok(d) if d <= config.fairway_half_width_m => return PositionZone::Fairway,
            Ok(_) => {}
            Err(e) => debug!(
                "skipping fairway centerline on hole {} of '{}': {}",
                hole.hole_number, hole.course_id, e
            ),
        }
    }

    PositionZone::Rough
}

/// Decide whether a fix lies within the course.
///
/// Uses polygon containment when a boundary ring exists; otherwise falls
/// back to `course_fallback_radius_m` around the course center — an
/// explicit approximation for courses whose geometry has not been
/// digitized yet.
pub fn within_course(
    position: &Coordinate,
    course: &CourseGeometry,
    config: &PositioningConfig,
) -> bool {
    if let Some(ring) = &course.boundary_polygon {
        match point_in_polygon(position, ring) {
            Ok(inside) => return inside,
            Err(e) => debug!(
                "boundary polygon of '{}' unusable, falling back to radius: {}",
                course.course_id, e
            ),
        }
    }
    planar_distance(position, &course.center_point)
        .map(|d| d <= config.course_fallback_radius_m)
        .unwrap_or(false)
}
