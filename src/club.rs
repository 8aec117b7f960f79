//! Club-distance mapper and target advice for the presentation layer.
//!
//! [`recommend_club`] is a pure, monotonic step table from yardage to a
//! recommended club. [`target_advice`] combines it with distance and
//! bearing for a user-selected target point.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo_utils::{initial_bearing, meters_to_yards, planar_distance, CompassPoint};
use crate::Coordinate;

/// Yardage bands, descending. Band edges are inclusive at the lower
/// bound: exactly 150 yards recommends the 150-yard club.
const CLUB_BANDS: [(f64, &str); 13] = [
    (280.0, "Driver"),
    (250.0, "3-Wood"),
    (225.0, "5-Wood"),
    (210.0, "Hybrid"),
    (190.0, "4-Iron"),
    (175.0, "5-Iron"),
    (160.0, "6-Iron"),
    (150.0, "7-Iron"),
    (135.0, "8-Iron"),
    (120.0, "9-Iron"),
    (105.0, "Pitching Wedge"),
    (85.0, "Gap Wedge"),
    (70.0, "Sand Wedge"),
];

/// Recommend a club for a carry distance in yards.
///
/// Monotonic: a longer distance never recommends a shorter club.
/// Distances below the bottom band get the generic short answer.
///
/// # Example
/// ```
/// use linksight::club::recommend_club;
/// assert_eq!(recommend_club(265.0), "3-Wood");
/// assert_eq!(recommend_club(150.0), "7-Iron");
/// ```
pub fn recommend_club(distance_yards: f64) -> &'static str {
    for (min_yards, club) in CLUB_BANDS {
        if distance_yards >= min_yards {
            return club;
        }
    }
    "Lob Wedge"
}

/// Advice for a user-selected target point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAdvice {
    pub distance_meters: f64,
    pub distance_yards: f64,
    pub recommended_club: String,
    /// Initial course angle from the fix to the target, 0..360.
    pub bearing_degrees: f64,
    pub compass: CompassPoint,
}

/// Compute distance, club and bearing from the current fix to a target.
pub fn target_advice(from: &Coordinate, target: &Coordinate) -> Result<TargetAdvice> {
    let distance_meters = planar_distance(from, target)?;
    let distance_yards = meters_to_yards(distance_meters);
    let bearing_degrees = initial_bearing(from, target)?;
    Ok(TargetAdvice {
        distance_meters,
        distance_yards,
        recommended_club: recommend_club(distance_yards).to_string(),
        bearing_degrees,
        compass: CompassPoint::from_bearing(bearing_degrees),
    })
}
