//! # linksight
//!
//! Course-relative positioning and distance engine for golf round
//! companion applications.
//!
//! This library turns raw GPS position fixes into golf-meaningful
//! context:
//! - Which hole the player is on (nearest-tee search)
//! - Where on that hole they stand (tee/fairway/green/hazard/rough)
//! - Distances to tee and pin over a local planar projection
//! - Whether the fix is inside the course at all
//! - Discrete shot events derived from per-round displacement
//! - Club recommendations for a selected target point
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch enrichment with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use linksight::engine::{LocationEngine, StaticCourseProvider};
//! use linksight::synthetic::{generate_course, SyntheticCourseConfig};
//! use linksight::LocationFix;
//!
//! let course = generate_course("pebble-creek", &SyntheticCourseConfig::default());
//! let tee = course.holes[0].tee_point;
//!
//! let mut provider = StaticCourseProvider::new();
//! provider.insert(course);
//! let mut engine = LocationEngine::new(Box::new(provider));
//!
//! let fix = LocationFix::new(tee.latitude, tee.longitude, 1_700_000_000_000, "player-1")
//!     .with_round("round-1")
//!     .with_course("pebble-creek");
//!
//! let enrichment = engine.enrich(fix).unwrap();
//! assert_eq!(enrichment.location.current_hole, Some(1));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{EnrichError, Result};

// Geographic utilities (planar distance, bearing, containment)
pub mod geo_utils;
pub use geo_utils::{CompassPoint, GeometryTarget};

// Static course geometry (holes, boundaries, bounds)
pub mod course;
pub use course::{Bounds, CourseGeometry, HoleGeometry};

// Stateless positioning algorithms (hole locator, classifier, boundary)
pub mod positioning;
pub use positioning::{classify_position, locate_hole, within_course, PositioningConfig};

// Club-distance mapper and target advice
pub mod club;
pub use club::{recommend_club, target_advice, TargetAdvice};

// Modular location engine with extracted components
pub mod engine;
pub use engine::{
    CourseGeometryProvider, CourseStore, EngineStats, Enrichment, HistorySink, LocationEngine,
    LocationHistory, ShotSequencer, StaticCourseProvider,
};

// Synthetic course and fix-stream generation for tests and benchmarks
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate in degrees.
///
/// # Example
/// ```
/// use linksight::Coordinate;
/// let point = Coordinate::new(55.9533, -3.1883); // Edinburgh
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that the coordinate is finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One timestamped GPS reading from a player's device.
///
/// Immutable once created. Fixes for a given `(user_id, round_id)` form a
/// strictly increasing sequence by `timestamp_ms`; equal or older
/// timestamps are rejected by the engine rather than reprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    /// Reported horizontal accuracy in meters (consumer GPS: 3-15 m).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl LocationFix {
    /// Create a new fix with the required fields.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64, user_id: &str) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            accuracy_meters: None,
            altitude_meters: None,
            heading_degrees: None,
            speed_mps: None,
            timestamp_ms,
            user_id: user_id.to_string(),
            round_id: None,
            course_id: None,
        }
    }

    /// Attach a round identifier (enables shot sequencing).
    pub fn with_round(mut self, round_id: &str) -> Self {
        self.round_id = Some(round_id.to_string());
        self
    }

    /// Attach a course identifier (skips proximity-based resolution).
    pub fn with_course(mut self, course_id: &str) -> Self {
        self.course_id = Some(course_id.to_string());
        self
    }

    /// Attach a reported horizontal accuracy.
    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters = Some(accuracy_meters);
        self
    }

    /// Validate the fix before it enters the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.coordinate.is_valid() {
            Ok(())
        } else {
            Err(EnrichError::InvalidCoordinate {
                latitude: self.coordinate.latitude,
                longitude: self.coordinate.longitude,
            })
        }
    }

    /// The round key for this fix, if it carries round identity.
    pub fn round_key(&self) -> Option<RoundKey> {
        self.round_id.as_ref().map(|round_id| RoundKey {
            user_id: self.user_id.clone(),
            round_id: round_id.clone(),
        })
    }
}

/// Key isolating per-round mutable state: `(user_id, round_id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundKey {
    pub user_id: String,
    pub round_id: String,
}

impl RoundKey {
    pub fn new(user_id: &str, round_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            round_id: round_id.to_string(),
        }
    }
}

impl std::fmt::Display for RoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.round_id)
    }
}

/// Coarse on-hole position classification.
///
/// The zones are not a true geometric partition; classification is an
/// ordered first-match over zone rules tuned for consumer GPS noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionZone {
    Tee,
    Fairway,
    Green,
    Hazard,
    Rough,
    /// No hole could be located for the fix.
    Unknown,
}

impl std::fmt::Display for PositionZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PositionZone::Tee => "tee",
            PositionZone::Fairway => "fairway",
            PositionZone::Green => "green",
            PositionZone::Hazard => "hazard",
            PositionZone::Rough => "rough",
            PositionZone::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A fix enriched with golf context. Append-only; identity fields
/// (coordinate, timestamp, user) never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLocation {
    pub fix: LocationFix,
    /// The course the engine resolved the fix to (explicit `course_id`
    /// or nearest-course lookup). Absent when no course was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Hole number on the resolved course. Always references a hole of
    /// `course_id`. Absent when no hole could be located.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hole: Option<u32>,
    pub position_on_hole: PositionZone,
    /// Meters to the current hole's tee. `None` means unknown, never 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_tee_meters: Option<f64>,
    /// Meters to the current hole's pin. `None` means unknown, never 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_pin_meters: Option<f64>,
    /// Containment per the course boundary polygon, or the fallback
    /// center-radius policy. `false` when no course was resolved.
    pub within_course_boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shot_distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shot_location: Option<Coordinate>,
    /// `true` once the record is durably appended to history; `false`
    /// when it was computed but the append failed (retryable).
    pub persisted: bool,
}

/// A discrete shot detected by the shot sequencer.
///
/// Produced at most once per qualifying anchor transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub user_id: String,
    pub round_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hole_number: Option<u32>,
    /// The anchor the shot started from.
    pub from: Coordinate,
    /// The fix that ended the shot (the new anchor).
    pub to: Coordinate,
    pub distance_meters: f64,
    /// Timestamp of the fix that completed the shot.
    pub timestamp_ms: i64,
}
