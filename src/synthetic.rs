//! Synthetic course and fix-stream generation for tests, benchmarks and
//! the CLI demo.
//!
//! Generates a parameterized golf course with fully digitized geometry
//! (tees, pins, fairway center lines, hole corridors, hazards, course
//! boundary) and deterministic noisy rounds over it, providing ground
//! truth for shot-sequencing validation.
//!
//! # Example
//!
//! ```rust
//! use linksight::synthetic::{generate_course, generate_round, RoundScenarioConfig, SyntheticCourseConfig};
//!
//! let course = generate_course("links-18", &SyntheticCourseConfig::default());
//! assert_eq!(course.holes.len(), 18);
//!
//! let round = generate_round(&course, &RoundScenarioConfig::default());
//! assert!(round.expected_shots > 0);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::course::{Bounds, CourseGeometry, HoleGeometry};
use crate::{Coordinate, LocationFix};

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Offset a coordinate by meters north and east.
fn offset(origin: &Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let lat = origin.latitude + north_m / METERS_PER_DEG_LAT;
    let meters_per_deg_lng = METERS_PER_DEG_LAT * origin.latitude.to_radians().cos();
    let lng = origin.longitude + east_m / meters_per_deg_lng;
    Coordinate::new(lat, lng)
}

/// Linear interpolation between two coordinates.
fn lerp(a: &Coordinate, b: &Coordinate, t: f64) -> Coordinate {
    Coordinate::new(
        a.latitude + (b.latitude - a.latitude) * t,
        a.longitude + (b.longitude - a.longitude) * t,
    )
}

// ============================================================================
// Course Generation
// ============================================================================

/// Configuration for a synthetic course.
#[derive(Debug, Clone)]
pub struct SyntheticCourseConfig {
    /// Southwest reference point the layout grows from.
    pub origin: Coordinate,
    /// Number of holes. Default: 18
    pub hole_count: u32,
    /// Tee-to-pin length of every hole in meters. Default: 360
    pub hole_length_m: f64,
    /// East-west spacing between adjacent hole corridors. Default: 75
    pub corridor_spacing_m: f64,
    /// Sample spacing along fairway center lines. Default: 30
    pub fairway_sample_spacing_m: f64,
    /// Margin the course boundary extends past the holes. Default: 150
    pub boundary_margin_m: f64,
}

impl Default for SyntheticCourseConfig {
    fn default() -> Self {
        Self {
            origin: Coordinate::new(56.34, -2.80),
            hole_count: 18,
            hole_length_m: 360.0,
            corridor_spacing_m: 75.0,
            fairway_sample_spacing_m: 30.0,
            boundary_margin_m: 150.0,
        }
    }
}

/// Generate a course with fully digitized geometry.
///
/// Holes run serpentine: odd holes south to north, even holes north to
/// south, each corridor `corridor_spacing_m` east of the previous one.
/// Every 5th hole carries a hazard polygon beside its fairway.
pub fn generate_course(course_id: &str, config: &SyntheticCourseConfig) -> CourseGeometry {
    let mut holes = Vec::with_capacity(config.hole_count as usize);

    for hole_number in 1..=config.hole_count {
        let east = (hole_number - 1) as f64 * config.corridor_spacing_m;
        let northbound = hole_number % 2 == 1;
        let (tee, pin) = if northbound {
            (
                offset(&config.origin, 0.0, east),
                offset(&config.origin, config.hole_length_m, east),
            )
        } else {
            (
                offset(&config.origin, config.hole_length_m, east),
                offset(&config.origin, 0.0, east),
            )
        };

        let samples = ((config.hole_length_m / config.fairway_sample_spacing_m).ceil() as usize).max(1);
        let centerline: Vec<Coordinate> = (0..=samples)
            .map(|i| lerp(&tee, &pin, i as f64 / samples as f64))
            .collect();

        let half_width = config.corridor_spacing_m / 2.0;
        let hole_boundary = vec![
            offset(&tee, if northbound { -40.0 } else { 40.0 }, -half_width),
            offset(&tee, if northbound { -40.0 } else { 40.0 }, half_width),
            offset(&pin, if northbound { 40.0 } else { -40.0 }, half_width),
            offset(&pin, if northbound { 40.0 } else { -40.0 }, -half_width),
        ];

        let hazards = if hole_number % 5 == 2 {
            // 20x20 m pond beside the fairway, 45 m east of the midpoint
            let mid = lerp(&tee, &pin, 0.5);
            vec![vec![
                offset(&mid, -10.0, 35.0),
                offset(&mid, -10.0, 55.0),
                offset(&mid, 10.0, 55.0),
                offset(&mid, 10.0, 35.0),
            ]]
        } else {
            Vec::new()
        };

        holes.push(HoleGeometry {
            course_id: course_id.to_string(),
            hole_number,
            tee_point: tee,
            pin_point: pin,
            fairway_centerline: Some(centerline),
            hole_boundary: Some(hole_boundary),
            hazards,
            par: match hole_number % 3 {
                0 => 5,
                1 => 4,
                _ => 3,
            },
            stroke_index: (config.hole_count - hole_number + 1) as u8,
        });
    }

    let all_points: Vec<Coordinate> = holes
        .iter()
        .flat_map(|h| [h.tee_point, h.pin_point])
        .collect();
    let bounds = Bounds::from_points(&all_points).unwrap_or(Bounds {
        min_lat: config.origin.latitude,
        max_lat: config.origin.latitude,
        min_lng: config.origin.longitude,
        max_lng: config.origin.longitude,
    });
    let center = bounds.center();
    let margin = config.boundary_margin_m;
    let sw = offset(
        &Coordinate::new(bounds.min_lat, bounds.min_lng),
        -margin,
        -margin,
    );
    let ne = offset(
        &Coordinate::new(bounds.max_lat, bounds.max_lng),
        margin,
        margin,
    );
    let boundary_polygon = vec![
        Coordinate::new(sw.latitude, sw.longitude),
        Coordinate::new(sw.latitude, ne.longitude),
        Coordinate::new(ne.latitude, ne.longitude),
        Coordinate::new(ne.latitude, sw.longitude),
    ];

    CourseGeometry {
        course_id: course_id.to_string(),
        name: format!("Synthetic Links ({})", course_id),
        boundary_polygon: Some(boundary_polygon),
        center_point: center,
        holes,
    }
}

// ============================================================================
// Round Generation
// ============================================================================

/// Configuration for a synthetic round of fixes.
#[derive(Debug, Clone)]
pub struct RoundScenarioConfig {
    pub user_id: String,
    pub round_id: String,
    /// Fixes emitted while standing at each stance. Default: 3
    pub fixes_per_stance: u32,
    /// Uniform GPS jitter amplitude per axis in meters. Must stay below
    /// half the minimum shot distance so jitter can never fake a shot.
    /// Default: 2.0
    pub gps_jitter_m: f64,
    /// Timestamp of the first fix. Default: 1_700_000_000_000
    pub start_timestamp_ms: i64,
    /// Interval between fixes. Default: 2000 ms
    pub fix_interval_ms: i64,
    /// RNG seed for deterministic reproduction. Default: 42
    pub seed: u64,
}

impl Default for RoundScenarioConfig {
    fn default() -> Self {
        Self {
            user_id: "player-1".to_string(),
            round_id: "round-1".to_string(),
            fixes_per_stance: 3,
            gps_jitter_m: 2.0,
            start_timestamp_ms: 1_700_000_000_000,
            fix_interval_ms: 2000,
            seed: 42,
        }
    }
}

/// A generated round with ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticRound {
    /// Timestamp-ordered fixes, several per stance, with jitter.
    pub fixes: Vec<LocationFix>,
    /// Noiseless stance points the player hit from.
    pub stances: Vec<Coordinate>,
    /// Shots the sequencer must emit for this round.
    pub expected_shots: usize,
}

/// Generate a round walking every hole: tee, mid-fairway, green.
///
/// Each stance emits `fixes_per_stance` jittered fixes. Stances are at
/// least a corridor spacing apart while jitter stays within a couple of
/// meters, so the expected shot count is exactly the number of stance
/// transitions.
pub fn generate_round(course: &CourseGeometry, config: &RoundScenarioConfig) -> SyntheticRound {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut stances: Vec<Coordinate> = Vec::new();
    for hole in &course.holes {
        stances.push(hole.tee_point);
        stances.push(lerp(&hole.tee_point, &hole.pin_point, 0.55));
        stances.push(hole.pin_point);
    }

    let mut fixes = Vec::with_capacity(stances.len() * config.fixes_per_stance as usize);
    let mut timestamp = config.start_timestamp_ms;
    for stance in &stances {
        for _ in 0..config.fixes_per_stance {
            let jitter_north = rng.gen_range(-config.gps_jitter_m..=config.gps_jitter_m);
            let jitter_east = rng.gen_range(-config.gps_jitter_m..=config.gps_jitter_m);
            let noisy = offset(stance, jitter_north, jitter_east);
            fixes.push(
                LocationFix::new(noisy.latitude, noisy.longitude, timestamp, &config.user_id)
                    .with_round(&config.round_id)
                    .with_course(&course.course_id)
                    .with_accuracy(5.0),
            );
            timestamp += config.fix_interval_ms;
        }
    }

    SyntheticRound {
        expected_shots: stances.len().saturating_sub(1),
        fixes,
        stances,
    }
}
