//! Static course geometry: holes, boundaries and bounds.
//!
//! Course geometry is external reference data. It is loaded through a
//! [`crate::engine::CourseGeometryProvider`], cached by the engine, and
//! never mutated here. Optional fields reflect partially digitized
//! courses: a course may lack a boundary polygon, a hole may lack a
//! fairway center line. Algorithms degrade per-field when geometry is
//! absent.

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::Coordinate;

/// Static geometry for a single hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleGeometry {
    pub course_id: String,
    /// 1-based hole number.
    pub hole_number: u32,
    pub tee_point: Coordinate,
    pub pin_point: Coordinate,
    /// Center line of the fairway from tee to green, if digitized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairway_centerline: Option<Vec<Coordinate>>,
    /// Boundary ring of the hole's layout, if digitized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hole_boundary: Option<Vec<Coordinate>>,
    /// Hazard polygons (water, bunkers) on this hole, if digitized.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hazards: Vec<Vec<Coordinate>>,
    pub par: u8,
    pub stroke_index: u8,
}

/// Static geometry for a whole course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGeometry {
    pub course_id: String,
    pub name: String,
    /// Course boundary ring. When absent, containment falls back to a
    /// radius around `center_point`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_polygon: Option<Vec<Coordinate>>,
    pub center_point: Coordinate,
    pub holes: Vec<HoleGeometry>,
}

impl CourseGeometry {
    /// Look up a hole by number.
    pub fn hole(&self, hole_number: u32) -> Option<&HoleGeometry> {
        self.holes.iter().find(|h| h.hole_number == hole_number)
    }

    /// Validate the coordinates the positioning pipeline depends on.
    ///
    /// Checks the center point and every hole's tee/pin, plus hole
    /// ownership (`hole.course_id` must match). Optional polylines and
    /// rings are not checked here; degenerate ones are caught per
    /// computation.
    pub fn validate(&self) -> Result<()> {
        if !self.center_point.is_valid() {
            return Err(EnrichError::InvalidCoordinate {
                latitude: self.center_point.latitude,
                longitude: self.center_point.longitude,
            });
        }
        for hole in &self.holes {
            if hole.course_id != self.course_id {
                return Err(EnrichError::Provider {
                    detail: format!(
                        "hole {} belongs to course '{}', not '{}'",
                        hole.hole_number, hole.course_id, self.course_id
                    ),
                });
            }
            for point in [&hole.tee_point, &hole.pin_point] {
                if !point.is_valid() {
                    return Err(EnrichError::InvalidCoordinate {
                        latitude: point.latitude,
                        longitude: point.longitude,
                    });
                }
            }
        }
        Ok(())
    }

    /// Bounding box over all course geometry (boundary, tees, pins).
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points: Vec<Coordinate> = vec![self.center_point];
        if let Some(ring) = &self.boundary_polygon {
            points.extend_from_slice(ring);
        }
        for hole in &self.holes {
            points.push(hole.tee_point);
            points.push(hole.pin_point);
        }
        Bounds::from_points(&points)
    }
}

/// Bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from coordinates. Returns `None` for an empty set.
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}
