//! Geographic utilities: metric distance, bearing and containment.
//!
//! All metric math runs on a local equirectangular projection of WGS84
//! coordinates (x = R * dlng * cos(mid_lat), y = R * dlat). At the
//! separations a golf course produces (well under 1 km) this stays within
//! ~1% of the true geodesic distance, which is far below consumer GPS
//! error. Polygon containment delegates to the `geo` crate.
//!
//! Invalid coordinates are a computation failure
//! ([`EnrichError::InvalidCoordinate`]), never silently coerced to 0.

use geo::{Contains, Coord, LineString, Point, Polygon};

use crate::error::{EnrichError, Result};
use crate::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per yard.
pub const METERS_PER_YARD: f64 = 0.9144;

/// Convert meters to yards.
pub fn meters_to_yards(meters: f64) -> f64 {
    meters / METERS_PER_YARD
}

/// Convert yards to meters.
pub fn yards_to_meters(yards: f64) -> f64 {
    yards * METERS_PER_YARD
}

fn ensure_valid(c: &Coordinate) -> Result<()> {
    if c.is_valid() {
        Ok(())
    } else {
        Err(EnrichError::InvalidCoordinate {
            latitude: c.latitude,
            longitude: c.longitude,
        })
    }
}

/// Project `p` into a local planar frame centered on `origin`.
///
/// Returns (x, y) in meters, x east, y north.
fn project(p: &Coordinate, origin: &Coordinate) -> (f64, f64) {
    let mid_lat = ((p.latitude + origin.latitude) / 2.0).to_radians();
    let x = (p.longitude - origin.longitude).to_radians() * mid_lat.cos() * EARTH_RADIUS_M;
    let y = (p.latitude - origin.latitude).to_radians() * EARTH_RADIUS_M;
    (x, y)
}

/// Distance in meters between two coordinates on the local planar
/// projection.
///
/// # Example
/// ```
/// use linksight::Coordinate;
/// use linksight::geo_utils::planar_distance;
///
/// let tee = Coordinate::new(55.9533, -3.1883);
/// let d = planar_distance(&tee, &tee).unwrap();
/// assert_eq!(d, 0.0);
/// ```
pub fn planar_distance(a: &Coordinate, b: &Coordinate) -> Result<f64> {
    ensure_valid(a)?;
    ensure_valid(b)?;
    let (x, y) = project(b, a);
    Ok((x * x + y * y).sqrt())
}

/// Initial course angle from `a` to `b` in degrees, normalized to
/// [0, 360). Returns 0 for coincident points.
pub fn initial_bearing(a: &Coordinate, b: &Coordinate) -> Result<f64> {
    ensure_valid(a)?;
    ensure_valid(b)?;
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();
    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    if y == 0.0 && x == 0.0 {
        return Ok(0.0);
    }
    Ok((y.atan2(x).to_degrees() + 360.0) % 360.0)
}

/// One of the 8 principal compass winds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    /// Map a bearing in degrees to its nearest compass wind.
    pub fn from_bearing(bearing_degrees: f64) -> Self {
        const WINDS: [CompassPoint; 8] = [
            CompassPoint::N,
            CompassPoint::NE,
            CompassPoint::E,
            CompassPoint::SE,
            CompassPoint::S,
            CompassPoint::SW,
            CompassPoint::W,
            CompassPoint::NW,
        ];
        let normalized = bearing_degrees.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        WINDS[sector]
    }

    /// Human-readable label, e.g. "NE".
    pub fn label(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NE => "NE",
            CompassPoint::E => "E",
            CompassPoint::SE => "SE",
            CompassPoint::S => "S",
            CompassPoint::SW => "SW",
            CompassPoint::W => "W",
            CompassPoint::NW => "NW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Distance in meters from `p` to the segment `a`-`b` on the local
/// planar projection centered at `p`.
fn point_to_segment_distance(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    let (ax, ay) = project(a, p);
    let (bx, by) = project(b, p);
    // p projects to the origin of its own frame
    let dx = bx - ax;
    let dy = by - ay;
    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq == 0.0 {
        return (ax * ax + ay * ay).sqrt();
    }
    let t = ((-ax * dx - ay * dy) / seg_len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    (cx * cx + cy * cy).sqrt()
}

/// Distance in meters from a point to a polyline (minimum over segments).
///
/// A single-point polyline degrades to point distance; an empty polyline
/// is degenerate.
pub fn point_to_polyline_distance(p: &Coordinate, line: &[Coordinate]) -> Result<f64> {
    ensure_valid(p)?;
    match line {
        [] => Err(EnrichError::DegenerateGeometry {
            detail: "empty polyline".to_string(),
        }),
        [only] => planar_distance(p, only),
        _ => {
            for v in line {
                ensure_valid(v)?;
            }
            let min = line
                .windows(2)
                .map(|seg| point_to_segment_distance(p, &seg[0], &seg[1]))
                .fold(f64::INFINITY, f64::min);
            Ok(min)
        }
    }
}

fn ring_to_polygon(ring: &[Coordinate]) -> Result<Polygon<f64>> {
    if ring.len() < 3 {
        return Err(EnrichError::DegenerateGeometry {
            detail: format!("polygon ring with {} vertices", ring.len()),
        });
    }
    for v in ring {
        ensure_valid(v)?;
    }
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|c| Coord {
            x: c.longitude,
            y: c.latitude,
        })
        .collect();
    Ok(Polygon::new(LineString::new(coords), vec![]))
}

/// Point-in-polygon containment test. The ring need not be explicitly
/// closed; `geo` closes it.
pub fn point_in_polygon(p: &Coordinate, ring: &[Coordinate]) -> Result<bool> {
    ensure_valid(p)?;
    let polygon = ring_to_polygon(ring)?;
    Ok(polygon.contains(&Point::new(p.longitude, p.latitude)))
}

/// Distance in meters from a point to a polygon: 0 inside, otherwise the
/// minimum distance to the boundary ring.
pub fn distance_to_polygon(p: &Coordinate, ring: &[Coordinate]) -> Result<f64> {
    if point_in_polygon(p, ring)? {
        return Ok(0.0);
    }
    // Close the ring so the last edge is included.
    let mut closed: Vec<Coordinate> = ring.to_vec();
    if ring.first() != ring.last() {
        closed.push(ring[0]);
    }
    point_to_polyline_distance(p, &closed)
}

/// A borrowed geometry target for distance queries.
#[derive(Debug, Clone, Copy)]
pub enum GeometryTarget<'a> {
    Point(&'a Coordinate),
    Polyline(&'a [Coordinate]),
    Polygon(&'a [Coordinate]),
}

/// Distance in meters from a point to a geometry target.
pub fn distance_to_geometry(p: &Coordinate, target: GeometryTarget<'_>) -> Result<f64> {
    match target {
        GeometryTarget::Point(q) => planar_distance(p, q),
        GeometryTarget::Polyline(line) => point_to_polyline_distance(p, line),
        GeometryTarget::Polygon(ring) => distance_to_polygon(p, ring),
    }
}
