//! Read-through course geometry cache with proximity resolution.
//!
//! Geometry comes from a pluggable [`CourseGeometryProvider`] (the
//! strategy seam between fully digitized and radius-only courses lives
//! behind this trait plus per-field degradation). Loaded courses are
//! cached by `course_id` and shared immutably as `Arc`s; invalidation is
//! explicit, tied to course-data updates. An R-tree over cached course
//! centers answers nearest-course queries for fixes that carry no
//! `course_id`.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::course::CourseGeometry;
use crate::error::{EnrichError, Result};
use crate::geo_utils::planar_distance;
use crate::Coordinate;

/// Source of static course geometry, keyed by course id.
///
/// Read-only from the engine's perspective; populated by a separate
/// course-authoring/import process.
pub trait CourseGeometryProvider: Send + Sync {
    /// Fetch one course. `Ok(None)` means the course is not digitized.
    fn fetch(&self, course_id: &str) -> Result<Option<CourseGeometry>>;

    /// All course ids this provider can serve. Used to build the
    /// proximity index.
    fn course_ids(&self) -> Vec<String>;
}

/// In-memory provider backed by a map, loadable from JSON.
#[derive(Debug, Default)]
pub struct StaticCourseProvider {
    courses: HashMap<String, CourseGeometry>,
}

impl StaticCourseProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self {
            courses: HashMap::new(),
        }
    }

    /// Insert a course, replacing any previous geometry for its id.
    pub fn insert(&mut self, course: CourseGeometry) {
        self.courses.insert(course.course_id.clone(), course);
    }

    /// Load a provider from a JSON array of `CourseGeometry`.
    pub fn from_json(json: &str) -> Result<Self> {
        let courses: Vec<CourseGeometry> =
            serde_json::from_str(json).map_err(|e| EnrichError::Provider {
                detail: format!("invalid course JSON: {}", e),
            })?;
        let mut provider = Self::new();
        for course in courses {
            provider.insert(course);
        }
        Ok(provider)
    }

    /// Number of courses held.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Check if the provider is empty.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CourseGeometryProvider for StaticCourseProvider {
    fn fetch(&self, course_id: &str) -> Result<Option<CourseGeometry>> {
        Ok(self.courses.get(course_id).cloned())
    }

    fn course_ids(&self) -> Vec<String> {
        self.courses.keys().cloned().collect()
    }
}

/// Project a coordinate into index space. Longitude is scaled by
/// cos(latitude) so squared distances in this space rank candidates the
/// same way the equirectangular metric does; in raw degrees a degree of
/// longitude shrinks with latitude and nearest-by-degrees can disagree
/// with nearest-by-meters.
fn index_point(c: &Coordinate) -> [f64; 2] {
    [c.longitude * c.latitude.to_radians().cos(), c.latitude]
}

/// Course center wrapper for R-tree indexing.
#[derive(Debug, Clone)]
struct CourseCell {
    course_id: String,
    /// `index_point` of the course center.
    center: [f64; 2],
}

impl RTreeObject for CourseCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.center)
    }
}

impl PointDistance for CourseCell {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.center[0] - point[0];
        let dy = self.center[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Read-through cache over a course geometry provider.
///
/// Courses are validated once on load; a course failing validation is
/// treated as missing (a data-quality gap, logged, not an error).
pub struct CourseStore {
    provider: Box<dyn CourseGeometryProvider>,
    cache: HashMap<String, Arc<CourseGeometry>>,
    tree: RTree<CourseCell>,
    index_dirty: bool,
}

impl CourseStore {
    /// Create a store over a provider.
    pub fn new(provider: Box<dyn CourseGeometryProvider>) -> Self {
        Self {
            provider,
            cache: HashMap::new(),
            tree: RTree::new(),
            index_dirty: true,
        }
    }

    /// Get a course, loading it through the provider on first access.
    pub fn get(&mut self, course_id: &str) -> Result<Option<Arc<CourseGeometry>>> {
        if let Some(course) = self.cache.get(course_id) {
            return Ok(Some(Arc::clone(course)));
        }
        match self.provider.fetch(course_id)? {
            Some(course) => {
                if let Err(e) = course.validate() {
                    warn!("course '{}' failed validation, treating as missing: {}", course_id, e);
                    return Ok(None);
                }
                let course = Arc::new(course);
                self.cache.insert(course_id.to_string(), Arc::clone(&course));
                self.index_dirty = true;
                Ok(Some(course))
            }
            None => Ok(None),
        }
    }

    /// Drop a cached course so the next access re-fetches it. Call when
    /// course data is updated upstream.
    pub fn invalidate(&mut self, course_id: &str) {
        if self.cache.remove(course_id).is_some() {
            self.index_dirty = true;
        }
    }

    /// Drop the whole cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.tree = RTree::new();
        self.index_dirty = true;
    }

    /// Number of cached courses.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Load every known course and rebuild the proximity index.
    fn ensure_index(&mut self) {
        if !self.index_dirty {
            return;
        }
        for course_id in self.provider.course_ids() {
            if !self.cache.contains_key(&course_id) {
                if let Err(e) = self.get(&course_id) {
                    warn!("skipping course '{}' in proximity index: {}", course_id, e);
                }
            }
        }
        let cells: Vec<CourseCell> = self
            .cache
            .values()
            .map(|course| CourseCell {
                course_id: course.course_id.clone(),
                center: index_point(&course.center_point),
            })
            .collect();
        self.tree = RTree::bulk_load(cells);
        self.index_dirty = false;
    }

    /// Find the course whose center is nearest to `position`, within
    /// `max_distance_m`. Returns `None` when nothing is close enough.
    pub fn nearest_course(
        &mut self,
        position: &Coordinate,
        max_distance_m: f64,
    ) -> Option<Arc<CourseGeometry>> {
        self.ensure_index();
        let nearest = self.tree.nearest_neighbor(&index_point(position))?;
        let course = self.cache.get(&nearest.course_id)?;
        let distance = planar_distance(position, &course.center_point).ok()?;
        if distance <= max_distance_m {
            Some(Arc::clone(course))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::synthetic::{generate_course, SyntheticCourseConfig};

    /// Provider that counts fetches, to assert read-through behavior.
    struct CountingProvider {
        inner: StaticCourseProvider,
        fetches: &'static AtomicUsize,
    }

    impl CourseGeometryProvider for CountingProvider {
        fn fetch(&self, course_id: &str) -> Result<Option<CourseGeometry>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(course_id)
        }

        fn course_ids(&self) -> Vec<String> {
            self.inner.course_ids()
        }
    }

    fn store_with_course(course_id: &str) -> (CourseStore, &'static AtomicUsize) {
        let mut inner = StaticCourseProvider::new();
        inner.insert(generate_course(course_id, &SyntheticCourseConfig::default()));
        let fetches: &'static AtomicUsize = Box::leak(Box::new(AtomicUsize::new(0)));
        let provider = CountingProvider { inner, fetches };
        (CourseStore::new(Box::new(provider)), fetches)
    }

    #[test]
    fn test_read_through_caches_after_first_fetch() {
        let (mut store, fetches) = store_with_course("c1");

        assert!(store.get("c1").unwrap().is_some());
        assert!(store.get("c1").unwrap().is_some());
        assert!(store.get("c1").unwrap().is_some());

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.cached_count(), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (mut store, fetches) = store_with_course("c1");

        store.get("c1").unwrap();
        store.invalidate("c1");
        store.get("c1").unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_course_is_none() {
        let (mut store, _) = store_with_course("c1");
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_nearest_course_within_radius() {
        let (mut store, _) = store_with_course("c1");
        let center = store.get("c1").unwrap().unwrap().center_point;

        let hit = store.nearest_course(&center, 3000.0);
        assert_eq!(hit.unwrap().course_id, "c1");
    }

    #[test]
    fn test_nearest_course_ranks_by_meters_not_degrees() {
        // At 56N a degree of longitude is ~0.56 of a degree of latitude.
        // "east" (~620 m away) is nearer in meters than "north" (~890 m)
        // despite being farther in raw degrees (0.010 vs 0.008).
        let minimal = |course_id: &str, center: Coordinate| CourseGeometry {
            course_id: course_id.to_string(),
            name: course_id.to_string(),
            boundary_polygon: None,
            center_point: center,
            holes: Vec::new(),
        };
        let mut provider = StaticCourseProvider::new();
        provider.insert(minimal("east", Coordinate::new(56.0, -2.99)));
        provider.insert(minimal("north", Coordinate::new(56.008, -3.0)));
        let mut store = CourseStore::new(Box::new(provider));

        let hit = store.nearest_course(&Coordinate::new(56.0, -3.0), 3000.0);
        assert_eq!(hit.unwrap().course_id, "east");
    }

    #[test]
    fn test_nearest_course_too_far() {
        let (mut store, _) = store_with_course("c1");
        let far = Coordinate::new(10.0, 10.0);
        assert!(store.nearest_course(&far, 3000.0).is_none());
    }
}
