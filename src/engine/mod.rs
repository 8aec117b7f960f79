//! # Location Engine
//!
//! The orchestrator composing the positioning pipeline into one
//! enriched record per fix, with focused subcomponents:
//!
//! - `CourseStore` - Read-through course geometry cache with proximity
//!   resolution
//! - `ShotSequencer` - Keyed per-round shot anchor state
//! - `LocationHistory` - Append-only enriched record store
//!
//! ## Pipeline
//!
//! validate fix -> resolve course -> locate hole -> {classify, boundary
//! check, tee/pin distances} -> shot sequencing -> assemble record ->
//! append to history -> return.
//!
//! Enrichment is pure until the final append. Round state only advances
//! after a successful append, so a fix whose persistence failed can be
//! resubmitted and re-derives identically.

pub mod course_store;
pub mod history;
pub mod shot_sequencer;

pub use course_store::{CourseGeometryProvider, CourseStore, StaticCourseProvider};
pub use history::{HistorySink, LocationHistory};
pub use shot_sequencer::{RoundState, ShotOutcome, ShotSequencer};

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::club::{self, TargetAdvice};
use crate::course::CourseGeometry;
use crate::error::Result;
use crate::geo_utils::planar_distance;
use crate::positioning::{classify_position, locate_hole, within_course, PositioningConfig};
use crate::{
    Coordinate, EnrichedLocation, LocationFix, PositionZone, RoundKey, ShotEvent,
};

/// The result of enriching one fix: the record plus any shot it closed.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub location: EnrichedLocation,
    pub shot: Option<ShotEvent>,
}

/// Engine monitoring counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EngineStats {
    pub cached_courses: usize,
    pub tracked_rounds: usize,
    pub history_len: usize,
    pub shots_emitted: u64,
}

/// Course-relative positioning engine.
///
/// One instance serves many users and rounds concurrently submitted
/// fixes; all per-round mutable state is keyed by `(user_id, round_id)`
/// inside the sequencer, never held per instance field.
pub struct LocationEngine {
    pub courses: CourseStore,
    pub sequencer: ShotSequencer,
    history: Box<dyn HistorySink>,
    config: PositioningConfig,
}

impl LocationEngine {
    /// Create an engine over a geometry provider with default tuning.
    pub fn new(provider: Box<dyn CourseGeometryProvider>) -> Self {
        Self::with_config(provider, PositioningConfig::default())
    }

    /// Create an engine with per-deployment tuning radii.
    pub fn with_config(
        provider: Box<dyn CourseGeometryProvider>,
        config: PositioningConfig,
    ) -> Self {
        Self {
            courses: CourseStore::new(provider),
            sequencer: ShotSequencer::new(),
            history: Box::new(LocationHistory::new()),
            config,
        }
    }

    /// Replace the bundled in-memory history with another sink.
    pub fn with_history(mut self, history: Box<dyn HistorySink>) -> Self {
        self.history = history;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PositioningConfig {
        &self.config
    }

    // ========================================================================
    // Enrichment
    // ========================================================================

    /// Enrich one fix.
    ///
    /// Rejects invalid coordinates and stale (out-of-order or duplicate)
    /// fixes with an error. Missing course geometry is not an error: the
    /// dependent fields degrade to absent and enrichment proceeds. A
    /// failed history append is reported through
    /// `location.persisted == false`; the round's shot state is not
    /// advanced, so resubmitting the same fix is safe.
    pub fn enrich(&mut self, fix: LocationFix) -> Result<Enrichment> {
        fix.validate()?;

        let course = self.resolve_course(&fix);
        let fields = derive_position(&fix.coordinate, course.as_deref(), &self.config);

        let key = fix.round_key();
        let outcome = match &key {
            Some(k) => Some(self.sequencer.evaluate(
                k,
                &fix,
                fields.current_hole,
                self.config.min_shot_distance_m,
            )?),
            None => None,
        };

        let (last_shot_distance, last_shot_location) = outcome
            .as_ref()
            .map(|o| (o.next_state.last_shot_distance_m, o.next_state.last_shot_location))
            .unwrap_or((None, None));

        let mut location = assemble(fix, fields, last_shot_distance, last_shot_location);

        match self.history.append(&location) {
            Ok(()) => {
                let shot = outcome.as_ref().and_then(|o| o.event.clone());
                if let (Some(key), Some(outcome)) = (key, outcome) {
                    self.sequencer.commit(key, outcome.next_state);
                }
                Ok(Enrichment { location, shot })
            }
            Err(e) => {
                warn!(
                    "history append failed for fix at {} (round state not advanced): {}",
                    location.fix.timestamp_ms, e
                );
                location.persisted = false;
                // The record must mirror the state the engine kept, not
                // the uncommitted evaluation; the withheld shot and its
                // fields surface on retry.
                let committed = key.as_ref().and_then(|k| self.sequencer.state(k));
                location.last_shot_distance_meters =
                    committed.and_then(|s| s.last_shot_distance_m);
                location.last_shot_location = committed.and_then(|s| s.last_shot_location);
                Ok(Enrichment {
                    location,
                    shot: None,
                })
            }
        }
    }

    /// Enrich a backlog of fixes.
    ///
    /// Fixes are grouped by round, ordered by timestamp within each
    /// round, and rounds processed independently (in parallel with the
    /// `parallel` feature). Results come back in input order. As in
    /// [`enrich`](Self::enrich), round state advances fix by fix only as
    /// appends succeed: when an append fails, that fix and the rest of
    /// its round come back with `persisted == false` and shots withheld,
    /// uncommitted, so resubmitting them in order is safe. Other rounds
    /// in the batch are unaffected.
    pub fn enrich_batch(&mut self, fixes: Vec<LocationFix>) -> Vec<Result<Enrichment>> {
        let total = fixes.len();
        let mut results: Vec<Option<Result<Enrichment>>> = (0..total).map(|_| None).collect();

        // Validate and resolve courses up front; this warms the cache
        // and keeps the per-round stage pure.
        let mut keyed: HashMap<RoundKey, Vec<BatchItem>> = HashMap::new();
        let mut unkeyed: Vec<BatchItem> = Vec::new();

        for (index, fix) in fixes.into_iter().enumerate() {
            if let Err(e) = fix.validate() {
                results[index] = Some(Err(e));
                continue;
            }
            let course = self.resolve_course(&fix);
            let item = BatchItem { index, fix, course };
            match item.fix.round_key() {
                Some(key) => keyed.entry(key).or_default().push(item),
                None => unkeyed.push(item),
            }
        }

        let mut batches: Vec<RoundBatch> = keyed
            .into_iter()
            .map(|(key, mut items)| {
                items.sort_by_key(|item| item.fix.timestamp_ms);
                let start = self.sequencer.state(&key).copied();
                RoundBatch { key, start, items }
            })
            .collect();
        batches.sort_by(|a, b| a.key.cmp(&b.key));

        let config = self.config.clone();

        #[cfg(feature = "parallel")]
        let outputs: Vec<RoundBatchOutput> = batches
            .into_par_iter()
            .map(|batch| process_round_batch(batch, &config))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outputs: Vec<RoundBatchOutput> = batches
            .into_iter()
            .map(|batch| process_round_batch(batch, &config))
            .collect();

        for output in outputs {
            let key = output.key;
            let mut halted = false;
            for (index, item) in output.items {
                results[index] = Some(item.map(|record| {
                    let BatchRecord {
                        mut location,
                        shot,
                        next_state,
                    } = record;
                    if !halted {
                        match self.history.append(&location) {
                            Ok(()) => {
                                self.sequencer.commit(key.clone(), next_state);
                                return Enrichment { location, shot };
                            }
                            Err(e) => {
                                warn!(
                                    "history append failed during batch for fix at {} (round halted for retry): {}",
                                    location.fix.timestamp_ms, e
                                );
                                halted = true;
                            }
                        }
                    }
                    // Everything from the failed append on stays
                    // unpersisted and uncommitted; the caller resubmits
                    // those fixes in order and they re-derive, shots
                    // included.
                    location.persisted = false;
                    let committed = self.sequencer.state(&key);
                    location.last_shot_distance_meters =
                        committed.and_then(|s| s.last_shot_distance_m);
                    location.last_shot_location = committed.and_then(|s| s.last_shot_location);
                    Enrichment {
                        location,
                        shot: None,
                    }
                }));
            }
        }

        for item in unkeyed {
            let fields = derive_position(&item.fix.coordinate, item.course.as_deref(), &config);
            let mut location = assemble(item.fix, fields, None, None);
            if let Err(e) = self.history.append(&location) {
                warn!(
                    "history append failed during batch for fix at {}: {}",
                    location.fix.timestamp_ms, e
                );
                location.persisted = false;
            }
            results[item.index] = Some(Ok(Enrichment {
                location,
                shot: None,
            }));
        }

        results
            .into_iter()
            .map(|r| r.expect("every batch fix produces exactly one result"))
            .collect()
    }

    /// Resolve the course for a fix: explicit `course_id` when present,
    /// otherwise the nearest course center within the resolution radius.
    fn resolve_course(&mut self, fix: &LocationFix) -> Option<Arc<CourseGeometry>> {
        if let Some(course_id) = &fix.course_id {
            match self.courses.get(course_id) {
                Ok(Some(course)) => Some(course),
                Ok(None) => {
                    warn!(
                        "no geometry for course '{}'; enriching without course context",
                        course_id
                    );
                    None
                }
                Err(e) => {
                    warn!("course provider failed for '{}': {}", course_id, e);
                    None
                }
            }
        } else {
            self.courses
                .nearest_course(&fix.coordinate, self.config.course_resolution_radius_m)
        }
    }

    // ========================================================================
    // Target advice (presentation layer)
    // ========================================================================

    /// Distance, club and bearing from a fix to a user-selected target.
    pub fn target_advice(&self, from: &Coordinate, target: &Coordinate) -> Result<TargetAdvice> {
        club::target_advice(from, target)
    }

    // ========================================================================
    // History reads
    // ========================================================================

    /// Location history for a round, in timestamp order.
    pub fn history_for_round(&self, user_id: &str, round_id: &str) -> Vec<&EnrichedLocation> {
        self.history.history_for_round(user_id, round_id)
    }

    /// Zone distribution for a hole of a course.
    pub fn zone_distribution(
        &self,
        course_id: &str,
        hole_number: u32,
    ) -> HashMap<PositionZone, usize> {
        self.history.zone_distribution(course_id, hole_number)
    }

    /// The underlying history sink.
    pub fn history(&self) -> &dyn HistorySink {
        self.history.as_ref()
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop cached geometry for a course after an upstream data update.
    pub fn invalidate_course(&mut self, course_id: &str) {
        self.courses.invalidate(course_id);
    }

    /// Drop a round's shot state once the round is finished.
    pub fn finish_round(&mut self, key: &RoundKey) {
        self.sequencer.remove_round(key);
    }

    /// Engine monitoring counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cached_courses: self.courses.cached_count(),
            tracked_rounds: self.sequencer.tracked_rounds(),
            history_len: self.history.len(),
            shots_emitted: self.sequencer.total_shots(),
        }
    }
}

// ============================================================================
// Pure pipeline stages
// ============================================================================

/// Course-dependent fields derived for one fix.
struct PositionFields {
    course_id: Option<String>,
    current_hole: Option<u32>,
    zone: PositionZone,
    distance_to_tee_m: Option<f64>,
    distance_to_pin_m: Option<f64>,
    within_course: bool,
}

/// Derive all positional fields for a fix. Missing or degenerate
/// geometry degrades the affected field, never the whole derivation.
fn derive_position(
    position: &Coordinate,
    course: Option<&CourseGeometry>,
    config: &PositioningConfig,
) -> PositionFields {
    let course = match course {
        Some(course) => course,
        None => {
            debug!("no course resolved; all course-dependent fields absent");
            return PositionFields {
                course_id: None,
                current_hole: None,
                zone: PositionZone::Unknown,
                distance_to_tee_m: None,
                distance_to_pin_m: None,
                within_course: false,
            };
        }
    };

    let current_hole = locate_hole(position, course);
    let (zone, distance_to_tee_m, distance_to_pin_m) = match current_hole {
        Some(hole_number) => {
            // locate_hole only returns holes of this course
            match course.hole(hole_number) {
                Some(hole) => (
                    classify_position(position, hole, config),
                    planar_distance(position, &hole.tee_point).ok(),
                    planar_distance(position, &hole.pin_point).ok(),
                ),
                None => (PositionZone::Unknown, None, None),
            }
        }
        None => (PositionZone::Unknown, None, None),
    };

    PositionFields {
        course_id: Some(course.course_id.clone()),
        current_hole,
        zone,
        distance_to_tee_m,
        distance_to_pin_m,
        within_course: within_course(position, course, config),
    }
}

/// Assemble the enriched record. `persisted` starts `true`; the caller
/// flips it when the append fails.
fn assemble(
    fix: LocationFix,
    fields: PositionFields,
    last_shot_distance_m: Option<f64>,
    last_shot_location: Option<Coordinate>,
) -> EnrichedLocation {
    EnrichedLocation {
        fix,
        course_id: fields.course_id,
        current_hole: fields.current_hole,
        position_on_hole: fields.zone,
        distance_to_tee_meters: fields.distance_to_tee_m,
        distance_to_pin_meters: fields.distance_to_pin_m,
        within_course_boundary: fields.within_course,
        last_shot_distance_meters: last_shot_distance_m,
        last_shot_location,
        persisted: true,
    }
}

// ============================================================================
// Batch plumbing
// ============================================================================

struct BatchItem {
    index: usize,
    fix: LocationFix,
    course: Option<Arc<CourseGeometry>>,
}

struct RoundBatch {
    key: RoundKey,
    start: Option<RoundState>,
    items: Vec<BatchItem>,
}

/// One enriched batch fix plus the round state it leads to; the state
/// is committed only once the record's append succeeds.
struct BatchRecord {
    location: EnrichedLocation,
    shot: Option<ShotEvent>,
    next_state: RoundState,
}

struct RoundBatchOutput {
    key: RoundKey,
    items: Vec<(usize, Result<BatchRecord>)>,
}

/// Run one round's ordered fixes through the pipeline against a local
/// copy of its state. Pure apart from the local sequencer.
fn process_round_batch(batch: RoundBatch, config: &PositioningConfig) -> RoundBatchOutput {
    let RoundBatch { key, start, items } = batch;

    let mut local = ShotSequencer::new();
    if let Some(state) = start {
        local.commit(key.clone(), state);
    }

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let fields = derive_position(&item.fix.coordinate, item.course.as_deref(), config);
        match local.evaluate(&key, &item.fix, fields.current_hole, config.min_shot_distance_m) {
            Ok(outcome) => {
                local.commit(key.clone(), outcome.next_state);
                let location = assemble(
                    item.fix,
                    fields,
                    outcome.next_state.last_shot_distance_m,
                    outcome.next_state.last_shot_location,
                );
                out.push((
                    item.index,
                    Ok(BatchRecord {
                        location,
                        shot: outcome.event,
                        next_state: outcome.next_state,
                    }),
                ));
            }
            Err(e) => out.push((item.index, Err(e))),
        }
    }

    RoundBatchOutput { key, items: out }
}
