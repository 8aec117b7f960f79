//! Append-only enriched location history.
//!
//! The engine persists exactly one record per valid fix through a
//! [`HistorySink`]. The bundled [`LocationHistory`] keeps records in
//! memory and serves the round-history and zone-distribution reads; a
//! durable backend replaces it by implementing the same trait.

use std::collections::HashMap;

use crate::error::{EnrichError, Result};
use crate::{EnrichedLocation, PositionZone};

/// Persistence seam for enriched records.
pub trait HistorySink {
    /// Append one record. Failures are retryable; the caller keeps the
    /// computed record either way.
    fn append(&mut self, record: &EnrichedLocation) -> Result<()>;

    /// All records for a round, in append (timestamp) order.
    fn history_for_round(&self, user_id: &str, round_id: &str) -> Vec<&EnrichedLocation>;

    /// How often each zone was observed on a hole of a course.
    fn zone_distribution(&self, course_id: &str, hole_number: u32) -> HashMap<PositionZone, usize>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Check if the sink holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory append-only history store.
#[derive(Debug, Default)]
pub struct LocationHistory {
    records: Vec<EnrichedLocation>,
    fail_next_append: bool,
}

impl LocationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            fail_next_append: false,
        }
    }

    /// All stored records in append order.
    pub fn records(&self) -> &[EnrichedLocation] {
        &self.records
    }

    /// Make the next append fail, for exercising the computed-vs-durable
    /// path in tests.
    pub fn inject_append_failure(&mut self) {
        self.fail_next_append = true;
    }
}

impl HistorySink for LocationHistory {
    fn append(&mut self, record: &EnrichedLocation) -> Result<()> {
        if self.fail_next_append {
            self.fail_next_append = false;
            return Err(EnrichError::Persistence {
                detail: "injected append failure".to_string(),
            });
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn history_for_round(&self, user_id: &str, round_id: &str) -> Vec<&EnrichedLocation> {
        self.records
            .iter()
            .filter(|r| {
                r.fix.user_id == user_id && r.fix.round_id.as_deref() == Some(round_id)
            })
            .collect()
    }

    fn zone_distribution(&self, course_id: &str, hole_number: u32) -> HashMap<PositionZone, usize> {
        let mut distribution = HashMap::new();
        for record in &self.records {
            if record.course_id.as_deref() == Some(course_id)
                && record.current_hole == Some(hole_number)
            {
                *distribution.entry(record.position_on_hole).or_insert(0) += 1;
            }
        }
        distribution
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
