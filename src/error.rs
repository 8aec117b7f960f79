//! Unified error handling for the enrichment pipeline.
//!
//! All fallible operations in this crate return [`Result`]. Errors fall
//! into two classes:
//! - Rejections (`InvalidCoordinate`, `StaleFix`) stop a fix before it
//!   enters or mutates the pipeline.
//! - Degradations (`DegenerateGeometry`, `Provider`, `Persistence`) are
//!   caught per-field or per-step by the engine, which degrades the
//!   affected output rather than aborting the whole enrichment.

use thiserror::Error;

/// Errors produced by the positioning and enrichment pipeline.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnrichError {
    /// A coordinate was non-finite or outside WGS84 bounds.
    /// Rejected before any computation; never coerced.
    #[error("invalid coordinate: lat={latitude}, lng={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A fix arrived with a timestamp at or before the last accepted fix
    /// for its round. Covers both duplicates and late arrivals; the fix
    /// is rejected, never retroactively reprocessed.
    #[error(
        "stale fix for round {user_id}/{round_id}: \
         timestamp {fix_timestamp_ms} <= last {last_timestamp_ms}"
    )]
    StaleFix {
        user_id: String,
        round_id: String,
        fix_timestamp_ms: i64,
        last_timestamp_ms: i64,
    },

    /// Geometry too degenerate to compute against (empty polyline,
    /// polygon ring with fewer than 3 vertices). Degraded per-field.
    #[error("degenerate geometry: {detail}")]
    DegenerateGeometry { detail: String },

    /// The course geometry provider failed. Treated like missing
    /// geometry: dependent fields degrade to absent.
    #[error("course geometry provider failed: {detail}")]
    Provider { detail: String },

    /// The history append failed. Retryable; the computed record is
    /// still returned with `persisted = false`.
    #[error("persistence failed: {detail}")]
    Persistence { detail: String },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EnrichError>;
