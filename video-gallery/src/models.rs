use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A committed gallery record
///
/// Created by the store on a successful upload commit and never mutated
/// afterwards. `id` and `timestamp` are assigned by the store on write;
/// the application only ever holds read-only projections of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRecord {
    pub id: String,
    pub uri: String,
    pub timestamp: DateTime<Utc>,
    /// Size in bytes at commit time
    pub file_size: u64,
}

/// A user-picked video held pending upload confirmation
///
/// At most one exists per coordinator. Destroyed by a successful commit,
/// by re-selection, or by cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSelection {
    pub uri: String,
    /// Size in bytes as measured when the selection was staged
    pub file_size: u64,
}

/// Outcome of evaluating a byte size against the admission policy
///
/// Derived value, not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionDecision {
    pub accepted: bool,
    pub actual_size_bytes: u64,
    pub reason_if_rejected: Option<String>,
}
