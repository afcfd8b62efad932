//! Counters for data-quality and degraded-path events.
//!
//! Nothing here installs a recorder; without one the calls are no-ops.

use crate::conflict::ConflictKind;

pub const RECORDS_DROPPED: &str = "horarios_records_dropped_total";
pub const GRID_OVERLAPS: &str = "horarios_grid_overlaps_total";
pub const CONFLICTS: &str = "horarios_conflicts_total";
pub const CHECKS_DEGRADED: &str = "horarios_conflict_checks_degraded_total";

pub fn record_dropped_records(count: usize) {
    metrics::counter!(RECORDS_DROPPED).increment(count as u64);
}

pub fn record_grid_overlap() {
    metrics::counter!(GRID_OVERLAPS).increment(1);
}

pub fn record_conflict(kind: ConflictKind) {
    metrics::counter!(CONFLICTS, "kind" => kind.as_str()).increment(1);
}

pub fn record_degraded_check() {
    metrics::counter!(CHECKS_DEGRADED).increment(1);
}
