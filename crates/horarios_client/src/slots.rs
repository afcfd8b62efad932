//! Selectable start/end times for a new class block.

use crate::grid::{DEFAULT_RANGE_END, DEFAULT_RANGE_START, DEFAULT_SLOT_MINUTES};
use crate::model::AvailabilityWindow;
use crate::normalize::{
    UNPARSEABLE_MINUTES, minutes_to_time_key, normalize_day, normalize_time, parse_time_to_minutes,
};
use std::collections::BTreeSet;

const STEP: u32 = DEFAULT_SLOT_MINUTES;

/// Windows for `day` as minute ranges. A teacher with no windows at all is
/// unrestricted and gets the default range.
fn windows_for(day: &str, availability: &[AvailabilityWindow]) -> Vec<(u32, u32)> {
    if availability.is_empty() {
        return vec![(DEFAULT_RANGE_START, DEFAULT_RANGE_END)];
    }
    let day = normalize_day(day);
    if day.is_empty() {
        return Vec::new();
    }
    availability
        .iter()
        .filter(|w| normalize_day(&w.day) == day)
        .map(|w| {
            (
                parse_time_to_minutes(&w.start_time),
                parse_time_to_minutes(&w.end_time),
            )
        })
        .filter(|&(start, end)| end != UNPARSEABLE_MINUTES && start < end)
        .collect()
}

fn to_keys(instants: BTreeSet<u32>) -> Vec<String> {
    instants.into_iter().map(minutes_to_time_key).collect()
}

/// Aligned instants in `[start, end)` of every window on `day`.
pub fn start_times(day: &str, availability: &[AvailabilityWindow]) -> Vec<String> {
    let mut instants = BTreeSet::new();
    for (start, end) in windows_for(day, availability) {
        let first = start.div_ceil(STEP) * STEP;
        instants.extend((first..end).step_by(STEP as usize));
    }
    to_keys(instants)
}

/// Aligned instants in `(start, end]` of the windows on `day`.
///
/// With a start time, only windows containing it contribute and only instants
/// after it are offered.
pub fn end_times(day: &str, start_time: &str, availability: &[AvailabilityWindow]) -> Vec<String> {
    let chosen = match parse_time_to_minutes(start_time) {
        UNPARSEABLE_MINUTES => None,
        minutes => Some(minutes),
    };
    let mut instants = BTreeSet::new();
    for (start, end) in windows_for(day, availability) {
        if chosen.is_some_and(|s| !(start <= s && s < end)) {
            continue;
        }
        let first = (start / STEP + 1) * STEP;
        let floor = chosen.unwrap_or(start);
        instants.extend((first..=end).step_by(STEP as usize).filter(|&m| m > floor));
    }
    to_keys(instants)
}

/// Keep a previously selected value offered even when the recomputed options
/// no longer contain it.
pub fn with_selected(mut options: Vec<String>, selected: Option<&str>) -> Vec<String> {
    let Some(selected) = selected.map(normalize_time).filter(|s| !s.is_empty()) else {
        return options;
    };
    if !options.contains(&selected) {
        options.push(selected);
    }
    options
}
