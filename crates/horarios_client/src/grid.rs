//! Weekly calendar layout with merged multi-slot cells.
//!
//! Keys are `"{day}-{HH:MM:SS}"`. A populated cell sits on the first slot of a
//! block and every following slot of its span holds an explicit `None`, so a
//! renderer can tell "free period" (key absent) from "covered by the cell
//! above" (key present, `None`).

use crate::model::ClassBlock;
use crate::normalize::{
    UNPARSEABLE_MINUTES, minutes_to_label, minutes_to_time_key, normalize_day, normalize_time,
    parse_time_to_minutes,
};
use crate::observability;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_SLOT_MINUTES: u32 = 30;
pub const DEFAULT_RANGE_START: u32 = 7 * 60;
pub const DEFAULT_RANGE_END: u32 = 21 * 60 + 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridOptions {
    pub slot_minutes: u32,
    /// First row of the grid, minutes since midnight.
    pub range_start: u32,
    /// Last row of the grid (inclusive), minutes since midnight.
    pub range_end: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            slot_minutes: DEFAULT_SLOT_MINUTES,
            range_start: DEFAULT_RANGE_START,
            range_end: DEFAULT_RANGE_END,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq, JsonSchema)]
pub struct GridCell {
    pub block: ClassBlock,
    pub row_span: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum OverlapKind {
    /// The class times intersect.
    Clash,
    /// The class times only touch, but the rejected block lies entirely in a
    /// slot its neighbour already holds.
    SharedSlot,
}

/// A block that could not be placed on the grid.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, JsonSchema)]
pub struct GridOverlap {
    pub day: String,
    pub time_key: String,
    pub kept_id: Option<i64>,
    pub rejected_id: Option<i64>,
    pub kind: OverlapKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState<'a> {
    Free,
    Covered,
    Start(&'a GridCell),
}

/// One row of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    pub label: String,
    pub time_key: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WeeklyGrid {
    cells: BTreeMap<String, Option<GridCell>>,
    overlaps: Vec<GridOverlap>,
    #[serde(skip)]
    options: GridOptions,
}

pub fn cell_key(day: &str, time: &str) -> String {
    format!("{day}-{time}")
}

impl WeeklyGrid {
    pub fn cell(&self, key: &str) -> Option<&Option<GridCell>> {
        self.cells.get(key)
    }

    /// State of the slot starting at `time` on `day`; both are normalized.
    pub fn get(&self, day: &str, time: &str) -> SlotState<'_> {
        let key = cell_key(&normalize_day(day), &normalize_time(time));
        match self.cells.get(&key) {
            None => SlotState::Free,
            Some(None) => SlotState::Covered,
            Some(Some(cell)) => SlotState::Start(cell),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<GridCell>)> {
        self.cells.iter()
    }

    /// Blocks left off the grid, in the order they were rejected.
    pub fn overlaps(&self) -> &[GridOverlap] {
        &self.overlaps
    }

    /// Row labels and keys from the start of the range to its end, inclusive.
    pub fn time_slots(&self) -> Vec<TimeSlot> {
        let step = self.options.slot_minutes.max(1);
        (self.options.range_start..=self.options.range_end)
            .step_by(step as usize)
            .map(|m| TimeSlot {
                label: minutes_to_label(m),
                time_key: minutes_to_time_key(m),
            })
            .collect()
    }

    fn place(&mut self, block: ClassBlock, first_slot: u32, slot_end: u32, step: u32) {
        let day = block.day.clone();
        let row_span = (slot_end - first_slot) / step;
        self.cells.insert(
            cell_key(&day, &minutes_to_time_key(first_slot)),
            Some(GridCell { block, row_span }),
        );
        for slot in (first_slot + step..slot_end).step_by(step as usize) {
            self.cells.insert(cell_key(&day, &minutes_to_time_key(slot)), None);
        }
    }

    fn reject(&mut self, block: &ClassBlock, slot: u32, kept_id: Option<i64>, kind: OverlapKind) {
        let time_key = minutes_to_time_key(slot);
        match kind {
            OverlapKind::Clash => tracing::warn!(
                day = %block.day,
                time = %time_key,
                kept = ?kept_id,
                rejected = ?block.id,
                "overlapping classes in grid; keeping the first one"
            ),
            OverlapKind::SharedSlot => tracing::warn!(
                day = %block.day,
                time = %time_key,
                kept = ?kept_id,
                rejected = ?block.id,
                "class fits inside a slot already used by the class next to it"
            ),
        }
        observability::record_grid_overlap();
        self.overlaps.push(GridOverlap {
            day: block.day.clone(),
            time_key,
            kept_id,
            rejected_id: block.id,
            kind,
        });
    }
}

/// A block already on the grid: its class time and the slots it holds.
struct Placed {
    id: Option<i64>,
    start: u32,
    end: u32,
    first_slot: u32,
    slot_end: u32,
}

fn slot_owner(placed: &[Placed], slot: u32) -> Option<&Placed> {
    placed
        .iter()
        .find(|p| p.first_slot <= slot && slot < p.slot_end)
}

/// Lay `blocks` out on the weekly grid.
///
/// Blocks without a day, with a missing time, or with `end <= start` are
/// skipped. Starts are aligned down to the slot boundary and the span is
/// rounded up to whole slots. A block whose class time intersects one already
/// placed is rejected as [`OverlapKind::Clash`]. Touching blocks that only
/// share a boundary slot both stay on the grid: the block placed first keeps
/// that slot and the other one is trimmed to the slots left over. When nothing
/// is left it is reported as [`OverlapKind::SharedSlot`].
pub fn build_grid(blocks: &[ClassBlock], options: &GridOptions) -> WeeklyGrid {
    let step = options.slot_minutes.max(1);
    let mut grid = WeeklyGrid {
        options: *options,
        ..WeeklyGrid::default()
    };
    let mut placed: HashMap<String, Vec<Placed>> = HashMap::new();

    for block in blocks {
        let day = normalize_day(&block.day);
        let start = parse_time_to_minutes(&block.start_time);
        let end = parse_time_to_minutes(&block.end_time);
        if day.is_empty() || start == UNPARSEABLE_MINUTES || end == UNPARSEABLE_MINUTES {
            continue;
        }
        if end <= start {
            continue;
        }
        let normalized = ClassBlock {
            day: day.clone(),
            start_time: normalize_time(&block.start_time),
            end_time: normalize_time(&block.end_time),
            ..block.clone()
        };
        let on_day = placed.entry(day).or_default();

        if let Some(other) = on_day.iter().find(|p| p.start < end && start < p.end) {
            let from = start.max(other.start);
            grid.reject(&normalized, from - from % step, other.id, OverlapKind::Clash);
            continue;
        }

        let mut first_slot = start - start % step;
        let mut slot_end = first_slot + (end - first_slot).div_ceil(step).max(1) * step;
        // only the boundary slots can be held by a touching block
        let mut shared_with = None;
        while first_slot < slot_end {
            let Some(owner) = slot_owner(on_day, first_slot) else {
                break;
            };
            shared_with = Some(owner.id);
            first_slot += step;
        }
        while first_slot < slot_end {
            let Some(owner) = slot_owner(on_day, slot_end - step) else {
                break;
            };
            shared_with = Some(owner.id);
            slot_end -= step;
        }
        if first_slot == slot_end {
            grid.reject(
                &normalized,
                start - start % step,
                shared_with.flatten(),
                OverlapKind::SharedSlot,
            );
            continue;
        }

        on_day.push(Placed {
            id: normalized.id,
            start,
            end,
            first_slot,
            slot_end,
        });
        grid.place(normalized, first_slot, slot_end, step);
    }

    grid
}
