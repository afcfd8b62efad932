//! Advisory conflict pre-check for a class block about to be committed.
//!
//! The backend re-validates every write, so this check never blocks a
//! submission on its own failures: incomplete input or an unreachable
//! schedule service both mean "no conflict detected".

use crate::extract::valid_blocks;
use crate::model::ClassBlock;
use crate::normalize::{normalize_day, parse_time_to_minutes, to_time_label};
use crate::{HorariosError, ScheduleSource, observability};
use futures_util::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DUPLICATE_CLASS_MESSAGE: &str =
    "Ya existe un horario para esta clase en el salón seleccionado";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConflictKind {
    Teacher,
    Room,
    DuplicateSubject,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::Teacher => "teacher",
            ConflictKind::Room => "room",
            ConflictKind::DuplicateSubject => "duplicateSubject",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
}

/// Form values for the block being created or edited.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ConflictCandidate {
    pub subject_id: Option<i64>,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub day: String,
    pub start: String,
    pub end: String,
}

/// Candidate reduced to the values the rules compare.
struct Probe {
    subject_id: i64,
    day: String,
    start: u32,
    end: u32,
}

impl ConflictCandidate {
    fn probe(&self) -> Option<Probe> {
        let (Some(subject_id), Some(_), Some(_)) = (self.subject_id, self.room_id, self.teacher_id)
        else {
            return None;
        };
        let day = normalize_day(&self.day);
        if day.is_empty() || self.start.trim().is_empty() || self.end.trim().is_empty() {
            return None;
        }
        let start = parse_time_to_minutes(&self.start);
        let end = parse_time_to_minutes(&self.end);
        if start >= end {
            return None;
        }
        Some(Probe {
            subject_id,
            day,
            start,
            end,
        })
    }

    /// All fields needed for a meaningful check are filled in.
    pub fn is_complete(&self) -> bool {
        self.probe().is_some()
    }
}

fn find_clash<'a>(
    schedule: &'a [ClassBlock],
    probe: &Probe,
    editing_id: Option<i64>,
    same_subject: bool,
) -> Option<&'a ClassBlock> {
    schedule.iter().find(|c| {
        if editing_id.is_some() && c.id == editing_id {
            return false;
        }
        if same_subject && c.subject_id != Some(probe.subject_id) {
            return false;
        }
        normalize_day(&c.day) == probe.day && c.overlaps(probe.start, probe.end)
    })
}

fn occupied_message(prefix: &str, clash: &ClassBlock) -> String {
    format!(
        "{prefix} el {} de {} a {}",
        normalize_day(&clash.day),
        to_time_label(&clash.start_time),
        to_time_label(&clash.end_time)
    )
}

/// Evaluate the conflict rules against already-fetched schedules.
///
/// Rules are tried in order and the first match wins:
/// 1. the subject already has an overlapping class in the room
/// 2. the teacher has an overlapping class
/// 3. the room has an overlapping class
///
/// Intervals are half-open, back-to-back classes do not clash. `editing_id`
/// excludes the stored copy of the block being edited.
pub fn check_conflict(
    candidate: &ConflictCandidate,
    editing_id: Option<i64>,
    teacher_schedule: &[ClassBlock],
    room_schedule: &[ClassBlock],
) -> Option<Conflict> {
    let probe = candidate.probe()?;

    let conflict = if find_clash(room_schedule, &probe, editing_id, true).is_some() {
        Conflict {
            kind: ConflictKind::DuplicateSubject,
            message: DUPLICATE_CLASS_MESSAGE.to_string(),
        }
    } else if let Some(clash) = find_clash(teacher_schedule, &probe, editing_id, false) {
        Conflict {
            kind: ConflictKind::Teacher,
            message: occupied_message("El docente ya tiene clase", clash),
        }
    } else if let Some(clash) = find_clash(room_schedule, &probe, editing_id, false) {
        Conflict {
            kind: ConflictKind::Room,
            message: occupied_message("El aula está ocupada", clash),
        }
    } else {
        return None;
    };

    observability::record_conflict(conflict.kind);
    Some(conflict)
}

/// Fetches fresh schedules and runs [`check_conflict`].
#[derive(Clone)]
pub struct ConflictChecker {
    source: Arc<dyn ScheduleSource>,
}

impl ConflictChecker {
    pub fn new(source: Arc<dyn ScheduleSource>) -> Self {
        Self { source }
    }

    async fn fetch_both(
        &self,
        teacher_id: i64,
        room_id: i64,
    ) -> Result<(Vec<ClassBlock>, Vec<ClassBlock>), HorariosError> {
        let (teacher, room) = tokio::join!(
            self.source.get_schedule_by_teacher(teacher_id),
            self.source.get_schedule_by_room(room_id),
        );
        Ok((valid_blocks(&teacher?), valid_blocks(&room?)))
    }

    /// Check one candidate. Fetch failures are logged and reported as no
    /// conflict.
    pub async fn check(
        &self,
        candidate: &ConflictCandidate,
        editing_id: Option<i64>,
    ) -> Option<Conflict> {
        if !candidate.is_complete() {
            return None;
        }
        let (teacher_id, room_id) = (candidate.teacher_id?, candidate.room_id?);

        match self.fetch_both(teacher_id, room_id).await {
            Ok((teacher_schedule, room_schedule)) => {
                tracing::debug!(
                    teacher_id,
                    room_id,
                    teacher_classes = teacher_schedule.len(),
                    room_classes = room_schedule.len(),
                    "checking class block against current schedules"
                );
                check_conflict(candidate, editing_id, &teacher_schedule, &room_schedule)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    teacher_id,
                    room_id,
                    "schedule lookup failed; skipping conflict pre-check"
                );
                observability::record_degraded_check();
                None
            }
        }
    }

    /// Check several block rows of one submission concurrently. Results keep
    /// the order of `candidates`.
    pub async fn check_blocks(
        &self,
        candidates: &[ConflictCandidate],
        editing_id: Option<i64>,
    ) -> Vec<Option<Conflict>> {
        join_all(candidates.iter().map(|c| self.check(c, editing_id))).await
    }
}
