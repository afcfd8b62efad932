//! Timetable normalization and conflict-detection engine for the university
//! scheduling admin tool.
//!
//! The scheduling backend is reached through the [`ScheduleSource`] trait; every
//! other module is a pure function over already-fetched data.

use async_trait::async_trait;
use thiserror::Error;

pub mod config;
pub mod conflict;
pub mod extract;
pub mod grid;
pub mod http_client;
pub mod model;
pub mod normalize;
pub mod observability;
pub mod retry;
pub mod slots;

pub use conflict::{Conflict, ConflictCandidate, ConflictChecker, ConflictKind, check_conflict};
pub use extract::{extract_class_list, normalize_class_list, valid_blocks};
pub use grid::{
    GridCell, GridOptions, GridOverlap, OverlapKind, SlotState, WeeklyGrid, build_grid,
};
pub use model::{AvailabilityWindow, ClassBlock, DayValue, RawClassRecord};
pub use normalize::{
    Weekday, day_order, normalize_day, normalize_time, parse_time_to_minutes, to_time_label,
};

#[derive(Debug, Error)]
pub enum HorariosError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl HorariosError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        HorariosError::Api {
            status,
            message: message.into(),
        }
    }

    /// Transport failures and 5xx responses are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            HorariosError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            HorariosError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Read contract of the external scheduling data service.
///
/// Both endpoints return a class-list payload in any of the envelope shapes
/// understood by [`extract_class_list`].
#[async_trait]
pub trait ScheduleSource: Send + Sync + 'static {
    async fn get_schedule_by_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<serde_json::Value, HorariosError>;

    async fn get_schedule_by_room(&self, room_id: i64) -> Result<serde_json::Value, HorariosError>;
}
