//! Class record shapes: the loose backend record and the normalized block.

use crate::normalize::{normalize_day, normalize_time, parse_time_to_minutes};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Day as sent by the backend: a name or a 1..7 code.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DayValue {
    Code(i64),
    Text(String),
}

impl DayValue {
    pub fn normalized(&self) -> String {
        match self {
            DayValue::Code(code) => normalize_day(&code.to_string()),
            DayValue::Text(text) => normalize_day(text),
        }
    }
}

/// Deserialize a field, reading anything malformed as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Ids arrive as numbers or numeric strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_id))
}

pub(crate) fn value_as_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawRef {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub nombre: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawAssignment {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub materia: Option<RawRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub docente: Option<RawRef>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub materia_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub docente_id: Option<i64>,
}

/// Untrusted scheduled-class record. Every field is optional and a field of
/// the wrong type is treated as missing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawClassRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub dia: Option<DayValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub hora_inicio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hora_fin: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub asignacion: Option<RawAssignment>,
    #[serde(default, deserialize_with = "lenient")]
    pub aula: Option<RawRef>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub materia_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub docente_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub aula_id: Option<i64>,
}

impl RawClassRecord {
    /// `None` only when the value is not a JSON object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// A scheduled class with canonical day and `HH:MM:SS` times.
///
/// Empty `day`, `start_time` or `end_time` mark the block as invalid.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ClassBlock {
    pub id: Option<i64>,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub subject_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub subject_name: Option<String>,
    pub room_name: Option<String>,
}

impl ClassBlock {
    pub fn from_record(record: &RawClassRecord) -> Self {
        let assignment = record.asignacion.as_ref();
        let subject = assignment.and_then(|a| a.materia.as_ref());
        let teacher = assignment.and_then(|a| a.docente.as_ref());
        Self {
            id: record.id,
            day: record
                .dia
                .as_ref()
                .map(DayValue::normalized)
                .unwrap_or_default(),
            start_time: normalize_time(record.hora_inicio.as_deref().unwrap_or("")),
            end_time: normalize_time(record.hora_fin.as_deref().unwrap_or("")),
            subject_id: subject
                .and_then(|s| s.id)
                .or_else(|| assignment.and_then(|a| a.materia_id))
                .or(record.materia_id),
            teacher_id: teacher
                .and_then(|t| t.id)
                .or_else(|| assignment.and_then(|a| a.docente_id))
                .or(record.docente_id),
            room_id: record.aula.as_ref().and_then(|a| a.id).or(record.aula_id),
            subject_name: subject.and_then(|s| s.nombre.clone()),
            room_name: record.aula.as_ref().and_then(|a| a.nombre.clone()),
        }
    }

    pub fn start_minutes(&self) -> u32 {
        parse_time_to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> u32 {
        parse_time_to_minutes(&self.end_time)
    }

    pub fn is_valid(&self) -> bool {
        !self.day.is_empty()
            && !self.start_time.is_empty()
            && !self.end_time.is_empty()
            && self.start_minutes() < self.end_minutes()
    }

    /// Half-open overlap with `[start, end)` given in minutes.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end_minutes() && end > self.start_minutes()
    }
}

/// Teacher-declared window in which classes may be scheduled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct AvailabilityWindow {
    #[serde(alias = "dia")]
    pub day: String,
    #[serde(alias = "hora_inicio")]
    pub start_time: String,
    #[serde(alias = "hora_fin")]
    pub end_time: String,
}

impl AvailabilityWindow {
    pub fn new(day: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            day: day.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}
