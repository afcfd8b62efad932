//! Day and time canonicalization.
//!
//! Backend records spell days as numeric codes (`1`..`7`) or as Spanish names
//! with or without accents, and times with any number of components
//! (`"7:0"`, `"08:00"`, `"08:00:00"`). Everything downstream works on the
//! canonical forms produced here.

use regex::Regex;
use std::sync::LazyLock;

/// Sort key used for times that cannot be parsed, so they order last.
pub const UNPARSEABLE_MINUTES: u32 = u32::MAX;

/// Anything but ASCII digits, Unicode digits included.
static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("static regex is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    /// Canonical capitalized, accented name.
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Lunes => "Lunes",
            Weekday::Martes => "Martes",
            Weekday::Miercoles => "Miércoles",
            Weekday::Jueves => "Jueves",
            Weekday::Viernes => "Viernes",
            Weekday::Sabado => "Sábado",
            Weekday::Domingo => "Domingo",
        }
    }

    /// 1 for Monday through 7 for Sunday.
    pub fn order(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_code(code: i64) -> Option<Weekday> {
        match code {
            1..=7 => Some(Weekday::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Resolve a single-digit code or any case/accent variant of a day name.
    pub fn from_alias(input: &str) -> Option<Weekday> {
        let trimmed = input.trim();
        if let [digit @ b'1'..=b'7'] = trimmed.as_bytes() {
            return Weekday::from_code(i64::from(digit - b'0'));
        }
        match fold_accents(&trimmed.to_lowercase()).as_str() {
            "lunes" => Some(Weekday::Lunes),
            "martes" => Some(Weekday::Martes),
            "miercoles" => Some(Weekday::Miercoles),
            "jueves" => Some(Weekday::Jueves),
            "viernes" => Some(Weekday::Viernes),
            "sabado" => Some(Weekday::Sabado),
            "domingo" => Some(Weekday::Domingo),
            _ => None,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Map a day code or spelling to its canonical name.
///
/// Unknown non-empty input comes back trimmed but otherwise unchanged; empty
/// input yields an empty string, which callers treat as invalid.
pub fn normalize_day(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match Weekday::from_alias(trimmed) {
        Some(day) => day.as_str().to_string(),
        None => trimmed.to_string(),
    }
}

/// Position of a day in the week, `u32::MAX` when the day is not recognized.
pub fn day_order(input: &str) -> u32 {
    Weekday::from_alias(input)
        .map(Weekday::order)
        .unwrap_or(u32::MAX)
}

fn two_digits(component: Option<&str>) -> String {
    let digits = NON_DIGITS.replace_all(component.unwrap_or("").trim(), "");
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (None, _) => "00".to_string(),
        (Some(d), None) => format!("0{d}"),
        (Some(a), Some(b)) => format!("{a}{b}"),
    }
}

/// Canonicalize a time to zero-padded `HH:MM:SS`.
pub fn normalize_time(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut parts = trimmed.split(':');
    let hours = two_digits(parts.next());
    let minutes = two_digits(parts.next());
    let seconds = two_digits(parts.next());
    format!("{hours}:{minutes}:{seconds}")
}

/// Minutes since midnight, or [`UNPARSEABLE_MINUTES`].
pub fn parse_time_to_minutes(input: &str) -> u32 {
    let normalized = normalize_time(input);
    let mut parts = normalized.split(':');
    let hours = parts.next().and_then(|h| h.parse::<u32>().ok());
    let minutes = parts.next().and_then(|m| m.parse::<u32>().ok());
    match (hours, minutes) {
        (Some(h), Some(m)) => h * 60 + m,
        _ => UNPARSEABLE_MINUTES,
    }
}

/// `HH:MM` display label.
pub fn to_time_label(input: &str) -> String {
    let normalized = normalize_time(input);
    normalized.get(..5).unwrap_or_default().to_string()
}

pub fn minutes_to_time_key(total_minutes: u32) -> String {
    format!("{}:00", minutes_to_label(total_minutes))
}

pub fn minutes_to_label(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}
