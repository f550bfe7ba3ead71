//! Date normalizer
//!
//! Validates raw form values and produces an immutable [`BirthMoment`].
//! Nothing downstream re-checks calendar validity: a `BirthMoment` can only
//! be built here.
//!
//! # Hour input
//!
//! Two input modes reach the same 0-23 clock hour:
//! - clock values: `14`, `14:30`, `14시`
//! - traditional two-hour blocks named after the branches: `未`, `未時`, `미시`
//!
//! The traditional mode is a table lookup because the first block (子)
//! straddles midnight.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{Result, SajuError};
use super::models::{Branch, CalendarType, YearLimits};

lazy_static! {
    static ref CLOCK_PATTERN: Regex =
        Regex::new(r"^(?P<hour>[+-]?\d{1,3})(?::(?P<minute>\d{2}))?\s*(?:시|h|H)?$")
            .expect("clock pattern is valid");

    /// Traditional block name -> representative clock hour (block k -> 2k mod 24)
    static ref TRADITIONAL_HOURS: HashMap<String, u8> = {
        let mut table = HashMap::new();
        for (block, branch) in Branch::ALL.iter().enumerate() {
            let hour = ((block * 2) % 24) as u8;
            table.insert(branch.symbol().to_string(), hour);
            table.insert(format!("{}時", branch.symbol()), hour);
            table.insert(format!("{}时", branch.symbol()), hour);
            table.insert(branch.korean().to_string(), hour);
            table.insert(format!("{}시", branch.korean()), hour);
        }
        table
    };
}

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a month, or None for a month outside 1-12
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    if month == 2 && is_leap_year(year) {
        Some(29)
    } else {
        Some(DAYS_IN_MONTH[(month - 1) as usize])
    }
}

/// Raw hour as submitted: either a number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourInput {
    Clock(i64),
    Text(String),
}

impl HourInput {
    /// Resolve to a 0-23 clock hour
    pub fn resolve(&self) -> Result<u8> {
        match self {
            HourInput::Clock(hour) => clock_hour(*hour),
            HourInput::Text(text) => parse_hour(text),
        }
    }
}

impl From<u8> for HourInput {
    fn from(hour: u8) -> Self {
        HourInput::Clock(hour as i64)
    }
}

impl From<&str> for HourInput {
    fn from(text: &str) -> Self {
        HourInput::Text(text.to_string())
    }
}

fn clock_hour(hour: i64) -> Result<u8> {
    if (0..=23).contains(&hour) {
        Ok(hour as u8)
    } else {
        Err(SajuError::HourOutOfRange { hour })
    }
}

/// Parse hour text in clock or traditional-block form
pub fn parse_hour(raw: &str) -> Result<u8> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(SajuError::MissingField { field: "birthHour" });
    }

    if let Some(caps) = CLOCK_PATTERN.captures(text) {
        let hour: i64 = caps["hour"].parse().map_err(|_| SajuError::InvalidNumber {
            field: "birthHour",
            value: raw.to_string(),
        })?;
        if let Some(minute) = caps.name("minute") {
            let minute: u32 = minute.as_str().parse().unwrap_or(60);
            if minute > 59 {
                return Err(SajuError::InvalidNumber {
                    field: "birthHour",
                    value: raw.to_string(),
                });
            }
        }
        return clock_hour(hour);
    }

    if let Some(hour) = traditional_hour(text) {
        return Ok(hour);
    }

    if text.chars().any(|c| c.is_ascii_digit()) {
        Err(SajuError::InvalidNumber {
            field: "birthHour",
            value: raw.to_string(),
        })
    } else {
        Err(SajuError::UnknownHourName {
            name: raw.to_string(),
        })
    }
}

/// Clock hour for a traditional block name, if the name is known
pub fn traditional_hour(name: &str) -> Option<u8> {
    TRADITIONAL_HOURS.get(name.trim()).copied()
}

/// A validated birth moment.
///
/// Fields are private so every instance has passed [`normalize`], which
/// also guarantees the date is representable as a `NaiveDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthMoment {
    year: i32,
    month: u32,
    day: u32,
    hour: u8,
    is_lunar: bool,
    #[serde(skip)]
    date: NaiveDate,
}

impl BirthMoment {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn is_lunar(&self) -> bool {
        self.is_lunar
    }

    pub fn calendar_type(&self) -> CalendarType {
        CalendarType::from_lunar_flag(self.is_lunar)
    }
}

/// Validate a (year, month, day, hour) tuple into a [`BirthMoment`].
///
/// Rejects hours outside 0-23, dates that do not exist in the Gregorian
/// calendar, and years outside `limits` or beyond the range `NaiveDate`
/// can count days over.
pub fn normalize(
    year: i32,
    month: u32,
    day: u32,
    hour: &HourInput,
    calendar: CalendarType,
    limits: YearLimits,
) -> Result<BirthMoment> {
    let hour = hour.resolve()?;

    if !limits.contains(year) {
        return Err(SajuError::YearOutOfRange {
            year,
            min: limits.effective_min(),
            max: limits.max.unwrap_or(i32::MAX),
        });
    }

    let valid_day = days_in_month(year, month).map_or(false, |last| (1..=last).contains(&day));
    if !valid_day {
        return Err(SajuError::InvalidDate { year, month, day });
    }

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(SajuError::YearOutOfRange {
        year,
        min: limits.effective_min(),
        max: limits.max.unwrap_or(i32::MAX).min(NaiveDate::MAX.year()),
    })?;

    if calendar == CalendarType::Lunar {
        tracing::warn!(year, month, day, "Lunar flag set; date is encoded as given");
    }

    Ok(BirthMoment {
        year,
        month,
        day,
        hour,
        is_lunar: calendar == CalendarType::Lunar,
        date,
    })
}

/// Parse a required integer form field
pub fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(SajuError::MissingField { field });
    }
    text.parse().map_err(|_| SajuError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}
