//! Sexagenary encoder
//!
//! Maps a validated [`BirthMoment`] to its four pillars.
//!
//! # Algorithm
//!
//! - **Year**: `(year - 4) mod 10` / `(year - 4) mod 12`
//! - **Month**: stem offset by the year-stem group, branch from a fixed table
//!   starting at 寅 for month 1
//! - **Day**: whole-day delta from the 1900-01-01 epoch (己亥)
//! - **Hour**: two-hour blocks starting at 23:00
//!
//! Day counting uses calendar dates, not timestamps, so there is no
//! time-zone or daylight-saving skew. The date comes from the
//! [`BirthMoment`], so encoding cannot fail.

use chrono::{Datelike, NaiveDate};

use super::models::{Branch, FourPillars, Pillar, Stem};
use super::normalizer::BirthMoment;

/// Epoch for the day cycle
pub const EPOCH_YEAR: i32 = 1900;
/// `num_days_from_ce` of 1900-01-01
pub const EPOCH_DAYS_FROM_CE: i64 = 693_596;
/// Stem index of the epoch day (己)
pub const EPOCH_DAY_STEM: i64 = 5;
/// Branch index of the epoch day (亥)
pub const EPOCH_DAY_BRANCH: i64 = 11;

/// Calendar month -> branch index. Month 1 is 寅.
const MONTH_BRANCHES: [i64; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 1];

/// Encode a birth moment into its four pillars
pub fn encode(moment: &BirthMoment) -> FourPillars {
    let year = year_pillar(moment.year());
    let pillars = FourPillars {
        year,
        month: month_pillar(year.stem, moment.month()),
        day: day_pillar(days_since_epoch(moment)),
        hour: hour_pillar(moment.hour()),
    };
    tracing::debug!(
        year = moment.year(),
        month = moment.month(),
        day = moment.day(),
        hour = moment.hour(),
        pillars = %pillars,
        "Encoded birth moment"
    );
    pillars
}

pub fn year_pillar(year: i32) -> Pillar {
    let offset = year as i64 - 4;
    Pillar::new(Stem::from_index(offset), Branch::from_index(offset))
}

/// Month pillar from the year stem and a calendar month (1-12)
pub fn month_pillar(year_stem: Stem, month: u32) -> Pillar {
    let month_offset = (year_stem.index() % 5) * 2;
    let stem = Stem::from_index((month_offset + month as usize) as i64 - 1);
    let branch = Branch::from_index(MONTH_BRANCHES[(month.clamp(1, 12) - 1) as usize]);
    Pillar::new(stem, branch)
}

/// Day pillar from a whole-day delta against the epoch
pub fn day_pillar(days_since_epoch: i64) -> Pillar {
    Pillar::new(
        Stem::from_index(EPOCH_DAY_STEM + days_since_epoch),
        Branch::from_index(EPOCH_DAY_BRANCH + days_since_epoch),
    )
}

/// Hour pillar; stem follows the block position, not the day stem
pub fn hour_pillar(hour: u8) -> Pillar {
    let block = hour_block(hour);
    Pillar::new(Stem::from_index(block as i64 % 10), Branch::from_index(block as i64))
}

/// Two-hour block index: 0 = 23:00-00:59, 1 = 01:00-02:59, ... 11 = 21:00-22:59
pub fn hour_block(hour: u8) -> usize {
    ((hour as usize + 1) / 2) % 12
}

/// Whole days between 1900-01-01 and the moment's date
pub fn days_since_epoch(moment: &BirthMoment) -> i64 {
    days_from_epoch(moment.date())
}

fn days_from_epoch(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - EPOCH_DAYS_FROM_CE
}

/// Whole days between 1900-01-01 and a date, or None if the date is invalid
pub fn day_delta(year: i32, month: u32, day: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, day).map(days_from_epoch)
}
