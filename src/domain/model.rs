use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ganji::Pillar;
use crate::domain::term::SolarTerm;
use crate::utils::error::{Result, SajuError};
use crate::utils::validation::{validate_range, Validate};

pub const DEFAULT_PIVOT_OFFSET_MINUTES: i32 = 30;
/// Clock correction from the 135°E standard meridian to local mean time in Seoul (동경시 보정).
pub const DEFAULT_MERIDIAN_ADJUST_MINUTES: i32 = -30;
/// Korea Standard Time, the zone of the bundled reference datasets.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 540;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarSystem {
    #[default]
    Solar,
    Lunar,
}

/// A birth moment as the caller reports it: civil clock time in the zone given by
/// `utc_offset_minutes`, on either calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub calendar: CalendarSystem,
    /// Only consulted for lunar input.
    #[serde(default)]
    pub is_leap_month: bool,
    #[serde(default = "default_true")]
    pub is_male: bool,
    #[serde(default = "default_pivot")]
    pub pivot_offset_minutes: i32,
    #[serde(default = "default_meridian_adjust")]
    pub meridian_adjust_minutes: i32,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_true() -> bool {
    true
}
fn default_pivot() -> i32 {
    DEFAULT_PIVOT_OFFSET_MINUTES
}
fn default_meridian_adjust() -> i32 {
    DEFAULT_MERIDIAN_ADJUST_MINUTES
}
fn default_utc_offset() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

impl BirthInput {
    /// Solar-calendar input at `hour:00` with every other field at its default.
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute: 0,
            calendar: CalendarSystem::Solar,
            is_leap_month: false,
            is_male: true,
            pivot_offset_minutes: DEFAULT_PIVOT_OFFSET_MINUTES,
            meridian_adjust_minutes: DEFAULT_MERIDIAN_ADJUST_MINUTES,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }

    pub fn lunar(year: i32, month: u32, day: u32, hour: u32, is_leap_month: bool) -> Self {
        Self {
            calendar: CalendarSystem::Lunar,
            is_leap_month,
            ..Self::new(year, month, day, hour)
        }
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = minute;
        self
    }

    pub fn with_male(mut self, is_male: bool) -> Self {
        self.is_male = is_male;
        self
    }

    pub fn with_pivot(mut self, pivot_offset_minutes: i32) -> Self {
        self.pivot_offset_minutes = pivot_offset_minutes;
        self
    }

    pub fn with_meridian_adjust(mut self, meridian_adjust_minutes: i32) -> Self {
        self.meridian_adjust_minutes = meridian_adjust_minutes;
        self
    }

    pub fn with_utc_offset(mut self, utc_offset_minutes: i32) -> Self {
        self.utc_offset_minutes = utc_offset_minutes;
        self
    }

    pub fn is_lunar(&self) -> bool {
        self.calendar == CalendarSystem::Lunar
    }

    pub fn clock_time(&self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or_else(|| {
            SajuError::invalid_input(
                "hour/minute",
                format!("{}:{}", self.hour, self.minute),
                "not a clock time",
            )
        })
    }
}

impl Validate for BirthInput {
    fn validate(&self) -> Result<()> {
        validate_range("month", self.month, 1, 12)?;
        validate_range("hour", self.hour, 0, 23)?;
        validate_range("minute", self.minute, 0, 59)?;
        validate_range("pivot_offset_minutes", self.pivot_offset_minutes, -720, 720)?;
        validate_range("meridian_adjust_minutes", self.meridian_adjust_minutes, -720, 720)?;
        validate_range("utc_offset_minutes", self.utc_offset_minutes, -720, 840)?;

        match self.calendar {
            CalendarSystem::Solar => {
                if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
                    return Err(SajuError::invalid_input(
                        "day",
                        self.day,
                        format!("{}-{:02} has no such day", self.year, self.month),
                    ));
                }
            }
            CalendarSystem::Lunar => validate_range("day", self.day, 1, 30)?,
        }
        Ok(())
    }
}

/// A date in the lunisolar calendar. `is_leap` marks the inserted month that repeats `month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub is_leap: bool,
    pub day: u32,
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leap = if self.is_leap { "윤" } else { "" };
        write!(f, "음력 {}년 {}{}월 {}일", self.year, leap, self.month, self.day)
    }
}

/// One row of the perpetual calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRecordEntry {
    pub solar_date: NaiveDate,
    pub lunar: LunarDate,
    /// 0..59, position of the day in the sexagenary cycle.
    pub day_cycle_index: u32,
    /// 0..59, sexagenary position of the lunar year.
    pub year_cycle_index: u32,
}

impl CalendarRecordEntry {
    pub fn day_pillar(&self) -> Pillar {
        Pillar::from_cycle(self.day_cycle_index)
    }

    pub fn lunar_year_pillar(&self) -> Pillar {
        Pillar::from_cycle(self.year_cycle_index)
    }
}

/// One solar-term boundary, in the local time of the dataset's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolarTermEntry {
    pub term: SolarTerm,
    pub instant: NaiveDateTime,
    /// 0..59, sexagenary position of the Start-of-Spring year this term belongs to.
    pub year_cycle_index: u32,
}

/// A birth input pinned to the reference calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMoment {
    pub solar_date: NaiveDate,
    pub lunar: LunarDate,
    pub day_cycle_index: u32,
    pub lunar_year_cycle_index: u32,
    /// Civil clock time as entered.
    pub clock_time: NaiveTime,
    pub pivot_offset_minutes: i32,
    pub meridian_adjust_minutes: i32,
    pub utc_offset_minutes: i32,
}

impl ResolvedMoment {
    /// Civil clock instant on the canonical solar date.
    pub fn clock_instant(&self) -> NaiveDateTime {
        self.solar_date.and_time(self.clock_time)
    }

    /// Clock instant with the meridian correction applied. Hour windows are read off this
    /// instant's time of day.
    pub fn adjusted_instant(&self) -> NaiveDateTime {
        self.clock_instant() + Duration::minutes(i64::from(self.meridian_adjust_minutes))
    }

    /// Adjusted instant moved forward by the pivot offset.
    pub fn true_solar_instant(&self) -> NaiveDateTime {
        self.adjusted_instant() + Duration::minutes(i64::from(self.pivot_offset_minutes))
    }
}

/// The four pillars of a birth moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SajuResult {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    pub is_male: bool,
}

impl fmt::Display for SajuResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}
