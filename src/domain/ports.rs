use chrono::NaiveDate;

use crate::domain::model::{CalendarRecordEntry, SolarTermEntry};
use crate::utils::error::Result;

/// Read-only access to the perpetual calendar.
pub trait CalendarStore: Send + Sync {
    /// Fails with `OutOfRange` outside the covered solar span.
    fn lookup_by_solar_date(&self, date: NaiveDate) -> Result<CalendarRecordEntry>;

    /// Fails with `OutOfRange` for an uncovered lunar year and `NotFound` for a coordinate the
    /// calendar never had (a leap flag without a leap block, day 30 of a short month).
    fn lookup_by_lunar_date(
        &self,
        year: i32,
        month: u32,
        is_leap: bool,
        day: u32,
    ) -> Result<CalendarRecordEntry>;

    /// The leap month of a lunar year, if it has one.
    fn leap_month(&self, year: i32) -> Option<u32>;
}

/// Read-only access to the 24-term boundary table.
pub trait SolarTermStore: Send + Sync {
    /// All entries dated in Gregorian years `from..=to`, in increasing time order.
    fn terms_between(&self, from_year: i32, to_year: i32) -> &[SolarTermEntry];

    /// UTC offset of the zone the term instants are recorded in.
    fn utc_offset_minutes(&self) -> i32;
}
