use chrono::NaiveDate;

use crate::domain::model::{BirthInput, CalendarSystem, ResolvedMoment};
use crate::domain::ports::CalendarStore;
use crate::utils::error::{Result, SajuError};
use crate::utils::validation::Validate;

/// Pins a solar or lunar birth input to one row of the perpetual calendar.
pub struct CalendarResolver<'a, C: CalendarStore> {
    store: &'a C,
}

impl<'a, C: CalendarStore> CalendarResolver<'a, C> {
    pub fn new(store: &'a C) -> Self {
        Self { store }
    }

    pub fn resolve(&self, input: &BirthInput) -> Result<ResolvedMoment> {
        input.validate()?;
        let clock_time = input.clock_time()?;

        let entry = match input.calendar {
            CalendarSystem::Solar => {
                let date = NaiveDate::from_ymd_opt(input.year, input.month, input.day)
                    .ok_or_else(|| {
                        SajuError::invalid_input(
                            "date",
                            format!("{}-{}-{}", input.year, input.month, input.day),
                            "not a Gregorian date",
                        )
                    })?;
                self.store.lookup_by_solar_date(date)?
            }
            CalendarSystem::Lunar => {
                match self.store.lookup_by_lunar_date(
                    input.year,
                    input.month,
                    input.is_leap_month,
                    input.day,
                ) {
                    Ok(entry) => entry,
                    Err(SajuError::NotFound { .. })
                        if input.is_leap_month
                            && self.store.leap_month(input.year) != Some(input.month) =>
                    {
                        return Err(SajuError::InvalidLeapMonth {
                            year: input.year,
                            month: input.month,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        tracing::debug!(
            "Resolved {:?} {}-{}-{} (leap: {}) to {} / {}",
            input.calendar,
            input.year,
            input.month,
            input.day,
            input.is_leap_month,
            entry.solar_date,
            entry.lunar
        );

        Ok(ResolvedMoment {
            solar_date: entry.solar_date,
            lunar: entry.lunar,
            day_cycle_index: entry.day_cycle_index,
            lunar_year_cycle_index: entry.year_cycle_index,
            clock_time,
            pivot_offset_minutes: input.pivot_offset_minutes,
            meridian_adjust_minutes: input.meridian_adjust_minutes,
            utc_offset_minutes: input.utc_offset_minutes,
        })
    }
}
