use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::adapters::calendar_table::CalendarTable;
use crate::adapters::term_table::SolarTermTable;
use crate::core::analysis::Interpretation;
use crate::core::deriver;
use crate::core::locator::{PivotScope, SolarTermLocator, TermPosition};
use crate::core::luck::{LuckCycle, LuckOptions};
use crate::core::resolver::CalendarResolver;
use crate::domain::ganji::Pillar;
use crate::domain::model::{BirthInput, LunarDate, ResolvedMoment, SajuResult};
use crate::domain::ports::{CalendarStore, SolarTermStore};
use crate::domain::term::SolarTerm;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub pivot_scope: PivotScope,
    pub luck: LuckOptions,
}

/// Where a chart sits in both calendars and in the solar-term year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarContext {
    pub solar_date: NaiveDate,
    pub lunar: LunarDate,
    pub lunar_year_pillar: Pillar,
    pub term: SolarTerm,
    pub term_instant: NaiveDateTime,
    pub next_term: SolarTerm,
    pub next_term_instant: NaiveDateTime,
    /// The birth instant as compared with the term boundaries.
    pub boundary_instant: NaiveDateTime,
    pub pivot_scope: PivotScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartReport {
    pub input: BirthInput,
    pub chart: SajuResult,
    pub calendar: CalendarContext,
    pub interpretation: Interpretation,
    pub luck: LuckCycle,
}

/// Runs resolve, locate and derive over two read-only stores. Holds no per-request state, so
/// one engine can serve any number of threads.
pub struct SajuEngine<C: CalendarStore, T: SolarTermStore> {
    calendar: C,
    terms: T,
    options: EngineOptions,
}

impl SajuEngine<CalendarTable, SolarTermTable> {
    /// Loads both CSV datasets. A failure here leaves no engine behind.
    pub fn from_datasets<P: AsRef<Path>, Q: AsRef<Path>>(
        calendar_path: P,
        terms_path: Q,
        terms_utc_offset_minutes: i32,
        options: EngineOptions,
    ) -> Result<Self> {
        let calendar = CalendarTable::from_path(calendar_path)?;
        let terms = SolarTermTable::from_path(terms_path, terms_utc_offset_minutes)?;
        Ok(Self::with_options(calendar, terms, options))
    }
}

impl<C: CalendarStore, T: SolarTermStore> SajuEngine<C, T> {
    pub fn new(calendar: C, terms: T) -> Self {
        Self::with_options(calendar, terms, EngineOptions::default())
    }

    pub fn with_options(calendar: C, terms: T, options: EngineOptions) -> Self {
        Self {
            calendar,
            terms,
            options,
        }
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// The four pillars of a birth moment. Any stage failure is returned unchanged.
    pub fn assemble(&self, input: &BirthInput) -> Result<SajuResult> {
        let (chart, _, _) = self.derive(input)?;
        Ok(chart)
    }

    /// Pillars plus calendar context, interpretation and luck cycles.
    pub fn report(&self, input: &BirthInput) -> Result<ChartReport> {
        let (chart, moment, position) = self.derive(input)?;
        let locator = self.locator();
        let luck = LuckCycle::compute(
            &locator,
            position.instant,
            moment.solar_date.year(),
            &chart,
            &self.options.luck,
        )?;

        Ok(ChartReport {
            input: input.clone(),
            chart,
            calendar: CalendarContext {
                solar_date: moment.solar_date,
                lunar: moment.lunar,
                lunar_year_pillar: Pillar::from_cycle(moment.lunar_year_cycle_index),
                term: position.enclosing.term,
                term_instant: position.enclosing.instant,
                next_term: position.next.term,
                next_term_instant: position.next.instant,
                boundary_instant: position.instant,
                pivot_scope: self.options.pivot_scope,
            },
            interpretation: Interpretation::of(&chart),
            luck,
        })
    }

    fn locator(&self) -> SolarTermLocator<'_, T> {
        SolarTermLocator::new(&self.terms, self.options.pivot_scope)
    }

    fn derive(&self, input: &BirthInput) -> Result<(SajuResult, ResolvedMoment, TermPosition)> {
        let moment = CalendarResolver::new(&self.calendar).resolve(input)?;
        let position = self.locator().locate(&moment)?;

        let year = deriver::year_pillar(position.year_cycle_index());
        let month = deriver::month_pillar(position.term(), year.stem);
        let day = deriver::day_pillar(moment.day_cycle_index);
        // Only the time of day counts; the day stem stays with the canonical solar date.
        let adjusted = moment.adjusted_instant();
        let hour = deriver::hour_pillar(
            adjusted.hour(),
            adjusted.minute(),
            moment.pivot_offset_minutes,
            day.stem,
        );

        let chart = SajuResult {
            year,
            month,
            day,
            hour,
            is_male: input.is_male,
        };
        tracing::debug!("Assembled {} for {}", chart, moment.solar_date);
        Ok((chart, moment, position))
    }
}
