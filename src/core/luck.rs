//! Ten-year luck pillars (대운), yearly pillars (세운) and monthly pillars (월운).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::deriver;
use crate::core::locator::SolarTermLocator;
use crate::domain::ganji::{Branch, Pillar, Stem};
use crate::domain::model::{SajuResult, SolarTermEntry};
use crate::domain::ports::SolarTermStore;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};

/// How the fractional start age is brought to whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    #[default]
    Floor,
    Round,
    Ceil,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Floor => value.floor(),
            Rounding::Round => value.round(),
            Rounding::Ceil => value.ceil(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuckOptions {
    pub rounding: Rounding,
    /// Constant shift applied to the reported target term instant. The start age is not
    /// affected.
    pub season_adjust_minutes: i32,
    pub pillar_count: u32,
    pub yearly_count: u32,
}

impl Default for LuckOptions {
    fn default() -> Self {
        Self {
            rounding: Rounding::Floor,
            season_adjust_minutes: 0,
            pillar_count: 10,
            yearly_count: 10,
        }
    }
}

impl Validate for LuckOptions {
    fn validate(&self) -> Result<()> {
        validate_range("luck.season_adjust_minutes", self.season_adjust_minutes, -1440, 1440)?;
        validate_range("luck.pillar_count", self.pillar_count, 1, 12)?;
        validate_range("luck.yearly_count", self.yearly_count, 1, 100)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LuckDirection {
    Forward,
    Reverse,
}

impl LuckDirection {
    pub fn hangul(self) -> &'static str {
        match self {
            LuckDirection::Forward => "순행",
            LuckDirection::Reverse => "역행",
        }
    }
}

/// Forward for a man born in a yang year or a woman born in a yin year.
pub fn direction(is_male: bool, year_stem: Stem) -> LuckDirection {
    if is_male == year_stem.is_yang() {
        LuckDirection::Forward
    } else {
        LuckDirection::Reverse
    }
}

/// Three calendar days between the birth date and the target term's date count as one year
/// of age. Times of day are ignored.
pub fn start_age(birth: NaiveDate, target: NaiveDate, rounding: Rounding) -> u32 {
    let days = (target - birth).num_days().unsigned_abs();
    let raw = days as f64 / 3.0;
    (rounding.apply(raw) as u32).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LuckPillar {
    /// 1-based position in the sequence.
    pub order: u32,
    pub pillar: Pillar,
    pub start_age: u32,
    pub start_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearlyPillar {
    pub year: i32,
    pub pillar: Pillar,
}

pub fn luck_pillars(
    month: Pillar,
    direction: LuckDirection,
    start_age: u32,
    birth_year: i32,
    count: u32,
) -> Vec<LuckPillar> {
    (1..=count)
        .map(|order| {
            let step = match direction {
                LuckDirection::Forward => order as i32,
                LuckDirection::Reverse => -(order as i32),
            };
            let age = start_age + 10 * (order - 1);
            LuckPillar {
                order,
                pillar: month.offset(step),
                start_age: age,
                start_year: birth_year + age as i32 - 1,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyPillar {
    pub year: i32,
    /// 1 is the 寅 month opened by Start of Spring, 12 the 丑 month.
    pub month: u32,
    pub pillar: Pillar,
}

/// The twelve month pillars of a year whose stem is `year_stem`, 寅 through 丑.
pub fn monthly_pillars(year: i32, year_stem: Stem) -> Vec<MonthlyPillar> {
    (1..=12)
        .map(|month| MonthlyPillar {
            year,
            month,
            pillar: deriver::month_pillar_for_branch(Branch::from_index(month + 1), year_stem),
        })
        .collect()
}

pub fn yearly_pillars(from_year: i32, count: u32) -> Vec<YearlyPillar> {
    (0..count as i32)
        .map(|i| YearlyPillar {
            year: from_year + i,
            pillar: Pillar::for_year(from_year + i),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LuckCycle {
    pub direction: LuckDirection,
    /// Principal term the start age is counted to.
    pub target_term: SolarTermEntry,
    /// `target_term` moved by the season adjustment.
    pub target_instant: NaiveDateTime,
    pub start_age: u32,
    pub pillars: Vec<LuckPillar>,
    pub yearly: Vec<YearlyPillar>,
    /// Month pillars of the birth year.
    pub monthly: Vec<MonthlyPillar>,
}

impl LuckCycle {
    /// `birth` is the instant already compared with term boundaries; `birth_year` is the
    /// Gregorian year of the canonical solar date.
    pub fn compute<T: SolarTermStore>(
        locator: &SolarTermLocator<'_, T>,
        birth: NaiveDateTime,
        birth_year: i32,
        chart: &SajuResult,
        options: &LuckOptions,
    ) -> Result<Self> {
        let direction = direction(chart.is_male, chart.year.stem);
        let target_term = match direction {
            LuckDirection::Forward => locator.next_principal_after(birth)?,
            LuckDirection::Reverse => locator.prev_principal_before(birth)?,
        };
        let target_instant =
            target_term.instant + Duration::minutes(i64::from(options.season_adjust_minutes));
        let start_age = start_age(birth.date(), target_term.instant.date(), options.rounding);

        let pillars = luck_pillars(
            chart.month,
            direction,
            start_age,
            birth_year,
            options.pillar_count,
        );
        let first_year = pillars
            .first()
            .map(|p| p.start_year)
            .unwrap_or_else(|| birth.year());
        let yearly = yearly_pillars(first_year, options.yearly_count);
        let monthly = monthly_pillars(birth_year, chart.year.stem);

        tracing::debug!(
            "Luck runs {:?} from {} ({}), start age {}",
            direction,
            target_term.term,
            target_term.instant,
            start_age
        );

        Ok(Self {
            direction,
            target_term,
            target_instant,
            start_age,
            pillars,
            yearly,
            monthly,
        })
    }
}
