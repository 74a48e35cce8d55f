use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::model::{ResolvedMoment, SolarTermEntry};
use crate::domain::ports::SolarTermStore;
use crate::domain::term::SolarTerm;
use crate::utils::error::{Result, SajuError};

/// Which boundaries the true-solar-time pivot applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotScope {
    /// Term boundaries and hour windows both see the pivot.
    #[default]
    AllBoundaries,
    /// Only the hour windows move; term boundaries are compared against the
    /// meridian-corrected clock.
    HourOnly,
}

impl PivotScope {
    pub fn as_str(self) -> &'static str {
        match self {
            PivotScope::AllBoundaries => "all_boundaries",
            PivotScope::HourOnly => "hour_only",
        }
    }
}

/// The solar-term interval that holds a birth instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermPosition {
    pub enclosing: SolarTermEntry,
    pub next: SolarTermEntry,
    /// The compared instant, in the term table's zone.
    pub instant: NaiveDateTime,
}

impl TermPosition {
    pub fn term(&self) -> SolarTerm {
        self.enclosing.term
    }

    pub fn term_index(&self) -> u32 {
        self.enclosing.term.index()
    }

    pub fn year_cycle_index(&self) -> u32 {
        self.enclosing.year_cycle_index
    }
}

pub struct SolarTermLocator<'a, T: SolarTermStore> {
    store: &'a T,
    scope: PivotScope,
}

impl<'a, T: SolarTermStore> SolarTermLocator<'a, T> {
    pub fn new(store: &'a T, scope: PivotScope) -> Self {
        Self { store, scope }
    }

    /// The birth instant as it is compared with term boundaries, moved into the store's zone.
    pub fn boundary_instant(&self, moment: &ResolvedMoment) -> NaiveDateTime {
        let local = match self.scope {
            PivotScope::AllBoundaries => moment.true_solar_instant(),
            PivotScope::HourOnly => moment.adjusted_instant(),
        };
        let zone_shift = moment.utc_offset_minutes - self.store.utc_offset_minutes();
        local - Duration::minutes(i64::from(zone_shift))
    }

    pub fn locate(&self, moment: &ResolvedMoment) -> Result<TermPosition> {
        let instant = self.boundary_instant(moment);
        let terms = self.window(instant);

        // Terms are sorted by instant; the enclosing one is the last at or before `instant`.
        let idx = terms.partition_point(|t| t.instant <= instant);
        if idx == 0 || idx >= terms.len() {
            return Err(SajuError::out_of_range(format!(
                "no solar term interval covers {}",
                instant
            )));
        }

        let position = TermPosition {
            enclosing: terms[idx - 1],
            next: terms[idx],
            instant,
        };
        tracing::debug!(
            "{} falls in {} ({} to {})",
            instant,
            position.enclosing.term,
            position.enclosing.instant,
            position.next.instant
        );
        Ok(position)
    }

    /// First month-opening term strictly after `instant`.
    pub fn next_principal_after(&self, instant: NaiveDateTime) -> Result<SolarTermEntry> {
        let terms = self.window(instant);
        let idx = terms.partition_point(|t| t.instant <= instant);
        terms[idx..]
            .iter()
            .find(|t| t.term.is_principal())
            .copied()
            .ok_or_else(|| {
                SajuError::out_of_range(format!("no principal term after {}", instant))
            })
    }

    /// Last month-opening term strictly before `instant`.
    pub fn prev_principal_before(&self, instant: NaiveDateTime) -> Result<SolarTermEntry> {
        let terms = self.window(instant);
        let idx = terms.partition_point(|t| t.instant < instant);
        terms[..idx]
            .iter()
            .rev()
            .find(|t| t.term.is_principal())
            .copied()
            .ok_or_else(|| {
                SajuError::out_of_range(format!("no principal term before {}", instant))
            })
    }

    fn window(&self, instant: NaiveDateTime) -> &'a [SolarTermEntry] {
        let year = instant.year();
        self.store.terms_between(year - 1, year + 1)
    }
}
