use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::domain::ganji::Pillar;
use crate::domain::model::{CalendarRecordEntry, LunarDate};
use crate::domain::ports::CalendarStore;
use crate::utils::error::{Result, SajuError};

#[derive(Debug, Deserialize)]
struct CalendarRow {
    solar_date: NaiveDate,
    lunar_year: i32,
    lunar_month: u32,
    lunar_day: u32,
    leap_month: u8,
    year_pillar: String,
    day_pillar: String,
}

/// Perpetual calendar held as one contiguous vector, one entry per solar day.
///
/// Solar lookups are an offset from the first date; lunar lookups go through a hash index.
#[derive(Debug, Clone)]
pub struct CalendarTable {
    entries: Vec<CalendarRecordEntry>,
    by_lunar: HashMap<LunarDate, usize>,
    leap_months: HashMap<i32, u32>,
}

impl CalendarTable {
    /// Loads a calendar CSV. Any malformed row fails the whole load.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| {
            SajuError::data_load(&source_name, format!("cannot open dataset: {}", e))
        })?;
        Self::from_reader(file, &source_name)
    }

    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();

        for (line, row) in csv_reader.deserialize::<CalendarRow>().enumerate() {
            let row = row?;
            entries.push(Self::entry_from_row(row).map_err(|e| {
                SajuError::data_load(source_name, format!("row {}: {}", line + 1, e))
            })?);
        }

        let table = Self::from_entries(entries, source_name)?;
        tracing::info!(
            "Loaded {} calendar rows from {} ({} to {})",
            table.len(),
            source_name,
            table.first_date(),
            table.last_date()
        );
        Ok(table)
    }

    fn entry_from_row(row: CalendarRow) -> Result<CalendarRecordEntry> {
        let year_pillar: Pillar = row.year_pillar.parse()?;
        let day_pillar: Pillar = row.day_pillar.parse()?;
        let is_leap = match row.leap_month {
            0 => false,
            1 => true,
            other => {
                return Err(SajuError::invalid_input("leap_month", other, "expected 0 or 1"));
            }
        };
        Ok(CalendarRecordEntry {
            solar_date: row.solar_date,
            lunar: LunarDate {
                year: row.lunar_year,
                month: row.lunar_month,
                is_leap,
                day: row.lunar_day,
            },
            day_cycle_index: day_pillar.cycle_index(),
            year_cycle_index: year_pillar.cycle_index(),
        })
    }

    /// Builds the indexes, rejecting any table that is not one unbroken run of days.
    pub fn from_entries(entries: Vec<CalendarRecordEntry>, source_name: &str) -> Result<Self> {
        if entries.is_empty() {
            return Err(SajuError::data_load(source_name, "calendar table is empty"));
        }

        let mut by_lunar = HashMap::with_capacity(entries.len());
        let mut leap_months: HashMap<i32, u32> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            let lunar = entry.lunar;
            if !(1..=12).contains(&lunar.month) || !(1..=30).contains(&lunar.day) {
                return Err(SajuError::data_load(
                    source_name,
                    format!("{}: malformed lunar date {}", entry.solar_date, lunar),
                ));
            }

            if let Some(prev) = i.checked_sub(1).map(|p| &entries[p]) {
                if prev.solar_date.succ_opt() != Some(entry.solar_date) {
                    return Err(SajuError::data_load(
                        source_name,
                        format!(
                            "rows must be consecutive days: {} follows {}",
                            entry.solar_date, prev.solar_date
                        ),
                    ));
                }
                if (prev.day_cycle_index + 1) % 60 != entry.day_cycle_index {
                    return Err(SajuError::data_load(
                        source_name,
                        format!("day cycle breaks at {}", entry.solar_date),
                    ));
                }
            }

            if lunar.is_leap {
                let leap = *leap_months.entry(lunar.year).or_insert(lunar.month);
                if leap != lunar.month {
                    return Err(SajuError::data_load(
                        source_name,
                        format!(
                            "lunar year {} has leap months {} and {}",
                            lunar.year, leap, lunar.month
                        ),
                    ));
                }
            }

            if by_lunar.insert(lunar, i).is_some() {
                return Err(SajuError::data_load(
                    source_name,
                    format!("{} appears twice", lunar),
                ));
            }
        }

        Ok(Self {
            entries,
            by_lunar,
            leap_months,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.entries[0].solar_date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.entries[self.entries.len() - 1].solar_date
    }

    pub fn entries(&self) -> &[CalendarRecordEntry] {
        &self.entries
    }

    /// Coverage is judged by lunar month; a missing day or leap block inside it is `NotFound`.
    fn lunar_month_key(lunar: &LunarDate) -> (i32, u32) {
        (lunar.year, lunar.month)
    }
}

impl CalendarStore for CalendarTable {
    fn lookup_by_solar_date(&self, date: NaiveDate) -> Result<CalendarRecordEntry> {
        let (first, last) = (self.first_date(), self.last_date());
        if date < first || date > last {
            return Err(SajuError::out_of_range(format!(
                "solar date {} outside {} to {}",
                date, first, last
            )));
        }
        let offset = (date - first).num_days() as usize;
        Ok(self.entries[offset])
    }

    fn lookup_by_lunar_date(
        &self,
        year: i32,
        month: u32,
        is_leap: bool,
        day: u32,
    ) -> Result<CalendarRecordEntry> {
        let wanted = LunarDate {
            year,
            month,
            is_leap,
            day,
        };

        if let Some(&i) = self.by_lunar.get(&wanted) {
            return Ok(self.entries[i]);
        }

        let first = &self.entries[0].lunar;
        let last = &self.entries[self.entries.len() - 1].lunar;
        let key = Self::lunar_month_key(&wanted);
        if key < Self::lunar_month_key(first) || key > Self::lunar_month_key(last) {
            return Err(SajuError::out_of_range(format!(
                "{} outside {} to {}",
                wanted, first, last
            )));
        }

        Err(SajuError::not_found(format!("{} does not exist", wanted)))
    }

    fn leap_month(&self, year: i32) -> Option<u32> {
        self.leap_months.get(&year).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    const SAMPLE: &str = "\
solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar
2001-05-21,2001,4,28,0,辛巳,甲申
2001-05-22,2001,4,29,0,辛巳,乙酉
2001-05-23,2001,4,1,1,辛巳,丙戌
2001-05-24,2001,4,2,1,辛巳,丁亥
";

    fn sample() -> CalendarTable {
        CalendarTable::from_reader(SAMPLE.as_bytes(), "sample").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_solar_lookup() {
        let table = sample();
        let entry = table.lookup_by_solar_date(date(2001, 5, 23)).unwrap();
        assert!(entry.lunar.is_leap);
        assert_eq!("丙戌", entry.day_pillar().to_string());
        assert_eq!("辛巳", entry.lunar_year_pillar().to_string());
    }

    #[test]
    fn test_solar_lookup_out_of_range() {
        let table = sample();
        let err = table.lookup_by_solar_date(date(2001, 5, 25)).unwrap_err();
        assert_eq!(ErrorCategory::OutOfRange, err.category());
        let err = table.lookup_by_solar_date(date(2001, 5, 20)).unwrap_err();
        assert_eq!(ErrorCategory::OutOfRange, err.category());
    }

    #[test]
    fn test_lunar_lookup_distinguishes_leap() {
        let table = sample();
        let leap = table.lookup_by_lunar_date(2001, 4, true, 2).unwrap();
        assert_eq!(date(2001, 5, 24), leap.solar_date);
        assert_eq!(Some(4), table.leap_month(2001));
        assert_eq!(None, table.leap_month(2000));

        let err = table.lookup_by_lunar_date(2001, 4, false, 30).unwrap_err();
        assert_eq!(ErrorCategory::NotFound, err.category());
        let err = table.lookup_by_lunar_date(2002, 1, false, 1).unwrap_err();
        assert_eq!(ErrorCategory::OutOfRange, err.category());
    }

    #[test]
    fn test_rejects_gap() {
        let data = "\
solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar
2001-05-21,2001,4,28,0,辛巳,甲申
2001-05-23,2001,4,1,1,辛巳,乙酉
";
        let err = CalendarTable::from_reader(data.as_bytes(), "gap").unwrap_err();
        assert_eq!(ErrorCategory::ReferenceData, err.category());
    }

    #[test]
    fn test_rejects_broken_day_cycle() {
        let data = "\
solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar
2001-05-21,2001,4,28,0,辛巳,甲申
2001-05-22,2001,4,29,0,辛巳,丙戌
";
        assert!(CalendarTable::from_reader(data.as_bytes(), "cycle").is_err());
    }

    #[test]
    fn test_rejects_second_leap_block() {
        let data = "\
solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar
2001-05-22,2001,4,29,1,辛巳,乙酉
2001-05-23,2001,5,1,1,辛巳,丙戌
";
        let err = CalendarTable::from_reader(data.as_bytes(), "leap").unwrap_err();
        assert!(err.to_string().contains("leap months 4 and 5"));
    }

    #[test]
    fn test_rejects_malformed_pillar_and_empty_table() {
        let data = "\
solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar
2001-05-22,2001,4,29,0,辛巳,乙戌
";
        assert!(CalendarTable::from_reader(data.as_bytes(), "pillar").is_err());

        let header_only = "solar_date,lunar_year,lunar_month,lunar_day,leap_month,year_pillar,day_pillar\n";
        assert!(CalendarTable::from_reader(header_only.as_bytes(), "empty").is_err());
    }
}
