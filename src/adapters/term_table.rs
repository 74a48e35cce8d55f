use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::domain::ganji::Pillar;
use crate::domain::model::SolarTermEntry;
use crate::domain::ports::SolarTermStore;
use crate::domain::term::SolarTerm;
use crate::utils::error::{Result, SajuError};

const TERMS_PER_YEAR: usize = 24;

#[derive(Debug, Deserialize)]
struct TermRow {
    name: String,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

/// 24-term boundary table: 24 entries for each of a run of consecutive Gregorian years.
#[derive(Debug, Clone)]
pub struct SolarTermTable {
    entries: Vec<SolarTermEntry>,
    first_year: i32,
    utc_offset_minutes: i32,
}

impl SolarTermTable {
    pub fn from_path<P: AsRef<Path>>(path: P, utc_offset_minutes: i32) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| {
            SajuError::data_load(&source_name, format!("cannot open dataset: {}", e))
        })?;
        Self::from_reader(file, &source_name, utc_offset_minutes)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        source_name: &str,
        utc_offset_minutes: i32,
    ) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for (line, row) in csv_reader.deserialize::<TermRow>().enumerate() {
            let row = row?;
            let entry = Self::entry_from_row(&row).map_err(|e| {
                SajuError::data_load(source_name, format!("row {}: {}", line + 1, e))
            })?;
            rows.push((row.year, entry));
        }

        let table = Self::from_entries(rows, source_name, utc_offset_minutes)?;
        tracing::info!(
            "Loaded {} solar terms from {} ({} to {}, UTC{:+} min)",
            table.entries.len(),
            source_name,
            table.first_year,
            table.last_year(),
            utc_offset_minutes
        );
        Ok(table)
    }

    fn entry_from_row(row: &TermRow) -> Result<SolarTermEntry> {
        let term: SolarTerm = row.name.parse()?;
        let instant = NaiveDate::from_ymd_opt(row.year, row.month, row.day)
            .and_then(|d| d.and_hms_opt(row.hour, row.minute, 0))
            .ok_or_else(|| {
                SajuError::invalid_input(
                    "instant",
                    format!(
                        "{}-{}-{} {}:{}",
                        row.year, row.month, row.day, row.hour, row.minute
                    ),
                    "not a valid date-time",
                )
            })?;
        let spring_year = if term.precedes_spring() {
            row.year - 1
        } else {
            row.year
        };
        Ok(SolarTermEntry {
            term,
            instant,
            year_cycle_index: Pillar::for_year(spring_year).cycle_index(),
        })
    }

    /// Validates `(year, entry)` pairs and builds the table.
    pub fn from_entries(
        rows: Vec<(i32, SolarTermEntry)>,
        source_name: &str,
        utc_offset_minutes: i32,
    ) -> Result<Self> {
        let Some(&(first_year, _)) = rows.first() else {
            return Err(SajuError::data_load(source_name, "solar term table is empty"));
        };

        let mut entries: Vec<SolarTermEntry> = Vec::with_capacity(rows.len());
        for (i, (year, entry)) in rows.into_iter().enumerate() {
            let expected_year = first_year + (i / TERMS_PER_YEAR) as i32;
            let expected_order = (i % TERMS_PER_YEAR) as u32;

            if year != expected_year || entry.term.calendar_order() != expected_order {
                return Err(SajuError::data_load(
                    source_name,
                    format!(
                        "expected term #{} of {}, found {} of {}",
                        expected_order + 1,
                        expected_year,
                        entry.term,
                        year
                    ),
                ));
            }

            if let Some(prev) = entries.last() {
                if entry.instant <= prev.instant {
                    return Err(SajuError::data_load(
                        source_name,
                        format!(
                            "{} at {} is not after {} at {}",
                            entry.term, entry.instant, prev.term, prev.instant
                        ),
                    ));
                }
            }
            entries.push(entry);
        }

        if entries.len() % TERMS_PER_YEAR != 0 {
            return Err(SajuError::data_load(
                source_name,
                format!(
                    "year {} has {} terms, expected {}",
                    first_year + (entries.len() / TERMS_PER_YEAR) as i32,
                    entries.len() % TERMS_PER_YEAR,
                    TERMS_PER_YEAR
                ),
            ));
        }

        Ok(Self {
            entries,
            first_year,
            utc_offset_minutes,
        })
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.first_year + (self.entries.len() / TERMS_PER_YEAR) as i32 - 1
    }

    /// The term entry of `term` dated in Gregorian `year`.
    pub fn term_in_year(&self, year: i32, term: SolarTerm) -> Option<&SolarTermEntry> {
        self.terms_between(year, year)
            .get(term.calendar_order() as usize)
    }
}

impl SolarTermStore for SolarTermTable {
    fn terms_between(&self, from_year: i32, to_year: i32) -> &[SolarTermEntry] {
        let from = from_year.max(self.first_year);
        let to = to_year.min(self.last_year());
        if from > to {
            return &[];
        }
        let start = (from - self.first_year) as usize * TERMS_PER_YEAR;
        let end = (to - self.first_year + 1) as usize * TERMS_PER_YEAR;
        &self.entries[start..end]
    }

    fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    const NAMES: [&str; 24] = [
        "소한", "대한", "입춘", "우수", "경칩", "춘분", "청명", "곡우", "입하", "소만", "망종",
        "하지", "소서", "대서", "입추", "처서", "백로", "추분", "한로", "상강", "입동", "소설",
        "대설", "동지",
    ];

    /// Synthetic but well-ordered terms: two per month on the 5th and 20th.
    fn synthetic_csv(years: &[i32]) -> String {
        let mut csv = String::from("name,year,month,day,hour,minute\n");
        for &year in years {
            for (i, name) in NAMES.iter().enumerate() {
                let month = i / 2 + 1;
                let day = if i % 2 == 0 { 5 } else { 20 };
                csv.push_str(&format!("{},{},{},{},12,0\n", name, year, month, day));
            }
        }
        csv
    }

    #[test]
    fn test_load_and_slice() {
        let table =
            SolarTermTable::from_reader(synthetic_csv(&[2000, 2001]).as_bytes(), "terms", 540)
                .unwrap();
        assert_eq!(2000, table.first_year());
        assert_eq!(2001, table.last_year());
        assert_eq!(48, table.terms_between(1999, 2002).len());
        assert_eq!(24, table.terms_between(2001, 2001).len());
        assert!(table.terms_between(2003, 2004).is_empty());
        assert_eq!(540, table.utc_offset_minutes());
    }

    #[test]
    fn test_year_context_follows_start_of_spring() {
        let table =
            SolarTermTable::from_reader(synthetic_csv(&[2000]).as_bytes(), "terms", 540).unwrap();
        let minor_cold = table.term_in_year(2000, SolarTerm::MINOR_COLD).unwrap();
        let spring = table.term_in_year(2000, SolarTerm::START_OF_SPRING).unwrap();
        assert_eq!("己卯", Pillar::from_cycle(minor_cold.year_cycle_index).to_string());
        assert_eq!("庚辰", Pillar::from_cycle(spring.year_cycle_index).to_string());
    }

    #[test]
    fn test_rejects_incomplete_year() {
        let mut csv = synthetic_csv(&[2000]);
        csv.push_str("소한,2001,1,5,12,0\n");
        let err = SolarTermTable::from_reader(csv.as_bytes(), "terms", 540).unwrap_err();
        assert_eq!(ErrorCategory::ReferenceData, err.category());
        assert!(err.to_string().contains("year 2001 has 1 terms"));
    }

    #[test]
    fn test_rejects_out_of_order_terms() {
        let csv = synthetic_csv(&[2000]).replacen("입춘,2000,2,5", "입춘,2000,1,1", 1);
        assert!(SolarTermTable::from_reader(csv.as_bytes(), "terms", 540).is_err());

        let swapped = synthetic_csv(&[2000])
            .replacen("우수", "TMP", 1)
            .replacen("입춘", "우수", 1)
            .replacen("TMP", "입춘", 1);
        assert!(SolarTermTable::from_reader(swapped.as_bytes(), "terms", 540).is_err());
    }

    #[test]
    fn test_rejects_unknown_name() {
        let csv = synthetic_csv(&[2000]).replacen("입춘", "춘삼월", 1);
        assert!(SolarTermTable::from_reader(csv.as_bytes(), "terms", 540).is_err());
    }
}
