use crate::config::toml_config::TomlConfig;
use crate::core::locator::PivotScope;
use crate::domain::model::{BirthInput, CalendarSystem};
use crate::utils::error::{Result, SajuError};
use crate::utils::validation::{validate_one_of, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// One birth moment from the command line. Dataset and engine settings come from the TOML
/// file when `--config` is given and can be overridden per run.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "saju")]
#[command(about = "Four Pillars chart for one birth moment")]
pub struct CliConfig {
    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub month: u32,

    #[arg(long)]
    pub day: u32,

    #[arg(long)]
    pub hour: u32,

    #[arg(long, default_value = "0")]
    pub minute: u32,

    #[arg(long, help = "Read year/month/day as a lunar date")]
    pub lunar: bool,

    #[arg(long, help = "The lunar month is the leap month")]
    pub leap: bool,

    #[arg(long)]
    pub female: bool,

    #[arg(long, allow_hyphen_values = true, help = "True solar time pivot in minutes")]
    pub pivot: Option<i32>,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Standard meridian to local mean time correction in minutes"
    )]
    pub meridian_adjust: Option<i32>,

    #[arg(long, allow_hyphen_values = true, help = "UTC offset of the birth clock in minutes")]
    pub utc_offset: Option<i32>,

    #[arg(long, help = "all_boundaries or hour_only")]
    pub pivot_scope: Option<String>,

    #[arg(long, short = 'c', help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long)]
    pub calendar: Option<String>,

    #[arg(long)]
    pub solar_terms: Option<String>,

    #[arg(long, help = "Include calendar context, interpretation and luck cycles")]
    pub report: bool,

    #[arg(long, help = "Print JSON instead of text")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads `--config` (or defaults) and applies the command-line overrides on top.
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(calendar) = &self.calendar {
            settings.datasets.calendar = calendar.clone();
        }
        if let Some(terms) = &self.solar_terms {
            settings.datasets.solar_terms = terms.clone();
        }
        if let Some(scope) = &self.pivot_scope {
            settings.engine.pivot_scope = match scope.as_str() {
                "hour_only" => PivotScope::HourOnly,
                _ => PivotScope::AllBoundaries,
            };
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn birth_input(&self, settings: &TomlConfig) -> BirthInput {
        BirthInput {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            calendar: if self.lunar {
                CalendarSystem::Lunar
            } else {
                CalendarSystem::Solar
            },
            is_leap_month: self.leap,
            is_male: !self.female,
            pivot_offset_minutes: self
                .pivot
                .unwrap_or(settings.engine.default_pivot_offset_minutes),
            meridian_adjust_minutes: self
                .meridian_adjust
                .unwrap_or(settings.engine.default_meridian_adjust_minutes),
            utc_offset_minutes: self
                .utc_offset
                .unwrap_or(settings.engine.default_utc_offset_minutes),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(scope) = &self.pivot_scope {
            validate_one_of(
                "pivot_scope",
                scope,
                &[
                    PivotScope::AllBoundaries.as_str(),
                    PivotScope::HourOnly.as_str(),
                ],
            )?;
        }
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        if self.leap && !self.lunar {
            return Err(SajuError::invalid_input(
                "leap",
                true,
                "--leap only applies to --lunar dates",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["saju"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_caller_contract() {
        let cli = parse(&["--year", "2000", "--month", "1", "--day", "1", "--hour", "0"]);
        assert!(cli.validate().is_ok());

        let settings = cli.load_settings().unwrap();
        let input = cli.birth_input(&settings);
        assert_eq!(BirthInput::new(2000, 1, 1, 0), input);
    }

    #[test]
    fn test_lunar_female_with_overrides() {
        let cli = parse(&[
            "--year", "2001", "--month", "4", "--day", "1", "--hour", "13", "--minute", "45",
            "--lunar", "--leap", "--female", "--pivot", "-15", "--meridian-adjust", "0",
            "--utc-offset", "480",
            "--pivot-scope", "hour_only", "--calendar", "cal.csv",
        ]);
        assert!(cli.validate().is_ok());

        let settings = cli.load_settings().unwrap();
        assert_eq!("cal.csv", settings.datasets.calendar);
        assert_eq!(PivotScope::HourOnly, settings.engine.pivot_scope);

        let input = cli.birth_input(&settings);
        assert!(input.is_lunar());
        assert!(input.is_leap_month);
        assert!(!input.is_male);
        assert_eq!(45, input.minute);
        assert_eq!(-15, input.pivot_offset_minutes);
        assert_eq!(0, input.meridian_adjust_minutes);
        assert_eq!(480, input.utc_offset_minutes);
    }

    #[test]
    fn test_rejects_inconsistent_flags() {
        let leap_on_solar = parse(&[
            "--year", "2001", "--month", "4", "--day", "1", "--hour", "0", "--leap",
        ]);
        assert!(leap_on_solar.validate().is_err());

        let bad_scope = parse(&[
            "--year", "2001", "--month", "4", "--day", "1", "--hour", "0", "--pivot-scope", "some",
        ]);
        assert!(bad_scope.validate().is_err());
    }
}
