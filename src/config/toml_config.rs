use crate::core::engine::EngineOptions;
use crate::core::locator::PivotScope;
use crate::core::luck::LuckOptions;
use crate::domain::model::{
    DEFAULT_MERIDIAN_ADJUST_MINUTES, DEFAULT_PIVOT_OFFSET_MINUTES, DEFAULT_UTC_OFFSET_MINUTES,
};
use crate::utils::error::{Result, SajuError};
use crate::utils::validation::{
    validate_file_extensions, validate_one_of, validate_path, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File configuration. Every section is optional; `${VAR}` is replaced from the environment
/// before parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub datasets: DatasetsConfig,
    pub engine: EngineConfig,
    pub luck: LuckOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetsConfig {
    pub calendar: String,
    pub solar_terms: String,
    /// Zone the term instants are recorded in.
    pub solar_terms_utc_offset_minutes: i32,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            calendar: "data/manseryeok.csv".to_string(),
            solar_terms: "data/solar_terms.csv".to_string(),
            solar_terms_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pivot_scope: PivotScope,
    /// Used for inputs that do not carry their own pivot (batch rows, CLI default).
    pub default_pivot_offset_minutes: i32,
    pub default_meridian_adjust_minutes: i32,
    pub default_utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pivot_scope: PivotScope::default(),
            default_pivot_offset_minutes: DEFAULT_PIVOT_OFFSET_MINUTES,
            default_meridian_adjust_minutes: DEFAULT_MERIDIAN_ADJUST_MINUTES,
            default_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `compact` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SajuError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SajuError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}`; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SajuError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            pivot_scope: self.engine.pivot_scope,
            luck: self.luck.clone(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("datasets.calendar", &self.datasets.calendar)?;
        validate_path("datasets.solar_terms", &self.datasets.solar_terms)?;
        validate_file_extensions(
            "datasets",
            &[self.datasets.calendar.as_str(), self.datasets.solar_terms.as_str()],
            &["csv"],
        )?;
        validate_range(
            "datasets.solar_terms_utc_offset_minutes",
            self.datasets.solar_terms_utc_offset_minutes,
            -720,
            840,
        )?;

        validate_range(
            "engine.default_pivot_offset_minutes",
            self.engine.default_pivot_offset_minutes,
            -720,
            720,
        )?;
        validate_range(
            "engine.default_meridian_adjust_minutes",
            self.engine.default_meridian_adjust_minutes,
            -720,
            720,
        )?;
        validate_range(
            "engine.default_utc_offset_minutes",
            self.engine.default_utc_offset_minutes,
            -720,
            840,
        )?;

        self.luck.validate()?;

        validate_one_of(
            "logging.level",
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::luck::Rounding;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(TomlConfig::default(), config);
        assert_eq!("data/manseryeok.csv", config.datasets.calendar);
        assert_eq!(30, config.engine.default_pivot_offset_minutes);
        assert_eq!(-30, config.engine.default_meridian_adjust_minutes);
        assert_eq!(PivotScope::AllBoundaries, config.engine.pivot_scope);
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[datasets]
calendar = "/srv/saju/manseryeok.csv"
solar_terms = "/srv/saju/terms.csv"
solar_terms_utc_offset_minutes = 480

[engine]
pivot_scope = "hour_only"
default_pivot_offset_minutes = 0
default_meridian_adjust_minutes = 0

[luck]
rounding = "round"
season_adjust_minutes = -30
pillar_count = 8

[logging]
level = "debug"
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(480, config.datasets.solar_terms_utc_offset_minutes);
        assert_eq!(540, config.engine.default_utc_offset_minutes);
        assert_eq!(0, config.engine.default_meridian_adjust_minutes);
        assert!(config.logging.is_json());

        let options = config.engine_options();
        assert_eq!(PivotScope::HourOnly, options.pivot_scope);
        assert_eq!(Rounding::Round, options.luck.rounding);
        assert_eq!(-30, options.luck.season_adjust_minutes);
        assert_eq!(8, options.luck.pillar_count);
        assert_eq!(10, options.luck.yearly_count);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SAJU_TEST_DATA_DIR", "/opt/saju");

        let toml_content = r#"
[datasets]
calendar = "${SAJU_TEST_DATA_DIR}/manseryeok.csv"
solar_terms = "${SAJU_TEST_UNSET_DIR}/terms.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!("/opt/saju/manseryeok.csv", config.datasets.calendar);
        assert_eq!("${SAJU_TEST_UNSET_DIR}/terms.csv", config.datasets.solar_terms);

        std::env::remove_var("SAJU_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_extension = TomlConfig::from_toml_str("[datasets]\ncalendar = \"cal.db\"").unwrap();
        assert!(bad_extension.validate().is_err());

        let bad_level = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap();
        assert!(bad_level.validate().is_err());

        let bad_pivot =
            TomlConfig::from_toml_str("[engine]\ndefault_pivot_offset_minutes = 900").unwrap();
        assert!(bad_pivot.validate().is_err());

        // Enum fields are checked by the parser itself.
        assert!(TomlConfig::from_toml_str("[engine]\npivot_scope = \"sometimes\"").is_err());
        assert!(TomlConfig::from_toml_str("[luck]\nrounding = \"trunc\"").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[luck]\nrounding = \"ceil\"\nyearly_count = 5\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(Rounding::Ceil, config.luck.rounding);
        assert_eq!(5, config.luck.yearly_count);

        let err = TomlConfig::from_file("/nonexistent/saju.toml").unwrap_err();
        assert!(matches!(err, SajuError::ConfigError { .. }));
    }
}
