use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SajuError {
    #[error("Out of range: {message}")]
    OutOfRange { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Lunar year {year} has no leap month {month}")]
    InvalidLeapMonth { year: i32, month: u32 },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Reference data error in {source_name}: {message}")]
    DataLoad {
        source_name: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Caller-visible failure category. Carries no internal detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    OutOfRange,
    NotFound,
    InvalidLeapMonth,
    InvalidInput,
    ReferenceData,
    Configuration,
    Io,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::OutOfRange => "out_of_range",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidLeapMonth => "invalid_leap_month",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::ReferenceData => "reference_data",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Io => "io",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SajuError {
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data_load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::OutOfRange { .. } => ErrorCategory::OutOfRange,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidLeapMonth { .. } => ErrorCategory::InvalidLeapMonth,
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::DataLoad { .. } | Self::CsvError(_) => ErrorCategory::ReferenceData,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Io,
        }
    }

    /// Request-level failures are the caller's to fix; load and config failures stop the process.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::InvalidInput | ErrorCategory::InvalidLeapMonth => ErrorSeverity::Medium,
            ErrorCategory::OutOfRange | ErrorCategory::NotFound => ErrorSeverity::High,
            ErrorCategory::ReferenceData | ErrorCategory::Configuration | ErrorCategory::Io => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::OutOfRange => "The date is outside the range covered by the calendar data",
            ErrorCategory::NotFound => "That calendar date does not exist",
            ErrorCategory::InvalidLeapMonth => "That lunar year has no such leap month",
            ErrorCategory::InvalidInput => "One of the birth fields is malformed",
            ErrorCategory::ReferenceData => "The reference calendar data could not be loaded",
            ErrorCategory::Configuration => "The configuration is invalid",
            ErrorCategory::Io => "A file could not be read or written",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::OutOfRange => "Use a date inside the dataset span or load a wider dataset",
            ErrorCategory::NotFound => "Check the lunar day; short lunar months have only 29 days",
            ErrorCategory::InvalidLeapMonth => "Retry without the leap flag",
            ErrorCategory::InvalidInput => "Check month 1-12, hour 0-23 and minute 0-59",
            ErrorCategory::ReferenceData => "Verify the dataset files are complete and well formed",
            ErrorCategory::Configuration => "Fix the configuration file and try again",
            ErrorCategory::Io => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, SajuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_hides_details() {
        let err = SajuError::out_of_range("1800-01-01 precedes 1900-01-31");
        assert_eq!(err.category(), ErrorCategory::OutOfRange);
        assert!(!err.user_friendly_message().contains("1800"));
    }

    #[test]
    fn test_leap_month_display() {
        let err = SajuError::InvalidLeapMonth {
            year: 2000,
            month: 4,
        };
        assert_eq!(err.to_string(), "Lunar year 2000 has no leap month 4");
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_load_errors_are_critical() {
        let err = SajuError::data_load("terms.csv", "23 terms in 2001");
        assert_eq!(err.category(), ErrorCategory::ReferenceData);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SajuError>();
    }
}
