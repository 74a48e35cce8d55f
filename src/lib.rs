pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{calendar_table::CalendarTable, term_table::SolarTermTable};
pub use core::{ChartReport, EngineOptions, PivotScope, SajuEngine};
pub use domain::ganji::{Branch, Pillar, Stem};
pub use domain::model::{BirthInput, CalendarSystem, LunarDate, SajuResult};
pub use utils::error::{Result, SajuError};
