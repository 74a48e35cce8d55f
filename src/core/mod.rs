// Engine stages: resolve the calendar date, locate the solar term, derive the pillars.

pub mod analysis;
pub mod deriver;
pub mod engine;
pub mod locator;
pub mod luck;
pub mod resolver;

pub use engine::{ChartReport, EngineOptions, SajuEngine};
pub use locator::PivotScope;
