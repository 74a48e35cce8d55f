// Adapters layer: CSV-backed implementations of the calendar and solar-term store ports.

pub mod calendar_table;
pub mod term_table;
