use anyhow::Context;
use clap::Parser;
use saju_engine::config::toml_config::EngineConfig;
use saju_engine::utils::error::ErrorCategory;
use saju_engine::utils::{logger, validation::Validate};
use saju_engine::{BirthInput, CalendarSystem, SajuEngine, TomlConfig};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Parser)]
#[command(name = "saju-batch")]
#[command(about = "Four Pillars charts for every row of a birth CSV")]
struct Args {
    /// Birth CSV: year,month,day,hour and optional minute, calendar, is_leap_month, is_male,
    /// pivot_offset_minutes, meridian_adjust_minutes, utc_offset_minutes
    #[arg(short, long)]
    input: String,

    /// Chart CSV; stdout when omitted
    #[arg(short, long)]
    output: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct BirthRow {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: Option<u32>,
    calendar: Option<CalendarSystem>,
    is_leap_month: Option<bool>,
    is_male: Option<bool>,
    pivot_offset_minutes: Option<i32>,
    meridian_adjust_minutes: Option<i32>,
    utc_offset_minutes: Option<i32>,
}

impl BirthRow {
    fn into_input(self, defaults: &EngineConfig) -> BirthInput {
        BirthInput {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute.unwrap_or(0),
            calendar: self.calendar.unwrap_or_default(),
            is_leap_month: self.is_leap_month.unwrap_or(false),
            is_male: self.is_male.unwrap_or(true),
            pivot_offset_minutes: self
                .pivot_offset_minutes
                .unwrap_or(defaults.default_pivot_offset_minutes),
            meridian_adjust_minutes: self
                .meridian_adjust_minutes
                .unwrap_or(defaults.default_meridian_adjust_minutes),
            utc_offset_minutes: self
                .utc_offset_minutes
                .unwrap_or(defaults.default_utc_offset_minutes),
        }
    }
}

/// Failed rows carry only the error category.
#[derive(Debug, Default, Serialize)]
struct ChartRow {
    row: usize,
    year_pillar: Option<String>,
    month_pillar: Option<String>,
    day_pillar: Option<String>,
    hour_pillar: Option<String>,
    is_male: Option<bool>,
    error: Option<&'static str>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };
    settings.validate().context("invalid configuration")?;

    logger::init_logger(&settings.logging, args.verbose);

    tracing::info!("🚀 Starting saju-batch");
    tracing::info!("📁 Reading births from: {}", args.input);

    let engine = SajuEngine::from_datasets(
        &settings.datasets.calendar,
        &settings.datasets.solar_terms,
        settings.datasets.solar_terms_utc_offset_minutes,
        settings.engine_options(),
    )
    .context("failed to load reference datasets")?;

    let mut reader = csv::Reader::from_path(&args.input)
        .with_context(|| format!("cannot open input '{}'", args.input))?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output '{}'", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    let (mut succeeded, mut failed) = (0usize, 0usize);
    for (i, record) in reader.deserialize::<BirthRow>().enumerate() {
        let row = i + 1;
        let outcome = match record {
            Ok(birth) => engine
                .assemble(&birth.into_input(&settings.engine))
                .map_err(|e| e.category()),
            Err(e) => {
                tracing::debug!("row {}: {}", row, e);
                Err(ErrorCategory::InvalidInput)
            }
        };

        let chart_row = match outcome {
            Ok(chart) => {
                succeeded += 1;
                ChartRow {
                    row,
                    year_pillar: Some(chart.year.to_string()),
                    month_pillar: Some(chart.month.to_string()),
                    day_pillar: Some(chart.day.to_string()),
                    hour_pillar: Some(chart.hour.to_string()),
                    is_male: Some(chart.is_male),
                    error: None,
                }
            }
            Err(category) => {
                failed += 1;
                tracing::warn!("row {} failed: {:?}", row, category);
                ChartRow {
                    row,
                    error: Some(category.as_str()),
                    ..ChartRow::default()
                }
            }
        };
        writer.serialize(chart_row).context("failed to write chart row")?;
    }
    writer.flush().context("failed to flush output")?;

    tracing::info!(
        "✅ Processed {} rows: {} charts, {} failures",
        succeeded + failed,
        succeeded,
        failed
    );
    if let Some(path) = &args.output {
        tracing::info!("📁 Output saved to: {}", path);
    }
    Ok(())
}
