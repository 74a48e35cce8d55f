use clap::Parser;
use saju_engine::utils::error::{ErrorSeverity, SajuError};
use saju_engine::utils::{logger, validation::Validate};
use saju_engine::{ChartReport, CliConfig, SajuEngine, TomlConfig};

fn main() {
    let config = CliConfig::parse();

    let settings = match config.validate().and_then(|_| config.load_settings()) {
        Ok(settings) => settings,
        Err(e) => {
            logger::init_cli_logger(config.verbose);
            tracing::error!("❌ Argument validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };
    logger::init_logger(&settings.logging, config.verbose);

    tracing::info!("🚀 Starting saju");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config, &settings) {
        tracing::error!(
            "❌ Chart calculation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &SajuError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn run(config: &CliConfig, settings: &TomlConfig) -> Result<(), SajuError> {
    tracing::info!(
        "📁 Datasets: {} / {}",
        settings.datasets.calendar,
        settings.datasets.solar_terms
    );

    let engine = SajuEngine::from_datasets(
        &settings.datasets.calendar,
        &settings.datasets.solar_terms,
        settings.datasets.solar_terms_utc_offset_minutes,
        settings.engine_options(),
    )?;
    let input = config.birth_input(settings);

    if config.report {
        let report = engine.report(&input)?;
        if config.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
    } else {
        let chart = engine.assemble(&input)?;
        if config.json {
            println!("{}", serde_json::to_string_pretty(&chart)?);
        } else {
            println!("{}", chart);
        }
    }

    tracing::info!("✅ Done");
    Ok(())
}

fn print_report(report: &ChartReport) {
    let chart = &report.chart;
    let calendar = &report.calendar;
    let reading = &report.interpretation;

    println!("양력 {}  /  {}", calendar.solar_date, calendar.lunar);
    println!(
        "절기 {} ({}) ~ {} ({})",
        calendar.term, calendar.term_instant, calendar.next_term, calendar.next_term_instant
    );
    println!();
    println!("      시주  일주  월주  년주");
    println!(
        "천간  {}    {}    {}    {}",
        chart.hour.stem, chart.day.stem, chart.month.stem, chart.year.stem
    );
    println!(
        "지지  {}    {}    {}    {}",
        chart.hour.branch, chart.day.branch, chart.month.branch, chart.year.branch
    );
    let god = |g: Option<saju_engine::core::analysis::TenGod>| {
        g.map(|g| g.hangul()).unwrap_or("일간")
    };
    println!(
        "십성  {}  {}  {}  {}",
        god(reading.stem_gods.hour),
        god(reading.stem_gods.day),
        god(reading.stem_gods.month),
        god(reading.stem_gods.year)
    );
    println!(
        "운성  {}  {}  {}  {}",
        reading.stages.hour, reading.stages.day, reading.stages.month, reading.stages.year
    );
    for relation in &reading.relations {
        println!(
            "{}  {:?}-{:?} {}{}",
            relation.kind.hangul(),
            relation.from,
            relation.to,
            relation.branches.0,
            relation.branches.1
        );
    }
    println!();

    let luck = &report.luck;
    println!(
        "대운 {} (대운수 {})",
        luck.direction.hangul(),
        luck.start_age
    );
    for pillar in &luck.pillars {
        println!(
            "  {:>3}세 {}  {}",
            pillar.start_age, pillar.start_year, pillar.pillar
        );
    }
    let yearly: Vec<String> = luck
        .yearly
        .iter()
        .map(|y| format!("{} {}", y.year, y.pillar))
        .collect();
    println!("세운 {}", yearly.join(", "));
    let monthly: Vec<String> = luck
        .monthly
        .iter()
        .map(|m| format!("{}월 {}", m.month, m.pillar))
        .collect();
    println!("월운 {}", monthly.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_exits_non_zero() {
        let leap = SajuError::InvalidLeapMonth {
            year: 2000,
            month: 4,
        };
        assert_eq!(2, exit_code(&leap));
        assert_eq!(1, exit_code(&SajuError::out_of_range("1800-01-01")));
        assert_eq!(3, exit_code(&SajuError::data_load("terms.csv", "empty")));
    }
}
