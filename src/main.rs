mod calendar;
mod config;
mod flyover;
mod predict;
mod web;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::config::Config;
use crate::flyover::{DayOutcome, PlanSettings, Planner};
use crate::predict::{Location, Sgp4Ephemeris};

const DEFAULT_CONFIG: &str = "flyover.yaml";

#[derive(Parser)]
#[command(name = "iss-flyover")]
#[command(about = "Put visible ISS passes on your calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: String,
    },
    /// Print the nightly windows and visible passes without touching the calendar
    Preview {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: String,
        /// Override the configured horizon
        #[arg(long)]
        days: Option<u32>,
    },
    /// Compute visible passes and add the missing ones to the calendar
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: String,
    },
    /// Serve the pass preview API
    Serve {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Preview { config, days } => preview(&config, days),
        Commands::Run { config } => run(&config),
        Commands::Serve { config } => serve(&config),
    }
}

/// Everything the commands share once the configuration is loaded.
struct Setup {
    config: Config,
    location: Location,
    settings: PlanSettings,
}

fn setup(path: &str) -> Option<Setup> {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            return None;
        }
    };
    let location = match config.location() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return None;
        }
    };
    let settings = match config.plan_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return None;
        }
    };
    Some(Setup {
        config,
        location,
        settings,
    })
}

fn load_ephemeris(config: &Config) -> Option<Sgp4Ephemeris> {
    match Sgp4Ephemeris::load(&config.predict.catalog, &config.predict.satellite) {
        Ok(e) => Some(e),
        Err(e) => {
            eprintln!("Error loading orbital elements: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(setup) = setup(path) else {
        return ExitCode::FAILURE;
    };

    println!("Config is valid");
    println!(
        "  station: {:.4}, {:.4} ({} m, {})",
        setup.location.latitude_deg,
        setup.location.longitude_deg,
        setup.location.elevation_m,
        setup.location.timezone
    );
    println!(
        "  satellite: {} from {}",
        setup.config.predict.satellite, setup.config.predict.catalog
    );
    println!(
        "  horizon: {} days, min elevation {}°, bedtime {}",
        setup.settings.horizon_days, setup.settings.min_elevation_deg, setup.settings.bed_time
    );
    println!("  calendar: {}", setup.settings.calendar_id);
    ExitCode::SUCCESS
}

fn preview(path: &str, days: Option<u32>) -> ExitCode {
    let Some(setup) = setup(path) else {
        return ExitCode::FAILURE;
    };
    let Some(ephemeris) = load_ephemeris(&setup.config) else {
        return ExitCode::FAILURE;
    };

    let planner = Planner::new(&ephemeris, setup.location, &setup.settings);
    let days = days.unwrap_or(setup.settings.horizon_days);

    for (day, plan) in (0u32..).zip(planner.plan(Utc::now(), days)) {
        match plan {
            Ok(plan) => {
                println!("Day {}: {} -> {}", day, plan.window.start, plan.window.end);
                for event in &plan.events {
                    println!(
                        "  {} {} ({})",
                        event.kind,
                        event.at,
                        if event.sunlit { "sunlit" } else { "shadow" }
                    );
                }
                match plan.visible {
                    Some(pass) => println!("  visible: {} -> {}", pass.start, pass.end),
                    None => println!("  no visible pass"),
                }
            }
            Err(e) => println!("Day {}: {}", day, e),
        }
    }
    ExitCode::SUCCESS
}

fn run(path: &str) -> ExitCode {
    let Some(setup) = setup(path) else {
        return ExitCode::FAILURE;
    };
    let Some(ephemeris) = load_ephemeris(&setup.config) else {
        return ExitCode::FAILURE;
    };
    let sink = match setup.config.google_calendar() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Calendar error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let planner = Planner::new(&ephemeris, setup.location, &setup.settings);
    match planner.run(&sink, Utc::now()) {
        Ok(report) => {
            for day in &report.days {
                let night = day
                    .plan
                    .as_ref()
                    .map(|p| p.window.start.date_naive().to_string())
                    .unwrap_or_else(|| "?".to_string());
                match &day.outcome {
                    DayOutcome::Inserted { pass, event } => println!(
                        "Day {} ({}): added {} -> {} [{}]",
                        day.day,
                        night,
                        pass.start,
                        pass.end,
                        event.html_link.as_deref().unwrap_or(&event.id)
                    ),
                    DayOutcome::AlreadyRecorded { pass, event_id } => println!(
                        "Day {} ({}): {} already recorded as {}",
                        day.day, night, pass.start, event_id
                    ),
                    DayOutcome::DataUnavailable { reason } => {
                        println!("Day {} ({}): data unavailable: {}", day.day, night, reason)
                    }
                    DayOutcome::InsertFailed { pass, reason } => println!(
                        "Day {} ({}): failed to add {}: {}",
                        day.day, night, pass.start, reason
                    ),
                    DayOutcome::NoVisiblePass => {
                        println!("Day {} ({}): no visible pass", day.day, night)
                    }
                }
            }
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(setup) = setup(path) else {
        return ExitCode::FAILURE;
    };
    // Loaded before the runtime exists, the catalog fetch uses a blocking client.
    let Some(ephemeris) = load_ephemeris(&setup.config) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(
        setup.config,
        setup.location,
        setup.settings,
        ephemeris,
    )) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
