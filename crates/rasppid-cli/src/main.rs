//! `rasppid` – PID controller command line
//!
//! Builds a controller from positional arguments (or `~/.rasppid/config.toml`)
//! and drives it against a simulated heating process:
//!
//! 1. Initialises structured logging (`RUST_LOG`, `RASPPID_LOG_FORMAT=json`).
//! 2. Parses arguments and merges them over the config file.
//! 3. Runs the closed loop, printing progress every `report_every` ticks.
//! 4. Intercepts **Ctrl-C** to stop the controller and print the summary.

mod args;
mod config;

use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use rasppid_core::{
    HeatingProcess, LoopOptions, OutputSink, PidController, ProcessHeater, RunReport, Sample,
    run_closed_loop,
};
use rasppid_types::{PidConfig, PidError};

use args::RunArgs;
use config::SimulationConfig;

fn main() -> ExitCode {
    init_logging();

    let run = RunArgs::parse();

    let loaded = config::load_or_default();
    if let Some(path) = &loaded.path {
        info!(path = %path.display(), "config loaded");
    }
    if let Some(e) = &loaded.error {
        warn!(error = %e, "config unreadable; using defaults");
        println!("{}: {}", "Config error".red(), e);
        println!("  Using default configuration.");
    }

    let (controller_cfg, sim_cfg) = run.resolve(&loaded.config);

    if run.write_config {
        let path = config::config_path();
        return match write_config(&controller_cfg, &sim_cfg, &path) {
            Ok(()) => {
                println!(
                    "  {} Config saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bold()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "Error saving config".red(), e);
                ExitCode::FAILURE
            }
        };
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run cannot be interrupted cleanly");
    }

    match simulate(&controller_cfg, &sim_cfg, &cancel) {
        Ok(outcome) => {
            info!(
                ticks = outcome.report.ticks_run,
                final_value = outcome.final_value,
                cancelled = outcome.report.cancelled,
                "simulation finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Invalid controller".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation
// ─────────────────────────────────────────────────────────────────────────────

/// How a simulated run ended.
#[derive(Debug)]
struct Outcome {
    report: RunReport,
    final_value: f64,
}

fn simulate(
    controller_cfg: &PidConfig,
    sim_cfg: &SimulationConfig,
    cancel: &AtomicBool,
) -> Result<Outcome, PidError> {
    let process = HeatingProcess::new(sim_cfg.initial_value, sim_cfg.heating_max, sim_cfg.cooling);
    let mut pid = PidController::new(controller_cfg, process.probe())?;

    print_header(controller_cfg, sim_cfg);

    let mut sink = ReportingHeater {
        heater: process.heater(),
        process: process.clone(),
        report_every: sim_cfg.report_every,
        tick: 0,
    };
    let options = LoopOptions {
        ticks: sim_cfg.ticks,
        realtime: sim_cfg.realtime,
        record: false,
    };
    let Ok(report) = run_closed_loop(&mut pid, &mut sink, options, cancel);
    pid.stop();

    let final_value = process.current();
    print_summary(&report, controller_cfg.setpoint, final_value);
    Ok(Outcome {
        report,
        final_value,
    })
}

/// Heater that prints a progress row every `report_every` outputs.
struct ReportingHeater {
    heater: ProcessHeater,
    process: HeatingProcess,
    report_every: usize,
    tick: usize,
}

impl OutputSink for ReportingHeater {
    fn apply(&mut self, output: f64) {
        self.heater.apply(output);
        self.tick += 1;
        if self.report_every > 0 && self.tick % self.report_every == 0 {
            println!(
                "  {:>8}  {:>12.4}  {:>10.4}",
                self.tick,
                self.process.current(),
                output
            );
        }
    }
}

fn print_header(controller_cfg: &PidConfig, sim_cfg: &SimulationConfig) {
    println!();
    println!("  {} {}", "rasppid".bold().cyan(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!(
        "  kp={} ki={} kd={} sample_time={}ms setpoint={} output=[{}, {}] {}",
        controller_cfg.kp,
        controller_cfg.ki,
        controller_cfg.kd,
        controller_cfg.sample_time_ms,
        controller_cfg.setpoint,
        controller_cfg.output_min,
        controller_cfg.output_max,
        controller_cfg.direction,
    );
    println!(
        "  process: initial={} cooling={} heating_max={} ticks={}{}",
        sim_cfg.initial_value,
        sim_cfg.cooling,
        sim_cfg.heating_max,
        sim_cfg.ticks,
        if sim_cfg.realtime { " (realtime)" } else { "" },
    );
    if sim_cfg.report_every > 0 {
        println!();
        println!("  {:>8}  {:>12}  {:>10}", "tick".bold(), "value".bold(), "output".bold());
    }
}

fn print_summary(report: &RunReport, setpoint: f64, final_value: f64) {
    println!();
    if report.cancelled {
        println!("{}", "  ⚠  Interrupted – controller stopped.".yellow().bold());
    }
    match report.last() {
        Some(Sample { tick, output, .. }) => {
            println!(
                "  {} after {} tick(s): value={:.4} setpoint={} error={:.4} output={:.4}",
                "✓".green().bold(),
                tick + 1,
                final_value,
                setpoint,
                setpoint - final_value,
                output
            );
        }
        None => println!("  No ticks were run."),
    }
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config writer
// ─────────────────────────────────────────────────────────────────────────────

fn write_config(
    controller_cfg: &PidConfig,
    sim_cfg: &SimulationConfig,
    path: &Path,
) -> Result<(), String> {
    let cfg = config::Config {
        controller: controller_cfg.clone(),
        simulation: sim_cfg.clone(),
    };
    config::save_to(&cfg, path)?;
    info!(path = %path.display(), "config written");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

fn init_logging() {
    // RUST_LOG filters (default "info"); RASPPID_LOG_FORMAT=json switches to
    // newline-delimited JSON.  Logs go to stderr; the progress table stays
    // on stdout.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("RASPPID_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
