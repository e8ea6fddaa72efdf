//! Command-line parsing.
//!
//! ```text
//! rasppid [OPTIONS] [KP KI KD SAMPLE_TIME SETPOINT OUTPUT_MIN OUTPUT_MAX]
//! ```
//!
//! The seven positionals are all-or-nothing; without them the controller
//! comes from `~/.rasppid/config.toml`.  Negative numbers such as `-5` are
//! accepted as values.

use clap::Parser;
use rasppid_types::{Direction, PidConfig};

use crate::config::{Config, SimulationConfig};

/// Runs a PID controller against a simulated heating process.
#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(name = "rasppid", version)]
pub struct RunArgs {
    /// Controller gains, sample time (ms), setpoint and output bounds
    #[arg(
        num_args = 7,
        allow_negative_numbers = true,
        value_names = ["KP", "KI", "KD", "SAMPLE_TIME", "SETPOINT", "OUTPUT_MIN", "OUTPUT_MAX"]
    )]
    pub positional: Option<Vec<f64>>,

    /// Inverse-acting process (negates all gains)
    #[arg(long)]
    pub reverse: bool,

    /// Number of controller ticks to run
    #[arg(long, value_name = "N")]
    pub ticks: Option<usize>,

    /// Initial process value
    #[arg(long, value_name = "V", allow_negative_numbers = true)]
    pub initial: Option<f64>,

    /// Per-sample loss of the simulated process
    #[arg(long, value_name = "C", allow_negative_numbers = true)]
    pub cooling: Option<f64>,

    /// Print progress every N ticks (0 disables)
    #[arg(long, value_name = "N")]
    pub report_every: Option<usize>,

    /// Sleep one sample time between ticks
    #[arg(long)]
    pub realtime: bool,

    /// Write the effective configuration to ~/.rasppid/config.toml
    #[arg(long)]
    pub write_config: bool,
}

impl RunArgs {
    /// Merge these arguments over `cfg`.  Command-line values win.
    pub fn resolve(&self, cfg: &Config) -> (PidConfig, SimulationConfig) {
        let mut controller = match self.positional.as_deref() {
            Some(&[kp, ki, kd, sample_time_ms, setpoint, output_min, output_max]) => PidConfig {
                kp,
                ki,
                kd,
                sample_time_ms,
                setpoint,
                output_min,
                output_max,
                direction: Direction::Direct,
            },
            _ => cfg.controller.clone(),
        };
        if self.reverse {
            controller.direction = Direction::Reverse;
        }

        let mut sim = cfg.simulation.clone();
        if let Some(ticks) = self.ticks {
            sim.ticks = ticks;
        }
        if let Some(initial) = self.initial {
            sim.initial_value = initial;
        }
        if let Some(cooling) = self.cooling {
            sim.cooling = cooling;
        }
        if let Some(every) = self.report_every {
            sim.report_every = every;
        }
        if self.realtime {
            sim.realtime = true;
        }
        (controller, sim)
    }
}
