//! Configuration file – reads/writes `~/.rasppid/config.toml`.
//!
//! ```toml
//! [controller]
//! kp = 0.5
//! ki = 0.05
//! kd = 0.00001
//! sample_time_ms = 1.0
//! setpoint = 200.0
//! output_min = 0.0
//! output_max = 10.0
//! direction = "direct"
//!
//! [simulation]
//! ticks = 1000
//! initial_value = 100.0
//! cooling = 1.0
//! heating_max = 10.0
//! report_every = 100
//! realtime = false
//! ```
//!
//! Every field is optional.

use rasppid_types::PidConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of the simulated heating process and of the run itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of controller ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: usize,

    /// Process value before the first sample.
    #[serde(default = "default_initial_value")]
    pub initial_value: f64,

    /// Loss subtracted from the process value on every sample.
    #[serde(default = "default_cooling")]
    pub cooling: f64,

    /// Upper bound on the heating the process accepts.
    #[serde(default = "default_heating_max")]
    pub heating_max: f64,

    /// Print a progress line every this many ticks (0 disables).
    #[serde(default = "default_report_every")]
    pub report_every: usize,

    /// Sleep one sample interval between ticks.
    #[serde(default)]
    pub realtime: bool,
}

fn default_ticks() -> usize {
    1000
}
fn default_initial_value() -> f64 {
    100.0
}
fn default_cooling() -> f64 {
    1.0
}
fn default_heating_max() -> f64 {
    10.0
}
fn default_report_every() -> usize {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            initial_value: default_initial_value(),
            cooling: default_cooling(),
            heating_max: default_heating_max(),
            report_every: default_report_every(),
            realtime: false,
        }
    }
}

/// Persisted configuration stored in `~/.rasppid/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Controller used when no positional arguments are given.
    #[serde(default)]
    pub controller: PidConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Return the path to `~/.rasppid/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rasppid").join("config.toml")
}

/// Result of [`load_or_default`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Effective configuration, environment overrides applied.
    pub config: Config,
    /// The file it was read from; `None` when defaults were used.
    pub path: Option<PathBuf>,
    /// Why an existing file could not be used.
    pub error: Option<String>,
}

/// Load `~/.rasppid/config.toml`, falling back to defaults when it is
/// missing or unreadable.  `RASPPID_*` overrides apply in every case.
pub fn load_or_default() -> Loaded {
    load_or_default_from(&config_path(), |key| std::env::var(key).ok())
}

pub(crate) fn load_or_default_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Loaded {
    let (mut config, found, error) = match load_from(path) {
        Ok(Some(cfg)) => (cfg, Some(path.to_path_buf()), None),
        Ok(None) => (Config::default(), None, None),
        Err(e) => (Config::default(), None, Some(e)),
    };
    apply_overrides_from(&mut config, lookup);
    Loaded {
        config,
        path: found,
        error,
    }
}

/// Load the config from a specific path, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `RASPPID_*` overrides to `cfg`, reading each key via `lookup`.
///
/// | Variable | Config field |
/// |---|---|
/// | `RASPPID_TICKS` | `simulation.ticks` |
/// | `RASPPID_REALTIME` | `simulation.realtime` (`1`/`true`/`0`/`false`) |
/// | `RASPPID_REPORT_EVERY` | `simulation.report_every` |
///
/// Values that do not parse are ignored.
pub(crate) fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("RASPPID_TICKS")
        && let Ok(ticks) = v.trim().parse::<usize>()
    {
        cfg.simulation.ticks = ticks;
    }
    if let Some(v) = lookup("RASPPID_REALTIME") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => cfg.simulation.realtime = true,
            "0" | "false" => cfg.simulation.realtime = false,
            _ => {}
        }
    }
    if let Some(v) = lookup("RASPPID_REPORT_EVERY")
        && let Ok(every) = v.trim().parse::<usize>()
    {
        cfg.simulation.report_every = every;
    }
}

/// Save the config to `path`, creating its directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
