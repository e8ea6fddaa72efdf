use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Polarity of the controlled process.
///
/// A [`Direction::Direct`] process responds to a larger output with a larger
/// measured value (a heater).  A [`Direction::Reverse`] process does the
/// opposite (a cooler), so every gain is negated after normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Direct,
    Reverse,
}

impl Direction {
    /// `true` for [`Direction::Direct`].
    pub fn is_direct(self) -> bool {
        matches!(self, Direction::Direct)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Direct => write!(f, "direct"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Inclusive bounds applied to every computed output.
///
/// Only [`OutputLimits::new`] builds one, deserialisation included, so a
/// value of this type always satisfies `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLimits")]
pub struct OutputLimits {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawLimits {
    min: f64,
    max: f64,
}

impl TryFrom<RawLimits> for OutputLimits {
    type Error = PidError;

    fn try_from(raw: RawLimits) -> Result<Self, PidError> {
        Self::new(raw.min, raw.max)
    }
}

impl OutputLimits {
    /// Validate and build a pair of output bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::InvalidBounds`] unless `min < max`, or when both
    /// bounds are exactly zero.  A NaN bound fails the `min < max` check.
    pub fn new(min: f64, max: f64) -> Result<Self, PidError> {
        if !(min < max) || (min == 0.0 && max == 0.0) {
            return Err(PidError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamp `value` into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value > self.max {
            self.max
        } else if value < self.min {
            self.min
        } else {
            value
        }
    }
}

/// Gains as used by the compute step, already scaled by the sample time and
/// signed according to [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Construction parameters for a controller.
///
/// The defaults describe a heater driven from 100 toward 200 with a 1 ms
/// sample time and an output range of `[0, 10]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    #[serde(default = "default_kp")]
    pub kp: f64,
    #[serde(default = "default_ki")]
    pub ki: f64,
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Sampling interval in milliseconds.
    #[serde(default = "default_sample_time_ms")]
    pub sample_time_ms: f64,
    #[serde(default = "default_setpoint")]
    pub setpoint: f64,
    #[serde(default = "default_output_min")]
    pub output_min: f64,
    #[serde(default = "default_output_max")]
    pub output_max: f64,
    #[serde(default)]
    pub direction: Direction,
}

fn default_kp() -> f64 {
    0.5
}
fn default_ki() -> f64 {
    0.05
}
fn default_kd() -> f64 {
    0.00001
}
fn default_sample_time_ms() -> f64 {
    1.0
}
fn default_setpoint() -> f64 {
    200.0
}
fn default_output_min() -> f64 {
    0.0
}
fn default_output_max() -> f64 {
    10.0
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            sample_time_ms: default_sample_time_ms(),
            setpoint: default_setpoint(),
            output_min: default_output_min(),
            output_max: default_output_max(),
            direction: Direction::default(),
        }
    }
}

/// Whether a controller is updating its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControllerState {
    #[default]
    Disabled,
    Enabled,
}

/// Point-in-time copy of a controller's tuning and running state.
///
/// `error_sum` and `last_error` are tracked for diagnostics only; they do
/// not feed the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    pub setpoint: f64,
    pub sample_time_ms: f64,
    pub gains: Gains,
    pub last_error: f64,
    pub error_sum: f64,
    pub last_input: f64,
    pub i_term: f64,
    pub output: f64,
}

/// Validation failures raised while configuring a controller.
///
/// Measurement failures are not represented here: they belong to the
/// measurement source and reach the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PidError {
    #[error("Invalid output bounds: min {min} must be below max {max} and not both zero")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Invalid tuning: kp, ki and kd cannot be less than zero (kp={kp}, ki={ki}, kd={kd})")]
    InvalidTuning { kp: f64, ki: f64, kd: f64 },

    #[error("Invalid sample time: {0} ms (must be greater than zero)")]
    InvalidSampleTime(f64),
}
