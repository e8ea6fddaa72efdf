//! In-process heating plant for testing without hardware.
//!
//! [`HeatingProcess`] models an ideal heater: every time the temperature is
//! sampled it moves by the applied heating minus a constant cooling loss.
//! The plant hands out a [`ProcessProbe`] (its [`MeasurementSource`]) and a
//! [`ProcessHeater`] (its [`OutputSink`]) that share the same state, so a
//! controller can own the probe while the loop drives the heater.
//!
//! # Example
//!
//! ```rust
//! use rasppid_core::{HeatingProcess, MeasurementSource, OutputSink};
//!
//! let process = HeatingProcess::new(100.0, 10.0, 1.0);
//! let mut probe = process.probe();
//! let mut heater = process.heater();
//!
//! heater.apply(4.0);
//! let Ok(temp) = probe.read();
//! assert_eq!(temp, 103.0);
//! ```

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use crate::sink::OutputSink;
use crate::source::MeasurementSource;

#[derive(Debug)]
struct ProcessState {
    current: f64,
    heating: f64,
    heating_max: f64,
    cooling: f64,
}

/// A simulated heating process.
///
/// Cloning yields another handle onto the same plant.
#[derive(Debug, Clone)]
pub struct HeatingProcess {
    state: Rc<RefCell<ProcessState>>,
}

impl HeatingProcess {
    /// Create a plant at temperature `initial`, with heating capped at
    /// `heating_max` and a per-sample loss of `cooling`.  A negative cap is
    /// treated as zero.
    pub fn new(initial: f64, heating_max: f64, cooling: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(ProcessState {
                current: initial,
                heating: 0.0,
                heating_max: heating_max.max(0.0),
                cooling,
            })),
        }
    }

    /// Most recent temperature, without advancing the plant.
    pub fn current(&self) -> f64 {
        self.state.borrow().current
    }

    /// Heating currently applied.
    pub fn heating(&self) -> f64 {
        self.state.borrow().heating
    }

    /// Set the heating power, clamped to `[0, heating_max]`.
    pub fn set_heating(&self, heating: f64) {
        let mut state = self.state.borrow_mut();
        state.heating = heating.clamp(0.0, state.heating_max);
    }

    /// Measurement handle for a controller.
    pub fn probe(&self) -> ProcessProbe {
        ProcessProbe {
            process: self.clone(),
        }
    }

    /// Actuation handle for a loop driver.
    pub fn heater(&self) -> ProcessHeater {
        ProcessHeater {
            process: self.clone(),
        }
    }

    fn sample(&self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.current += state.heating - state.cooling;
        state.current
    }
}

/// Reads (and thereby advances) a [`HeatingProcess`].  Never fails.
#[derive(Debug, Clone)]
pub struct ProcessProbe {
    process: HeatingProcess,
}

impl MeasurementSource for ProcessProbe {
    type Error = Infallible;

    fn read(&mut self) -> Result<f64, Infallible> {
        Ok(self.process.sample())
    }
}

/// Applies controller outputs as heating power to a [`HeatingProcess`].
#[derive(Debug, Clone)]
pub struct ProcessHeater {
    process: HeatingProcess,
}

impl OutputSink for ProcessHeater {
    fn apply(&mut self, output: f64) {
        self.process.set_heating(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_advances_by_heating_minus_cooling() {
        let process = HeatingProcess::new(20.0, 10.0, 1.0);
        let mut probe = process.probe();
        let Ok(t) = probe.read();
        assert_eq!(t, 19.0);
        process.set_heating(3.0);
        let Ok(t) = probe.read();
        assert_eq!(t, 21.0);
        assert_eq!(process.current(), 21.0);
    }

    #[test]
    fn current_does_not_advance() {
        let process = HeatingProcess::new(50.0, 10.0, 2.0);
        assert_eq!(process.current(), 50.0);
        assert_eq!(process.current(), 50.0);
    }

    #[test]
    fn heating_is_clamped() {
        let process = HeatingProcess::new(0.0, 10.0, 1.0);
        let mut heater = process.heater();
        heater.apply(25.0);
        assert_eq!(process.heating(), 10.0);
        heater.apply(-3.0);
        assert_eq!(process.heating(), 0.0);
    }

    #[test]
    fn handles_share_state() {
        let process = HeatingProcess::new(0.0, 10.0, 0.0);
        let mut heater = process.heater();
        let mut probe = process.clone().probe();
        heater.apply(5.0);
        let Ok(t) = probe.read();
        assert_eq!(t, 5.0);
        assert_eq!(process.current(), 5.0);
    }
}
