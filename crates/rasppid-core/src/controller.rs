//! Discrete-time PID (Proportional–Integral–Derivative) controller.
//!
//! The controller drives a measured value toward a set-point.  It samples
//! the process through an injected [`MeasurementSource`] and returns an
//! output clamped to the configured [`OutputLimits`]; applying that output
//! is left to the caller.
//!
//! Gains are normalised by the sample time once, when they are set, so the
//! per-tick step is a plain discrete accumulation:
//!
//! ```text
//! ki' = ki * sample_time_s
//! kd' = kd / sample_time_s
//! output = kp * error + Σ ki' * error + kd' * (input - last_input)
//! ```
//!
//! The derivative acts on the measurement rather than the error so a
//! set-point change does not kick the output.
//!
//! # Example
//!
//! ```rust
//! use rasppid_core::{PidController, infallible};
//! use rasppid_types::PidConfig;
//!
//! let config = PidConfig {
//!     kp: 1.0,
//!     ki: 0.0,
//!     kd: 0.0,
//!     sample_time_ms: 100.0,
//!     setpoint: 90.0,
//!     output_min: -100.0,
//!     output_max: 100.0,
//!     ..PidConfig::default()
//! };
//! let mut pid = PidController::new(&config, infallible(|| 0.0)).unwrap();
//!
//! let Ok(()) = pid.start();
//! let Ok(output) = pid.compute();
//! assert_eq!(output, 90.0);
//! ```

use rasppid_types::{
    ControllerSnapshot, ControllerState, Direction, Gains, OutputLimits, PidConfig, PidError,
};
use tracing::{debug, trace, warn};

use crate::source::MeasurementSource;

/// A PID controller bound to one measurement source.
///
/// One instance serves exactly one control loop.  All mutation happens
/// synchronously inside [`start`][Self::start], [`stop`][Self::stop],
/// [`set_tunings`][Self::set_tunings], [`set_sample_time`][Self::set_sample_time]
/// and [`compute`][Self::compute]; the type is not meant to be shared
/// between threads without external serialisation.
#[derive(Debug)]
pub struct PidController<S> {
    gains: Gains,
    sample_time_ms: f64,
    direction: Direction,
    setpoint: f64,
    limits: OutputLimits,
    state: ControllerState,

    last_error: f64,
    error_sum: f64,
    last_input: f64,
    i_term: f64,
    output: f64,

    source: S,
}

impl<S: MeasurementSource> PidController<S> {
    /// Build a disabled controller from `config`, reading measurements from
    /// `source`.
    ///
    /// All running state starts at zero.  The source is not read until
    /// [`start`][Self::start].
    ///
    /// # Errors
    ///
    /// - [`PidError::InvalidSampleTime`] if `sample_time_ms` is not a finite
    ///   value > 0.
    /// - [`PidError::InvalidTuning`] if any gain is negative or non-finite,
    ///   or normalises to a non-finite value.
    /// - [`PidError::InvalidBounds`] unless `output_min < output_max` and the
    ///   two are not both zero.
    pub fn new(config: &PidConfig, source: S) -> Result<Self, PidError> {
        check_sample_time(config.sample_time_ms)?;
        let gains = normalize(
            config.kp,
            config.ki,
            config.kd,
            config.sample_time_ms,
            config.direction,
        )?;
        let limits = OutputLimits::new(config.output_min, config.output_max)?;

        debug!(
            kp = gains.kp,
            ki = gains.ki,
            kd = gains.kd,
            sample_time_ms = config.sample_time_ms,
            setpoint = config.setpoint,
            direction = %config.direction,
            "pid controller created"
        );

        Ok(Self {
            gains,
            sample_time_ms: config.sample_time_ms,
            direction: config.direction,
            setpoint: config.setpoint,
            limits,
            state: ControllerState::Disabled,
            last_error: 0.0,
            error_sum: 0.0,
            last_input: 0.0,
            i_term: 0.0,
            output: 0.0,
            source,
        })
    }

    /// Replace the gains with `kp`, `ki`, `kd` normalised by the current
    /// sample time and signed by the controller's [`Direction`].
    ///
    /// Running state is untouched, so calling this while enabled changes the
    /// effective gains from the next tick on without moving the current
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::InvalidTuning`] if any gain is negative or
    /// non-finite.  The previous gains are kept in that case.
    pub fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) -> Result<(), PidError> {
        match normalize(kp, ki, kd, self.sample_time_ms, self.direction) {
            Ok(gains) => {
                debug!(kp = gains.kp, ki = gains.ki, kd = gains.kd, "tunings updated");
                self.gains = gains;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rejected tunings; keeping previous gains");
                Err(e)
            }
        }
    }

    /// Change the sample interval, rescaling the normalised `ki` and `kd` by
    /// `new / old`.  `kp` is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::InvalidSampleTime`] if `sample_time_ms` is not a
    /// finite value > 0, or if the rescaled gains would overflow; nothing is
    /// changed in that case.
    pub fn set_sample_time(&mut self, sample_time_ms: f64) -> Result<(), PidError> {
        check_sample_time(sample_time_ms)?;
        let ratio = sample_time_ms / self.sample_time_ms;
        let ki = self.gains.ki * ratio;
        let kd = self.gains.kd * ratio;
        if !ki.is_finite() || !kd.is_finite() {
            return Err(PidError::InvalidSampleTime(sample_time_ms));
        }
        self.gains.ki = ki;
        self.gains.kd = kd;
        debug!(
            from_ms = self.sample_time_ms,
            to_ms = sample_time_ms,
            ki = self.gains.ki,
            kd = self.gains.kd,
            "sample time changed"
        );
        self.sample_time_ms = sample_time_ms;
        Ok(())
    }

    /// Enable the controller.
    ///
    /// On a disabled-to-enabled transition the controller reads the source
    /// once and seeds its state for a bump-free resume: `last_input` takes
    /// the reading and the integral term takes the last output, clamped to
    /// the output limits.  Calling `start` while already enabled does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged.  The controller stays
    /// disabled if the read fails.
    pub fn start(&mut self) -> Result<(), S::Error> {
        if self.state == ControllerState::Enabled {
            return Ok(());
        }
        self.initialize()?;
        self.state = ControllerState::Enabled;
        debug!(
            last_input = self.last_input,
            i_term = self.i_term,
            "pid controller started"
        );
        Ok(())
    }

    /// Disable the controller.  State and tuning are kept; subsequent
    /// [`compute`][Self::compute] calls return the last output.
    pub fn stop(&mut self) {
        if self.state == ControllerState::Enabled {
            debug!(output = self.output, "pid controller stopped");
        }
        self.state = ControllerState::Disabled;
    }

    /// Run one control step and return the output.
    ///
    /// While disabled this returns the last output without reading the
    /// source.  While enabled it reads the source exactly once.
    ///
    /// Only the output is clamped here; the integral term keeps
    /// accumulating under saturation and is clamped only by
    /// [`start`][Self::start].
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged, leaving all state as it was
    /// before the call.
    pub fn compute(&mut self) -> Result<f64, S::Error> {
        if self.state == ControllerState::Disabled {
            return Ok(self.output);
        }

        let input = self.source.read()?;
        let error = self.setpoint - input;
        self.error_sum += error;
        self.i_term += self.gains.ki * error;
        let d_input = input - self.last_input;

        let raw = self.gains.kp * error + self.i_term + self.gains.kd * d_input;
        self.output = self.limits.clamp(raw);

        self.last_error = error;
        self.last_input = input;

        trace!(input, error, i_term = self.i_term, output = self.output, "pid tick");
        Ok(self.output)
    }

    fn initialize(&mut self) -> Result<(), S::Error> {
        self.last_input = self.source.read()?;
        self.i_term = self.limits.clamp(self.output);
        Ok(())
    }
}

impl<S> PidController<S> {
    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// `true` while [`compute`][Self::compute] is updating the output.
    pub fn is_enabled(&self) -> bool {
        self.state == ControllerState::Enabled
    }

    /// Normalised, signed gains used by the compute step.
    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Sample interval in milliseconds.
    pub fn sample_time_ms(&self) -> f64 {
        self.sample_time_ms
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Change the target.  Takes effect on the next tick; the derivative
    /// term does not react to the jump.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    pub fn output_limits(&self) -> OutputLimits {
        self.limits
    }

    /// Last computed output.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Copy of the tuning and running state, including the diagnostic-only
    /// `error_sum` and `last_error`.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            setpoint: self.setpoint,
            sample_time_ms: self.sample_time_ms,
            gains: self.gains,
            last_error: self.last_error,
            error_sum: self.error_sum,
            last_input: self.last_input,
            i_term: self.i_term,
            output: self.output,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

fn check_sample_time(sample_time_ms: f64) -> Result<(), PidError> {
    if !sample_time_ms.is_finite() || sample_time_ms <= 0.0 {
        return Err(PidError::InvalidSampleTime(sample_time_ms));
    }
    Ok(())
}

fn normalize(
    kp: f64,
    ki: f64,
    kd: f64,
    sample_time_ms: f64,
    direction: Direction,
) -> Result<Gains, PidError> {
    let usable = |g: f64| g.is_finite() && g >= 0.0;
    if !usable(kp) || !usable(ki) || !usable(kd) {
        return Err(PidError::InvalidTuning { kp, ki, kd });
    }
    let sample_time_s = sample_time_ms / 1000.0;
    let gains = Gains {
        kp,
        ki: ki * sample_time_s,
        kd: kd / sample_time_s,
    };
    // A tiny sample time can still push `kd / T` past f64::MAX.
    if !gains.ki.is_finite() || !gains.kd.is_finite() {
        return Err(PidError::InvalidTuning { kp, ki, kd });
    }
    Ok(match direction {
        Direction::Direct => gains,
        Direction::Reverse => Gains {
            kp: -gains.kp,
            ki: -gains.ki,
            kd: -gains.kd,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    /// Returns a fixed value and counts how often it was read.
    #[derive(Debug)]
    struct CountingSource {
        value: Rc<Cell<f64>>,
        reads: Rc<Cell<usize>>,
    }

    impl MeasurementSource for CountingSource {
        type Error = Infallible;

        fn read(&mut self) -> Result<f64, Infallible> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.value.get())
        }
    }

    fn counting(value: f64) -> (CountingSource, Rc<Cell<f64>>, Rc<Cell<usize>>) {
        let value = Rc::new(Cell::new(value));
        let reads = Rc::new(Cell::new(0));
        let source = CountingSource {
            value: value.clone(),
            reads: reads.clone(),
        };
        (source, value, reads)
    }

    fn config(kp: f64, ki: f64, kd: f64, sample_time_ms: f64) -> PidConfig {
        PidConfig {
            kp,
            ki,
            kd,
            sample_time_ms,
            setpoint: 10.0,
            output_min: -100.0,
            output_max: 100.0,
            direction: Direction::Direct,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn construction_normalizes_gains_by_sample_time() {
        let (source, _, _) = counting(0.0);
        let pid = PidController::new(&config(2.0, 3.0, 4.0, 500.0), source).unwrap();
        let g = pid.gains();
        assert!(approx(g.kp, 2.0));
        assert!(approx(g.ki, 1.5));
        assert!(approx(g.kd, 8.0));
        assert_eq!(pid.state(), ControllerState::Disabled);
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn reverse_direction_negates_all_gains() {
        let mut cfg = config(1.0, 1.0, 1.0, 1000.0);
        cfg.direction = Direction::Reverse;
        let (source, _, _) = counting(0.0);
        let pid = PidController::new(&cfg, source).unwrap();
        let g = pid.gains();
        assert!(approx(g.kp, -1.0));
        assert!(approx(g.ki, -1.0));
        assert!(approx(g.kd, -1.0));
    }

    #[test]
    fn construction_rejects_bad_bounds() {
        let mut cfg = config(1.0, 0.0, 0.0, 1000.0);
        cfg.output_min = 10.0;
        cfg.output_max = 0.0;
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&cfg, source).unwrap_err();
        assert!(matches!(err, PidError::InvalidBounds { .. }));
    }

    #[test]
    fn construction_rejects_zero_sample_time() {
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&config(1.0, 0.0, 0.0, 0.0), source).unwrap_err();
        assert_eq!(err, PidError::InvalidSampleTime(0.0));
    }

    #[test]
    fn construction_rejects_nan_gain() {
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&config(f64::NAN, 0.0, 0.0, 1000.0), source).unwrap_err();
        assert!(matches!(err, PidError::InvalidTuning { .. }));
    }

    #[test]
    fn construction_rejects_infinite_gain() {
        let mut cfg = config(f64::INFINITY, 0.0, 0.0, 1000.0);
        cfg.setpoint = 5.0;
        let (source, _, _) = counting(5.0);
        let err = PidController::new(&cfg, source).unwrap_err();
        assert!(matches!(err, PidError::InvalidTuning { .. }));
    }

    #[test]
    fn construction_rejects_non_finite_sample_time() {
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&config(1.0, 0.0, 0.0, f64::INFINITY), source).unwrap_err();
        assert_eq!(err, PidError::InvalidSampleTime(f64::INFINITY));
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&config(1.0, 0.0, 0.0, f64::NAN), source).unwrap_err();
        assert!(matches!(err, PidError::InvalidSampleTime(_)));
    }

    #[test]
    fn subnormal_sample_time_overflowing_kd_is_rejected() {
        let (source, _, _) = counting(0.0);
        let err = PidController::new(&config(1.0, 0.0, 1.0, 1e-310), source).unwrap_err();
        assert!(matches!(err, PidError::InvalidTuning { .. }));
    }

    #[test]
    fn set_tunings_rejects_infinite_gain() {
        let (source, _, _) = counting(0.0);
        let mut pid = PidController::new(&config(1.0, 2.0, 3.0, 1000.0), source).unwrap();
        let before = pid.gains();
        assert!(pid.set_tunings(1.0, f64::INFINITY, 0.0).is_err());
        assert_eq!(pid.gains(), before);
    }

    #[test]
    fn construction_does_not_read_source() {
        let (source, _, reads) = counting(0.0);
        let _pid = PidController::new(&config(1.0, 0.0, 0.0, 1000.0), source).unwrap();
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn proportional_only_output() {
        let (source, _, _) = counting(4.0);
        let mut pid = PidController::new(&config(2.0, 0.0, 0.0, 1000.0), source).unwrap();
        let Ok(()) = pid.start();
        // error = 10 - 4 = 6 → 2 * 6 = 12
        let Ok(out) = pid.compute();
        assert!(approx(out, 12.0));
    }

    #[test]
    fn integral_accumulates_with_normalized_ki() {
        let (source, _, _) = counting(8.0);
        let mut pid = PidController::new(&config(0.0, 1.0, 0.0, 500.0), source).unwrap();
        let Ok(()) = pid.start();
        // ki' = 0.5; error = 2 → i_term grows by 1 per tick.
        let Ok(first) = pid.compute();
        let Ok(second) = pid.compute();
        assert!(approx(first, 1.0));
        assert!(approx(second, 2.0));
    }

    #[test]
    fn derivative_acts_on_input_not_setpoint() {
        let (source, value, _) = counting(0.0);
        let mut pid = PidController::new(&config(0.0, 0.0, 1.0, 1000.0), source).unwrap();
        let Ok(()) = pid.start();
        let Ok(out) = pid.compute();
        assert!(approx(out, 0.0));

        // A set-point jump alone does not move a pure-derivative output.
        pid.set_setpoint(50.0);
        let Ok(out) = pid.compute();
        assert!(approx(out, 0.0));

        // The input change feeds the derivative term directly.
        value.set(3.0);
        let Ok(out) = pid.compute();
        assert!(approx(out, 3.0));
    }

    #[test]
    fn output_is_clamped_to_limits() {
        let (source, value, _) = counting(0.0);
        let mut cfg = config(100.0, 0.0, 0.0, 1000.0);
        cfg.output_min = -1.0;
        cfg.output_max = 1.0;
        let mut pid = PidController::new(&cfg, source).unwrap();
        let Ok(()) = pid.start();
        let Ok(out) = pid.compute();
        assert_eq!(out, 1.0);

        value.set(50.0);
        let Ok(out) = pid.compute();
        assert_eq!(out, -1.0);
    }

    #[test]
    fn integral_term_is_not_clamped_during_compute() {
        let (source, _, _) = counting(0.0);
        let mut cfg = config(0.0, 1.0, 0.0, 1000.0);
        cfg.output_min = 0.0;
        cfg.output_max = 5.0;
        let mut pid = PidController::new(&cfg, source).unwrap();
        let Ok(()) = pid.start();
        for _ in 0..3 {
            let Ok(out) = pid.compute();
            assert!(out <= 5.0);
        }
        // 3 ticks of error 10 with ki' = 1.
        assert!(approx(pid.snapshot().i_term, 30.0));
    }

    #[test]
    fn compute_while_disabled_returns_last_output_without_reading() {
        let (source, _, reads) = counting(4.0);
        let mut pid = PidController::new(&config(1.0, 0.0, 0.0, 1000.0), source).unwrap();
        let Ok(out) = pid.compute();
        assert_eq!(out, 0.0);
        assert_eq!(reads.get(), 0);

        let Ok(()) = pid.start();
        let Ok(enabled_out) = pid.compute();
        assert_eq!(reads.get(), 2);

        pid.stop();
        let before = pid.snapshot();
        let Ok(out) = pid.compute();
        assert_eq!(out, enabled_out);
        assert_eq!(reads.get(), 2);
        assert_eq!(pid.snapshot(), before);
    }

    #[test]
    fn start_is_idempotent() {
        let (source, value, reads) = counting(4.0);
        let mut pid = PidController::new(&config(1.0, 1.0, 0.0, 1000.0), source).unwrap();
        let Ok(()) = pid.start();
        let Ok(_) = pid.compute();
        let after_first = pid.snapshot();

        value.set(9.0);
        let Ok(()) = pid.start();
        assert_eq!(reads.get(), 2);
        assert_eq!(pid.snapshot(), after_first);
    }

    #[test]
    fn restart_seeds_integral_from_last_output() {
        let (source, value, _) = counting(0.0);
        let mut cfg = config(1.0, 0.0, 0.0, 1000.0);
        cfg.output_min = 0.0;
        cfg.output_max = 5.0;
        let mut pid = PidController::new(&cfg, source).unwrap();
        let Ok(()) = pid.start();
        let Ok(out) = pid.compute();
        assert_eq!(out, 5.0);

        pid.stop();
        value.set(7.0);
        let Ok(()) = pid.start();
        let snap = pid.snapshot();
        assert_eq!(snap.i_term, 5.0);
        assert_eq!(snap.last_input, 7.0);
    }

    #[test]
    fn start_failure_leaves_controller_disabled() {
        let mut fail = true;
        let source = move || {
            if fail {
                fail = false;
                Err("adc timeout")
            } else {
                Ok(1.0)
            }
        };
        let mut pid = PidController::new(&config(1.0, 0.0, 0.0, 1000.0), source).unwrap();
        assert_eq!(pid.start(), Err("adc timeout"));
        assert!(!pid.is_enabled());
        assert_eq!(pid.start(), Ok(()));
        assert!(pid.is_enabled());
    }

    #[test]
    fn compute_propagates_source_error_unchanged() {
        let mut calls = 0;
        let source = move || {
            calls += 1;
            if calls > 1 { Err(calls) } else { Ok(0.0) }
        };
        let mut pid = PidController::new(&config(1.0, 0.0, 0.0, 1000.0), source).unwrap();
        pid.start().unwrap();
        let before = pid.snapshot();
        assert_eq!(pid.compute(), Err(2));
        assert_eq!(pid.snapshot(), before);
    }

    #[test]
    fn set_tunings_rejects_negative_and_keeps_previous() {
        let (source, _, _) = counting(0.0);
        let mut pid = PidController::new(&config(1.0, 2.0, 3.0, 1000.0), source).unwrap();
        let before = pid.gains();
        let err = pid.set_tunings(1.0, -0.5, 0.0).unwrap_err();
        assert!(matches!(err, PidError::InvalidTuning { .. }));
        assert_eq!(pid.gains(), before);
    }

    #[test]
    fn set_tunings_does_not_touch_running_state() {
        let (source, _, _) = counting(4.0);
        let mut pid = PidController::new(&config(1.0, 1.0, 0.0, 1000.0), source).unwrap();
        let Ok(()) = pid.start();
        let Ok(_) = pid.compute();
        let before = pid.snapshot();

        pid.set_tunings(2.0, 0.0, 0.0).unwrap();
        let after = pid.snapshot();
        assert_eq!(after.output, before.output);
        assert_eq!(after.i_term, before.i_term);
        assert_eq!(after.error_sum, before.error_sum);
        assert_eq!(after.last_input, before.last_input);
        assert!(approx(after.gains.kp, 2.0));
    }

    #[test]
    fn set_sample_time_rescales_ki_and_kd() {
        let (source, _, _) = counting(0.0);
        let mut pid = PidController::new(&config(1.0, 2.0, 3.0, 1000.0), source).unwrap();
        pid.set_sample_time(2000.0).unwrap();
        let g = pid.gains();
        assert!(approx(g.kp, 1.0));
        assert!(approx(g.ki, 4.0));
        assert!(approx(g.kd, 6.0));
        assert_eq!(pid.sample_time_ms(), 2000.0);
    }

    #[test]
    fn set_sample_time_rejects_non_positive() {
        let (source, _, _) = counting(0.0);
        let mut pid = PidController::new(&config(1.0, 2.0, 3.0, 1000.0), source).unwrap();
        let before = pid.gains();
        assert_eq!(pid.set_sample_time(0.0), Err(PidError::InvalidSampleTime(0.0)));
        assert!(pid.set_sample_time(-5.0).is_err());
        assert_eq!(pid.gains(), before);
        assert_eq!(pid.sample_time_ms(), 1000.0);
    }

    #[test]
    fn set_sample_time_rejects_rescale_to_infinity() {
        let (source, _, _) = counting(0.0);
        let mut pid = PidController::new(&config(1.0, 2.0, 3.0, 1e-300), source).unwrap();
        let before = pid.gains();
        assert_eq!(
            pid.set_sample_time(1e300),
            Err(PidError::InvalidSampleTime(1e300))
        );
        assert_eq!(pid.gains(), before);
        assert_eq!(pid.sample_time_ms(), 1e-300);
        assert!(pid.set_sample_time(f64::INFINITY).is_err());
        assert_eq!(pid.gains(), before);
    }

    #[test]
    fn accessors_reflect_construction() {
        let mut cfg = config(1.0, 0.0, 0.0, 1000.0);
        cfg.direction = Direction::Reverse;
        cfg.output_min = -3.0;
        cfg.output_max = 7.0;
        let (source, value, _) = counting(2.5);
        let mut pid = PidController::new(&cfg, source).unwrap();

        assert_eq!(pid.direction(), Direction::Reverse);
        let limits = pid.output_limits();
        assert_eq!(limits.min(), -3.0);
        assert_eq!(limits.max(), 7.0);
        assert_eq!(pid.setpoint(), 10.0);
        pid.set_setpoint(12.0);
        assert_eq!(pid.setpoint(), 12.0);

        assert_eq!(pid.source().value.get(), 2.5);
        pid.source_mut().value.set(4.0);
        assert_eq!(value.get(), 4.0);
        let Ok(()) = pid.start();
        assert_eq!(pid.snapshot().last_input, 4.0);
    }

    #[test]
    fn error_sum_and_last_error_are_tracked() {
        let (source, value, _) = counting(6.0);
        let mut pid = PidController::new(&config(1.0, 0.0, 0.0, 1000.0), source).unwrap();
        let Ok(()) = pid.start();
        let Ok(_) = pid.compute();
        value.set(8.0);
        let Ok(_) = pid.compute();
        let snap = pid.snapshot();
        assert!(approx(snap.last_error, 2.0));
        assert!(approx(snap.error_sum, 6.0));
    }
}
