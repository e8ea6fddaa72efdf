//! [`run_closed_loop`] – a fixed-count control loop.
//!
//! Each tick calls [`PidController::compute`] and hands the output to an
//! [`OutputSink`].  The loop optionally sleeps one sample interval between
//! ticks so a run tracks wall-clock time.
//!
//! Only the last tick is kept unless [`LoopOptions::record`] asks for the
//! full trace, so long runs stay in constant memory.
//!
//! Cancellation is cooperative: the shared flag is checked before every tick
//! and, once raised, the controller is stopped and the run ends.  A tick
//! already in progress always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::controller::PidController;
use crate::sink::OutputSink;
use crate::source::MeasurementSource;

/// One recorded tick of a closed-loop run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Zero-based tick index.
    pub tick: usize,
    /// Measurement read by the controller on this tick.
    pub input: f64,
    /// Output applied to the sink on this tick.
    pub output: f64,
}

/// How long and how fast to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Maximum number of ticks.
    pub ticks: usize,
    /// Sleep one sample interval between ticks.
    pub realtime: bool,
    /// Keep every tick in [`RunReport::samples`].
    pub record: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            ticks: 1000,
            realtime: false,
            record: false,
        }
    }
}

/// Outcome of a closed-loop run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Number of completed ticks.
    pub ticks_run: usize,
    /// Every completed tick, in order.  Empty unless recording was requested.
    pub samples: Vec<Sample>,
    /// `true` if the run ended because the cancel flag was raised.
    pub cancelled: bool,
    last_sample: Option<Sample>,
}

impl RunReport {
    /// The last completed tick, if any ran.
    pub fn last(&self) -> Option<&Sample> {
        self.last_sample.as_ref()
    }
}

/// Start `pid`, then run up to `options.ticks` compute/apply cycles.
///
/// # Errors
///
/// Propagates the first measurement error from [`PidController::start`] or
/// [`PidController::compute`] unchanged.  The controller is left running in
/// that case; stopping it is up to the caller.
pub fn run_closed_loop<S, K>(
    pid: &mut PidController<S>,
    sink: &mut K,
    options: LoopOptions,
    cancel: &AtomicBool,
) -> Result<RunReport, S::Error>
where
    S: MeasurementSource,
    K: OutputSink + ?Sized,
{
    let mut report = RunReport::default();
    let pace = Duration::try_from_secs_f64(pid.sample_time_ms() / 1000.0).unwrap_or(Duration::MAX);

    pid.start()?;
    info!(
        ticks = options.ticks,
        realtime = options.realtime,
        setpoint = pid.setpoint(),
        "closed loop started"
    );

    for tick in 0..options.ticks {
        if cancel.load(Ordering::SeqCst) {
            pid.stop();
            report.cancelled = true;
            info!(tick, "closed loop cancelled");
            return Ok(report);
        }

        let output = pid.compute()?;
        sink.apply(output);
        let sample = Sample {
            tick,
            input: pid.snapshot().last_input,
            output,
        };
        if options.record {
            report.samples.push(sample);
        }
        report.last_sample = Some(sample);
        report.ticks_run += 1;

        if options.realtime {
            std::thread::sleep(pace);
        }
    }

    debug!(ticks = report.ticks_run, "closed loop finished");
    Ok(report)
}
