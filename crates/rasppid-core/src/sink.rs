//! The actuation side of a control loop.
//!
//! Drivers that turn a controller output into a physical effect (a PWM duty
//! cycle, a heater relay, a simulated plant) implement [`OutputSink`].  The
//! [`driver`][crate::driver] only ever talks to this trait.

/// Consumes controller outputs.
pub trait OutputSink {
    /// Apply the most recent controller output to the process.
    fn apply(&mut self, output: f64);
}

impl<F> OutputSink for F
where
    F: FnMut(f64),
{
    fn apply(&mut self, output: f64) {
        self(output)
    }
}
