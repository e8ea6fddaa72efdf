//! `rasppid-core` – discrete-time PID control
//!
//! The controller itself never schedules, sleeps, or spawns: an external
//! loop calls [`PidController::compute`] once per sample interval and hands
//! the result to whatever drives the process.
//!
//! # Modules
//!
//! - [`controller`] – [`PidController`][controller::PidController]:
//!   tuning normalisation, the compute step with output clamping, and the
//!   start/stop lifecycle with bump-free resume.
//! - [`source`] – [`MeasurementSource`][source::MeasurementSource]:
//!   the injected capability the controller samples on every tick.
//! - [`sink`] – [`OutputSink`][sink::OutputSink]: the consumer of the
//!   controller output on the actuation side of the loop.
//! - [`sim`] – [`HeatingProcess`][sim::HeatingProcess]: an ideal heating
//!   process for headless tests and demos.
//! - [`driver`] – [`run_closed_loop`][driver::run_closed_loop]: a
//!   cancellable fixed-count loop tying a controller to a sink.

pub mod controller;
pub mod driver;
pub mod sim;
pub mod sink;
pub mod source;

pub use controller::PidController;
pub use driver::{LoopOptions, RunReport, Sample, run_closed_loop};
pub use sim::{HeatingProcess, ProcessHeater, ProcessProbe};
pub use sink::OutputSink;
pub use source::{MeasurementSource, infallible};
