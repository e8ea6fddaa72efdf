//! The measurement side of a control loop.
//!
//! A [`MeasurementSource`] is whatever yields the current process value:
//! a thermistor read, an encoder, or a simulated plant.  The controller owns
//! its source and reads it exactly once per enabled
//! [`compute`][crate::PidController::compute] and once on every
//! disabled-to-enabled transition.
//!
//! Source failures are not wrapped: the controller returns
//! `Result<_, S::Error>` so a caller gets back exactly what its source
//! produced.

use std::convert::Infallible;

/// Supplies the current measured value of the controlled process.
pub trait MeasurementSource {
    /// Failure type produced by this source.
    type Error;

    /// Sample the process.
    ///
    /// # Errors
    ///
    /// Whatever the underlying device or computation reports.  The
    /// controller does not catch or retry.
    fn read(&mut self) -> Result<f64, Self::Error>;
}

impl<F, E> MeasurementSource for F
where
    F: FnMut() -> Result<f64, E>,
{
    type Error = E;

    fn read(&mut self) -> Result<f64, E> {
        self()
    }
}

/// Adapt a plain `FnMut() -> f64` into a source that cannot fail.
///
/// ```rust
/// use rasppid_core::source::{MeasurementSource, infallible};
///
/// let mut source = infallible(|| 21.5);
/// let Ok(value) = source.read();
/// assert_eq!(value, 21.5);
/// ```
pub fn infallible<F>(mut f: F) -> impl MeasurementSource<Error = Infallible>
where
    F: FnMut() -> f64,
{
    move || Ok::<f64, Infallible>(f())
}
