//! User defined callback hook executed after each accepted step.

use crate::{Float, core::interpolate::Interpolate};

/// Return flags for [`SolOut`].
///
/// - `Continue`: proceed with integration as normal.
/// - `Interrupt`: stop integration and return control to the caller.
/// - `ModifiedSolution`: restart from the given abscissa and state; the
///   integrator re-evaluates the derivatives before continuing.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlag {
    Continue,
    Interrupt,
    ModifiedSolution(Float, Vec<Float>),
}

/// Callback hook executed after each accepted step.
///
/// The callback is invoked once before the main loop (with `xold == x`) and
/// after every accepted step. When an event truncates a step, `x` is the event
/// location and the interpolator is restricted to `[xold, x]`.
///
/// # Example
///
/// ```rust
/// use gbs_ivp::prelude::*;
///
/// struct Printer { xout: f64, dx: f64 }
///
/// impl SolOut for Printer {
///     fn solout<I: Interpolate>(
///         &mut self,
///         xold: f64,
///         x: f64,
///         y: &[f64],
///         interpolator: &I,
///     ) -> ControlFlag {
///         if xold == x {
///             self.xout = x + self.dx;
///             return ControlFlag::Continue;
///         }
///         let mut yi = y.to_vec();
///         while self.xout <= x {
///             interpolator.interpolate(self.xout, &mut yi);
///             println!("x = {}, y = {:?}", self.xout, yi);
///             self.xout += self.dx;
///         }
///         ControlFlag::Continue
///     }
/// }
/// ```
pub trait SolOut {
    fn solout<I: Interpolate>(
        &mut self,
        xold: Float,
        x: Float,
        y: &[Float],
        interpolator: &I,
    ) -> ControlFlag;
}

/// A [`SolOut`] that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSolOut;

impl SolOut for NoSolOut {
    fn solout<I: Interpolate>(
        &mut self,
        _xold: Float,
        _x: Float,
        _y: &[Float],
        _interpolator: &I,
    ) -> ControlFlag {
        ControlFlag::Continue
    }
}
