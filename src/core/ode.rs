//! User-supplied ODE system.

use crate::Float;

/// User-supplied ODE system.
///
/// Implement this trait for your problem to provide the right-hand side
/// function y' = f(x, y). The integrator calls `ode` with the abscissa `x` and
/// state `y` and expects `dydx` to be filled with the derivative values. The
/// dimension of `y` is fixed for a whole integration and `y` must be left
/// untouched.
///
/// # Example
///
/// ```rust
/// use gbs_ivp::prelude::*;
///
/// struct Oscillator { omega: f64 }
///
/// impl ODE for Oscillator {
///     fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
///         dydx[0] = y[1];
///         dydx[1] = -self.omega * self.omega * y[0];
///     }
/// }
/// ```
pub trait ODE {
    fn ode(&self, x: Float, y: &[Float], dydx: &mut [Float]);
}
