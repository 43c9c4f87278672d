//! Interpolation trait for dense output inside an accepted step.

use crate::{Float, methods::gbs::DenseOutput};

/// Continuous access to the solution over the interval `[xold, x]` of the
/// last accepted step.
///
/// Queries outside the interval are answered by extrapolating the step
/// polynomial and lose accuracy quickly.
pub trait Interpolate {
    /// Left end of the interval the interpolant is valid on.
    fn xold(&self) -> Float;

    /// Right end of the interval the interpolant is valid on.
    fn x(&self) -> Float;

    /// Interpolate the solution at the given abscissa `xi`.
    fn interpolate(&self, xi: Float, yi: &mut [Float]);

    /// Interpolate the first derivative of the solution at `xi`.
    fn interpolate_derivative(&self, xi: Float, dyi: &mut [Float]);

    /// Owned copy of the interpolation polynomial, e.g. to keep the whole
    /// continuous solution after integration.
    fn get_cont(&self) -> DenseOutput;
}
