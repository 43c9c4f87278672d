//! Gragg–Bulirsch–Stoer extrapolation method.
//!
//! The building blocks are kept in separate modules: the modified midpoint
//! sub-stepper, the Aitken–Neville table, the order and step controller and
//! the dense output polynomial. The driver ties them together.

mod control;
mod counter;
mod dense;
mod driver;
mod extrapolation;
mod midpoint;
pub(crate) mod tables;

pub use dense::DenseOutput;
pub use driver::{GraggBulirschStoer, gbs};
