//! Gragg–Bulirsch–Stoer extrapolation integrator for initial value problems (IVPs)
//! of ordinary differential equations, with adaptive order, adaptive step size and
//! high-order dense output.
//!
//! The low-level entry point is [`methods::gbs::gbs`] (or the reusable
//! [`methods::gbs::GraggBulirschStoer`]); [`solve::solve_ivp`] offers a SciPy-like
//! front end on top of it.
//!
//! ```rust
//! use gbs_ivp::prelude::*;
//!
//! struct Decay;
//! impl ODE for Decay {
//!     fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
//!         dydx[0] = -y[0];
//!     }
//! }
//!
//! let options = IVPOptions::builder().rtol(1e-10).atol(1e-10).build();
//! let sol = solve_ivp(&Decay, 0.0, 5.0, &[1.0], options).unwrap();
//! let y_end = sol.y.last().unwrap()[0];
//! assert!((y_end - (-5.0f64).exp()).abs() < 1e-8);
//! ```

pub mod core;
pub mod error;
pub mod methods;
pub mod prelude;
pub mod solve;

pub use error::Error;

/// Floating point type used throughout the crate.
pub type Float = f64;
