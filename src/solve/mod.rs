//! High-level solve module: SciPy-like API pieces split into submodules.

pub mod cont;
pub mod options;
pub mod solout;
pub mod solution;
pub mod solve_ivp;

// Re-exports for ergonomic access via crate::solve::* and prelude
pub use cont::ContinuousOutput;
pub use options::{IVPOptions, StepCallback};
pub use solution::IVPSolution;
pub use solve_ivp::solve_ivp;
