//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use gbs_ivp::prelude::*;
//! ```
//!
//! Re-exports included:
//! - Core traits and types: `ODE`, `Interpolate`, `SolOut`, `ControlFlag`, `Status`
//!   and the event types.
//! - The integrator: `gbs`, `GraggBulirschStoer`, `DenseOutput`, `Settings`, `Tolerance`.
//! - High-level API: `solve_ivp`, `IVPOptions`, `IVPSolution`.

pub use crate::core::{
    event::{Event, EventAction, EventConfig, EventDirection},
    interpolate::Interpolate,
    ode::ODE,
    solout::{ControlFlag, NoSolOut, SolOut},
    status::Status,
};
pub use crate::error::Error;
pub use crate::methods::{
    gbs::{DenseOutput, GraggBulirschStoer, gbs},
    result::{EventRecord, IntegrationResult},
    settings::{Settings, Tolerance},
};
pub use crate::solve::{IVPOptions, IVPSolution, solve_ivp};
