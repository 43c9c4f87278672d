//! A struct representing the outputted result of a numerical integrator.

use crate::{Float, core::status::Status};

/// Counters of right-hand side evaluations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evals {
    /// Calls of [`ODE::ode`](crate::core::ode::ODE::ode), the mandatory first one
    /// and the initial step estimate included.
    pub ode: usize,
}

impl Evals {
    pub fn new() -> Self {
        Self { ode: 0 }
    }
}

/// Counters of macro-steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Steps {
    /// Attempted steps.
    pub total: usize,
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected steps.
    pub rejected: usize,
}

impl Steps {
    pub fn new() -> Self {
        Self {
            total: 0,
            accepted: 0,
            rejected: 0,
        }
    }
}

/// A located event.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    /// Position of the event in the slice handed to the integrator.
    pub index: usize,
    /// Event location.
    pub t: Float,
    /// Interpolated state at the event, before any reset.
    pub y: Vec<Float>,
}

/// The output of a numerical integrator
#[derive(Clone, Debug)]
pub struct IntegrationResult {
    /// The final value of the independent variable
    pub x: Float,
    /// The last step size attempted, signed with the integration direction
    pub h: Float,
    /// The status of the integration process
    pub status: Status,
    /// Right-hand side evaluation counters
    pub evals: Evals,
    /// Step counters
    pub steps: Steps,
    /// Events located during the integration, in chronological order
    pub events: Vec<EventRecord>,
}

impl IntegrationResult {
    pub fn new(
        x: Float,
        h: Float,
        status: Status,
        evals: Evals,
        steps: Steps,
        events: Vec<EventRecord>,
    ) -> Self {
        Self {
            x,
            h,
            status,
            evals,
            steps,
            events,
        }
    }
}
