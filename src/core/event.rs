//! Event functions located along the dense output of accepted steps.

use bon::Builder;

use crate::Float;

/// Event zero-crossing direction filter, with respect to the independent variable.
/// - All: any sign change triggers.
/// - Positive: only negative -> nonnegative crossings.
/// - Negative: only nonnegative -> negative crossings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventDirection {
    All,
    Positive,
    Negative,
}

impl From<i32> for EventDirection {
    fn from(v: i32) -> Self {
        match v {
            x if x > 0 => EventDirection::Positive,
            x if x < 0 => EventDirection::Negative,
            _ => EventDirection::All,
        }
    }
}

impl EventDirection {
    /// Whether a crossing with the given slope sign is reported.
    pub fn accepts(&self, increasing: bool) -> bool {
        match self {
            EventDirection::All => true,
            EventDirection::Positive => increasing,
            EventDirection::Negative => !increasing,
        }
    }
}

/// What the integrator does once an event has been located.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventAction {
    /// Keep integrating; the event is only recorded.
    Continue,
    /// Stop at the event.
    Stop,
    /// Call [`Event::reset_state`] and restart from the event.
    ResetState,
    /// Restart from the event with re-evaluated derivatives.
    ResetDerivatives,
}

/// Location parameters of an event.
#[derive(Builder, Copy, Clone, Debug)]
pub struct EventConfig {
    /// Which sign changes are reported. Default: all.
    #[builder(default = EventDirection::All)]
    pub direction: EventDirection,
    /// Largest sampling interval when searching a step for sign changes.
    /// Two roots closer than this may be missed. Default: one sample per step.
    #[builder(default = Float::INFINITY)]
    pub max_check_interval: Float,
    /// Absolute convergence threshold of the root location. Default: `1e-10`.
    #[builder(default = 1e-10)]
    pub convergence: Float,
    /// Iteration limit of the root refinement. Default: `100`.
    #[builder(default = 100)]
    pub max_iterations: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A switching function `g(t, y)` whose sign changes are events.
///
/// # Example
///
/// ```rust
/// use gbs_ivp::prelude::*;
///
/// /// Ball hitting the ground, bouncing back with restitution `e`.
/// struct Ground { e: f64 }
///
/// impl Event for Ground {
///     fn g(&self, _t: f64, y: &[f64]) -> f64 {
///         y[0]
///     }
///
///     fn config(&self) -> EventConfig {
///         EventConfig::builder().direction(EventDirection::Negative).build()
///     }
///
///     fn event_occurred(&mut self, _t: f64, _y: &[f64], _increasing: bool) -> EventAction {
///         EventAction::ResetState
///     }
///
///     fn reset_state(&mut self, _t: f64, y: &mut [f64]) {
///         y[0] = 0.0;
///         y[1] = -self.e * y[1];
///     }
/// }
/// ```
pub trait Event {
    /// Switching function; events are its zeros.
    fn g(&self, t: Float, y: &[Float]) -> Float;

    /// Location parameters.
    fn config(&self) -> EventConfig {
        EventConfig::default()
    }

    /// Called at the located event. `increasing` tells whether `g` crosses
    /// zero upwards with respect to the independent variable.
    fn event_occurred(&mut self, _t: Float, _y: &[Float], _increasing: bool) -> EventAction {
        EventAction::Stop
    }

    /// Modify the state at the event, called for [`EventAction::ResetState`].
    fn reset_state(&mut self, _t: Float, _y: &mut [Float]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_int() {
        assert_eq!(EventDirection::from(3), EventDirection::Positive);
        assert_eq!(EventDirection::from(-1), EventDirection::Negative);
        assert_eq!(EventDirection::from(0), EventDirection::All);
    }

    #[test]
    fn direction_filter() {
        assert!(EventDirection::All.accepts(true));
        assert!(EventDirection::All.accepts(false));
        assert!(EventDirection::Positive.accepts(true));
        assert!(!EventDirection::Positive.accepts(false));
        assert!(EventDirection::Negative.accepts(false));
        assert!(!EventDirection::Negative.accepts(true));
    }

    #[test]
    fn config_defaults() {
        let config = EventConfig::default();
        assert_eq!(config.direction, EventDirection::All);
        assert!(config.max_check_interval.is_infinite());
        assert_eq!(config.convergence, 1e-10);
        assert_eq!(config.max_iterations, 100);
    }
}
