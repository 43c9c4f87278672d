//! Options for solve_ivp

use bon::Builder;

use crate::{
    Float,
    core::{event::Event, interpolate::Interpolate, solout::ControlFlag},
    methods::settings::{Settings, Tolerance},
};

/// User callback invoked after each accepted step: `(xold, x, y, interpolator)`.
pub type StepCallback<'a> = dyn FnMut(Float, Float, &[Float], &dyn Interpolate) -> ControlFlag + 'a;

#[derive(Builder)]
/// Options for solve_ivp similar to SciPy
pub struct IVPOptions<'a> {
    /// Relative tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub rtol: Tolerance,
    /// Absolute tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub atol: Tolerance,
    /// Maximum number of attempted steps (maps to `settings.nmax`).
    pub nmax: Option<usize>,
    /// Budget of right-hand side evaluations (maps to `settings.max_evaluations`).
    pub max_evaluations: Option<usize>,
    /// Points where the solution is requested, ordered in the integration
    /// direction. When given, step endpoints are not recorded unless
    /// [`save_step_endpoints`](Self::save_step_endpoints) says otherwise.
    pub t_eval: Option<Vec<Float>>,
    /// Keep the dense output of every step to evaluate the solution anywhere
    /// afterwards. Default: false.
    #[builder(default)]
    pub dense_output: bool,
    /// Optional user callback invoked after each accepted step, after the
    /// internal sampling at `t_eval`.
    pub solout: Option<&'a mut StepCallback<'a>>,
    /// Event functions located during the integration.
    #[builder(default)]
    pub events: Vec<&'a mut dyn Event>,
    /// Convenience alias for the initial step suggestion (maps to `settings.h0`).
    pub first_step: Option<Float>,
    /// Convenience alias for maximum step size (maps to `settings.hmax`).
    pub max_step: Option<Float>,
    /// Minimum step size constraint (maps to `settings.hmin`).
    pub min_step: Option<Float>,
    /// Save step endpoints (initial call and each accepted step).
    /// Default: true without `t_eval`, false with it.
    pub save_step_endpoints: Option<bool>,
    /// Tuning of the extrapolation method; the aliases above take precedence.
    #[builder(default)]
    pub settings: Settings,
}
