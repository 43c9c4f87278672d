//! Errors for integration methods

use thiserror::Error;

use crate::Float;

/// Errors returned by the integrator entry points.
///
/// Configuration problems are collected and returned together before any
/// derivative evaluation; the remaining variants abort a running integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("state vector must not be empty")]
    EmptyState,
    #[error("nmax must be positive (got {0})")]
    NMaxMustBePositive(usize),
    #[error("max_evaluations must be positive (got {0})")]
    MaxEvaluationsMustBePositive(usize),
    #[error("uround must be in (1e-35, 1.0) (got {0})")]
    URoundOutOfRange(Float),
    #[error("initial step h0 must be finite and non-zero (got {0})")]
    InvalidInitialStep(Float),
    #[error("hmax must be positive (got {0})")]
    InvalidMaxStep(Float),
    #[error("hmin must be non-negative (got {0})")]
    InvalidMinStep(Float),
    #[error("hmin ({hmin}) must not exceed hmax ({hmax})")]
    MinStepExceedsMaxStep { hmin: Float, hmax: Float },
    #[error("max_order must be even and greater than 6 (got {0})")]
    InvalidMaxOrder(usize),
    #[error("{name} has {found} components but the state has {expected}")]
    ToleranceDimension {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{name} must be non-negative (got {value})")]
    NegativeTolerance { name: &'static str, value: Float },
    #[error("t_eval must not be empty")]
    EmptyTEval,
    #[error("t_eval[{index}] = {value} is outside the integration span or out of order")]
    InvalidTEval { index: usize, value: Float },
    #[error("extrapolated state is not finite at x = {x} with step {h}")]
    NonFiniteState { x: Float, h: Float },
    #[error("maximal number of derivative evaluations exceeded ({0})")]
    MaxEvaluationsExceeded(usize),
    #[error("event {index} is not bracketed on [{t_a}, {t_b}] (g = {g_a}, {g_b})")]
    EventBracketing {
        index: usize,
        t_a: Float,
        t_b: Float,
        g_a: Float,
        g_b: Float,
    },
    #[error("event {index} root not converged after {iterations} iterations near t = {t}")]
    EventNotConverged {
        index: usize,
        iterations: usize,
        t: Float,
    },
}
