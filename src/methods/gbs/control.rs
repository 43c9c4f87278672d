//! Order and step size control of the extrapolation integrator.
//!
//! The controller walks through increasing extrapolation levels `k` for one
//! macro-step. After each level it either asks for the next one, declares
//! convergence or rejects the step with a new step size. Once a step has been
//! accepted it selects the order and step size of the next step from the cost
//! per unit of time observed at each level.

use log::warn;

use crate::{Float, error::Error, methods::settings::Settings};

use super::tables::Tables;

/// Use `value` when it lies in `[lo, hi]`, otherwise fall back to `default`.
fn factor_or_default(
    name: &str,
    value: Option<Float>,
    lo: Float,
    hi: Float,
    default: Float,
) -> Float {
    match value {
        Some(v) if v >= lo && v <= hi => v,
        Some(v) => {
            warn!("{name} = {v} outside [{lo}, {hi}], using default {default}");
            default
        }
        None => default,
    }
}

/// Use a positive count, otherwise fall back to `default`.
fn count_or_default(name: &str, value: Option<usize>, max: usize, default: usize) -> usize {
    match value {
        Some(v) if v > 0 && v <= max => v,
        Some(v) => {
            warn!("{name} = {v} outside [1, {max}], using default {default}");
            default
        }
        None => default,
    }
}

/// Early detection of a diverging midpoint sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StabilityCheck {
    pub enabled: bool,
    /// Levels `k < max_iter` are checked.
    pub max_iter: usize,
    /// Sub-steps `j <= max_checks` are checked.
    pub max_checks: usize,
    /// Step size reduction applied when the check fails.
    pub reduction: Float,
}

impl StabilityCheck {
    pub fn new(settings: &Settings) -> Self {
        Self {
            enabled: settings.stability_check.unwrap_or(true),
            max_iter: count_or_default(
                "stability_max_iter",
                settings.stability_max_iter,
                usize::MAX,
                2,
            ),
            max_checks: count_or_default(
                "stability_max_checks",
                settings.stability_max_checks,
                usize::MAX,
                1,
            ),
            reduction: factor_or_default(
                "stability_reduction",
                settings.stability_reduction,
                1e-4,
                0.9999,
                0.5,
            ),
        }
    }

    /// Whether sub-step `j` of level `k` is checked.
    pub fn applies(&self, k: usize, j: usize) -> bool {
        self.enabled && j <= self.max_checks && k < self.max_iter
    }
}

/// Step size factors derived from the error at a given level.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepControl {
    sc1: Float,
    sc2: Float,
    sc3: Float,
    sc4: Float,
}

impl StepControl {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sc1: factor_or_default("step_control1", settings.step_control1, 1e-4, 0.9999, 0.65),
            sc2: factor_or_default("step_control2", settings.step_control2, 1e-4, 0.9999, 0.94),
            sc3: factor_or_default("step_control3", settings.step_control3, 1e-4, 0.9999, 0.02),
            sc4: factor_or_default("step_control4", settings.step_control4, 1.0001, 999.9, 4.0),
        }
    }

    /// Ratio between the optimal step and the current one for level `k`.
    pub fn factor(&self, error: Float, k: usize) -> Float {
        let exp = 1.0 / (2 * k + 1) as Float;
        let fac = self.sc2 / (error / self.sc1).powf(exp);
        let pow = self.sc3.powf(exp);
        fac.min(1.0 / pow).max(pow / self.sc4)
    }
}

/// Maximal order and the hysteresis thresholds of the order selection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OrderControl {
    pub max_order: usize,
    oc1: Float,
    oc2: Float,
}

impl OrderControl {
    pub fn new(settings: &Settings, errors: &mut Vec<Error>) -> Self {
        let max_order = match settings.max_order {
            Some(m) => {
                if m % 2 != 0 || m <= 6 {
                    errors.push(Error::InvalidMaxOrder(m));
                }
                m
            }
            None => 18,
        };
        Self {
            max_order,
            oc1: factor_or_default("order_control1", settings.order_control1, 1e-4, 0.9999, 0.8),
            oc2: factor_or_default("order_control2", settings.order_control2, 1e-4, 0.9999, 0.9),
        }
    }
}

/// Dense-output degree selection and its error control.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InterpolationControl {
    pub use_error: bool,
    pub mudif: usize,
}

impl InterpolationControl {
    pub fn new(settings: &Settings) -> Self {
        Self {
            use_error: settings.use_interpolation_error.unwrap_or(true),
            mudif: count_or_default("mudif", settings.mudif, 6, 4),
        }
    }

    /// Number of midpoint derivatives fitted after a step accepted at level `k`.
    /// Negative values mean the plain Hermite cubic is used.
    pub fn mu(&self, k: usize) -> isize {
        2 * k as isize - self.mudif as isize + 3
    }
}

/// A step size fell below `hmin` where this is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepTooSmall;

/// Bounds on the step magnitude.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepBounds {
    pub hmin: Float,
    pub hmax: Float,
}

impl StepBounds {
    /// Magnitude of `h` clipped to `hmax`. Below `hmin` it is raised to
    /// `hmin` when `accept_small`, and refused otherwise.
    pub fn filter(&self, h: Float, accept_small: bool) -> Result<Float, StepTooSmall> {
        let mut filtered = h.abs();
        if filtered < self.hmin {
            if accept_small {
                filtered = self.hmin;
            } else {
                return Err(StepTooSmall);
            }
        }
        Ok(filtered.min(self.hmax))
    }
}

/// Why a step attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    /// The stability check failed inside a midpoint sequence.
    Unstable,
    /// The error blew up or stopped decreasing between levels.
    Diverging,
    /// The error is too large to expect convergence at the target level.
    Hopeless,
    /// The last admissible level did not reach the tolerance.
    NotConverged,
    /// The dense output is not accurate enough.
    Interpolation,
}

/// Outcome of one extrapolation level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Verdict {
    /// Try the next level.
    Continue,
    /// The step is accurate enough.
    Converged,
    /// Retry the step with magnitude `h_new`.
    Reject { h_new: Float, reason: RejectReason },
}

/// Order and step size controller state for one integration run.
#[derive(Clone, Debug)]
pub(crate) struct OrderStepController {
    /// Level at which convergence is expected.
    pub target_iter: usize,
    pub previous_rejected: bool,
    pub first_time: bool,
    optimal_step: Vec<Float>,
    cost_per_time_unit: Vec<Float>,
    max_error: Float,
    step: StepControl,
    order: OrderControl,
    reduction: Float,
}

impl OrderStepController {
    /// Initial target level from the relative tolerance of the first component.
    pub fn new(
        tables: &Tables,
        step: StepControl,
        order: OrderControl,
        stability: &StabilityCheck,
        rtol: Float,
    ) -> Self {
        let size = tables.size();
        let log10r = rtol.max(1.0e-10).log10();
        let target = (0.5 - 0.6 * log10r).floor().min((size - 2) as Float).max(1.0);
        Self {
            target_iter: target as usize,
            previous_rejected: false,
            first_time: true,
            optimal_step: vec![0.0; size],
            cost_per_time_unit: vec![0.0; size],
            max_error: Float::MAX,
            step,
            order,
            reduction: stability.reduction,
        }
    }

    /// Order assumed by the initial step size estimate.
    pub fn initial_order(&self) -> usize {
        2 * self.target_iter + 1
    }

    /// Rejection after a failed stability check.
    pub fn unstable(&self, h: Float, bounds: &StepBounds) -> Result<Verdict, StepTooSmall> {
        Ok(Verdict::Reject {
            h_new: bounds.filter(h * self.reduction, false)?,
            reason: RejectReason::Unstable,
        })
    }

    /// Reject a converged step whose dense output is too inaccurate, retrying
    /// with the step size `h_int` suggested by the interpolation error.
    pub fn interpolation_reject(
        &self,
        h_int: Float,
        bounds: &StepBounds,
    ) -> Result<Verdict, StepTooSmall> {
        Ok(Verdict::Reject {
            h_new: bounds.filter(h_int, false)?,
            reason: RejectReason::Interpolation,
        })
    }

    /// Judge level `k >= 1` of a step of magnitude `h` given its scaled RMS error.
    pub fn assess(
        &mut self,
        k: usize,
        error: Float,
        h: Float,
        is_last_step: bool,
        tables: &Tables,
        bounds: &StepBounds,
    ) -> Result<Verdict, StepTooSmall> {
        if error > 1.0e15 || (k > 1 && error > self.max_error) {
            return Ok(Verdict::Reject {
                h_new: bounds.filter(h * self.reduction, false)?,
                reason: RejectReason::Diverging,
            });
        }

        self.max_error = (4.0 * error).max(1.0);
        self.optimal_step[k] = bounds.filter(h * self.step.factor(error, k), true)?;
        self.cost_per_time_unit[k] = tables.cost_per_step[k] as Float / self.optimal_step[k];

        let seq = &tables.sequence;
        let t = self.target_iter;
        let verdict = match k as isize - t as isize {
            -1 => {
                if t > 1 && !self.previous_rejected {
                    if error <= 1.0 {
                        Verdict::Converged
                    } else {
                        let ratio = (seq[t] * seq[t + 1]) as Float / (seq[0] * seq[0]) as Float;
                        if error > ratio * ratio {
                            self.target_iter = k;
                            self.reject_at_target(RejectReason::Hopeless, bounds)?
                        } else {
                            Verdict::Continue
                        }
                    }
                } else {
                    Verdict::Continue
                }
            }
            0 => {
                if error <= 1.0 {
                    Verdict::Converged
                } else {
                    let ratio = seq[k + 1] as Float / seq[0] as Float;
                    if error > ratio * ratio {
                        self.reject_at_target(RejectReason::Hopeless, bounds)?
                    } else {
                        Verdict::Continue
                    }
                }
            }
            1 => {
                if error > 1.0 {
                    self.reject_at_target(RejectReason::NotConverged, bounds)?
                } else {
                    Verdict::Converged
                }
            }
            _ => {
                if (self.first_time || is_last_step) && error <= 1.0 {
                    Verdict::Converged
                } else {
                    Verdict::Continue
                }
            }
        };
        Ok(verdict)
    }

    fn reject_at_target(
        &mut self,
        reason: RejectReason,
        bounds: &StepBounds,
    ) -> Result<Verdict, StepTooSmall> {
        let t = self.target_iter;
        if t > 1 && self.cost_per_time_unit[t - 1] < self.order.oc1 * self.cost_per_time_unit[t] {
            self.target_iter -= 1;
        }
        Ok(Verdict::Reject {
            h_new: bounds.filter(self.optimal_step[self.target_iter], false)?,
            reason,
        })
    }

    /// Choose the next target level and step magnitude after a step of
    /// magnitude `h` was accepted at level `k`.
    pub fn next_step(
        &mut self,
        k: usize,
        h: Float,
        tables: &Tables,
        bounds: &StepBounds,
    ) -> Result<Float, StepTooSmall> {
        let size = tables.size();
        let cpt = &self.cost_per_time_unit;
        let (oc1, oc2) = (self.order.oc1, self.order.oc2);

        let optimal_iter = if k == 1 {
            if self.previous_rejected { 1 } else { 2 }
        } else if k <= self.target_iter {
            if cpt[k - 1] < oc1 * cpt[k] {
                k - 1
            } else if cpt[k] < oc2 * cpt[k - 1] {
                (k + 1).min(size - 2)
            } else {
                k
            }
        } else {
            let mut o = k - 1;
            if k > 2 && cpt[k - 2] < oc1 * cpt[k - 1] {
                o = k - 2;
            }
            if cpt[k] < oc2 * cpt[o] {
                o = k.min(size - 2);
            }
            o
        };

        // After a rejection neither the order nor the step may grow.
        if self.previous_rejected {
            self.target_iter = optimal_iter.min(k);
            return Ok(h.min(self.optimal_step[self.target_iter]));
        }

        let cost = &tables.cost_per_step;
        let h_new = if optimal_iter <= k {
            self.optimal_step[optimal_iter]
        } else if k < self.target_iter && cpt[k] < oc2 * cpt[k - 1] {
            let scaled = self.optimal_step[k] * cost[optimal_iter + 1] as Float / cost[k] as Float;
            bounds.filter(scaled, false)?
        } else {
            let scaled = self.optimal_step[k] * cost[optimal_iter] as Float / cost[k] as Float;
            bounds.filter(scaled, false)?
        };
        self.target_iter = optimal_iter;
        Ok(h_new)
    }

    /// Bookkeeping at the end of every step attempt.
    pub fn finish_step(&mut self, rejected: bool) {
        self.first_time = false;
        self.previous_rejected = rejected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(rtol: Float) -> (OrderStepController, Tables) {
        let settings = Settings::default();
        let mut errors = Vec::new();
        let order = OrderControl::new(&settings, &mut errors);
        assert!(errors.is_empty());
        let tables = Tables::new(order.max_order);
        let controller = OrderStepController::new(
            &tables,
            StepControl::new(&settings),
            order,
            &StabilityCheck::new(&settings),
            rtol,
        );
        (controller, tables)
    }

    const BOUNDS: StepBounds = StepBounds {
        hmin: 0.0,
        hmax: 10.0,
    };

    #[test]
    fn out_of_range_factors_fall_back_to_defaults() {
        let settings = Settings::builder()
            .step_control1(2.0)
            .step_control4(0.5)
            .stability_reduction(0.0)
            .stability_max_iter(0)
            .mudif(9)
            .build();
        let step = StepControl::new(&settings);
        assert_eq!(step.sc1, 0.65);
        assert_eq!(step.sc4, 4.0);
        let stability = StabilityCheck::new(&settings);
        assert_eq!(stability.reduction, 0.5);
        assert_eq!(stability.max_iter, 2);
        assert_eq!(InterpolationControl::new(&settings).mudif, 4);
    }

    #[test]
    fn odd_or_small_max_order_is_an_error() {
        for bad in [7, 6, 4] {
            let mut errors = Vec::new();
            OrderControl::new(&Settings::builder().max_order(bad).build(), &mut errors);
            assert_eq!(errors, vec![Error::InvalidMaxOrder(bad)]);
        }
        let mut errors = Vec::new();
        OrderControl::new(&Settings::builder().max_order(8).build(), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn target_order_follows_tolerance() {
        assert_eq!(controller(1e-3).0.target_iter, 2);
        assert_eq!(controller(1e-10).0.target_iter, 6);
        assert_eq!(controller(1e-14).0.target_iter, 6);
        assert_eq!(controller(10.0).0.target_iter, 1);
    }

    #[test]
    fn step_factor_is_clamped() {
        let step = StepControl::new(&Settings::default());
        let tiny = step.factor(1e-30, 1);
        let huge = step.factor(1e30, 1);
        let pow = (0.02 as Float).powf(1.0 / 3.0);
        assert!((tiny - 1.0 / pow).abs() < 1e-12);
        assert!((huge - pow / 4.0).abs() < 1e-12);
    }

    #[test]
    fn stability_check_window() {
        let check = StabilityCheck::new(&Settings::default());
        assert!(check.applies(0, 1));
        assert!(check.applies(1, 1));
        assert!(!check.applies(2, 1));
        assert!(!check.applies(0, 2));
        let off = StabilityCheck::new(&Settings::builder().stability_check(false).build());
        assert!(!off.applies(0, 1));
    }

    #[test]
    fn exploding_error_rejects_with_reduced_step() {
        let (mut c, tables) = controller(1e-6);
        let verdict = c.assess(1, 1e16, 0.1, false, &tables, &BOUNDS).unwrap();
        assert_eq!(
            verdict,
            Verdict::Reject {
                h_new: 0.05,
                reason: RejectReason::Diverging
            }
        );
    }

    #[test]
    fn growing_error_between_levels_rejects() {
        let (mut c, tables) = controller(1e-6);
        c.first_time = false;
        c.target_iter = 6;
        assert_eq!(c.assess(1, 1.0, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Continue);
        // max_error is now 4
        let verdict = c.assess(2, 5.0, 0.1, false, &tables, &BOUNDS).unwrap();
        assert!(matches!(verdict, Verdict::Reject { reason: RejectReason::Diverging, .. }));
    }

    #[test]
    fn converges_at_target_level() {
        let (mut c, tables) = controller(1e-6);
        let t = c.target_iter;
        for k in 1..t - 1 {
            c.first_time = false;
            let error = 10.0 / k as Float;
            assert_eq!(
                c.assess(k, error, 0.1, false, &tables, &BOUNDS).unwrap(),
                Verdict::Continue
            );
        }
        assert_eq!(c.assess(t - 1, 2.0, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Continue);
        assert_eq!(c.assess(t, 0.5, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Converged);
    }

    #[test]
    fn first_step_may_converge_early() {
        let (mut c, tables) = controller(1e-10);
        assert!(c.target_iter > 3);
        assert_eq!(c.assess(1, 0.5, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Converged);
        c.first_time = false;
        assert_eq!(c.assess(1, 0.5, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Continue);
        assert_eq!(c.assess(1, 0.5, 0.1, true, &tables, &BOUNDS).unwrap(), Verdict::Converged);
    }

    #[test]
    fn level_beyond_target_must_converge() {
        let (mut c, tables) = controller(1e-6);
        c.first_time = false;
        c.target_iter = 2;
        assert_eq!(c.assess(1, 50.0, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Continue);
        assert_eq!(c.assess(2, 20.0, 0.1, false, &tables, &BOUNDS).unwrap(), Verdict::Continue);
        let verdict = c.assess(3, 2.0, 0.1, false, &tables, &BOUNDS).unwrap();
        assert!(matches!(verdict, Verdict::Reject { reason: RejectReason::NotConverged, .. }));
    }

    #[test]
    fn rejection_below_hmin_is_refused() {
        let (mut c, tables) = controller(1e-6);
        let bounds = StepBounds { hmin: 0.08, hmax: 1.0 };
        assert_eq!(c.assess(1, 1e16, 0.1, false, &tables, &bounds), Err(StepTooSmall));
        assert_eq!(c.unstable(0.1, &bounds), Err(StepTooSmall));
        assert_eq!(c.interpolation_reject(0.05, &bounds), Err(StepTooSmall));
    }

    #[test]
    fn interpolation_rejection_is_bounded() {
        let (c, _) = controller(1e-6);
        let bounds = StepBounds { hmin: 0.01, hmax: 0.2 };
        assert_eq!(
            c.interpolation_reject(0.05, &bounds),
            Ok(Verdict::Reject {
                h_new: 0.05,
                reason: RejectReason::Interpolation
            })
        );
        assert!(matches!(
            c.interpolation_reject(3.0, &bounds),
            Ok(Verdict::Reject { h_new, .. }) if h_new == 0.2
        ));
    }

    #[test]
    fn filter_clamps_magnitude() {
        let bounds = StepBounds { hmin: 0.1, hmax: 1.0 };
        assert_eq!(bounds.filter(-5.0, false), Ok(1.0));
        assert_eq!(bounds.filter(0.01, true), Ok(0.1));
        assert_eq!(bounds.filter(-0.01, false), Err(StepTooSmall));
        assert_eq!(bounds.filter(0.5, false), Ok(0.5));
    }

    #[test]
    fn step_never_grows_after_rejection() {
        let (mut c, tables) = controller(1e-6);
        c.first_time = false;
        let t = c.target_iter;
        for k in 1..=t {
            c.assess(k, 1e-3 / k as Float, 0.1, false, &tables, &BOUNDS).unwrap();
        }
        c.previous_rejected = true;
        let h_new = c.next_step(t, 0.1, &tables, &BOUNDS).unwrap();
        assert!(h_new <= 0.1);
        assert!(c.target_iter <= t);
    }

    #[test]
    fn first_level_acceptance_raises_order() {
        let (mut c, tables) = controller(1e-6);
        c.assess(1, 0.5, 0.1, false, &tables, &BOUNDS).unwrap();
        c.next_step(1, 0.1, &tables, &BOUNDS).unwrap();
        assert_eq!(c.target_iter, 2);

        c.previous_rejected = true;
        c.next_step(1, 0.1, &tables, &BOUNDS).unwrap();
        assert_eq!(c.target_iter, 1);
    }
}
