//! Gragg–Bulirsch–Stoer integration driver
//!
//! # References
//! - E. Hairer, S. P. Nørsett, and G. Wanner, "Solving Ordinary Differential
//!   Equations I. Nonstiff Problems", 2nd ed., Springer (1993), section II.9.
//! - E. Hairer and A. Ostermann, "Dense output for extrapolation methods",
//!   Numerische Mathematik 58 (1990), 419-439.
//!
//! Each macro-step runs modified midpoint sequences with `4k + 2` sub-steps
//! for increasing levels `k`, extrapolates them towards a zero sub-step and
//! stops as soon as the extrapolated error is within tolerance at a level
//! suggested by the cost-per-time-unit model of the previous steps.

use log::{debug, info, trace, warn};

use crate::{
    Float,
    core::{
        event::{Event, EventAction},
        interpolate::Interpolate,
        ode::ODE,
        solout::{ControlFlag, SolOut},
        status::Status,
    },
    error::Error,
    methods::{
        events::{EventState, earliest_crossing},
        hinit::hinit,
        result::{EventRecord, IntegrationResult, Steps},
        settings::{Settings, Tolerance},
    },
};

use super::{
    control::{
        InterpolationControl, OrderControl, OrderStepController, StabilityCheck,
        StepBounds, StepControl, Verdict,
    },
    counter::EvaluationCounter,
    dense::DenseOutput,
    extrapolation::{extrapolate, rescale, rms_error},
    midpoint::{SubstepOutcome, modified_midpoint},
    tables::Tables,
};

/// Extrapolation integrator with resolved settings and cached tables.
///
/// The tables depend on the maximal order only, so one instance can
/// integrate any number of problems. Working storage is allocated per call of
/// [`integrate`](Self::integrate).
#[derive(Clone, Debug)]
pub struct GraggBulirschStoer {
    uround: Float,
    h0: Option<Float>,
    hmin: Float,
    hmax: Option<Float>,
    nmax: usize,
    max_evaluations: usize,
    stability: StabilityCheck,
    step_control: StepControl,
    interpolation: InterpolationControl,
    order: OrderControl,
    tables: Tables,
}

/// How the handling of an accepted step ended.
enum StepEnd {
    /// The whole step was taken.
    Completed,
    /// Continue from the given abscissa with a new state.
    Restart(Float),
    /// Stop at the given abscissa.
    Halt(Float, Status),
}

impl GraggBulirschStoer {
    /// Validate `settings` and build the extrapolation tables.
    pub fn new(settings: Settings) -> Result<Self, Vec<Error>> {
        // --- Input Validation ---
        let mut errors: Vec<Error> = Vec::new();

        // Rounding Unit
        let uround = match settings.uround {
            Some(u) => {
                if u <= 1e-35 || u >= 1.0 {
                    errors.push(Error::URoundOutOfRange(u));
                }
                u
            }
            None => 2.3e-16,
        };

        // Maximum Number of Steps
        let nmax = match settings.nmax {
            Some(n) => {
                if n == 0 {
                    errors.push(Error::NMaxMustBePositive(n));
                }
                n
            }
            None => 100_000,
        };

        // Evaluation budget
        let max_evaluations = match settings.max_evaluations {
            Some(n) => {
                if n == 0 {
                    errors.push(Error::MaxEvaluationsMustBePositive(n));
                }
                n
            }
            None => usize::MAX,
        };

        // Step size bounds
        if let Some(h0) = settings.h0 {
            if h0 == 0.0 || !h0.is_finite() {
                errors.push(Error::InvalidInitialStep(h0));
            }
        }
        let hmin = match settings.hmin {
            Some(h) => {
                if !(h >= 0.0) {
                    errors.push(Error::InvalidMinStep(h));
                }
                h
            }
            None => 0.0,
        };
        if let Some(hmax) = settings.hmax {
            if !(hmax > 0.0) {
                errors.push(Error::InvalidMaxStep(hmax));
            } else if hmin > hmax {
                errors.push(Error::MinStepExceedsMaxStep { hmin, hmax });
            }
        }

        let order = OrderControl::new(&settings, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        let tables = Tables::new(order.max_order);
        debug!(
            "gbs: max order {}, subdivision sequence {:?}",
            order.max_order, tables.sequence
        );

        Ok(Self {
            uround,
            h0: settings.h0,
            hmin,
            hmax: settings.hmax,
            nmax,
            max_evaluations,
            stability: StabilityCheck::new(&settings),
            step_control: StepControl::new(&settings),
            interpolation: InterpolationControl::new(&settings),
            order,
            tables,
        })
    }

    /// Integrate `y' = f(x, y)` from `x` to `xend`, advancing `y` in place.
    ///
    /// `solout` is called once before the first step and after every accepted
    /// step; `events` are located on the dense output of every accepted step.
    ///
    /// # Returns
    /// An [`IntegrationResult`] whose status tells why the integration ended,
    /// or the list of problems found in the inputs. Exhausting the evaluation
    /// budget and failing to locate an event are returned as errors too.
    pub fn integrate<F, S>(
        &self,
        f: &F,
        x: Float,
        xend: Float,
        y: &mut [Float],
        rtol: Tolerance,
        atol: Tolerance,
        solout: &mut S,
        events: &mut [&mut dyn Event],
    ) -> Result<IntegrationResult, Vec<Error>>
    where
        F: ODE,
        S: SolOut,
    {
        let mut errors: Vec<Error> = Vec::new();
        let n = y.len();
        if n == 0 {
            errors.push(Error::EmptyState);
        }
        rtol.check("rtol", n, &mut errors);
        atol.check("atol", n, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        self.run(f, x, xend, y, &rtol, &atol, solout, events)
            .map_err(|e| vec![e])
    }

    fn run<F, S>(
        &self,
        f: &F,
        mut x: Float,
        xend: Float,
        y: &mut [Float],
        rtol: &Tolerance,
        atol: &Tolerance,
        solout: &mut S,
        events: &mut [&mut dyn Event],
    ) -> Result<IntegrationResult, Error>
    where
        F: ODE,
        S: SolOut,
    {
        // --- Declarations ---
        let n = y.len();
        let tables = &self.tables;
        let size = tables.size();
        let posneg = (xend - x).signum();
        let hmax = self.hmax.unwrap_or((xend - x).abs());
        let bounds = StepBounds {
            hmin: self.hmin,
            hmax,
        };
        let mut rhs = EvaluationCounter::new(f, self.max_evaluations);
        let mut controller = OrderStepController::new(
            tables,
            self.step_control,
            self.order,
            &self.stability,
            rtol[0],
        );
        let mut steps = Steps::new();
        let mut records: Vec<EventRecord> = Vec::new();

        let mut y_dot0 = vec![0.0; n];
        let mut y_dot1 = vec![0.0; n];
        let mut y1 = vec![0.0; n];
        let mut y_tmp = vec![0.0; n];
        let mut y_event = vec![0.0; n];
        let mut scale = vec![0.0; n];
        let mut fk: Vec<Vec<Vec<Float>>> = tables
            .sequence
            .iter()
            .map(|&m| vec![vec![0.0; n]; m + 1])
            .collect();
        let mut diagonal = vec![vec![0.0; n]; size - 1];
        let mut y1_diag = vec![vec![0.0; n]; size - 1];
        let mut mid_dots = vec![vec![0.0; n]; 2 * size + 1];
        let mut dense = DenseOutput::new(n, 2 * size + 4);
        let mut h = 0.0;
        let status;

        // --- Initializations ---
        rhs.ode(x, y, &mut y_dot0)?;

        dense.at_rest(x, y, &y_dot0);
        match solout.solout(x, x, y, &dense) {
            ControlFlag::Interrupt => {
                return Ok(IntegrationResult::new(
                    x,
                    h,
                    Status::UserInterrupt,
                    rhs.evals,
                    steps,
                    records,
                ));
            }
            ControlFlag::ModifiedSolution(xm, ym) => {
                x = xm;
                y.copy_from_slice(&ym);
                rhs.ode(x, y, &mut y_dot0)?;
            }
            ControlFlag::Continue => {}
        }

        if x == xend {
            return Ok(IntegrationResult::new(
                x,
                h,
                Status::Success,
                rhs.evals,
                steps,
                records,
            ));
        }

        rescale(atol, rtol, y, y, &mut scale);
        let mut h_new = match self.h0 {
            Some(h0) => h0.abs().max(self.hmin).min(hmax),
            None => {
                rhs.charge(1)?;
                hinit(
                    rhs.f,
                    x,
                    y,
                    posneg,
                    &y_dot0,
                    &mut y_dot1,
                    &mut y1,
                    controller.initial_order(),
                    self.hmin,
                    hmax,
                    atol,
                    rtol,
                )
                .abs()
            }
        };
        debug!(
            "gbs: n = {n}, target level {}, initial step {h_new:e}",
            controller.target_iter
        );

        let mut states: Vec<EventState> = events
            .iter()
            .map(|event| EventState::new(&**event, x, y))
            .collect();

        // --- Main integration loop ---
        loop {
            // Check for maximum number of steps
            if steps.total >= self.nmax {
                warn!("gbs: more than nmax = {} steps needed at x = {x}", self.nmax);
                status = Status::NeedLargerNMax;
                break;
            }

            h = posneg * h_new;

            // Check for underflow due to machine rounding
            if 0.1 * h.abs() <= x.abs() * self.uround {
                warn!("gbs: step size {h:e} too small at x = {x}");
                status = Status::StepSizeTooSmall;
                break;
            }

            // Adjust last step to land on xend
            let is_last_step = (x + h - xend) * posneg >= 0.0;
            if is_last_step {
                h = xend - x;
            }
            let x_new = if is_last_step { xend } else { x + h };
            let h_abs = h.abs();

            steps.total += 1;

            // --- Extrapolation over increasing levels ---
            let mut k = 0;
            let verdict = loop {
                let (y_middle, y_end) = if k == 0 {
                    (&mut mid_dots[0], &mut y1)
                } else {
                    (&mut diagonal[k - 1], &mut y1_diag[k - 1])
                };
                fk[k][0].copy_from_slice(&y_dot0);
                let outcome = modified_midpoint(
                    &mut rhs,
                    x,
                    y,
                    h,
                    k,
                    &scale,
                    &self.stability,
                    &mut fk[k],
                    y_middle,
                    y_end,
                    &mut y_tmp,
                )?;

                if outcome == SubstepOutcome::Unstable {
                    break controller.unstable(h_abs, &bounds);
                }

                if k > 0 {
                    extrapolate(&tables.coeff, 0, k, &mut y1_diag, &mut y1);
                    rescale(atol, rtol, y, &y1, &mut scale);
                    let error = rms_error(&y1, &y1_diag[0], &scale);
                    trace!("gbs: x = {x}, h = {h:e}, level {k}, error {error:e}");
                    if error.is_nan() {
                        warn!("gbs: non-finite extrapolated state at x = {x}, h = {h:e}");
                        return Err(Error::NonFiniteState { x, h });
                    }
                    match controller.assess(k, error, h_abs, is_last_step, tables, &bounds) {
                        Ok(Verdict::Continue) => {}
                        other => break other,
                    }
                }
                k += 1;
            };

            let mut verdict = match verdict {
                Ok(v) => v,
                Err(_) => {
                    warn!("gbs: step size below hmin = {} at x = {x}", self.hmin);
                    status = Status::StepSizeTooSmall;
                    break;
                }
            };

            // --- Dense output ---
            let mut h_int = hmax;
            if verdict == Verdict::Converged {
                rhs.ode(x_new, &y1, &mut y_dot1)?;

                // State at the midpoint
                for j in 1..=k {
                    extrapolate(&tables.coeff, 0, j, &mut diagonal, &mut mid_dots[0]);
                }

                // Derivatives at the midpoint from centered differences
                let mu = self.interpolation.mu(k);
                for l in 0..mu.max(0) as usize {
                    let l2 = l / 2;
                    let factor = (0.5 * tables.sequence[l2] as Float).powi(l as i32);
                    let middle = fk[l2].len() / 2;
                    for i in 0..n {
                        mid_dots[l + 1][i] = factor * fk[l2][middle + l][i];
                    }
                    for j in 1..=k - l2 {
                        let factor = (0.5 * tables.sequence[j + l2] as Float).powi(l as i32);
                        let middle = fk[l2 + j].len() / 2;
                        for i in 0..n {
                            diagonal[j - 1][i] = factor * fk[l2 + j][middle + l][i];
                        }
                        extrapolate(&tables.coeff, l2, j, &mut diagonal, &mut mid_dots[l + 1]);
                    }
                    for v in mid_dots[l + 1].iter_mut() {
                        *v *= h;
                    }

                    for j in (l + 1) / 2..=k {
                        for m in (2 * (l + 1)..fk[j].len()).rev() {
                            let (lower, upper) = fk[j].split_at_mut(m);
                            for i in 0..n {
                                upper[0][i] -= lower[m - 2][i];
                            }
                        }
                    }
                }

                dense.compute_coefficients(mu, x, h, y, &y_dot0, &y1, &y_dot1, &mid_dots);
                if mu >= 0 && self.interpolation.use_error {
                    let interp_error = dense.estimate_error(&scale, &tables.error_factors);
                    h_int = (h / interp_error.powf(1.0 / (mu + 4) as Float).max(0.01)).abs();
                    if interp_error > 10.0 {
                        trace!("gbs: x = {x}, dense output error {interp_error:e}");
                        verdict = match controller.interpolation_reject(h_int, &bounds) {
                            Ok(v) => v,
                            Err(_) => {
                                warn!("gbs: step size below hmin = {} at x = {x}", self.hmin);
                                status = Status::StepSizeTooSmall;
                                break;
                            }
                        };
                    }
                }
            }

            if let Verdict::Reject { h_new: h_rej, reason } = verdict {
                trace!("gbs: step {h:e} at x = {x} rejected at level {k} ({reason:?})");
                steps.rejected += 1;
                controller.finish_step(true);
                h_new = h_rej.min(h_int);
                continue;
            }

            // --- Accepted step: events and output ---
            steps.accepted += 1;
            let mut t_start = x;
            let end = loop {
                let crossing = earliest_crossing(&states, events, x_new, &dense, &mut y_event)?;
                let Some(crossing) = crossing else {
                    dense.restrict(t_start, x_new);
                    break match solout.solout(t_start, x_new, &y1, &dense) {
                        ControlFlag::Continue => StepEnd::Completed,
                        ControlFlag::Interrupt => {
                            y_event.copy_from_slice(&y1);
                            StepEnd::Halt(x_new, Status::UserInterrupt)
                        }
                        ControlFlag::ModifiedSolution(xm, ym) => {
                            y_event.copy_from_slice(&ym);
                            StepEnd::Restart(xm)
                        }
                    };
                };

                let te = crossing.t;
                dense.restrict(t_start, te);
                dense.interpolate(te, &mut y_event);
                match solout.solout(t_start, te, &y_event, &dense) {
                    ControlFlag::Continue => {}
                    ControlFlag::Interrupt => break StepEnd::Halt(te, Status::UserInterrupt),
                    ControlFlag::ModifiedSolution(xm, ym) => {
                        y_event.copy_from_slice(&ym);
                        break StepEnd::Restart(xm);
                    }
                }

                records.push(EventRecord {
                    index: crossing.index,
                    t: te,
                    y: y_event.clone(),
                });
                let action =
                    events[crossing.index].event_occurred(te, &y_event, crossing.increasing);
                debug!("gbs: event {} at t = {te}: {action:?}", crossing.index);
                match action {
                    EventAction::Continue => {
                        states[crossing.index].pass(
                            &*events[crossing.index],
                            &crossing,
                            x_new,
                            &dense,
                            &mut y_tmp,
                        );
                        t_start = te;
                    }
                    EventAction::Stop => break StepEnd::Halt(te, Status::EventStop),
                    EventAction::ResetState => {
                        events[crossing.index].reset_state(te, &mut y_event);
                        break StepEnd::Restart(te);
                    }
                    EventAction::ResetDerivatives => break StepEnd::Restart(te),
                }
            };

            match end {
                StepEnd::Completed => {
                    x = x_new;
                    y.copy_from_slice(&y1);
                    y_dot0.copy_from_slice(&y_dot1);
                }
                StepEnd::Restart(xr) => {
                    x = xr;
                    y.copy_from_slice(&y_event);
                    rhs.ode(x, y, &mut y_dot0)?;
                }
                StepEnd::Halt(xh, halt) => {
                    x = xh;
                    y.copy_from_slice(&y_event);
                    if halt == Status::EventStop {
                        info!("gbs: stopped by event at x = {x}");
                    }
                    status = halt;
                    break;
                }
            }
            for (state, event) in states.iter_mut().zip(events.iter()) {
                state.reset(&**event, x, y);
            }

            // Normal exit
            if x == xend {
                status = Status::Success;
                break;
            }

            // Order and step size for the next step
            h_new = match controller.next_step(k, h_abs, tables, &bounds) {
                Ok(hn) => hn.min(h_int),
                Err(_) => {
                    warn!("gbs: step size below hmin = {} at x = {x}", self.hmin);
                    status = Status::StepSizeTooSmall;
                    break;
                }
            };
            controller.finish_step(false);
        }

        Ok(IntegrationResult::new(
            x,
            h,
            status,
            rhs.evals,
            steps,
            records,
        ))
    }
}

/// Gragg–Bulirsch–Stoer: adaptive order extrapolation of the modified
/// midpoint rule with step size control and dense output.
///
/// This function integrates `y' = f(x, y)` from `x` to `xend`, advancing the
/// provided state buffer `y` in place.
///
/// # Arguments
///
/// ## Defining the Problem
/// - `f`: Right‑hand side implementing `ODE`.
/// - `x`: Initial independent variable value.
/// - `xend`: Final independent variable value; may be smaller than `x`.
/// - `y`: Mutable slice containing the initial state; on return contains the
///   state at the final abscissa of the result.
/// - `rtol`, `atol`: Relative and absolute tolerances (see [`Tolerance`]).
///
/// ## Output Control
/// - `solout`: `SolOut` callback receiving the dense output of every
///   accepted step.
/// - `events`: event functions located within each accepted step.
///
/// ## Optional Settings
/// - `settings`: see [`Settings`]; `Settings::default()` suits most problems.
///
/// # Returns
/// A `Result` with `IntegrationResult` on success or a vector of `Error`
/// values describing input problems or a fatal runtime failure.
pub fn gbs<F, S>(
    f: &F,
    x: Float,
    xend: Float,
    y: &mut [Float],
    rtol: Tolerance,
    atol: Tolerance,
    solout: &mut S,
    events: &mut [&mut dyn Event],
    settings: Settings,
) -> Result<IntegrationResult, Vec<Error>>
where
    F: ODE,
    S: SolOut,
{
    GraggBulirschStoer::new(settings)?.integrate(f, x, xend, y, rtol, atol, solout, events)
}
