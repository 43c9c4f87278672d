//! Event location along the dense output of accepted steps.
//!
//! Each event keeps the abscissa and value of `g` at the last point it was
//! checked. Inside a step, `g` is sampled on the interpolated solution at most
//! `max_check_interval` apart; the first sign change is refined with Brent's
//! method.

use log::warn;

use crate::{
    Float,
    core::{
        event::{Event, EventConfig},
        interpolate::Interpolate,
    },
    error::Error,
};

/// A located zero of an event function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Crossing {
    pub index: usize,
    pub t: Float,
    /// `g` increases through zero with respect to the independent variable.
    pub increasing: bool,
    /// Sign of `g` right after the crossing, in integration direction.
    after_positive: bool,
}

/// Tracking state of one event.
#[derive(Clone, Debug)]
pub(crate) struct EventState {
    config: EventConfig,
    t_last: Float,
    g_last: Float,
}

impl EventState {
    pub fn new(event: &dyn Event, t: Float, y: &[Float]) -> Self {
        Self {
            config: checked(event.config()),
            t_last: t,
            g_last: event.g(t, y),
        }
    }

    /// Restart tracking at `(t, y)`, after an accepted step or a state reset.
    pub fn reset(&mut self, event: &dyn Event, t: Float, y: &[Float]) {
        self.t_last = t;
        self.g_last = event.g(t, y);
    }

    /// First reported sign change of `g` in `(t_last, t_end]`.
    pub fn find_crossing<I: Interpolate>(
        &self,
        index: usize,
        event: &dyn Event,
        t_end: Float,
        interpolator: &I,
        y: &mut [Float],
    ) -> Result<Option<Crossing>, Error> {
        let span = t_end - self.t_last;
        if span == 0.0 {
            return Ok(None);
        }
        let dir = span.signum();
        let samples = ((span.abs() / self.config.max_check_interval).ceil() as usize).max(1);

        let mut ta = self.t_last;
        let mut ga = self.g_last;
        for s in 1..=samples {
            let tb = if s == samples {
                t_end
            } else {
                self.t_last + span * s as Float / samples as Float
            };
            interpolator.interpolate(tb, y);
            let gb = event.g(tb, y);

            if (ga >= 0.0) != (gb >= 0.0) {
                let increasing = (gb >= 0.0) == (dir > 0.0);
                if self.config.direction.accepts(increasing) {
                    let g = |t: Float| {
                        interpolator.interpolate(t, y);
                        event.g(t, y)
                    };
                    let (tol, max_iter) = (self.config.convergence, self.config.max_iterations);
                    let t = brent(g, ta, tb, ga, gb, tol, max_iter)
                        .map_err(|failure| failure.into_error(index, ta, tb, ga, gb))?;
                    return Ok(Some(Crossing {
                        index,
                        t,
                        increasing,
                        after_positive: gb >= 0.0,
                    }));
                }
            }
            ta = tb;
            ga = gb;
        }
        Ok(None)
    }

    /// Move past a handled crossing, restarting the search slightly after it.
    pub fn pass<I: Interpolate>(
        &mut self,
        event: &dyn Event,
        crossing: &Crossing,
        t_end: Float,
        interpolator: &I,
        y: &mut [Float],
    ) {
        let dir = (t_end - crossing.t).signum();
        let mut t = crossing.t + dir * self.config.convergence;
        if (t - t_end) * dir > 0.0 {
            t = t_end;
        }
        interpolator.interpolate(t, y);
        let g = event.g(t, y);
        self.t_last = t;
        self.g_last = if (g >= 0.0) == crossing.after_positive {
            g
        } else if crossing.after_positive {
            Float::MIN_POSITIVE
        } else {
            -Float::MIN_POSITIVE
        };
    }
}

/// Replace out-of-range location parameters by their defaults.
fn checked(config: EventConfig) -> EventConfig {
    let default = EventConfig::default();
    let mut checked = config;
    if !(config.max_check_interval > 0.0) {
        warn!(
            "event max_check_interval = {} must be positive, using default {}",
            config.max_check_interval, default.max_check_interval
        );
        checked.max_check_interval = default.max_check_interval;
    }
    if !(config.convergence > 0.0 && config.convergence.is_finite()) {
        warn!(
            "event convergence = {} must be positive and finite, using default {}",
            config.convergence, default.convergence
        );
        checked.convergence = default.convergence;
    }
    if config.max_iterations == 0 {
        warn!(
            "event max_iterations must be positive, using default {}",
            default.max_iterations
        );
        checked.max_iterations = default.max_iterations;
    }
    checked
}

/// Earliest reported crossing of all events in integration direction.
pub(crate) fn earliest_crossing<I: Interpolate>(
    states: &[EventState],
    events: &[&mut dyn Event],
    t_end: Float,
    interpolator: &I,
    y: &mut [Float],
) -> Result<Option<Crossing>, Error> {
    let mut earliest: Option<Crossing> = None;
    for (index, (state, event)) in states.iter().zip(events.iter()).enumerate() {
        let dir = (t_end - state.t_last).signum();
        if let Some(c) = state.find_crossing(index, &**event, t_end, interpolator, y)? {
            match earliest {
                Some(e) if (c.t - e.t) * dir >= 0.0 => {}
                _ => earliest = Some(c),
            }
        }
    }
    Ok(earliest)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RootFailure {
    SameSignBracket,
    DidNotConverge { iterations: usize, t: Float },
}

impl RootFailure {
    fn into_error(self, index: usize, t_a: Float, t_b: Float, g_a: Float, g_b: Float) -> Error {
        match self {
            RootFailure::SameSignBracket => Error::EventBracketing {
                index,
                t_a,
                t_b,
                g_a,
                g_b,
            },
            RootFailure::DidNotConverge { iterations, t } => Error::EventNotConverged {
                index,
                iterations,
                t,
            },
        }
    }
}

/// Brent's method on the bracket `[a, b]` (either order) with known end values.
fn brent<G>(
    mut g: G,
    a: Float,
    b: Float,
    fa: Float,
    fb: Float,
    tol: Float,
    max_iter: usize,
) -> Result<Float, RootFailure>
where
    G: FnMut(Float) -> Float,
{
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if (fa > 0.0) == (fb > 0.0) {
        return Err(RootFailure::SameSignBracket);
    }

    let (mut xa, mut xb, mut fa, mut fb) = (a, b, fa, fb);
    let mut xc = xa;
    let mut fc = fa;
    let mut d = xb - xa;
    let mut e = d;

    for _ in 0..max_iter {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            xc = xa;
            fc = fa;
            d = xb - xa;
            e = d;
        }

        if fc.abs() < fb.abs() {
            xa = xb;
            xb = xc;
            xc = xa;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * Float::EPSILON * xb.abs() + 0.5 * tol;
        let xm = 0.5 * (xc - xb);

        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(xb);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if xa == xc {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (xb - xa) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };

            if 2.0 * p < (3.0 * xm * q - (tol1 * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        xa = xb;
        fa = fb;
        if d.abs() > tol1 {
            xb += d;
        } else {
            xb += if xm > 0.0 { tol1 } else { -tol1 };
        }
        fb = g(xb);
    }

    Err(RootFailure::DidNotConverge {
        iterations: max_iter,
        t: xb,
    })
}
