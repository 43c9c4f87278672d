//! SciPy-like solve_ivp entry point implementation

use log::debug;

use crate::{
    Float,
    core::ode::ODE,
    error::Error,
    methods::gbs::gbs,
};

use super::{
    cont::ContinuousOutput, options::IVPOptions, solout::DefaultSolOut, solution::IVPSolution,
};

/// Solve an initial value problem with SciPy-like options.
///
/// Samples are recorded at every accepted step, or at `t_eval` when given.
/// With `dense_output` the returned solution can be evaluated anywhere in
/// the integrated span.
pub fn solve_ivp<F>(
    f: &F,
    x0: Float,
    xend: Float,
    y0: &[Float],
    options: IVPOptions,
) -> Result<IVPSolution, Vec<Error>>
where
    F: ODE,
{
    let IVPOptions {
        rtol,
        atol,
        nmax,
        max_evaluations,
        t_eval,
        dense_output,
        solout,
        mut events,
        first_step,
        max_step,
        min_step,
        save_step_endpoints,
        mut settings,
    } = options;

    if let Some(te) = t_eval.as_deref() {
        check_t_eval(te, x0, xend)?;
    }

    // Aliases take precedence over the pass-through settings
    settings.nmax = nmax.or(settings.nmax);
    settings.max_evaluations = max_evaluations.or(settings.max_evaluations);
    settings.h0 = first_step.or(settings.h0);
    settings.hmax = max_step.or(settings.hmax);
    settings.hmin = min_step.or(settings.hmin);

    let save_endpoints = save_step_endpoints.unwrap_or(t_eval.is_none());
    let mut default_solout = DefaultSolOut::new(t_eval, save_endpoints, dense_output, solout);
    let mut y = y0.to_vec();

    let result = gbs(
        f,
        x0,
        xend,
        &mut y,
        rtol,
        atol,
        &mut default_solout,
        &mut events,
        settings,
    )?;
    debug!(
        "solve_ivp: {:?} at x = {} after {} steps",
        result.status, result.x, result.steps.total
    );

    let (t, y, segments) = default_solout.into_data();
    Ok(IVPSolution {
        t,
        y,
        status: result.status,
        evals: result.evals,
        steps: result.steps,
        events: result.events,
        dense_output: dense_output.then(|| ContinuousOutput::from_segments(segments)),
    })
}

/// `t_eval` must be non-empty, inside the span and ordered in integration direction.
fn check_t_eval(t_eval: &[Float], x0: Float, xend: Float) -> Result<(), Vec<Error>> {
    if t_eval.is_empty() {
        return Err(vec![Error::EmptyTEval]);
    }
    let dir = if xend >= x0 { 1.0 } else { -1.0 };
    let mut errors = Vec::new();
    let mut previous = x0;
    for (index, &value) in t_eval.iter().enumerate() {
        let inside = (value - x0) * dir >= 0.0 && (xend - value) * dir >= 0.0;
        if !inside || (value - previous) * dir < 0.0 {
            errors.push(Error::InvalidTEval { index, value });
        } else {
            previous = value;
        }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_eval_checks() {
        assert_eq!(check_t_eval(&[], 0.0, 1.0), Err(vec![Error::EmptyTEval]));
        assert_eq!(check_t_eval(&[0.0, 0.5, 1.0], 0.0, 1.0), Ok(()));
        assert_eq!(check_t_eval(&[0.0, -0.5, -1.0], 0.0, -1.0), Ok(()));
        assert_eq!(
            check_t_eval(&[0.5, 0.2, 1.5], 0.0, 1.0),
            Err(vec![
                Error::InvalidTEval { index: 1, value: 0.2 },
                Error::InvalidTEval { index: 2, value: 1.5 },
            ])
        );
    }
}
