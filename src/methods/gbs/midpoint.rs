//! Modified midpoint sub-stepper.

use crate::{Float, core::ode::ODE, error::Error};

use super::{control::StabilityCheck, counter::EvaluationCounter};

/// Result of one midpoint sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubstepOutcome {
    Completed,
    /// The stability check detected growth; the sequence was abandoned.
    Unstable,
}

/// Advance `y0` over `h` with the modified midpoint method at level `k`.
///
/// `f` holds `sequence[k] + 1` derivative vectors; `f[0]` is the derivative at
/// the step start and must be filled by the caller, the others are filled here.
/// On completion `y_end` holds the smoothed end state and `y_middle` the state
/// at the step midpoint. `y_tmp` is work space.
pub(crate) fn modified_midpoint<F: ODE>(
    rhs: &mut EvaluationCounter<F>,
    t0: Float,
    y0: &[Float],
    h: Float,
    k: usize,
    scale: &[Float],
    stability: &StabilityCheck,
    f: &mut [Vec<Float>],
    y_middle: &mut [Float],
    y_end: &mut [Float],
    y_tmp: &mut [Float],
) -> Result<SubstepOutcome, Error> {
    let n = y0.len();
    let m = f.len() - 1;
    let sub = h / m as Float;
    let sub2 = 2.0 * sub;

    // First sub-step: explicit Euler
    let mut t = t0 + sub;
    for i in 0..n {
        y_tmp[i] = y0[i];
        y_end[i] = y0[i] + sub * f[0][i];
    }
    rhs.ode(t, y_end, &mut f[1])?;

    // Remaining sub-steps: centered differences
    for j in 1..m {
        if 2 * j == m {
            y_middle.copy_from_slice(y_end);
        }

        t += sub;
        for i in 0..n {
            let middle = y_end[i];
            y_end[i] = y_tmp[i] + sub2 * f[j][i];
            y_tmp[i] = middle;
        }

        let (done, next) = f.split_at_mut(j + 1);
        rhs.ode(t, y_end, &mut next[0])?;

        if stability.applies(k, j) {
            let mut initial_norm = 0.0;
            let mut delta_norm = 0.0;
            for i in 0..n {
                let ratio = done[0][i] / scale[i];
                initial_norm += ratio * ratio;
                let ratio = (next[0][i] - done[0][i]) / scale[i];
                delta_norm += ratio * ratio;
            }
            if delta_norm > 4.0 * initial_norm.max(1.0e-15) {
                return Ok(SubstepOutcome::Unstable);
            }
        }
    }

    // Smoothing at the final node
    for i in 0..n {
        y_end[i] = 0.5 * (y_tmp[i] + y_end[i] + sub * f[m][i]);
    }

    Ok(SubstepOutcome::Completed)
}
