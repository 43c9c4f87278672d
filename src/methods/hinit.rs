//! Compute an initial step size guess

use crate::{Float, core::ode::ODE, methods::settings::Tolerance};

/// Compute an initial step size guess for a method of order `iord`.
///
/// One explicit Euler probe is taken, so `f` is evaluated exactly once.
/// `f0` holds the derivative at `(x, y)`; `f1` and `y1` are work space.
/// The result carries the sign of `posneg` and lies within `[hmin, hmax]`.
pub(crate) fn hinit<F>(
    f: &F,
    x: Float,
    y: &[Float],
    posneg: Float,
    f0: &[Float],
    f1: &mut [Float],
    y1: &mut [Float],
    iord: usize,
    hmin: Float,
    hmax: Float,
    atol: &Tolerance,
    rtol: &Tolerance,
) -> Float
where
    F: ODE,
{
    let n = y.len();
    let mut dnf: Float = 0.0;
    let mut dny: Float = 0.0;

    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        dnf += (f0[i] / sk) * (f0[i] / sk);
        dny += (y[i] / sk) * (y[i] / sk);
    }

    let mut h: Float = if dnf < 1e-10 || dny < 1e-10 {
        1.0e-6
    } else {
        0.01 * (dny / dnf).sqrt()
    };
    h = h.min(hmax) * posneg.signum();

    // Explicit Euler step: y1 = y + h * f0
    for i in 0..n {
        y1[i] = y[i] + h * f0[i];
    }
    f.ode(x + h, y1, f1);

    // Estimate second derivative
    let mut der2: Float = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        let df = (f1[i] - f0[i]) / sk;
        der2 += df * df;
    }
    der2 = der2.sqrt() / h.abs();

    let der12 = der2.max(dnf.sqrt());
    let h1: Float = if der12 < 1.0e-15 {
        (1.0e-6 as Float).max(0.001 * h.abs())
    } else {
        (0.01 / der12).powf(1.0 / iord as Float)
    };

    let h_final = (100.0 * h.abs())
        .min(h1)
        .max(1.0e-12 * x.abs())
        .max(hmin)
        .min(hmax);
    h_final * posneg.signum()
}
