//! Aitken–Neville extrapolation and the scaled error norm.

use crate::{Float, methods::settings::Tolerance};

/// Fold level `k` into the extrapolation table.
///
/// `diag[0..k]` holds the raw estimates of levels `1..=k` on entry, `last` the
/// extrapolated value up to level `k - 1`. On exit `last` holds the value
/// extrapolated up to level `k` and `diag[0]` the one of level `k - 1`.
/// `offset` shifts the coefficient row, as needed for midpoint derivatives.
pub(crate) fn extrapolate(
    coeff: &[Vec<Float>],
    offset: usize,
    k: usize,
    diag: &mut [Vec<Float>],
    last: &mut [Float],
) {
    let row = &coeff[k + offset];
    for j in 1..k {
        let (lower, upper) = diag.split_at_mut(k - j);
        let hi = &upper[0];
        let lo = &mut lower[k - j - 1];
        let c = row[j - 1];
        for i in 0..last.len() {
            lo[i] = hi[i] + c * (hi[i] - lo[i]);
        }
    }
    let c = row[k - 1];
    for i in 0..last.len() {
        last[i] = diag[0][i] + c * (diag[0][i] - last[i]);
    }
}

/// Per-component error scale `atol + rtol * max(|y1|, |y2|)`.
pub(crate) fn rescale(
    atol: &Tolerance,
    rtol: &Tolerance,
    y1: &[Float],
    y2: &[Float],
    scale: &mut [Float],
) {
    for i in 0..scale.len() {
        scale[i] = atol[i] + rtol[i] * y1[i].abs().max(y2[i].abs());
    }
}

/// Scaled RMS norm of `a - b`.
pub(crate) fn rms_error(a: &[Float], b: &[Float], scale: &[Float]) -> Float {
    let n = a.len();
    let mut err = 0.0;
    for i in 0..n {
        let e = (a[i] - b[i]) / scale[i];
        err += e * e;
    }
    (err / n as Float).sqrt()
}
