//! Dense output of the extrapolation integrator.
//!
//! After a step of size `h` from `x0` has been accepted, the solution on the
//! step is represented, with `θ = (t - x0) / h`, by the Hermite cubic through
//! both end points and end slopes plus a correction
//! `(θ (1 - θ))² Σ_j P[j] (θ - 1/2)^(j - 4)` fitted to the state and `mu`
//! derivatives at the midpoint, which are obtained by extrapolating centered
//! differences of the midpoint sequences.

use crate::{Float, core::interpolate::Interpolate};

/// Error scaling of the highest polynomial coefficient, indexed by `degree - 5`.
pub(crate) fn error_factors(max_degree: usize) -> Vec<Float> {
    (0..max_degree.saturating_sub(4))
        .map(|i| {
            let ip5 = (i + 5) as Float;
            let e = 0.5 * ((i + 1) as Float / ip5).sqrt();
            (0..=i).fold(1.0 / (ip5 * ip5), |acc, j| acc * e / (j + 1) as Float)
        })
        .collect()
}

/// Interpolation polynomial of one accepted step.
#[derive(Clone, Debug)]
pub struct DenseOutput {
    /// Start of the full step; origin of `θ`.
    x0: Float,
    /// Size of the full step.
    h: Float,
    /// Interval reported to observers, possibly shortened by an event.
    xold: Float,
    x: Float,
    degree: usize,
    polynomials: Vec<Vec<Float>>,
    y1: Vec<Float>,
    /// Derivative at the midpoint, answered when `h == 0`.
    mid_dot: Vec<Float>,
}

impl DenseOutput {
    /// Storage for states of dimension `n` and polynomials up to `max_degree`.
    pub(crate) fn new(n: usize, max_degree: usize) -> Self {
        Self {
            x0: 0.0,
            h: 0.0,
            xold: 0.0,
            x: 0.0,
            degree: 3,
            polynomials: vec![vec![0.0; n]; max_degree + 1],
            y1: vec![0.0; n],
            mid_dot: vec![0.0; n],
        }
    }

    /// Zero-length step at `(x, y)` with slope `dy`.
    pub(crate) fn at_rest(&mut self, x: Float, y: &[Float], dy: &[Float]) {
        self.x0 = x;
        self.h = 0.0;
        self.xold = x;
        self.x = x;
        self.degree = 3;
        self.polynomials[0].copy_from_slice(y);
        for p in &mut self.polynomials[1..4] {
            p.fill(0.0);
        }
        self.y1.copy_from_slice(y);
        self.mid_dot.copy_from_slice(dy);
    }

    /// Fit the polynomial of the step `[x0, x0 + h]`.
    ///
    /// `mid_dots[0]` is the midpoint state and `mid_dots[j]` the `j`-th midpoint
    /// derivative scaled by `h^j`, for `j <= mu`. A negative `mu` leaves the
    /// plain Hermite cubic.
    pub(crate) fn compute_coefficients(
        &mut self,
        mu: isize,
        x0: Float,
        h: Float,
        y0: &[Float],
        y0_dot: &[Float],
        y1: &[Float],
        y1_dot: &[Float],
        mid_dots: &[Vec<Float>],
    ) {
        self.x0 = x0;
        self.h = h;
        self.xold = x0;
        self.x = x0 + h;
        self.degree = (mu + 4).max(3) as usize;
        self.y1.copy_from_slice(y1);

        let p = &mut self.polynomials;
        for i in 0..y0.len() {
            let yp0 = h * y0_dot[i];
            let yp1 = h * y1_dot[i];
            let ydiff = y1[i] - y0[i];
            let aspl = ydiff - yp1;
            let bspl = yp0 - ydiff;

            p[0][i] = y0[i];
            p[1][i] = ydiff;
            p[2][i] = aspl;
            p[3][i] = bspl;

            self.mid_dot[i] = if mu > 0 && h != 0.0 {
                mid_dots[1][i] / h
            } else {
                0.5 * (y0_dot[i] + y1_dot[i])
            };

            if mu < 0 {
                continue;
            }

            // Hermite cubic and its scaled derivatives at θ = 1/2
            let ph0 = 0.5 * (y0[i] + y1[i]) + 0.125 * (aspl + bspl);
            p[4][i] = 16.0 * (mid_dots[0][i] - ph0);

            if mu > 0 {
                let ph1 = ydiff + 0.25 * (aspl - bspl);
                p[5][i] = 16.0 * (mid_dots[1][i] - ph1);

                if mu > 1 {
                    let ph2 = yp1 - yp0;
                    p[6][i] = 16.0 * (mid_dots[2][i] - ph2 + p[4][i]);

                    if mu > 2 {
                        let ph3 = 6.0 * (bspl - aspl);
                        p[7][i] = 16.0 * (mid_dots[3][i] - ph3 + 3.0 * p[5][i]);

                        for j in 4..=mu as usize {
                            let fac1 = 0.5 * j as Float * (j - 1) as Float;
                            let fac2 = 2.0 * fac1 * (j - 2) as Float * (j - 3) as Float;
                            p[j + 4][i] =
                                16.0 * (mid_dots[j][i] + fac1 * p[j + 2][i] - fac2 * p[j][i]);
                        }
                    }
                }
            }
        }
    }

    /// Scaled norm of the highest coefficient; zero below degree five.
    pub(crate) fn estimate_error(&self, scale: &[Float], error_factors: &[Float]) -> Float {
        if self.degree < 5 {
            return 0.0;
        }
        let top = &self.polynomials[self.degree];
        let mut error = 0.0;
        for i in 0..scale.len() {
            let e = top[i] / scale[i];
            error += e * e;
        }
        (error / scale.len() as Float).sqrt() * error_factors[self.degree - 5]
    }

    /// Report only `[xold, x]` as the valid interval.
    pub(crate) fn restrict(&mut self, xold: Float, x: Float) {
        self.xold = xold;
        self.x = x;
    }

    /// Degree of the current polynomial.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of state components.
    pub fn dimension(&self) -> usize {
        self.y1.len()
    }

    fn evaluate(&self, xi: Float, mut yi: Option<&mut [Float]>, mut dyi: Option<&mut [Float]>) {
        let h = self.h;
        let theta = if h == 0.0 { 0.0 } else { (xi - self.x0) / h };
        let one_minus_theta = 1.0 - theta;
        let theta05 = theta - 0.5;
        let t_omt = theta * one_minus_theta;
        let t4 = t_omt * t_omt;
        let t4_dot = 2.0 * t_omt * (1.0 - 2.0 * theta);
        let dot2 = theta * (2.0 - 3.0 * theta);
        let dot3 = (3.0 * theta - 4.0) * theta + 1.0;
        let p = &self.polynomials;

        for i in 0..self.y1.len() {
            let q = p[2][i] * theta + p[3][i] * one_minus_theta;
            // Expand around the nearer end of the step
            let mut state = if theta <= 0.5 {
                p[0][i] + theta * (p[1][i] + one_minus_theta * q)
            } else {
                self.y1[i] - one_minus_theta * (p[1][i] - theta * q)
            };
            let mut deriv = p[1][i] + dot2 * p[2][i] + dot3 * p[3][i];

            if self.degree > 3 {
                let mut c = p[self.degree][i];
                let mut c_dot = 0.0;
                for j in (4..self.degree).rev() {
                    let d = 1.0 / (j - 3) as Float;
                    c_dot = d * (theta05 * c_dot + c);
                    c = p[j][i] + c * d * theta05;
                }
                state += t4 * c;
                deriv += t4 * c_dot + t4_dot * c;
            }

            if let Some(yi) = yi.as_deref_mut() {
                yi[i] = state;
            }
            if let Some(dyi) = dyi.as_deref_mut() {
                dyi[i] = if h == 0.0 { self.mid_dot[i] } else { deriv / h };
            }
        }
    }
}

impl Interpolate for DenseOutput {
    fn xold(&self) -> Float {
        self.xold
    }

    fn x(&self) -> Float {
        self.x
    }

    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        self.evaluate(xi, Some(yi), None);
    }

    fn interpolate_derivative(&self, xi: Float, dyi: &mut [Float]) {
        self.evaluate(xi, None, Some(dyi));
    }

    fn get_cont(&self) -> DenseOutput {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Dense output of y = exp(t) on [0, h] fitted with exact midpoint data.
    fn exp_step(mu: isize, h: Float) -> DenseOutput {
        let e = h.exp();
        let mid = (0.5 * h).exp();
        let mid_dots: Vec<Vec<Float>> = (0..=mu.max(0))
            .map(|j| vec![h.powi(j as i32) * mid])
            .collect();
        let mut dense = DenseOutput::new(1, 20);
        dense.compute_coefficients(mu, 0.0, h, &[1.0], &[1.0], &[e], &[e], &mid_dots);
        dense
    }

    #[test]
    fn reproduces_end_points_and_slopes() {
        let h = 0.5;
        for mu in [-1, 0, 3, 6] {
            let dense = exp_step(mu, h);
            let mut y = [0.0];
            let mut dy = [0.0];
            dense.interpolate(0.0, &mut y);
            dense.interpolate_derivative(0.0, &mut dy);
            assert_eq!(y[0], 1.0);
            assert_relative_eq!(dy[0], 1.0, max_relative = 1e-14);
            dense.interpolate(h, &mut y);
            dense.interpolate_derivative(h, &mut dy);
            assert_eq!(y[0], h.exp());
            assert_relative_eq!(dy[0], h.exp(), max_relative = 1e-14);
        }
    }

    #[test]
    fn accuracy_grows_with_degree() {
        let h = 0.5;
        let mut y = [0.0];
        let error = |mu| {
            let dense = exp_step(mu, h);
            let mut y = [0.0];
            dense.interpolate(0.3 * h, &mut y);
            (y[0] - (0.3 * h).exp()).abs()
        };
        assert!(error(-1) < 1e-3);
        assert!(error(0) < 1e-5);
        assert!(error(2) < 1e-8);
        assert!(error(4) < 1e-12);

        let dense = exp_step(4, h);
        dense.interpolate(0.5 * h, &mut y);
        assert_relative_eq!(y[0], (0.5 * h).exp(), max_relative = 1e-15);
        assert_eq!(dense.degree(), 8);
    }

    #[test]
    fn halves_join_continuously() {
        let h = 0.8;
        let dense = exp_step(2, h);
        let (mut below, mut above) = ([0.0], [0.0]);
        dense.interpolate(0.5 * h - 1e-12, &mut below);
        dense.interpolate(0.5 * h + 1e-12, &mut above);
        assert_abs_diff_eq!(below[0], above[0], epsilon = 1e-11);
    }

    #[test]
    fn zero_step_returns_midpoint_slope() {
        let mut dense = DenseOutput::new(2, 10);
        dense.at_rest(3.0, &[1.0, -2.0], &[0.25, 4.0]);
        let mut y = [0.0; 2];
        let mut dy = [0.0; 2];
        dense.interpolate(3.0, &mut y);
        dense.interpolate_derivative(3.0, &mut dy);
        assert_eq!(y, [1.0, -2.0]);
        assert_eq!(dy, [0.25, 4.0]);
        assert!(y.iter().chain(dy.iter()).all(|v| v.is_finite()));
        assert_eq!((dense.xold(), dense.x()), (3.0, 3.0));
    }

    #[test]
    fn interpolation_error_tracks_top_coefficient() {
        let scale = [1e-6];
        let factors = error_factors(20);
        assert_eq!(exp_step(0, 0.5).estimate_error(&scale, &factors), 0.0);
        let coarse = exp_step(2, 1.0).estimate_error(&scale, &factors);
        let fine = exp_step(2, 0.25).estimate_error(&scale, &factors);
        assert!(coarse > 0.0);
        assert!(fine < coarse);
    }

    #[test]
    fn estimated_error_bounds_taylor_deviation() {
        let h = 0.5;
        let scale = [1e-6];
        let factors = error_factors(20);
        let taylor = |t: Float| {
            (1..30).fold((1.0, 1.0), |(sum, term), j| {
                let term = term * t / j as Float;
                (sum + term, term)
            })
            .0
        };
        for mu in [1, 2, 4] {
            let dense = exp_step(mu, h);
            let estimate = dense.estimate_error(&scale, &factors);
            for theta in [0.25, 0.5, 0.75] {
                let mut y = [0.0];
                dense.interpolate(theta * h, &mut y);
                let deviation = (y[0] - taylor(theta * h)).abs() / scale[0];
                assert!(deviation <= estimate, "mu = {mu}, theta = {theta}");
            }
        }
    }

    #[test]
    fn error_factors_decrease() {
        let factors = error_factors(12);
        assert_eq!(factors.len(), 8);
        assert_relative_eq!(factors[0], 1.0 / 25.0 * 0.5 * (0.2 as Float).sqrt());
        assert!(factors.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn restriction_only_moves_reported_bounds() {
        let h = 0.5;
        let mut dense = exp_step(3, h);
        let mut before = [0.0];
        dense.interpolate(0.2, &mut before);
        dense.restrict(0.0, 0.3);
        let mut after = [0.0];
        dense.interpolate(0.2, &mut after);
        assert_eq!(before, after);
        assert_eq!(dense.x(), 0.3);
        let copy = dense.get_cont();
        assert_eq!(copy.x(), 0.3);
    }
}
