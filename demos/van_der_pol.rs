//! # Example: Van der Pol oscillator
//!
//! Solve the Van der Pol oscillator as a first-order system. With a moderate
//! damping parameter the problem is non-stiff and well suited to extrapolation.
//!
//! Equations:
//! dy0/dt = y1
//! dy1/dt = mu (1 - y0^2) y1 - y0
//!
//! Initial conditions: y0(0) = 2.0, y1(0) = 0.0
//!

use gbs_ivp::prelude::*;

struct VanDerPol {
    mu: f64,
}

impl ODE for VanDerPol {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0];
    }
}

fn main() {
    let van_der_pol = VanDerPol { mu: 5.0 };
    let x0 = 0.0;
    let xend = 20.0;
    let y0 = [2.0, 0.0];
    let t_eval = (0..=40).map(|i| i as f64 * 0.5).collect();
    let options = IVPOptions::builder()
        .rtol(1e-9)
        .atol(1e-9)
        .t_eval(t_eval)
        .nmax(10_000)
        .max_evaluations(2_000_000)
        .build();

    match solve_ivp(&van_der_pol, x0, xend, &y0, options) {
        Ok(sol) => {
            println!("Finished status: {:?}", sol.status);
            if let (Some(&t_last), Some(y_last)) = (sol.t.last(), sol.y.last()) {
                println!("Final State: x = {:.5}, y = {:?}", t_last, y_last);
            }
            println!("Number of function evaluations: {}", sol.evals.ode);
            println!("Number of steps taken: {}", sol.steps.total);
            println!("Number of accepted steps: {}", sol.steps.accepted);
            println!("Number of rejected steps: {}", sol.steps.rejected);

            for (ti, yi) in sol.iter() {
                println!("x = {:>8.5}, y = {:?}", ti, yi);
            }
        }
        Err(e) => eprintln!("solve_ivp failed: {:?}", e),
    }
}
