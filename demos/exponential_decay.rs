//! # Example: Exponential Decay
//!
//! Solve the exponential decay equation and sample it on a fixed grid.
//!
//! Equations:
//! dy/dx = -k y
//!
//! Initial condition: y(0) = 1.0
//!

use gbs_ivp::prelude::*;

struct Decay {
    k: f64,
}

impl ODE for Decay {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        for i in 0..y.len() {
            dydx[i] = -self.k * y[i];
        }
    }
}

fn main() {
    let f = Decay { k: 0.8 };
    let x0 = 0.0;
    let xend = 5.0;
    let y0 = [1.0, 2.0];
    let t_eval: Vec<f64> = (0..=10).map(|i| i as f64 * 0.5).collect();

    let options = IVPOptions::builder()
        .rtol(1e-10)
        .atol(1e-12)
        .t_eval(t_eval)
        // A lower maximal order keeps the extrapolation tables small
        .settings(Settings::builder().max_order(10).build())
        .build();

    match solve_ivp(&f, x0, xend, &y0, options) {
        Ok(sol) => {
            println!("Final status: {:?}", sol.status);
            println!("Number of function evaluations: {}", sol.evals.ode);
            println!("Number of steps taken: {}", sol.steps.total);
            println!("Number of accepted steps: {}", sol.steps.accepted);
            println!("Number of rejected steps: {}", sol.steps.rejected);

            for (ti, yi) in sol.iter() {
                let exact = (-f.k * ti).exp();
                println!(
                    "x = {:.2}, y = [{:.10}, {:.10}], error = {:.2e}",
                    ti,
                    yi[0],
                    yi[1],
                    (yi[0] - exact).abs()
                );
            }
        }
        Err(e) => eprintln!("Integration failed: {:?}", e),
    }
}
