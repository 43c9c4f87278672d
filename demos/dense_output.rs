//! Example: Dense output interpolation on a harmonic oscillator

use gbs_ivp::prelude::*;
use std::f64::consts::PI;

struct SHO;

impl ODE for SHO {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        // y' = [y1, -y0]
        dydx[0] = y[1];
        dydx[1] = -y[0];
    }
}

fn main() {
    let f = SHO;
    let x0 = 0.0;
    let xend = 2.0 * PI; // one period
    let y0 = [1.0, 0.0];

    let options = IVPOptions::builder()
        .rtol(1e-9)
        .atol(1e-9)
        .dense_output(true)
        .build();

    let sol = match solve_ivp(&f, x0, xend, &y0, options) {
        Ok(sol) => sol,
        Err(e) => {
            eprintln!("solve_ivp failed: {:?}", e);
            return;
        }
    };
    println!("Final status: {:?}", sol.status);
    println!(
        "Steps: {} (accepted {} / rejected {}), {} evaluations",
        sol.steps.total, sol.steps.accepted, sol.steps.rejected, sol.evals.ode
    );

    // Few large steps, yet the continuous solution is accurate on a fine grid
    let Some((t0, t1)) = sol.sol_span() else {
        println!("dense output was not enabled");
        return;
    };
    let npts = 40;
    let ts: Vec<f64> = (0..=npts)
        .map(|i| t0 + (t1 - t0) * (i as f64) / (npts as f64))
        .collect();
    let ys = sol.sol_many(&ts);

    let mut max_error: f64 = 0.0;
    for (i, (t, y_opt)) in ts.iter().zip(ys.iter()).enumerate() {
        if let Some(y) = y_opt {
            let y_ref = [t.cos(), -t.sin()];
            max_error = max_error.max((y[0] - y_ref[0]).abs()).max((y[1] - y_ref[1]).abs());
            if i % 8 == 0 {
                println!(
                    "t = {:>7.4}, y = [{:>.9}, {:>.9}]  ref = [{:>.9}, {:>.9}]",
                    t, y[0], y[1], y_ref[0], y_ref[1]
                );
            }
        }
    }
    println!("Largest interpolation error on the grid: {:.2e}", max_error);
}
