//! Example: drive the integrator directly and print the solution at a fixed
//! output interval from the dense output of each step.

use gbs_ivp::prelude::*;
use std::f64::consts::PI;

struct HarmonicOscillator {
    omega: f64,
}

impl ODE for HarmonicOscillator {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = -self.omega * self.omega * y[0];
    }
}

/// Prints the state every `dx` and the degree of the polynomial it came from.
struct Printer {
    xout: f64,
    dx: f64,
}

impl SolOut for Printer {
    fn solout<I: Interpolate>(
        &mut self,
        xold: f64,
        x: f64,
        y: &[f64],
        interpolator: &I,
    ) -> ControlFlag {
        if xold == x {
            println!("x = {:>8.5}, y = {:?}", x, y);
            self.xout = x + self.dx;
            return ControlFlag::Continue;
        }
        let degree = interpolator.get_cont().degree();
        let mut yi = vec![0.0; y.len()];
        while (self.xout - x) * self.dx.signum() <= 0.0 {
            interpolator.interpolate(self.xout, &mut yi);
            println!("x = {:>8.5}, y = {:?} (degree {})", self.xout, yi, degree);
            self.xout += self.dx;
        }
        ControlFlag::Continue
    }
}

fn main() {
    let oscillator = HarmonicOscillator { omega: 2.0 };
    let integrator = match GraggBulirschStoer::new(Settings::default()) {
        Ok(integrator) => integrator,
        Err(errors) => {
            eprintln!("Invalid settings: {:?}", errors);
            return;
        }
    };

    // Two periods, then back to the start with the same instance
    let period = PI;
    let mut y = [1.0, 0.0];
    for (x0, xend) in [(0.0, 2.0 * period), (2.0 * period, 0.0)] {
        let mut printer = Printer {
            xout: x0,
            dx: (xend - x0).signum() * period / 4.0,
        };
        match integrator.integrate(
            &oscillator,
            x0,
            xend,
            &mut y,
            1e-9.into(),
            1e-9.into(),
            &mut printer,
            &mut [],
        ) {
            Ok(res) => println!(
                "{:?} at x = {:.5}: y = {:?}, {} evaluations, {} steps ({} rejected)",
                res.status, res.x, y, res.evals.ode, res.steps.total, res.steps.rejected
            ),
            Err(e) => eprintln!("Integration failed: {:?}", e),
        }
    }
}
