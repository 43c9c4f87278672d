//! # Example: Bouncing ball
//!
//! A ball dropped from 10 m loses 20 % of its speed at every bounce. The
//! ground contact is an event that resets the velocity; integration stops
//! once the rebound speed drops below a threshold.
//!
//! A `SimpleLogger` at info level shows the integrator's own report of the stop.

use gbs_ivp::prelude::*;
use simplelog::{Config, LevelFilter, SimpleLogger};

const GRAVITY: f64 = 9.81;

struct Ball;

impl ODE for Ball {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = -GRAVITY;
    }
}

struct Ground {
    restitution: f64,
    min_speed: f64,
    bounces: usize,
}

impl Event for Ground {
    fn g(&self, _t: f64, y: &[f64]) -> f64 {
        y[0]
    }

    fn config(&self) -> EventConfig {
        EventConfig::builder()
            .direction(EventDirection::Negative)
            .convergence(1e-12)
            .build()
    }

    fn event_occurred(&mut self, t: f64, y: &[f64], _increasing: bool) -> EventAction {
        let rebound = -self.restitution * y[1];
        if rebound < self.min_speed {
            println!("ball comes to rest at t = {:.6}", t);
            return EventAction::Stop;
        }
        self.bounces += 1;
        println!("bounce {} at t = {:.6}, rebound speed {:.4}", self.bounces, t, rebound);
        EventAction::ResetState
    }

    fn reset_state(&mut self, _t: f64, y: &mut [f64]) {
        y[0] = 0.0;
        y[1] = -self.restitution * y[1];
    }
}

fn main() {
    let _ = SimpleLogger::init(LevelFilter::Info, Config::default());

    let mut ground = Ground {
        restitution: 0.8,
        min_speed: 1.0,
        bounces: 0,
    };
    let options = IVPOptions::builder()
        .rtol(1e-10)
        .atol(1e-10)
        .dense_output(true)
        .events(vec![&mut ground as &mut dyn Event])
        .build();

    match solve_ivp(&Ball, 0.0, 60.0, &[10.0, 0.0], options) {
        Ok(sol) => {
            println!("Finished status: {:?}", sol.status);
            println!("Number of function evaluations: {}", sol.evals.ode);
            println!("Events located: {}", sol.events.len());
            if let Some((t0, t1)) = sol.sol_span() {
                let npts = 20;
                for i in 0..=npts {
                    let t = t0 + (t1 - t0) * i as f64 / npts as f64;
                    if let Some(y) = sol.sol(t) {
                        println!("t = {:>8.4}, height = {:>8.4}", t, y[0]);
                    }
                }
            }
        }
        Err(e) => eprintln!("solve_ivp failed: {:?}", e),
    }
}
