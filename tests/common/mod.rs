#![allow(dead_code)]

use gbs_ivp::prelude::*;

pub const GRAVITY: f64 = 9.81;

/// y' = -y, y(0) = 1
pub struct Decay;

impl ODE for Decay {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = -y[0];
    }
}

/// Simple harmonic oscillator; y(0) = [1, 0] gives (cos t, -sin t).
pub struct SHO;

impl ODE for SHO {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = -y[0];
    }
}

/// Ball under gravity, state `[height, velocity]`.
pub struct FallingBall;

impl ODE for FallingBall {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = -GRAVITY;
    }
}

/// Ground contact: stops the ball, or bounces it with the given restitution.
pub struct Ground {
    pub restitution: Option<f64>,
}

impl Event for Ground {
    fn g(&self, _t: f64, y: &[f64]) -> f64 {
        y[0]
    }

    fn config(&self) -> EventConfig {
        EventConfig::builder().direction(EventDirection::Negative).build()
    }

    fn event_occurred(&mut self, _t: f64, _y: &[f64], _increasing: bool) -> EventAction {
        match self.restitution {
            Some(_) => EventAction::ResetState,
            None => EventAction::Stop,
        }
    }

    fn reset_state(&mut self, _t: f64, y: &mut [f64]) {
        if let Some(e) = self.restitution {
            y[0] = 0.0;
            y[1] = -e * y[1];
        }
    }
}

/// Time for a ball released at rest from `height` to reach the ground.
pub fn fall_time(height: f64) -> f64 {
    (2.0 * height / GRAVITY).sqrt()
}

pub fn tight_opts<'a>() -> IVPOptions<'a> {
    IVPOptions::builder().rtol(1e-10).atol(1e-10).build()
}

pub fn default_opts_dense<'a>() -> IVPOptions<'a> {
    IVPOptions::builder()
        .rtol(1e-10)
        .atol(1e-10)
        .dense_output(true)
        .build()
}

pub fn init_logger() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Trace,
        simplelog::Config::default(),
    );
}
