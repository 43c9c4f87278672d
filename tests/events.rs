use approx::assert_abs_diff_eq;
use gbs_ivp::prelude::*;

mod common;
use common::{FallingBall, Ground, SHO, fall_time, init_logger};

#[test]
fn ground_contact_stops_integration() {
    init_logger();
    let mut ground = Ground { restitution: None };
    let options = IVPOptions::builder()
        .rtol(1e-10)
        .atol(1e-10)
        .events(vec![&mut ground as &mut dyn Event])
        .build();
    let sol = solve_ivp(&FallingBall, 0.0, 5.0, &[10.0, 0.0], options).unwrap();

    assert_eq!(sol.status, Status::EventStop);
    let t_hit = fall_time(10.0);
    assert_eq!(sol.events.len(), 1);
    assert_eq!(sol.events[0].index, 0);
    assert_abs_diff_eq!(sol.events[0].t, t_hit, epsilon = 1e-8);
    assert_abs_diff_eq!(*sol.t.last().unwrap(), t_hit, epsilon = 1e-8);
    let y = sol.y.last().unwrap();
    assert_abs_diff_eq!(y[0], 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(y[1], -9.81 * t_hit, epsilon = 1e-7);
}

#[test]
fn ball_bounces_with_state_reset() {
    let mut ground = Ground {
        restitution: Some(0.9),
    };
    let mut y = [10.0, 0.0];
    let mut events: [&mut dyn Event; 1] = [&mut ground];
    let res = gbs(
        &FallingBall,
        0.0,
        5.0,
        &mut y,
        1e-10.into(),
        1e-10.into(),
        &mut NoSolOut,
        &mut events,
        Settings::default(),
    )
    .unwrap();

    assert_eq!(res.status, Status::Success);
    assert_eq!(res.x, 5.0);

    // impact speed, then a parabola of twice the rebound speed over g
    let t1 = fall_time(10.0);
    let rebound = 0.9 * 9.81 * t1;
    let t2 = t1 + 2.0 * rebound / 9.81;
    let times: Vec<f64> = res.events.iter().map(|e| e.t).collect();
    assert_eq!(times.len(), 2);
    assert_abs_diff_eq!(times[0], t1, epsilon = 1e-8);
    assert_abs_diff_eq!(times[1], t2, epsilon = 1e-7);

    let v2 = 0.9 * rebound;
    let dt = 5.0 - t2;
    assert_abs_diff_eq!(y[0], v2 * dt - 0.5 * 9.81 * dt * dt, epsilon = 1e-6);
    assert_abs_diff_eq!(y[1], v2 - 9.81 * dt, epsilon = 1e-6);
}

#[test]
fn direction_filter_ignores_rising_crossings() {
    struct Level;
    impl Event for Level {
        fn g(&self, _t: f64, y: &[f64]) -> f64 {
            y[0]
        }
        fn config(&self) -> EventConfig {
            EventConfig::builder()
                .direction(EventDirection::Positive)
                .max_check_interval(0.1)
                .build()
        }
    }

    // cos t falls through zero at pi/2 and rises at 3pi/2
    let mut level = Level;
    let mut y = [1.0, 0.0];
    let mut events: [&mut dyn Event; 1] = [&mut level];
    let res = gbs(
        &SHO,
        0.0,
        6.0,
        &mut y,
        1e-10.into(),
        1e-10.into(),
        &mut NoSolOut,
        &mut events,
        Settings::default(),
    )
    .unwrap();
    assert_eq!(res.status, Status::EventStop);
    assert_eq!(res.events.len(), 1);
    assert_abs_diff_eq!(res.x, 1.5 * std::f64::consts::PI, epsilon = 1e-8);
}

#[test]
fn continue_records_every_crossing() {
    struct Zero {
        seen: usize,
    }
    impl Event for Zero {
        fn g(&self, _t: f64, y: &[f64]) -> f64 {
            y[0]
        }
        fn config(&self) -> EventConfig {
            EventConfig::builder().max_check_interval(0.1).build()
        }
        fn event_occurred(&mut self, _t: f64, _y: &[f64], _increasing: bool) -> EventAction {
            self.seen += 1;
            EventAction::Continue
        }
    }

    let mut zero = Zero { seen: 0 };
    let options = IVPOptions::builder()
        .rtol(1e-10)
        .atol(1e-10)
        .events(vec![&mut zero as &mut dyn Event])
        .build();
    let sol = solve_ivp(&SHO, 0.0, 10.0, &[1.0, 0.0], options).unwrap();
    assert_eq!(sol.status, Status::Success);
    assert_eq!(*sol.t.last().unwrap(), 10.0);

    let half_pi = 0.5 * std::f64::consts::PI;
    let times: Vec<f64> = sol.events_of(0).map(|e| e.t).collect();
    assert_eq!(times.len(), 3);
    for (i, t) in times.iter().enumerate() {
        assert_abs_diff_eq!(*t, (2 * i + 1) as f64 * half_pi, epsilon = 1e-8);
    }
    assert_eq!(zero.seen, 3);
}

#[test]
fn user_callback_can_interrupt() {
    let mut callback = |_xold: f64, x: f64, _y: &[f64], _i: &dyn Interpolate| {
        if x > 1.0 {
            ControlFlag::Interrupt
        } else {
            ControlFlag::Continue
        }
    };
    let options = IVPOptions::builder()
        .rtol(1e-8)
        .atol(1e-8)
        .max_step(0.1)
        .solout(&mut callback)
        .build();
    let sol = solve_ivp(&SHO, 0.0, 10.0, &[1.0, 0.0], options).unwrap();
    assert_eq!(sol.status, Status::UserInterrupt);
    let t_last = *sol.t.last().unwrap();
    assert!(t_last > 1.0 && t_last <= 1.1 + 1e-12);
}

#[test]
fn modified_solution_restarts_from_new_state() {
    struct Kick {
        done: bool,
    }
    impl SolOut for Kick {
        fn solout<I: Interpolate>(&mut self, _xold: f64, x: f64, y: &[f64], _i: &I) -> ControlFlag {
            if !self.done && x >= 1.0 {
                self.done = true;
                return ControlFlag::ModifiedSolution(x, vec![2.0 * y[0]]);
            }
            ControlFlag::Continue
        }
    }

    let mut y = [1.0];
    let res = gbs(
        &common::Decay,
        0.0,
        3.0,
        &mut y,
        1e-10.into(),
        1e-10.into(),
        &mut Kick { done: false },
        &mut [],
        Settings::default(),
    )
    .unwrap();
    assert_eq!(res.status, Status::Success);
    assert_abs_diff_eq!(y[0], 2.0 * (-3.0f64).exp(), epsilon = 1e-8);
}
