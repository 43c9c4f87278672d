//! Solution of [`solve_ivp`](super::solve_ivp): samples, counters, events and
//! the optional continuous output.

use crate::{
    Float,
    core::status::Status,
    methods::result::{EventRecord, Evals, Steps},
};

use super::cont::ContinuousOutput;

/// Sampled solution with statistics.
#[derive(Debug, Clone)]
pub struct IVPSolution {
    /// Sample abscissae in integration order.
    pub t: Vec<Float>,
    /// States at `t`.
    pub y: Vec<Vec<Float>>,
    /// Why the integration ended.
    pub status: Status,
    /// Right-hand side evaluations.
    pub evals: Evals,
    /// Attempted, accepted and rejected steps.
    pub steps: Steps,
    /// Events located during the integration, in chronological order.
    pub events: Vec<EventRecord>,
    pub(crate) dense_output: Option<ContinuousOutput>,
}

impl IVPSolution {
    /// Interpolated state at `t`; `None` without dense output or outside the
    /// integrated span.
    pub fn sol(&self, t: Float) -> Option<Vec<Float>> {
        self.dense_output.as_ref()?.evaluate(t)
    }

    pub fn sol_many(&self, ts: &[Float]) -> Vec<Option<Vec<Float>>> {
        match &self.dense_output {
            Some(dense) => dense.evaluate_many(ts),
            None => vec![None; ts.len()],
        }
    }

    /// `(start, end)` covered by the dense output, in integration order.
    pub fn sol_span(&self) -> Option<(Float, Float)> {
        self.dense_output.as_ref()?.t_span()
    }

    /// Stored samples as `(t, y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Float, &[Float])> + '_ {
        self.t.iter().copied().zip(self.y.iter().map(Vec::as_slice))
    }

    /// Last stored sample.
    pub fn last(&self) -> Option<(Float, &[Float])> {
        Some((*self.t.last()?, self.y.last()?.as_slice()))
    }

    /// Located events of the event at `index` in the slice handed to the solver.
    pub fn events_of(&self, index: usize) -> impl Iterator<Item = &EventRecord> + '_ {
        self.events.iter().filter(move |record| record.index == index)
    }
}
