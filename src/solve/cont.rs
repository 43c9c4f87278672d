//! Continuous output assembled from the dense output of each accepted step.

use crate::{Float, core::interpolate::Interpolate, methods::gbs::DenseOutput};

/// Piecewise dense output over all accepted steps.
#[derive(Debug, Clone)]
pub struct ContinuousOutput {
    segs: Vec<DenseOutput>,
    direction: Float,
}

impl ContinuousOutput {
    /// Build a ContinuousOutput from the per-step polynomials in integration order.
    pub(crate) fn from_segments(segs: Vec<DenseOutput>) -> Self {
        let segs: Vec<DenseOutput> = segs.into_iter().filter(|s| s.x() != s.xold()).collect();
        let direction = segs.first().map_or(1.0, |s| (s.x() - s.xold()).signum());
        Self { segs, direction }
    }

    /// Domain covered by the dense output as `(start, end)` in integration order.
    pub fn t_span(&self) -> Option<(Float, Float)> {
        let first = self.segs.first()?;
        let last = self.segs.last()?;
        Some((first.xold(), last.x()))
    }

    /// Interpolate y(t) if t lies within any recorded step; returns None if outside.
    pub fn evaluate(&self, t: Float) -> Option<Vec<Float>> {
        let seg = self.find_segment(t)?;
        let mut yi = vec![0.0; seg.dimension()];
        seg.interpolate(t, &mut yi);
        Some(yi)
    }

    /// Batch-evaluate at many times; returns None for points outside coverage.
    pub fn evaluate_many(&self, ts: &[Float]) -> Vec<Option<Vec<Float>>> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    fn find_segment(&self, t: Float) -> Option<&DenseOutput> {
        let dir = self.direction;
        let i = self.segs.partition_point(|s| (s.x() - t) * dir < 0.0);
        let seg = self.segs.get(i)?;
        ((t - seg.xold()) * dir >= 0.0).then_some(seg)
    }
}
