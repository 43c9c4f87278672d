//! Default SolOut that implements t_eval sampling, endpoint recording and dense
//! output collection; wraps a user callback.

use crate::{
    Float,
    methods::gbs::DenseOutput,
    prelude::{ControlFlag, Interpolate, SolOut},
};

use super::options::StepCallback;

pub(crate) struct DefaultSolOut<'a> {
    t_eval: Option<Vec<Float>>,
    save_endpoints: bool,
    keep_dense: bool,
    next_idx: usize,
    tol: Float,
    t: Vec<Float>,
    y: Vec<Vec<Float>>,
    segments: Vec<DenseOutput>,
    user: Option<&'a mut StepCallback<'a>>,
}

impl<'a> DefaultSolOut<'a> {
    pub fn new(
        t_eval: Option<Vec<Float>>,
        save_endpoints: bool,
        keep_dense: bool,
        user: Option<&'a mut StepCallback<'a>>,
    ) -> Self {
        Self {
            t_eval,
            save_endpoints,
            keep_dense,
            next_idx: 0,
            tol: 1e-12,
            t: Vec::new(),
            y: Vec::new(),
            segments: Vec::new(),
            user,
        }
    }

    pub fn into_data(self) -> (Vec<Float>, Vec<Vec<Float>>, Vec<DenseOutput>) {
        (self.t, self.y, self.segments)
    }
}

impl<'a> SolOut for DefaultSolOut<'a> {
    fn solout<I: Interpolate>(
        &mut self,
        xold: Float,
        x: Float,
        y: &[Float],
        interpolator: &I,
    ) -> ControlFlag {
        if self.save_endpoints {
            self.t.push(x);
            self.y.push(y.to_vec());
        }

        if self.keep_dense && xold != x {
            self.segments.push(interpolator.get_cont());
        }

        // Sample t_eval points within [xold, x]
        if let Some(te) = self.t_eval.as_deref() {
            let mut i = self.next_idx;
            if xold == x {
                // Initial call: only an exact match
                while i < te.len() && (te[i] - x).abs() <= self.tol {
                    self.t.push(te[i]);
                    self.y.push(y.to_vec());
                    i += 1;
                }
            } else {
                let dir = (x - xold).signum();
                while i < te.len() && (te[i] - x) * dir <= self.tol {
                    if (te[i] - xold) * dir >= -self.tol {
                        let mut yi = vec![0.0; y.len()];
                        interpolator.interpolate(te[i], &mut yi);
                        self.t.push(te[i]);
                        self.y.push(yi);
                    }
                    i += 1;
                }
            }
            self.next_idx = i;
        }

        // Forward to user callback if any
        if let Some(user) = self.user.as_deref_mut() {
            return user(xold, x, y, interpolator as &dyn Interpolate);
        }

        ControlFlag::Continue
    }
}
