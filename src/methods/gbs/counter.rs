use crate::{Float, core::ode::ODE, error::Error, methods::result::Evals};

/// Right-hand side wrapper that counts evaluations against a budget.
pub(crate) struct EvaluationCounter<'a, F: ODE> {
    pub f: &'a F,
    pub evals: Evals,
    limit: usize,
}

impl<'a, F: ODE> EvaluationCounter<'a, F> {
    pub fn new(f: &'a F, limit: usize) -> Self {
        Self {
            f,
            evals: Evals::new(),
            limit,
        }
    }

    /// Evaluate `f(x, y)` into `dydx`, failing once the budget is spent.
    pub fn ode(&mut self, x: Float, y: &[Float], dydx: &mut [Float]) -> Result<(), Error> {
        self.charge(1)?;
        self.f.ode(x, y, dydx);
        Ok(())
    }

    /// Account for `count` evaluations made outside of [`Self::ode`].
    pub fn charge(&mut self, count: usize) -> Result<(), Error> {
        if self.evals.ode + count > self.limit {
            return Err(Error::MaxEvaluationsExceeded(self.limit));
        }
        self.evals.ode += count;
        Ok(())
    }
}
