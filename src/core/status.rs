//! Status codes for integrators

/// How an integration that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The final abscissa was reached.
    Success,
    /// A [`SolOut`](crate::core::solout::SolOut) returned `Interrupt`.
    UserInterrupt,
    /// An event handler asked to stop.
    EventStop,
    /// The maximal number of steps was reached.
    NeedLargerNMax,
    /// The step size fell below `hmin` or the rounding limit.
    StepSizeTooSmall,
}
