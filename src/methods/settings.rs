//! Settings for the extrapolation integrator

use std::ops::{Index, IndexMut};

use bon::Builder;

use crate::{Float, error::Error};

#[derive(Builder, Clone, Debug, Default)]
/// Settings for the Gragg–Bulirsch–Stoer integrator.
///
/// Every field is optional; `None` selects the default. Step bounds and
/// budgets are validated and reported as [`Error`]s, while the tuning factors
/// of the extrapolation control fall back to their default (with a warning)
/// when given outside of their admissible range.
pub struct Settings {
    /// The rounding unit, typically machine epsilon. Default: `2.3e-16`.
    pub uround: Option<Float>,
    /// Initial step size. None will result in an initial guess
    /// provided by the `hinit` heuristic.
    pub h0: Option<Float>,
    /// Minimum step size. Default: `0`.
    pub hmin: Option<Float>,
    /// Maximal step size. Default: `|xend - x|`.
    pub hmax: Option<Float>,
    /// Maximum number of attempted steps. Default: `100_000`.
    pub nmax: Option<usize>,
    /// Budget of right-hand side evaluations. Default: unlimited.
    pub max_evaluations: Option<usize>,

    /// Enable the stability check inside the midpoint sub-steps. Default: `true`.
    pub stability_check: Option<bool>,
    /// Number of orders on which the stability check is performed. Default: `2`.
    pub stability_max_iter: Option<usize>,
    /// Number of sub-steps checked per order. Default: `1`.
    pub stability_max_checks: Option<usize>,
    /// Step reduction after a failed stability check or a diverging
    /// extrapolation, in `[1e-4, 0.9999]`. Default: `0.5`.
    pub stability_reduction: Option<Float>,

    /// First step control factor, in `[1e-4, 0.9999]`. Default: `0.65`.
    pub step_control1: Option<Float>,
    /// Second step control factor (safety), in `[1e-4, 0.9999]`. Default: `0.94`.
    pub step_control2: Option<Float>,
    /// Third step control factor, in `[1e-4, 0.9999]`. Default: `0.02`.
    pub step_control3: Option<Float>,
    /// Fourth step control factor, in `[1.0001, 999.9]`. Default: `4.0`.
    pub step_control4: Option<Float>,

    /// Maximal extrapolation order, even and greater than 6. Default: `18`.
    pub max_order: Option<usize>,
    /// Order decrease threshold, in `[1e-4, 0.9999]`. Default: `0.8`.
    pub order_control1: Option<Float>,
    /// Order increase threshold, in `[1e-4, 0.9999]`. Default: `0.9`.
    pub order_control2: Option<Float>,

    /// Use the dense-output error estimate to bound the step size. Default: `true`.
    pub use_interpolation_error: Option<bool>,
    /// Offset between the extrapolation order and the dense-output degree,
    /// in `1..=6`. Default: `4`.
    pub mudif: Option<usize>,
}

/// Tolerance enum to allow scalar or vector tolerances
/// using [`Into`] trait for easy conversion from `Float`, `[Float; N]`, or `Vec<Float>`
/// users do not need to know or worry this simply allows both
/// `Float` and `[Float; N]` to be passed in as arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Tolerance {
    Scalar(Float),
    Vector(Vec<Float>),
}

impl Tolerance {
    /// Push dimension and sign problems for a state of dimension `n`.
    pub(crate) fn check(&self, name: &'static str, n: usize, errors: &mut Vec<Error>) {
        let values = match self {
            Tolerance::Scalar(v) => std::slice::from_ref(v),
            Tolerance::Vector(vs) => {
                if vs.len() != n {
                    errors.push(Error::ToleranceDimension {
                        name,
                        expected: n,
                        found: vs.len(),
                    });
                }
                vs.as_slice()
            }
        };
        if let Some(&value) = values.iter().find(|v| !(**v >= 0.0)) {
            errors.push(Error::NegativeTolerance { name, value });
        }
    }
}

impl From<Float> for Tolerance {
    fn from(val: Float) -> Self {
        Tolerance::Scalar(val)
    }
}

impl From<&[Float]> for Tolerance {
    fn from(val: &[Float]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl<const N: usize> From<[Float; N]> for Tolerance {
    fn from(val: [Float; N]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl From<Vec<Float>> for Tolerance {
    fn from(val: Vec<Float>) -> Self {
        Tolerance::Vector(val)
    }
}

impl Index<usize> for Tolerance {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}

impl IndexMut<usize> for Tolerance {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) => &mut vs[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_tolerance_indexes_every_component() {
        let tol = Tolerance::from(1e-8);
        assert_eq!(tol[0], 1e-8);
        assert_eq!(tol[41], 1e-8);
    }

    #[test]
    fn vector_tolerance_dimension_is_checked() {
        let mut errors = Vec::new();
        Tolerance::from([1e-6, 1e-7]).check("atol", 3, &mut errors);
        assert_eq!(
            errors,
            vec![Error::ToleranceDimension {
                name: "atol",
                expected: 3,
                found: 2
            }]
        );
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let mut errors = Vec::new();
        Tolerance::from(vec![1e-6, -1.0]).check("rtol", 2, &mut errors);
        assert_eq!(
            errors,
            vec![Error::NegativeTolerance {
                name: "rtol",
                value: -1.0
            }]
        );
    }

    #[test]
    fn builder_leaves_unset_fields_empty() {
        let settings = Settings::builder().max_order(12).mudif(3).build();
        assert_eq!(settings.max_order, Some(12));
        assert_eq!(settings.mudif, Some(3));
        assert!(settings.h0.is_none());
        assert!(settings.step_control1.is_none());
    }
}
