//! Configuration-derived tables: subdivision sequence, cost and extrapolation
//! coefficients. They depend on the maximal order only.

use crate::Float;

use super::dense::error_factors;

/// Tables shared by every integration run of one integrator instance.
#[derive(Clone, Debug)]
pub(crate) struct Tables {
    /// Number of midpoint sub-steps per extrapolation level, `4k + 2`.
    pub sequence: Vec<usize>,
    /// Cumulative right-hand side evaluations needed to reach level `k`.
    pub cost_per_step: Vec<usize>,
    /// Aitken–Neville coefficients, `coeff[k][l]` for `l < k`.
    pub coeff: Vec<Vec<Float>>,
    /// Dense-output error scaling, indexed by `degree - 5`.
    pub error_factors: Vec<Float>,
}

impl Tables {
    /// Build the tables for an even `max_order` greater than 6.
    pub fn new(max_order: usize) -> Self {
        let size = max_order / 2;

        let sequence: Vec<usize> = (0..size).map(|k| 4 * k + 2).collect();

        let mut cost_per_step = Vec::with_capacity(size);
        cost_per_step.push(sequence[0] + 1);
        for k in 1..size {
            cost_per_step.push(cost_per_step[k - 1] + sequence[k]);
        }

        let coeff = (0..size)
            .map(|k| {
                (0..k)
                    .map(|l| {
                        let ratio = sequence[k] as Float / sequence[k - l - 1] as Float;
                        1.0 / (ratio * ratio - 1.0)
                    })
                    .collect()
            })
            .collect();

        Self {
            sequence,
            cost_per_step,
            coeff,
            error_factors: error_factors(2 * size + 4),
        }
    }

    /// Number of extrapolation levels.
    pub fn size(&self) -> usize {
        self.sequence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sequence_is_4k_plus_2() {
        let tables = Tables::new(18);
        assert_eq!(tables.size(), 9);
        for (k, &n) in tables.sequence.iter().enumerate() {
            assert_eq!(n, 4 * k + 2);
        }
        assert!(tables.sequence.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn cost_is_cumulative_and_increasing() {
        let tables = Tables::new(10);
        assert_eq!(tables.cost_per_step, vec![3, 9, 19, 33, 51]);
        assert!(tables.cost_per_step.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn coefficients_match_sequence_ratios() {
        let tables = Tables::new(16);
        assert!(tables.coeff[0].is_empty());
        for k in 1..tables.size() {
            assert_eq!(tables.coeff[k].len(), k);
            for l in 0..k {
                let ratio = tables.sequence[k] as Float / tables.sequence[k - l - 1] as Float;
                assert_relative_eq!(tables.coeff[k][l], 1.0 / (ratio * ratio - 1.0));
            }
        }
        // seq = 2, 6: ratio 3
        assert_relative_eq!(tables.coeff[1][0], 0.125);
    }

    #[test]
    fn tables_are_deterministic() {
        let a = Tables::new(12);
        let b = Tables::new(12);
        assert_eq!(a.coeff, b.coeff);
        assert_eq!(a.error_factors, b.error_factors);
        assert_eq!(a.error_factors.len(), 2 * a.size());
    }
}
