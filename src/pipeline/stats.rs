//! Chi-squared test of independence on contingency tables

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::FunnelError;

/// Result of a chi-squared independence test
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    /// Expected frequencies under independence, same shape as the input
    pub expected: Vec<Vec<f64>>,
}

/// Chi-squared test of independence of the rows and columns of `observed`.
///
/// Expected frequencies are `row total * column total / grand total`. Rows
/// and columns whose total is zero carry no information: their expected
/// frequencies are zero, they add nothing to the statistic, and they do not
/// count towards the degrees of freedom. With `correction` set and one degree
/// of freedom, Yates' continuity correction moves each observation up to 0.5
/// towards its expectation. A table with no degrees of freedom yields a
/// statistic of 0 and a p-value of 1.
pub fn chi2_contingency(observed: &[Vec<f64>], correction: bool) -> Result<ChiSquareTest, FunnelError> {
    let n_cols = observed.first().map(Vec::len).unwrap_or(0);
    if observed.iter().any(|row| row.len() != n_cols) {
        return Err(FunnelError::InvalidContingency(
            "rows have different lengths".to_string(),
        ));
    }
    if observed.iter().flatten().any(|&v| !v.is_finite() || v < 0.0) {
        return Err(FunnelError::InvalidContingency(
            "cells must be finite and non-negative".to_string(),
        ));
    }

    let row_totals: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..n_cols)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();
    let total: f64 = row_totals.iter().sum();

    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|&r| {
            col_totals
                .iter()
                .map(|&c| if total > 0.0 { r * c / total } else { 0.0 })
                .collect()
        })
        .collect();

    let live_rows = row_totals.iter().filter(|&&t| t > 0.0).count();
    let live_cols = col_totals.iter().filter(|&&t| t > 0.0).count();
    let dof = live_rows.saturating_sub(1) * live_cols.saturating_sub(1);

    if dof == 0 {
        return Ok(ChiSquareTest {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom: 0,
            expected,
        });
    }

    let mut statistic = 0.0;
    for (obs_row, exp_row) in observed.iter().zip(&expected) {
        for (&o, &e) in obs_row.iter().zip(exp_row) {
            if e <= 0.0 {
                continue;
            }
            let o = if correction && dof == 1 {
                let diff = e - o;
                o + diff.signum() * diff.abs().min(0.5)
            } else {
                o
            };
            statistic += (o - e).powi(2) / e;
        }
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| FunnelError::Statistics(e.to_string()))?;
    let p_value = dist.sf(statistic);

    Ok(ChiSquareTest {
        statistic,
        p_value,
        degrees_of_freedom: dof,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_with_yates_correction() {
        let test = chi2_contingency(&[vec![10.0, 20.0], vec![20.0, 10.0]], true).unwrap();
        assert_eq!(test.degrees_of_freedom, 1);
        assert!((test.statistic - 5.4).abs() < 1e-9, "got {}", test.statistic);
        assert!(test.p_value > 0.019 && test.p_value < 0.022, "got {}", test.p_value);
        assert_eq!(test.expected, vec![vec![15.0, 15.0], vec![15.0, 15.0]]);
    }

    #[test]
    fn test_two_by_two_without_correction() {
        let test = chi2_contingency(&[vec![10.0, 20.0], vec![20.0, 10.0]], false).unwrap();
        // 4 * 25 / 15
        assert!((test.statistic - 100.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_by_three_matches_closed_form() {
        let test = chi2_contingency(&[vec![10.0, 20.0, 30.0], vec![20.0, 20.0, 20.0]], true).unwrap();
        assert_eq!(test.degrees_of_freedom, 2);
        assert!((test.statistic - 16.0 / 3.0).abs() < 1e-9);
        // Survival function of chi2(2) is exp(-x / 2)
        assert!((test.p_value - (-8.0f64 / 3.0).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_zero_column_is_ignored() {
        let test = chi2_contingency(&[vec![5.0, 0.0, 5.0], vec![5.0, 0.0, 5.0]], true).unwrap();
        assert_eq!(test.degrees_of_freedom, 1);
        assert_eq!(test.expected[0][1], 0.0);
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_table_has_unit_p_value() {
        let test = chi2_contingency(&[vec![4.0, 0.0], vec![7.0, 0.0]], true).unwrap();
        assert_eq!(test.degrees_of_freedom, 0);
        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.p_value, 1.0);
    }

    #[test]
    fn test_rejects_negative_and_ragged() {
        assert!(chi2_contingency(&[vec![1.0, -1.0], vec![1.0, 1.0]], true).is_err());
        assert!(chi2_contingency(&[vec![1.0, 2.0], vec![1.0]], true).is_err());
    }
}
