//! Equal-variance tests for two independent samples
//!
//! Both variants run a one-way ANOVA on absolute deviations from a group
//! center: Levene centers on the mean, Brown-Forsythe on the median (the
//! robust variant). The F statistic is referred to F(k−1, N−k).

use hypatia_core::{StatError, StatResult};

use crate::describe::mean;
use crate::dist::f::f_sf;

/// Outcome of one equal-variance test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceCheck {
    pub statistic: f64,
    pub p_value: f64,
    /// True when equality of variances is not rejected at the threshold
    pub passed: bool,
}

#[derive(Debug, Clone, Copy)]
enum Center {
    Mean,
    Median,
}

/// Levene's test (mean-centered). `threshold` is the rejection level.
pub fn levene(group1: &[f64], group2: &[f64], threshold: f64) -> StatResult<VarianceCheck> {
    deviation_anova(group1, group2, Center::Mean, threshold)
}

/// Brown-Forsythe test (median-centered).
pub fn brown_forsythe(group1: &[f64], group2: &[f64], threshold: f64) -> StatResult<VarianceCheck> {
    deviation_anova(group1, group2, Center::Median, threshold)
}

fn median(values: &[f64]) -> f64 {
    let mut x = values.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = x.len();
    if n % 2 == 1 {
        x[n / 2]
    } else {
        (x[n / 2 - 1] + x[n / 2]) / 2.0
    }
}

fn deviation_anova(
    group1: &[f64],
    group2: &[f64],
    center: Center,
    threshold: f64,
) -> StatResult<VarianceCheck> {
    for g in [group1, group2] {
        if g.iter().any(|v| !v.is_finite()) {
            return Err(StatError::invalid_type(
                "sample values must be finite numbers",
            ));
        }
        if g.len() < 2 {
            return Err(StatError::insufficient_data(
                "Equal-variance tests require at least 2 observations per group.",
            ));
        }
    }

    let deviations = |g: &[f64]| -> StatResult<Vec<f64>> {
        let c = match center {
            Center::Mean => mean(g)?,
            Center::Median => median(g),
        };
        Ok(g.iter().map(|&x| (x - c).abs()).collect())
    };

    let z1 = deviations(group1)?;
    let z2 = deviations(group2)?;

    let n1 = z1.len() as f64;
    let n2 = z2.len() as f64;
    let total_n = n1 + n2;

    let m1 = mean(&z1)?;
    let m2 = mean(&z2)?;
    let grand = (n1 * m1 + n2 * m2) / total_n;

    let ss_between = n1 * (m1 - grand) * (m1 - grand) + n2 * (m2 - grand) * (m2 - grand);
    let ss_within: f64 = z1.iter().map(|&z| (z - m1) * (z - m1)).sum::<f64>()
        + z2.iter().map(|&z| (z - m2) * (z - m2)).sum::<f64>();

    let df_between = 1.0; // k - 1 with k = 2
    let df_within = total_n - 2.0;

    let ms_within = ss_within / df_within;
    if ms_within <= 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let f_stat = (ss_between / df_between) / ms_within;
    let p_value = f_sf(f_stat, df_between, df_within).clamp(0.0, 1.0);

    Ok(VarianceCheck {
        statistic: f_stat,
        p_value,
        passed: p_value > threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_spread_groups_pass() {
        let g1 = [10.0, 12.0, 11.0, 13.0, 9.0, 11.5];
        let g2 = [20.0, 22.0, 21.0, 23.0, 19.0, 21.5];
        let check = levene(&g1, &g2, 0.05).unwrap();
        assert!(check.passed, "p = {}", check.p_value);
        assert!(check.statistic < 1e-9); // identical deviations
    }

    #[test]
    fn wildly_different_spread_fails() {
        let g1 = [5.0, 5.01, 4.99, 5.02, 4.98, 5.0, 5.01, 4.99];
        let g2 = [0.0, 10.0, -10.0, 20.0, -20.0, 30.0, -30.0, 15.0];
        let check = levene(&g1, &g2, 0.05).unwrap();
        assert!(!check.passed, "p = {}", check.p_value);
        let robust = brown_forsythe(&g1, &g2, 0.05).unwrap();
        assert!(!robust.passed, "p = {}", robust.p_value);
    }

    #[test]
    fn median_centering_differs_from_mean_centering() {
        // An outlier shifts the mean but not the median
        let g1 = [1.0, 2.0, 3.0, 4.0, 100.0];
        let g2 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let lev = levene(&g1, &g2, 0.05).unwrap();
        let bf = brown_forsythe(&g1, &g2, 0.05).unwrap();
        assert!((lev.statistic - bf.statistic).abs() > 1e-9);
    }

    #[test]
    fn tiny_groups_are_rejected() {
        assert_eq!(
            levene(&[1.0], &[1.0, 2.0], 0.05).unwrap_err().code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn identical_constant_deviations_are_div_zero() {
        let g1 = [1.0, 1.0, 1.0];
        let g2 = [2.0, 2.0, 2.0];
        assert_eq!(
            levene(&g1, &g2, 0.05).unwrap_err(),
            StatError::DivisionByZero
        );
    }
}
