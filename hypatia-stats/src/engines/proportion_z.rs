//! Two-proportion Z-test

use hypatia_core::{
    round::{round3, round8},
    ProportionGroup, StatError, StatResult, TestOptions,
};
use serde::Serialize;

use super::{conclude, ConfidenceInterval};
use crate::dist::normal::{standard_normal_cdf, standard_normal_inv};

const REJECT: &str = "There is a significant difference in the proportions.";
const ACCEPT: &str = "No significant difference in the proportions.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionZResults {
    pub difference_of_sample_proportions: f64,
    pub pooled_estimate_for_p: f64,
    pub standard_error_of_difference: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub confidence_interval: ConfidenceInterval,
    pub power_of_test: f64,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionZReport {
    pub message: &'static str,
    pub alpha_value: f64,
    pub yates_correction: u8,
    pub confidence_level: f64,
    pub group_1: ProportionGroup,
    pub group_2: ProportionGroup,
    pub results: ProportionZResults,
}

/// Two-proportion Z-test on `{size, proportion}` pairs.
///
/// The p-value is two-tailed by construction; the report always carries
/// the in-family post-hoc power `1 − Φ(z_crit − |z|)`.
pub fn proportion_z_test(
    group1: ProportionGroup,
    group2: ProportionGroup,
    yates_correction: u8,
    options: &TestOptions,
) -> StatResult<ProportionZReport> {
    options.validate()?;
    group1.validate()?;
    group2.validate()?;

    if group1.size == 0 || group2.size == 0 {
        // standard error is undefined for an empty group
        return Err(StatError::DivisionByZero);
    }

    let n1 = group1.size as f64;
    let n2 = group2.size as f64;
    let p1 = group1.proportion;
    let p2 = group2.proportion;

    let pooled_p = (n1 * p1 + n2 * p2) / (n1 + n2);
    let standard_error = (pooled_p * (1.0 - pooled_p) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if standard_error == 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let z_score = (p1 - p2) / standard_error;
    let p_value = 2.0 * (1.0 - standard_normal_cdf(z_score.abs()));

    let z_critical = standard_normal_inv(1.0 - (1.0 - options.confidence_level) / 2.0);
    let margin_of_error = z_critical * standard_error;
    let interval = ConfidenceInterval::new(p1 - p2, margin_of_error);

    let power = 1.0 - standard_normal_cdf(z_critical - z_score.abs());

    let conclusion = conclude(p_value, options.alpha, REJECT, ACCEPT);

    Ok(ProportionZReport {
        message: "Z-test calculation successful",
        alpha_value: options.alpha,
        yates_correction,
        confidence_level: options.confidence_level,
        group_1: group1,
        group_2: group2,
        results: ProportionZResults {
            difference_of_sample_proportions: round3(p1 - p2),
            pooled_estimate_for_p: round3(pooled_p),
            standard_error_of_difference: round3(standard_error),
            z_score: round3(z_score),
            p_value: round8(p_value),
            confidence_interval: interval.rounded(3),
            power_of_test: round3(power),
            conclusion,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(size: usize, proportion: f64) -> ProportionGroup {
        ProportionGroup { size, proportion }
    }

    #[test]
    fn reference_fixture_rejects_the_null() {
        let report = proportion_z_test(
            group(40, 0.3),
            group(160, 0.7),
            0,
            &TestOptions::default(),
        )
        .unwrap();

        let r = &report.results;
        assert!(r.z_score < 0.0);
        assert!((r.z_score - -4.662).abs() < 1e-3);
        assert!(r.p_value < 0.05);
        assert!((r.pooled_estimate_for_p - 0.62).abs() < 1e-9);
        assert!((r.standard_error_of_difference - 0.086).abs() < 1e-9);
        assert!((r.confidence_interval.lower_bound - -0.568).abs() < 1e-9);
        assert!((r.confidence_interval.upper_bound - -0.232).abs() < 1e-9);
        assert!(r.power_of_test > 0.99);
        assert_eq!(r.conclusion, REJECT);
    }

    #[test]
    fn equal_proportions_do_not_reject() {
        let report = proportion_z_test(
            group(50, 0.5),
            group(50, 0.52),
            0,
            &TestOptions::default(),
        )
        .unwrap();
        assert!(report.results.p_value > 0.05);
        assert_eq!(report.results.conclusion, ACCEPT);
    }

    #[test]
    fn zero_size_group_is_division_by_zero() {
        let err = proportion_z_test(group(0, 0.5), group(50, 0.5), 0, &TestOptions::default())
            .unwrap_err();
        assert_eq!(err, StatError::DivisionByZero);
    }

    #[test]
    fn degenerate_pooled_proportion_is_division_by_zero() {
        // both groups at 0 make the pooled variance vanish
        let err = proportion_z_test(group(10, 0.0), group(20, 0.0), 0, &TestOptions::default())
            .unwrap_err();
        assert_eq!(err, StatError::DivisionByZero);
    }

    #[test]
    fn out_of_range_proportion_is_validation() {
        let err = proportion_z_test(group(10, 1.5), group(20, 0.5), 0, &TestOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn identical_calls_are_bit_identical() {
        let opts = TestOptions::default();
        let a = proportion_z_test(group(40, 0.3), group(160, 0.7), 0, &opts).unwrap();
        let b = proportion_z_test(group(40, 0.3), group(160, 0.7), 0, &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn interval_widens_with_confidence() {
        let mut opts = TestOptions::default();
        let narrow = proportion_z_test(group(40, 0.3), group(160, 0.7), 0, &opts).unwrap();
        opts.confidence_level = 0.99;
        let wide = proportion_z_test(group(40, 0.3), group(160, 0.7), 0, &opts).unwrap();
        let w = |r: &ProportionZReport| {
            r.results.confidence_interval.upper_bound - r.results.confidence_interval.lower_bound
        };
        assert!(w(&wide) > w(&narrow));
    }
}
