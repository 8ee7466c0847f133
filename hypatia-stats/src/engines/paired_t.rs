//! Paired t-test on before/after measurements

use hypatia_core::{
    round::{round3, round5},
    StatError, StatResult, TestOptions,
};
use serde::Serialize;

use super::{conclude, ConfidenceInterval};
use crate::describe::{mean, sample_std_dev, Descriptive};
use crate::diagnostics::normality::{lilliefors, shapiro_wilk};
use crate::dist::t::{t_cdf, t_inv};
use crate::engines::one_sample_t::NormalityBlock;
use crate::power::{one_sample_power, PowerEstimate};

const REJECT: &str = "Reject the null hypothesis of no mean difference.";
const ACCEPT: &str = "Do not reject the null hypothesis of no mean difference.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedGroupStats {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceStats {
    pub mean_difference: f64,
    pub std_dev: f64,
    pub std_err: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSampleStatistics {
    pub before_treatment: PairedGroupStats,
    pub after_treatment: PairedGroupStats,
    pub difference: DifferenceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTResults {
    pub t_statistic: f64,
    pub degrees_of_freedom: usize,
    pub confidence_interval: ConfidenceInterval,
    pub two_tailed_p_value: f64,
    pub one_tailed_p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTReport {
    pub test_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub normality_tests: Vec<NormalityBlock>,
    pub sample_statistics: PairedSampleStatistics,
    pub t_test_results: PairedTResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_analysis: Option<PowerEstimate>,
    pub conclusion: String,
}

/// Paired t-test.
///
/// The difference is `d_i = after_i − before_i`: a positive t statistic
/// means the second sequence is larger. Normality diagnostics run on the
/// differences, where the test's assumption actually lives.
pub fn paired_t_test(
    before: &[f64],
    after: &[f64],
    options: &TestOptions,
) -> StatResult<PairedTReport> {
    options.validate()?;

    if before.iter().chain(after.iter()).any(|v| !v.is_finite()) {
        return Err(StatError::invalid_type(
            "sample values must be finite numbers",
        ));
    }
    if before.len() != after.len() {
        return Err(StatError::validation(
            "The two lists must have the same length.",
        ));
    }
    if before.len() < 2 {
        return Err(StatError::insufficient_data(
            "Paired t-test requires at least 2 pairs.",
        ));
    }

    let differences: Vec<f64> = after.iter().zip(before.iter()).map(|(a, b)| a - b).collect();

    let n = differences.len();
    let degrees_of_freedom = n - 1;
    let df = degrees_of_freedom as f64;

    let mean_diff = mean(&differences)?;
    let sd_diff = sample_std_dev(&differences)?;
    let sem_diff = sd_diff / (n as f64).sqrt();
    if sem_diff == 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let t_statistic = mean_diff / sem_diff;
    let two_tailed = 2.0 * (1.0 - t_cdf(t_statistic.abs(), df));

    let t_critical = t_inv(1.0 - (1.0 - options.confidence_level) / 2.0, df);
    let interval = ConfidenceInterval::new(mean_diff, t_critical * sem_diff);

    let mut normality_tests = Vec::new();
    if options.diagnostics.shapiro {
        normality_tests.push(NormalityBlock::new(
            "shapiro-wilk",
            shapiro_wilk(&differences)?,
        ));
    }
    if options.diagnostics.lilliefors {
        normality_tests.push(NormalityBlock::new("lilliefors", lilliefors(&differences)?));
    }

    let power_analysis = if options.power {
        let effect = mean_diff / sd_diff;
        Some(one_sample_power(effect, n, options.alpha)?.rounded())
    } else {
        None
    };

    let conclusion = conclude(two_tailed, options.alpha, REJECT, ACCEPT);

    let d_before = Descriptive::from_raw(before)?;
    let d_after = Descriptive::from_raw(after)?;

    Ok(PairedTReport {
        test_type: "Paired t-test",
        normality_tests,
        sample_statistics: PairedSampleStatistics {
            before_treatment: PairedGroupStats {
                n: d_before.n,
                mean: round3(d_before.mean),
                std_dev: round3(d_before.std_dev),
            },
            after_treatment: PairedGroupStats {
                n: d_after.n,
                mean: round3(d_after.mean),
                std_dev: round3(d_after.std_dev),
            },
            difference: DifferenceStats {
                mean_difference: round3(mean_diff),
                std_dev: round3(sd_diff),
                std_err: round3(sem_diff),
            },
        },
        t_test_results: PairedTResults {
            t_statistic: round3(t_statistic),
            degrees_of_freedom,
            confidence_interval: interval.rounded(3),
            two_tailed_p_value: round5(two_tailed),
            one_tailed_p_value: round5(two_tailed / 2.0),
        },
        power_analysis,
        conclusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEFORE: [f64; 11] = [
        55.0, 45.0, 65.0, 54.0, 43.0, 45.0, 54.0, 63.0, 73.0, 36.0, 65.0,
    ];
    const AFTER: [f64; 11] = [
        74.0, 85.0, 76.0, 58.0, 67.0, 47.0, 56.0, 92.0, 71.0, 93.0, 86.0,
    ];

    fn run(options: &TestOptions) -> PairedTReport {
        paired_t_test(&BEFORE, &AFTER, options).unwrap()
    }

    #[test]
    fn reference_fixture() {
        let report = run(&TestOptions::default());
        let r = &report.t_test_results;

        assert_eq!(r.degrees_of_freedom, 10);
        // after − before: positive mean difference, positive t
        assert!(r.t_statistic > 0.0);
        assert!((r.t_statistic - 3.424).abs() < 1e-3);
        assert!(r.two_tailed_p_value < 0.05);
        // scipy ttest_rel: p ≈ 0.00647
        assert!((r.two_tailed_p_value - 0.00647).abs() < 5e-4);
        assert!((r.one_tailed_p_value - r.two_tailed_p_value / 2.0).abs() < 1e-5);

        let s = &report.sample_statistics;
        assert!((s.difference.mean_difference - 18.818).abs() < 1e-9);
        assert!((s.difference.std_dev - 18.225).abs() < 1e-3);
        assert!((s.before_treatment.mean - 54.364).abs() < 1e-9);
        assert!((s.after_treatment.mean - 73.182).abs() < 1e-9);

        assert_eq!(report.conclusion, REJECT);
    }

    #[test]
    fn interval_uses_the_t_critical_value() {
        let report = run(&TestOptions::default());
        let ci = &report.t_test_results.confidence_interval;
        // t₀.₉₇₅,₁₀ = 2.2281, sem ≈ 5.495: mean ± 12.244
        assert!((ci.lower_bound - 6.574).abs() < 5e-3);
        assert!((ci.upper_bound - 31.062).abs() < 5e-3);
        assert!(ci.lower_bound <= ci.upper_bound);
    }

    #[test]
    fn normality_runs_on_differences_by_default() {
        let report = run(&TestOptions::default());
        assert_eq!(report.normality_tests.len(), 1);
        assert_eq!(report.normality_tests[0].method, "shapiro-wilk");
    }

    #[test]
    fn swapping_sequences_flips_the_sign_only() {
        let forward = paired_t_test(&BEFORE, &AFTER, &TestOptions::default()).unwrap();
        let reversed = paired_t_test(&AFTER, &BEFORE, &TestOptions::default()).unwrap();
        assert_eq!(
            forward.t_test_results.t_statistic,
            -reversed.t_test_results.t_statistic
        );
        assert_eq!(
            forward.t_test_results.two_tailed_p_value,
            reversed.t_test_results.two_tailed_p_value
        );
    }

    #[test]
    fn mismatched_lengths_are_validation() {
        let err = paired_t_test(&BEFORE, &AFTER[..10], &TestOptions::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn identical_sequences_are_division_by_zero() {
        let err = paired_t_test(&BEFORE, &BEFORE, &TestOptions::default()).unwrap_err();
        assert_eq!(err, StatError::DivisionByZero);
    }

    #[test]
    fn power_block_appears_on_request() {
        let mut opts = TestOptions::default();
        opts.power = true;
        let report = run(&opts);
        let power = report.power_analysis.unwrap();
        // |d| ≈ 1.03 with n = 11: solidly powered
        assert!(power.two_tailed > 0.8);
    }
}
