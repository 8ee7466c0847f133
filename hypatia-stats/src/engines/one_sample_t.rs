//! One-sample t-test

use hypatia_core::{
    round::round3, GroupData, StatError, StatResult, TestOptions,
};
use serde::Serialize;

use super::{conclude, t_decision_p, ConfidenceInterval};
use crate::describe::Descriptive;
use crate::diagnostics::normality::{lilliefors, shapiro_wilk};
use crate::dist::t::t_inv;
use crate::power::{one_sample_power, PowerEstimate};

const REJECT: &str = "The null hypothesis is rejected, indicating a significant difference.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityBlock {
    pub method: &'static str,
    pub result: &'static str,
    pub p_value: f64,
}

impl NormalityBlock {
    pub(crate) fn new(method: &'static str, check: crate::diagnostics::NormalityCheck) -> Self {
        Self {
            method,
            result: if check.passed { "Passed" } else { "Failed" },
            p_value: round3(check.p_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneSampleStats {
    pub sample_size: usize,
    pub sample_mean: f64,
    pub sample_std_dev: f64,
    pub standard_error_of_mean: f64,
    pub degrees_of_freedom: usize,
    pub hypothesized_population_mean: f64,
    pub t_statistic: f64,
    pub two_tailed_p_value: f64,
    pub one_tailed_p_value: f64,
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneSampleTReport {
    pub test_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub normality_tests: Vec<NormalityBlock>,
    pub sample_statistics: OneSampleStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_analysis: Option<PowerEstimate>,
    pub conclusion: String,
}

/// One-sample t-test against a hypothesized population mean.
///
/// Every numeric field is rounded to three decimals, the family's
/// documented contract. The decision p-value follows the requested
/// alternative; the report always lists two- and one-tailed values.
pub fn one_sample_t_test(
    group: &GroupData,
    population_mean: f64,
    options: &TestOptions,
) -> StatResult<OneSampleTReport> {
    options.validate()?;
    if !population_mean.is_finite() {
        return Err(StatError::invalid_type(
            "population_mean must be a finite number",
        ));
    }
    group.validate(2)?;

    let desc = Descriptive::from_group(group)?;
    let degrees_of_freedom = desc.n - 1;
    let df = degrees_of_freedom as f64;

    if desc.std_err == 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let t_statistic = (desc.mean - population_mean) / desc.std_err;
    let two_tailed = t_decision_p(t_statistic, df, hypatia_core::Alternative::TwoSided);
    let decision_p = t_decision_p(t_statistic, df, options.alternative);

    let t_critical = t_inv(1.0 - (1.0 - options.confidence_level) / 2.0, df);
    let interval = ConfidenceInterval::new(desc.mean, t_critical * desc.std_err);

    // normality diagnostics only apply to raw observations
    let mut normality_tests = Vec::new();
    if let Some(values) = group.raw() {
        if options.diagnostics.shapiro {
            normality_tests.push(NormalityBlock::new("shapiro-wilk", shapiro_wilk(values)?));
        }
        if options.diagnostics.lilliefors {
            normality_tests.push(NormalityBlock::new("lilliefors", lilliefors(values)?));
        }
    }

    let power_analysis = if options.power {
        let effect = (desc.mean - population_mean) / desc.std_dev;
        Some(one_sample_power(effect, desc.n, options.alpha)?.rounded())
    } else {
        None
    };

    let conclusion = conclude(
        decision_p,
        options.alpha,
        REJECT,
        &format!(
            "The null hypothesis is not rejected (p-value: {:.3}).",
            decision_p
        ),
    );

    Ok(OneSampleTReport {
        test_type: "One-Sample t-test",
        normality_tests,
        sample_statistics: OneSampleStats {
            sample_size: desc.n,
            sample_mean: round3(desc.mean),
            sample_std_dev: round3(desc.std_dev),
            standard_error_of_mean: round3(desc.std_err),
            degrees_of_freedom,
            hypothesized_population_mean: population_mean,
            t_statistic: round3(t_statistic),
            two_tailed_p_value: round3(two_tailed),
            one_tailed_p_value: round3(two_tailed / 2.0),
            confidence_interval: interval.rounded(3),
        },
        power_analysis,
        conclusion,
    })
}
