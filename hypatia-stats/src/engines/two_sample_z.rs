//! Two-independent-sample Z-test on raw observations

use hypatia_core::{
    round::{round3, round8},
    Alternative, StatError, StatResult, TestOptions,
};
use serde::Serialize;

use super::{conclude, z_decision_p, ConfidenceInterval};
use crate::describe::Descriptive;
use crate::dist::normal::standard_normal_inv;

const REJECT: &str = "Significant difference between the means.";
const ACCEPT: &str = "No significant difference between the means.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMeanSummary {
    pub group: String,
    pub n: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZIntervalBlock {
    pub confidence_level: f64,
    pub mean_difference: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoSampleZReport {
    pub hypothesis: String,
    pub grouping_variable: String,
    pub summary: Vec<GroupMeanSummary>,
    pub confidence_interval: ZIntervalBlock,
    pub z_stat: f64,
    pub p_value: f64,
    pub conclusion: String,
}

/// Two-sample Z-test. The statistic uses the pooled-variance standard
/// error; the interval uses the unpooled one with a normal critical value.
/// The conclusion threshold is `1 − confidence_level`.
pub fn two_sample_z_test(
    group1: &[f64],
    group2: &[f64],
    labels: (&str, &str),
    grouping_variable: &str,
    options: &TestOptions,
) -> StatResult<TwoSampleZReport> {
    options.validate()?;

    for g in [group1, group2] {
        if g.iter().any(|v| !v.is_finite()) {
            return Err(StatError::invalid_type(
                "sample values must be finite numbers",
            ));
        }
        if g.len() < 2 {
            return Err(StatError::insufficient_data(
                "Z-test requires at least 2 observations per group.",
            ));
        }
    }

    let d1 = Descriptive::from_raw(group1)?;
    let d2 = Descriptive::from_raw(group2)?;

    let n1 = d1.n as f64;
    let n2 = d2.n as f64;
    let mean_diff = d1.mean - d2.mean;

    // pooled-variance standard error, as the original's statsmodels default
    let pooled_var =
        ((n1 - 1.0) * d1.variance() + (n2 - 1.0) * d2.variance()) / (n1 + n2 - 2.0);
    let se_pooled = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se_pooled == 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let z_stat = mean_diff / se_pooled;
    let p_value = z_decision_p(z_stat, options.alternative);

    // interval on the raw difference keeps the unpooled standard error
    let se_unpooled = (d1.variance() / n1 + d2.variance() / n2).sqrt();
    let z_critical = standard_normal_inv(1.0 - (1.0 - options.confidence_level) / 2.0);
    let interval = ConfidenceInterval::new(mean_diff, z_critical * se_unpooled).rounded(3);

    let threshold = 1.0 - options.confidence_level;
    let conclusion = conclude(p_value, threshold, REJECT, ACCEPT);

    let relation = match options.alternative {
        Alternative::TwoSided => "!=",
        Alternative::Greater => ">",
        Alternative::Less => "<",
    };

    Ok(TwoSampleZReport {
        hypothesis: format!("Ho: Mean1 = Mean2 vs H1: Mean1 {relation} Mean2"),
        grouping_variable: grouping_variable.to_string(),
        summary: vec![
            GroupMeanSummary {
                group: labels.0.to_string(),
                n: d1.n,
                mean: round3(d1.mean),
            },
            GroupMeanSummary {
                group: labels.1.to_string(),
                n: d2.n,
                mean: round3(d2.mean),
            },
        ],
        confidence_interval: ZIntervalBlock {
            confidence_level: options.confidence_level,
            mean_difference: round3(mean_diff),
            lower_bound: interval.lower_bound,
            upper_bound: interval.upper_bound,
        },
        z_stat: round3(z_stat),
        p_value: round8(p_value),
        conclusion,
    })
}
