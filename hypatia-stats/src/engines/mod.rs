//! Hypothesis test engines
//!
//! Each engine is a pure function from normalized inputs and options to a
//! serializable, fully rounded report. Engines fail fast on the first
//! violated precondition and never return partial results.

pub mod one_sample_t;
pub mod paired_t;
pub mod proportion_z;
pub mod two_sample_t;
pub mod two_sample_z;

use hypatia_core::{round::round_to, Alternative};
use serde::Serialize;

use crate::dist::normal::standard_normal_cdf;
use crate::dist::t::t_cdf;

/// Interval bounds shared by every report family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ConfidenceInterval {
    pub fn new(center: f64, margin: f64) -> Self {
        Self {
            lower_bound: center - margin,
            upper_bound: center + margin,
        }
    }

    pub fn rounded(&self, places: i32) -> Self {
        Self {
            lower_bound: round_to(self.lower_bound, places),
            upper_bound: round_to(self.upper_bound, places),
        }
    }
}

/// Decision p-value for a z statistic under the chosen alternative.
pub(crate) fn z_decision_p(z: f64, alternative: Alternative) -> f64 {
    match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - standard_normal_cdf(z.abs())),
        Alternative::Greater => 1.0 - standard_normal_cdf(z),
        Alternative::Less => standard_normal_cdf(z),
    }
}

/// Decision p-value for a t statistic under the chosen alternative.
pub(crate) fn t_decision_p(t: f64, df: f64, alternative: Alternative) -> f64 {
    match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - t_cdf(t.abs(), df)),
        Alternative::Greater => 1.0 - t_cdf(t, df),
        Alternative::Less => t_cdf(t, df),
    }
}

/// Pick the conclusion string by strict comparison; ties resolve to the
/// non-rejecting side.
pub(crate) fn conclude(p: f64, threshold: f64, reject: &str, accept: &str) -> String {
    if p < threshold {
        reject.to_string()
    } else {
        accept.to_string()
    }
}
