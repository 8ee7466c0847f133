//! Normalized input shapes consumed by the test engines
//!
//! The transport layer resolves the heterogeneous JSON forms (raw arrays,
//! mean/size/deviation objects, long-format pivot tables) into these types
//! once, at the boundary. Engines never see unnormalized input.

use serde::{Deserialize, Serialize};

use crate::error::{StatError, StatResult};

/// Pre-computed summary of a sample. Dispersion may arrive as a standard
/// deviation or a standard error; the two are mutually derivable via
/// `sd = se * sqrt(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub size: usize,
    pub mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_err: Option<f64>,
}

impl SummaryStats {
    /// Resolve the dispersion to a standard deviation.
    pub fn resolve_std_dev(&self) -> StatResult<f64> {
        if self.size == 0 {
            return Err(StatError::validation("Group size must be positive."));
        }
        let sd = match (self.std_dev, self.std_err) {
            (Some(sd), _) => sd,
            (None, Some(se)) => se * (self.size as f64).sqrt(),
            (None, None) => {
                return Err(StatError::missing_field(
                    "one of 'std_dev' or 'std_err' is required for summary input",
                ))
            }
        };
        if !sd.is_finite() || sd < 0.0 {
            return Err(StatError::validation(
                "Standard deviation must be a non-negative number.",
            ));
        }
        Ok(sd)
    }

    pub fn validate(&self) -> StatResult<()> {
        if !self.mean.is_finite() {
            return Err(StatError::invalid_type("mean must be a finite number"));
        }
        if self.size < 2 {
            return Err(StatError::insufficient_data(
                "Summary statistics require a group size of at least two.",
            ));
        }
        self.resolve_std_dev().map(|_| ())
    }
}

/// One group of observations: either the raw sample or its summary.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupData {
    Raw(Vec<f64>),
    Summary(SummaryStats),
}

impl GroupData {
    pub fn size(&self) -> usize {
        match self {
            GroupData::Raw(values) => values.len(),
            GroupData::Summary(summary) => summary.size,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, GroupData::Raw(_))
    }

    /// The raw observations, when present.
    pub fn raw(&self) -> Option<&[f64]> {
        match self {
            GroupData::Raw(values) => Some(values),
            GroupData::Summary(_) => None,
        }
    }

    /// Reject non-finite values and undersized groups up front.
    pub fn validate(&self, min_size: usize) -> StatResult<()> {
        match self {
            GroupData::Raw(values) => {
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(StatError::invalid_type(
                        "sample values must be finite numbers",
                    ));
                }
                if values.len() < min_size {
                    return Err(StatError::insufficient_data(format!(
                        "Sample data must contain at least {min_size} data points."
                    )));
                }
                Ok(())
            }
            GroupData::Summary(summary) => summary.validate(),
        }
    }
}

/// Input to the two-proportion Z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionGroup {
    pub size: usize,
    pub proportion: f64,
}

impl ProportionGroup {
    pub fn validate(&self) -> StatResult<()> {
        if !self.proportion.is_finite() || !(0.0..=1.0).contains(&self.proportion) {
            return Err(StatError::validation(
                "Proportions must be between 0 and 1.",
            ));
        }
        Ok(())
    }
}
