//! Descriptive statistics: mean, Bessel-corrected deviation, standard error

use hypatia_core::{GroupData, StatError, StatResult};
use serde::Serialize;

/// Sum of a slice.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean. Empty input is a validation failure, not a NaN.
pub fn mean(values: &[f64]) -> StatResult<f64> {
    if values.is_empty() {
        return Err(StatError::validation(
            "Cannot calculate the mean of an empty sample.",
        ));
    }
    Ok(sum(values) / values.len() as f64)
}

/// Sample variance with Bessel's correction (divisor n − 1).
pub fn sample_variance(values: &[f64]) -> StatResult<f64> {
    if values.len() < 2 {
        return Err(StatError::insufficient_data(
            "Sample variance requires at least two values.",
        ));
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation (Bessel-corrected).
pub fn sample_std_dev(values: &[f64]) -> StatResult<f64> {
    Ok(sample_variance(values)?.sqrt())
}

/// Standard error of the mean: sd / sqrt(n).
pub fn standard_error(values: &[f64]) -> StatResult<f64> {
    Ok(sample_std_dev(values)? / (values.len() as f64).sqrt())
}

/// Per-group descriptive block carried into every report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Descriptive {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub std_err: f64,
}

impl Descriptive {
    /// From raw observations; requires n ≥ 2 for the dispersion estimate.
    pub fn from_raw(values: &[f64]) -> StatResult<Self> {
        let sd = sample_std_dev(values)?;
        Ok(Self {
            n: values.len(),
            mean: mean(values)?,
            std_dev: sd,
            std_err: sd / (values.len() as f64).sqrt(),
        })
    }

    /// From either side of the raw-versus-summary union.
    pub fn from_group(group: &GroupData) -> StatResult<Self> {
        match group {
            GroupData::Raw(values) => Self::from_raw(values),
            GroupData::Summary(summary) => {
                summary.validate()?;
                let sd = summary.resolve_std_dev()?;
                Ok(Self {
                    n: summary.size,
                    mean: summary.mean,
                    std_dev: sd,
                    std_err: sd / (summary.size as f64).sqrt(),
                })
            }
        }
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// Rounded copy for report embedding.
    pub fn rounded(&self, places: i32) -> Self {
        Self {
            n: self.n,
            mean: hypatia_core::round::round_to(self.mean, places),
            std_dev: hypatia_core::round::round_to(self.std_dev, places),
            std_err: hypatia_core::round::round_to(self.std_err, places),
        }
    }
}
