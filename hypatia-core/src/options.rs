//! Test configuration: alternative hypothesis, thresholds, diagnostic flags

use serde::{Deserialize, Serialize};

use crate::error::{StatError, StatResult};

/// Direction of the alternative hypothesis.
///
/// Accepts the statsmodels spellings `larger`/`smaller` as aliases for
/// `greater`/`less`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    #[serde(alias = "two_sided")]
    TwoSided,
    #[serde(alias = "larger")]
    Greater,
    #[serde(alias = "smaller")]
    Less,
}

impl Alternative {
    /// Parse the wire token, case-insensitively.
    pub fn parse(token: &str) -> StatResult<Self> {
        match token.to_ascii_lowercase().as_str() {
            "two-sided" | "two_sided" => Ok(Alternative::TwoSided),
            "greater" | "larger" => Ok(Alternative::Greater),
            "less" | "smaller" => Ok(Alternative::Less),
            other => Err(StatError::validation(format!(
                "Invalid alternative hypothesis: {other}. Expected 'greater', 'less', or 'two-sided'."
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Greater => "greater",
            Alternative::Less => "less",
        }
    }
}

/// Which diagnostics a request enables. Families apply their own defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticFlags {
    pub shapiro: bool,
    pub lilliefors: bool,
    pub levene: bool,
    pub brown_forsythe: bool,
}

impl Default for DiagnosticFlags {
    fn default() -> Self {
        Self {
            shapiro: true,
            lilliefors: false,
            levene: true,
            brown_forsythe: false,
        }
    }
}

impl DiagnosticFlags {
    /// All diagnostics off (the Z-test families).
    pub fn none() -> Self {
        Self {
            shapiro: false,
            lilliefors: false,
            levene: false,
            brown_forsythe: false,
        }
    }
}

/// Shared per-request configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOptions {
    pub alternative: Alternative,
    /// Confidence level for intervals, in (0, 1)
    pub confidence_level: f64,
    /// Significance level for conclusions, in [0, 1]
    pub alpha: f64,
    pub diagnostics: DiagnosticFlags,
    /// Compute post-hoc power (t families; the proportion Z always reports it)
    pub power: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            confidence_level: 0.95,
            alpha: 0.05,
            diagnostics: DiagnosticFlags::default(),
            power: false,
        }
    }
}

impl TestOptions {
    /// Check the numeric ranges shared by every family.
    pub fn validate(&self) -> StatResult<()> {
        if !self.confidence_level.is_finite()
            || self.confidence_level <= 0.0
            || self.confidence_level >= 1.0
        {
            return Err(StatError::validation(
                "Confidence level must be between 0 and 1.",
            ));
        }
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(StatError::validation("Alpha_value must be between 0 and 1."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_alternative_spellings() {
        assert_eq!(Alternative::parse("two-sided").unwrap(), Alternative::TwoSided);
        assert_eq!(Alternative::parse("Greater").unwrap(), Alternative::Greater);
        assert_eq!(Alternative::parse("larger").unwrap(), Alternative::Greater);
        assert_eq!(Alternative::parse("smaller").unwrap(), Alternative::Less);
        assert!(Alternative::parse("both").is_err());
    }

    #[test]
    fn default_options_are_valid() {
        let opts = TestOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.alternative, Alternative::TwoSided);
        assert!((opts.confidence_level - 0.95).abs() < 1e-12);
        assert!((opts.alpha - 0.05).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let mut opts = TestOptions::default();
        opts.confidence_level = 1.0;
        assert!(opts.validate().is_err());
        opts.confidence_level = 0.95;
        opts.alpha = 1.5;
        assert!(opts.validate().is_err());
    }
}
