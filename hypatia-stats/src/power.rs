//! Post-hoc statistical power
//!
//! Normal approximation to the non-central distribution of the test
//! statistic: with noncentrality δ the achieved power is
//!   one-tailed  Φ(δ − z₁₋α)
//!   two-tailed  1 − Φ(z₁₋α∕₂ − δ) + Φ(−z₁₋α∕₂ − δ)
//! An effect size of exactly 0 legitimately yields power ≈ alpha; callers
//! must not treat that as a failure.

use hypatia_core::{round::round3, StatError, StatResult};
use serde::Serialize;

use crate::dist::normal::{standard_normal_cdf, standard_normal_inv};

/// Achieved power under both tail framings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerEstimate {
    pub one_tailed: f64,
    pub two_tailed: f64,
}

impl PowerEstimate {
    pub fn rounded(&self) -> Self {
        Self {
            one_tailed: round3(self.one_tailed),
            two_tailed: round3(self.two_tailed),
        }
    }
}

fn check_alpha(alpha: f64) -> StatResult<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(StatError::validation(
            "Power analysis requires 0 < alpha < 1.",
        ));
    }
    Ok(())
}

fn check_effect(effect_size: f64) -> StatResult<()> {
    if !effect_size.is_finite() {
        return Err(StatError::invalid_type(
            "effect size must be a finite number",
        ));
    }
    Ok(())
}

fn power_from_delta(delta: f64, alpha: f64) -> PowerEstimate {
    let delta = delta.abs();
    let z_one = standard_normal_inv(1.0 - alpha);
    let z_two = standard_normal_inv(1.0 - alpha / 2.0);

    let one_tailed = standard_normal_cdf(delta - z_one);
    let two_tailed =
        1.0 - standard_normal_cdf(z_two - delta) + standard_normal_cdf(-z_two - delta);

    PowerEstimate {
        one_tailed: one_tailed.clamp(0.0, 1.0),
        two_tailed: two_tailed.clamp(0.0, 1.0),
    }
}

/// One-sample (or paired-difference) design: δ = d·√n.
pub fn one_sample_power(effect_size: f64, n: usize, alpha: f64) -> StatResult<PowerEstimate> {
    check_effect(effect_size)?;
    check_alpha(alpha)?;
    if n < 1 {
        return Err(StatError::insufficient_data(
            "Power analysis requires at least one observation.",
        ));
    }
    Ok(power_from_delta(effect_size * (n as f64).sqrt(), alpha))
}

/// Two-independent-sample design: δ = d·√(n₁n₂/(n₁+n₂)).
pub fn two_sample_power(
    effect_size: f64,
    n1: usize,
    n2: usize,
    alpha: f64,
) -> StatResult<PowerEstimate> {
    check_effect(effect_size)?;
    check_alpha(alpha)?;
    if n1 < 1 || n2 < 1 {
        return Err(StatError::insufficient_data(
            "Power analysis requires at least one observation per group.",
        ));
    }
    let n1 = n1 as f64;
    let n2 = n2 as f64;
    Ok(power_from_delta(
        effect_size * (n1 * n2 / (n1 + n2)).sqrt(),
        alpha,
    ))
}

/// Two-proportion design: the noncentrality is the pooled-se z of the
/// observed difference.
pub fn proportion_power(
    p1: f64,
    n1: usize,
    p2: f64,
    n2: usize,
    alpha: f64,
) -> StatResult<PowerEstimate> {
    check_alpha(alpha)?;
    if n1 < 1 || n2 < 1 {
        return Err(StatError::insufficient_data(
            "Power analysis requires at least one observation per group.",
        ));
    }
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let pooled = (n1f * p1 + n2f * p2) / (n1f + n2f);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1f + 1.0 / n2f)).sqrt();
    if se == 0.0 {
        return Err(StatError::DivisionByZero);
    }
    Ok(power_from_delta((p1 - p2) / se, alpha))
}
