//! Goodness-of-fit tests against the normal distribution
//!
//! Two selectable methods answering the same question:
//! - Shapiro-Wilk via Royston's AS R94 algorithm (Blom scores, corrected
//!   leading coefficients, small/large-sample p transforms).
//! - Lilliefors: Kolmogorov-Smirnov distance against the normal fitted by
//!   the sample mean and deviation, Dallal-Wilkinson p approximation.

use hypatia_core::{StatError, StatResult};

use crate::describe::mean;
use crate::dist::normal::{standard_normal_cdf, standard_normal_inv};

/// Threshold is fixed by design, not tied to the request alpha.
const NORMALITY_ALPHA: f64 = 0.05;

/// Outcome of one normality test run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityCheck {
    pub statistic: f64,
    pub p_value: f64,
    pub passed: bool,
}

impl NormalityCheck {
    fn from_p(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value,
            passed: p_value > NORMALITY_ALPHA,
        }
    }

    /// Conservative two-group combination: keep the smaller p-value.
    pub fn combine(self, other: NormalityCheck) -> NormalityCheck {
        let worst = if other.p_value < self.p_value {
            other
        } else {
            self
        };
        NormalityCheck {
            statistic: worst.statistic,
            p_value: worst.p_value,
            passed: self.passed && other.passed,
        }
    }
}

fn checked_sorted(data: &[f64], min_n: usize, test: &str) -> StatResult<Vec<f64>> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(StatError::invalid_type(
            "sample values must be finite numbers",
        ));
    }
    if data.len() < min_n {
        return Err(StatError::insufficient_data(format!(
            "{test} requires at least {min_n} values, got {}",
            data.len()
        )));
    }
    let mut x = data.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(x)
}

// ============ Shapiro-Wilk ============

/// Shapiro-Wilk W test, supported for 3 ≤ n ≤ 5000.
pub fn shapiro_wilk(data: &[f64]) -> StatResult<NormalityCheck> {
    let n = data.len();
    if n > 5000 {
        return Err(StatError::validation(
            "Shapiro-Wilk test is limited to 5000 values.",
        ));
    }
    let x = checked_sorted(data, 3, "Shapiro-Wilk test")?;

    if x[n - 1] - x[0] < 1e-300 {
        // zero spread: W is undefined, downstream sd division would be too
        return Err(StatError::DivisionByZero);
    }

    if n == 3 {
        return Ok(shapiro_wilk_n3(&x));
    }

    let nn2 = n / 2;
    let a = sw_coefficients(n, nn2)?;

    // W = (Σ a_i (x_(n+1-i) - x_(i)))² / Σ (x_i - x̄)²
    let mut b = 0.0;
    for i in 0..nn2 {
        b += a[i] * (x[n - 1 - i] - x[i]);
    }
    let m = mean(&x)?;
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();
    if ss < 1e-300 {
        return Err(StatError::DivisionByZero);
    }

    let w = ((b * b) / ss).min(1.0);
    let p = sw_p_value(w, n);

    Ok(NormalityCheck::from_p(w, p.clamp(0.0, 1.0)))
}

// Exact small-sample case: a = [1/√2, 0, -1/√2]
fn shapiro_wilk_n3(x: &[f64]) -> NormalityCheck {
    let a1 = std::f64::consts::FRAC_1_SQRT_2;
    let m = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();

    let numerator = a1 * (x[2] - x[0]);
    let w = ((numerator * numerator) / ss).clamp(0.75, 1.0);

    // p = 1 - (6/π) · arccos(√W), exact for n = 3
    let p = (1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos()).clamp(0.0, 1.0);
    NormalityCheck::from_p(w, p)
}

// Royston (1992) polynomial constants, AS R94
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

// Horner evaluation: c[0] + c[1]·x + c[2]·x² + ...
fn sw_poly(c: &[f64], x: f64) -> f64 {
    let mut result = c[c.len() - 1];
    for i in (0..c.len() - 1).rev() {
        result = result * x + c[i];
    }
    result
}

// Weights from Blom's expected normal order statistics, with Royston's
// polynomial corrections to the one (n ≤ 5) or two leading coefficients.
fn sw_coefficients(n: usize, nn2: usize) -> StatResult<Vec<f64>> {
    let mut a = vec![0.0; nn2];

    let mut m = vec![0.0; nn2];
    let mut summ2 = 0.0;
    for (i, mi) in m.iter_mut().enumerate() {
        let p = (i as f64 + 1.0 - 0.375) / (n as f64 + 0.25);
        *mi = standard_normal_inv(p);
        summ2 += *mi * *mi;
    }
    summ2 *= 2.0;
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;

    if n <= 5 {
        let fac_sq = summ2 - 2.0 * m[0] * m[0];
        let one_minus = 1.0 - 2.0 * a1 * a1;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return Err(StatError::Unexpected(
                "Shapiro-Wilk coefficient normalization failed".into(),
            ));
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        for i in 1..nn2 {
            a[i] = -m[i] / fac;
        }
    } else {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        let fac_sq = summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1];
        let one_minus = 1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return Err(StatError::Unexpected(
                "Shapiro-Wilk coefficient normalization failed".into(),
            ));
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        a[1] = a2;
        for i in 2..nn2 {
            a[i] = -m[i] / fac;
        }
    }

    Ok(a)
}

// Royston's W → z transformation; p is the upper normal tail.
fn sw_p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    if n <= 11 {
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y2 = -(gamma - y).ln();
        let m = sw_poly(&SW_C3, nf);
        let s = sw_poly(&SW_C4, nf).exp();
        if s < 1e-300 {
            return 0.0;
        }
        1.0 - standard_normal_cdf((y2 - m) / s)
    } else {
        let xx = nf.ln();
        let m = sw_poly(&SW_C5, xx);
        let s = sw_poly(&SW_C6, xx).exp();
        if s < 1e-300 {
            return 0.0;
        }
        1.0 - standard_normal_cdf((y - m) / s)
    }
}

// ============ Lilliefors ============

/// Lilliefors test: KS distance against the normal fitted by the sample
/// mean and standard deviation. Requires n ≥ 4.
pub fn lilliefors(data: &[f64]) -> StatResult<NormalityCheck> {
    let x = checked_sorted(data, 4, "Lilliefors test")?;
    let n = x.len();
    let nf = n as f64;

    let m = mean(&x)?;
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();
    let sd = (ss / (nf - 1.0)).sqrt();
    if sd < 1e-300 {
        return Err(StatError::DivisionByZero);
    }

    // D = max deviation between the empirical CDF steps and Φ((x-μ)/s)
    let mut d = 0.0_f64;
    for (i, &v) in x.iter().enumerate() {
        let phi = standard_normal_cdf((v - m) / sd);
        let upper = (i as f64 + 1.0) / nf - phi;
        let lower = phi - i as f64 / nf;
        d = d.max(upper).max(lower);
    }

    let p = lilliefors_p_value(d, n);
    Ok(NormalityCheck::from_p(d, p.clamp(0.0, 1.0)))
}

// Dallal-Wilkinson (1986) approximation, calibrated for p ≤ 0.1; above
// that region fall back to the asymptotic Kolmogorov series with the
// Stephens small-sample adjustment.
fn lilliefors_p_value(d: f64, n: usize) -> f64 {
    let nf = n as f64;
    let (d_adj, n_adj) = if n > 100 {
        (d * (nf / 100.0).powf(0.49), 100.0)
    } else {
        (d, nf)
    };

    let p = (-7.01256 * d_adj * d_adj * (n_adj + 2.78019)
        + 2.99587 * d_adj * (n_adj + 2.78019).sqrt()
        - 0.122119
        + 0.974598 / n_adj.sqrt()
        + 1.67997 / n_adj)
        .exp();

    if p <= 0.1 {
        p
    } else {
        let lambda = d * (nf.sqrt() - 0.01 + 0.85 / nf.sqrt());
        kolmogorov_sf(lambda)
    }
}

// Asymptotic Kolmogorov survival: 2 Σ (-1)^{k-1} exp(-2k²λ²)
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    for k in 1..100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        if k % 2 == 0 {
            sum -= term;
        } else {
            sum += term;
        }
        if term < 1e-10 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMALISH: [f64; 11] = [
        55.0, 45.0, 65.0, 54.0, 43.0, 45.0, 54.0, 63.0, 73.0, 36.0, 65.0,
    ];

    #[test]
    fn shapiro_passes_plausible_data() {
        // scipy reports W ≈ 0.962, p ≈ 0.80 for this sample
        let check = shapiro_wilk(&NORMALISH).unwrap();
        assert!(check.statistic > 0.9 && check.statistic <= 1.0);
        assert!(check.p_value > 0.5);
        assert!(check.passed);
    }

    #[test]
    fn shapiro_rejects_extreme_skew() {
        let skewed = [
            1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 400.0, 1.0, 1.0, 2.0, 1.0, 1.0, 500.0,
        ];
        let check = shapiro_wilk(&skewed).unwrap();
        assert!(check.p_value < 0.05);
        assert!(!check.passed);
    }

    #[test]
    fn shapiro_constant_sample_is_div_zero() {
        assert_eq!(
            shapiro_wilk(&[5.0, 5.0, 5.0, 5.0]).unwrap_err(),
            StatError::DivisionByZero
        );
    }

    #[test]
    fn shapiro_small_sample_limits() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]).unwrap_err().code(),
            "INSUFFICIENT_DATA"
        );
        assert!(shapiro_wilk(&[1.0, 2.5, 2.9]).is_ok());
    }

    #[test]
    fn lilliefors_passes_plausible_data() {
        let check = lilliefors(&NORMALISH).unwrap();
        assert!(check.statistic > 0.0 && check.statistic < 1.0);
        assert!(check.passed, "p = {}", check.p_value);
    }

    #[test]
    fn lilliefors_rejects_extreme_skew() {
        let skewed = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 400.0, 450.0, 500.0, 1.0,
            1.0, 1.0, 1.0, 1.0,
        ];
        let check = lilliefors(&skewed).unwrap();
        assert!(check.p_value < 0.05);
    }

    #[test]
    fn combine_keeps_the_worst_group() {
        let good = NormalityCheck { statistic: 0.97, p_value: 0.8, passed: true };
        let bad = NormalityCheck { statistic: 0.71, p_value: 0.01, passed: false };
        let combined = good.combine(bad);
        assert!((combined.p_value - 0.01).abs() < 1e-12);
        assert!(!combined.passed);
        assert!((combined.statistic - 0.71).abs() < 1e-12);
    }
}
