//! Normality and equal-variance diagnostics
//!
//! Normality classification uses a fixed 0.05 threshold, independent of the
//! caller's alpha. When the same normality test runs on two groups, the
//! reported p-value is the minimum of the two: the diagnostic fails if
//! either group fails.

pub mod normality;
pub mod variance;

pub use normality::{lilliefors, shapiro_wilk, NormalityCheck};
pub use variance::{brown_forsythe, levene, VarianceCheck};
