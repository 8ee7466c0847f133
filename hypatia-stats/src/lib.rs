//! hypatia-stats: the statistical computation core
//!
//! Pure, deterministic functions from validated numeric inputs to fully
//! rounded report structures. No I/O, no logging, no shared state; the
//! transport layer owns everything else.

pub mod describe;
pub mod diagnostics;
pub mod dist;
pub mod engines;
pub mod power;

pub use describe::Descriptive;
pub use engines::one_sample_t::{one_sample_t_test, OneSampleTReport};
pub use engines::paired_t::{paired_t_test, PairedTReport};
pub use engines::proportion_z::{proportion_z_test, ProportionZReport};
pub use engines::two_sample_t::{two_sample_t_test, TwoSampleTReport};
pub use engines::two_sample_z::{two_sample_z_test, TwoSampleZReport};
