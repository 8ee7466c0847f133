//! Fixed-decimal rounding for report fields
//!
//! Each test family documents a rounding contract (three decimals for
//! display fields, five or eight for precise p-value fields). Reports
//! apply these at construction so serialization is a plain pass-through.

/// Round half away from zero to `places` decimal digits.
pub fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}

pub fn round3(x: f64) -> f64 {
    round_to(x, 3)
}

pub fn round5(x: f64) -> f64 {
    round_to(x, 5)
}

pub fn round8(x: f64) -> f64 {
    round_to(x, 8)
}
