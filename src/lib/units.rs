/// Rounds value to the given number of decimal places.
///
/// Only used at presentation boundaries (report display, CSV export).
/// Pipeline stages always consume unrounded upstream values.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounds to 2 decimal places (kilometers, liters, kWh, kg).
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

// ratio
//
// Divides numerator by denominator; a non-positive denominator yields 0.
// Partially filled inputs must produce stable zeros instead of NaN/inf.
//
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Share given in percent as a fraction
pub fn percent(share: f64) -> f64 {
    share / 100.0
}
