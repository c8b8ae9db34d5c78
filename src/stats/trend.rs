use crate::numeric::{ratio, round_to};

/// Whole-number percentage change; growth from zero reads as +100%.
pub fn percent_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }

    (((current - previous) / previous) * 100.0).round() as i64
}

pub fn efficiency_rating(deliveries: u64, hours_worked: f64) -> f64 {
    round_to(ratio(deliveries as f64, hours_worked), 1)
}
