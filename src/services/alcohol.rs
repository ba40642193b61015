//! Weighted-average alcohol-by-volume calculation.
//!
//! Every pour contributes its volume to the denominator, so zero-ABV mixers
//! dilute the result. The percentage is
//! `(Σ measure_ml · abv / 100) / Σ measure_ml × 100`, rounded to two decimals
//! with ties away from zero.

use serde::{Deserialize, Serialize};

/// Snapshot of one ingredient's strength and the volume poured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pour {
    /// Percentage, 0-100
    pub alcohol_content: f64,
    pub measure_ml: f64,
}

impl Pour {
    pub fn new(alcohol_content: f64, measure_ml: f64) -> Self {
        Self { alcohol_content, measure_ml }
    }
}

/// Aggregate ABV percentage of `pours`. Returns 0 for an empty list or zero total volume.
pub fn calculate_alcohol_content(pours: &[Pour]) -> f64 {
    // Volumes are taken relative to the largest pour so the sums stay finite
    let largest = pours.iter().map(|pour| pour.measure_ml).fold(0.0_f64, f64::max);
    if !(largest.is_finite() && largest > 0.0) {
        return 0.0;
    }

    let (alcohol, volume) = pours.iter().fold((0.0_f64, 0.0_f64), |(alcohol, volume), pour| {
        let share = pour.measure_ml / largest;
        (alcohol + share * (pour.alcohol_content / 100.0), volume + share)
    });

    let percentage = alcohol / volume * 100.0;
    if percentage.is_finite() {
        round_to_cents(percentage)
    } else {
        0.0
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
