//! Normalized classification segments
//!
//! Raw segments carry fractional probability and deviation (0..1). The display form is a
//! percentage with two decimals, kept as a string exactly as rendered.

use eegwa_common::api::RawSegment;
use serde::Serialize;

/// Display-ready detection window
///
/// A raw segment without `std` still gets a formatted deviation: the missing value is
/// treated as NaN and goes through the same multiply-then-format path, so `std` reads
/// `"NaN"`. Use [`ClassificationSegment::std_value`] when an absent deviation matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSegment {
    pub nr: u32,
    /// Probability percentage, two decimals (`"85.32"`)
    pub prob: String,
    /// Standard deviation percentage, two decimals (`"10.00"`, or `"NaN"`)
    pub std: String,
    pub start_time: i64,
    pub stop_time: i64,
}

impl ClassificationSegment {
    /// Probability percentage as a number
    pub fn prob_value(&self) -> Option<f64> {
        self.prob.parse().ok()
    }

    /// Deviation percentage as a number; `None` when the raw value was missing
    pub fn std_value(&self) -> Option<f64> {
        self.std.parse::<f64>().ok().filter(|v| !v.is_nan())
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}", fraction * 100.0)
}

/// Convert one raw segment to display form
pub fn normalize(raw: &RawSegment) -> ClassificationSegment {
    ClassificationSegment {
        nr: raw.nr,
        prob: percent(raw.prob),
        std: percent(raw.std.unwrap_or(f64::NAN)),
        start_time: raw.start_time,
        stop_time: raw.stop_time,
    }
}

pub fn normalize_all(raw: &[RawSegment]) -> Vec<ClassificationSegment> {
    raw.iter().map(normalize).collect()
}
