//! Phred helpers. `average_quality` and `phred_to_percent` are library API; the
//! report itself prints arithmetic means of per-read qualities.

use super::basic;

pub fn phred_to_error(q: f64) -> f64 {
    10f64.powf(q / -10.0)
}

pub fn error_to_phred(p: f64) -> f64 {
    -10.0 * p.log10()
}

pub fn phred_to_percent(q: f64) -> f64 {
    100.0 * (1.0 - phred_to_error(q))
}

// averaged as error probabilities, then converted back
pub fn average_quality(quals: &[f64]) -> Option<f64> {
    if quals.is_empty() {
        return None;
    }
    let mean_error = quals.iter().map(|&q| phred_to_error(q)).sum::<f64>() / quals.len() as f64;
    Some(error_to_phred(mean_error))
}

pub fn median_quality(quals: &[f64]) -> Option<f64> {
    basic::median(quals)
}
