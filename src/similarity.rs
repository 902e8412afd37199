//! Edit-distance similarity between the monitored domain and a candidate.

use strsim::damerau_levenshtein;

/// Damerau-Levenshtein distance over the full domain strings, suffix included.
pub fn score(original: &str, candidate: &str) -> usize {
    damerau_levenshtein(original, candidate)
}

/// Distance expressed against the average length, clamped to 0..=100 and
/// rounded to two decimals.
pub fn similarity_percent(original: &str, candidate: &str) -> f64 {
    let distance = score(original, candidate) as f64;
    let avg_len = (original.chars().count() + candidate.chars().count()) as f64 / 2.0;
    if avg_len == 0.0 {
        return 100.0;
    }

    let raw = (avg_len - distance) / avg_len * 100.0;
    (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0
}
