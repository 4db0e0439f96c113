// Confidence heuristic for recognized text
//
// NOT a model probability. Tesseract's CLI text output carries no
// per-word confidence, so the score is derived from the text alone:
// longer output scores higher, punctuation-heavy (garbled) output lower.

/// Starting score for any non-blank text
const BASE_SCORE: f64 = 0.5;
/// Maximum bonus for text length (reached at 30 chars)
const MAX_LENGTH_BONUS: f64 = 0.3;
/// Maximum penalty for non-alphanumeric noise
const MAX_NOISE_PENALTY: f64 = 0.4;

/// Score recognized text in [0, 1]. Blank text scores exactly 0.
pub fn calculate_confidence(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let length = text.chars().count() as f64;
    let noise = text
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
        .count() as f64;

    let mut score = BASE_SCORE;
    score += (length / 100.0).min(MAX_LENGTH_BONUS);
    score -= (noise / length).min(MAX_NOISE_PENALTY);

    score.clamp(0.0, 1.0)
}
