// SPDX-License-Identifier: MIT OR Apache-2.0
//! Article extraction: a readability-style density pass, falling back to
//! heuristic text windows around target-field tokens when the pass scores
//! too low to trust (`spec.md` §4.4 #5).

use specfactory_types::{Candidate, CandidateMethod};

/// Minimum readability score below which callers should fall back to
/// windowed extraction instead of trusting the whole article body.
pub const READABILITY_THRESHOLD: f64 = 0.4;

/// Score a block of extracted article text by word count, average word
/// length, and heading density — a coarse stand-in for a full readability
/// algorithm, precise enough only to gate the windowed fallback.
#[must_use]
pub fn readability_score(text: &str, heading_count: usize) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let word_count = words.len() as f64;
    let avg_word_len = words.iter().map(|w| w.len()).sum::<usize>() as f64 / word_count;
    let length_score = (word_count / 400.0).min(1.0);
    let density_score = (avg_word_len / 6.0).min(1.0);
    let heading_score = (heading_count as f64 / 4.0).min(1.0);
    0.5 * length_score + 0.3 * density_score + 0.2 * heading_score
}

/// Byte-safe substring: walk outward from `start`/`end` to the nearest char
/// boundary rather than panicking on a multi-byte split.
fn safe_slice(text: &str, mut start: usize, mut end: usize) -> &str {
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Extract a `±window_chars` text window around the first occurrence of
/// each target-field token. The window text itself becomes the candidate
/// value, since this fallback does not attempt to parse a clean scalar out
/// of prose — it hands the surrounding context to consensus/LLM review.
#[must_use]
pub fn extract_windows(text: &str, field_tokens: &[&str], window_chars: usize, source_id: &str) -> Vec<Candidate> {
    let lower = text.to_lowercase();
    let mut candidates = Vec::new();
    for field in field_tokens {
        let token = field.to_lowercase();
        let Some(pos) = lower.find(&token) else {
            continue;
        };
        let start = pos.saturating_sub(window_chars);
        let end = (pos + token.len() + window_chars).min(text.len());
        let window = safe_slice(text, start, end).trim().to_string();
        if window.is_empty() {
            continue;
        }
        candidates.push(Candidate::new(
            (*field).to_string(),
            window,
            CandidateMethod::ArticleWindow,
            format!("window[{pos}]"),
            source_id,
            vec![],
        ));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(readability_score("", 0), 0.0);
    }

    #[test]
    fn longer_text_with_headings_scores_higher() {
        let short = "a b c";
        let long = "word ".repeat(500);
        assert!(readability_score(&long, 3) > readability_score(short, 0));
    }

    #[test]
    fn score_is_capped_at_one() {
        let huge = "antidisestablishmentarianism ".repeat(2000);
        assert!(readability_score(&huge, 100) <= 1.0);
    }

    #[test]
    fn extracts_window_around_token() {
        let text = "The mouse has a Weight of 63 grams and ships fast.";
        let candidates = extract_windows(text, &["weight"], 10, "src-1");
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].value.to_lowercase().contains("weight"));
        assert_eq!(candidates[0].method, CandidateMethod::ArticleWindow);
    }

    #[test]
    fn missing_token_yields_no_candidate() {
        let candidates = extract_windows("no relevant terms here", &["dpi"], 10, "src-1");
        assert!(candidates.is_empty());
    }

    #[test]
    fn window_near_text_start_does_not_panic() {
        let candidates = extract_windows("DPI is 25600", &["dpi"], 50, "src-1");
        assert_eq!(candidates.len(), 1);
    }
}
