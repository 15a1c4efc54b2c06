//! Fact Extractors
//!
//! Two interchangeable strategies that pull structured wire measurements
//! out of free-text cost-result descriptions: a deterministic labeled
//! pattern matcher and a best-effort token-context extractor with a
//! confidence signal.

pub mod nlp;
pub mod pattern;

pub use nlp::NlpExtractor;
pub use pattern::PatternExtractor;

/// Normalize a wire identifier to its join key: strip everything outside
/// digits and parentheses, so `"45 (2)"`, `"45(2)"` and `" 45(2) "` all
/// resolve to `"45(2)"`.
pub fn normalize_wire_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '(' || *c == ')')
        .collect()
}
