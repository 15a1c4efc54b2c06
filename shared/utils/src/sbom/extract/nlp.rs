//! Natural-language description extractor.
//!
//! Best-effort extraction from prose and shorthand descriptions. The
//! description is lower-cased and tokenized, then walked with an explicit
//! measurement-context state machine: a trigger word arms a context and
//! the next numeric token under that context is assigned to the matching
//! field. This extractor never fails; a description with nothing usable
//! yields empty facts, and the confidence score tells the caller which
//! path produced the values.

use regex::Regex;

use veriloom_models::WireFacts;

/// Two-letter wire color abbreviations recognized in descriptions.
const COLOR_CODES: [&str; 8] = ["wh", "bu", "gy", "bk", "rd", "ye", "gn", "bn"];

/// Confidence assigned when only the labeled-pattern fallback produced
/// values.
const FALLBACK_CONFIDENCE: f64 = 0.7;

/// Which measurement the next numeric token belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MeasurementContext {
    Pitch,
    Untwist,
    /// `anchored` records whether a `twist` token backs this context; an
    /// unanchored bare `length` never captures a value.
    TwistLength { anchored: bool },
}

pub struct NlpExtractor {
    token_re: Regex,
    wire_re: Regex,
    wire_loose_re: Regex,
    fb_pitch: Regex,
    fb_untwist_a: Regex,
    fb_untwist_b: Regex,
    fb_twist_length: Regex,
}

impl Default for NlpExtractor {
    fn default() -> Self {
        Self {
            // Wire ids and decimal numbers are single tokens; words and
            // stray punctuation split apart.
            token_re: Regex::new(r"\d+\(\d+\)|\d+(?:\.\d+)?|[a-z]+|[^\s]").unwrap(),
            wire_re: Regex::new(r"\d+\(\d+\)").unwrap(),
            wire_loose_re: Regex::new(r"\d+\s*\(\s*\d+\s*\)").unwrap(),
            fb_pitch: Regex::new(r"pitch:\s*([\d.]+)").unwrap(),
            fb_untwist_a: Regex::new(r"untwist a:\s*([\d.]+)").unwrap(),
            fb_untwist_b: Regex::new(r"untwist b:\s*([\d.]+)").unwrap(),
            fb_twist_length: Regex::new(r"twist length:\s*([\d.]+)").unwrap(),
        }
    }
}

impl NlpExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, description: &str) -> WireFacts {
        let mut facts = WireFacts::empty();
        let lowered = description.to_lowercase();

        facts.wires = self.find_wires(description);

        let tokens: Vec<&str> = self
            .token_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();
        self.walk_tokens(&tokens, &mut facts);

        if !facts.has_measurements() {
            self.apply_fallback(&lowered, &mut facts);
            facts.confidence = FALLBACK_CONFIDENCE;
        }

        facts
    }

    /// Wire identifiers anywhere in the description, with a looser
    /// whitespace-tolerant pass when the strict pattern finds nothing.
    fn find_wires(&self, description: &str) -> Vec<String> {
        let strict: Vec<String> = self
            .wire_re
            .find_iter(description)
            .map(|m| m.as_str().trim().to_string())
            .collect();
        if !strict.is_empty() {
            return strict;
        }
        self.wire_loose_re
            .find_iter(description)
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }

    fn walk_tokens(&self, tokens: &[&str], facts: &mut WireFacts) {
        let mut context: Option<MeasurementContext> = None;

        for (i, token) in tokens.iter().enumerate() {
            match *token {
                "pitch" => {
                    context = Some(MeasurementContext::Pitch);
                    continue;
                }
                "untwist" => {
                    context = Some(MeasurementContext::Untwist);
                    continue;
                }
                "twist" => {
                    context = Some(MeasurementContext::TwistLength { anchored: true });
                    continue;
                }
                "length" => {
                    context = Some(MeasurementContext::TwistLength {
                        anchored: neighbors_contain(tokens, i, "twist"),
                    });
                    continue;
                }
                "s" | "z" => {
                    facts.direction = Some(token.to_uppercase());
                    continue;
                }
                _ => {}
            }

            if COLOR_CODES.contains(token) {
                facts.colors.push(token.to_uppercase());
                continue;
            }

            if let (Ok(value), Some(active)) = (token.parse::<f64>(), context) {
                match active {
                    MeasurementContext::Pitch => facts.pitch = Some(value),
                    MeasurementContext::Untwist => {
                        // The next two tokens disambiguate end A vs end B
                        let lookahead = &tokens[(i + 1).min(tokens.len())
                            ..(i + 3).min(tokens.len())];
                        if lookahead.contains(&"a") {
                            facts.untwist_a = Some(value);
                        } else if lookahead.contains(&"b") {
                            facts.untwist_b = Some(value);
                        }
                    }
                    MeasurementContext::TwistLength { anchored } => {
                        if anchored {
                            facts.twist_length = Some(value);
                        }
                    }
                }
                context = None;
            }
        }
    }

    fn apply_fallback(&self, lowered: &str, facts: &mut WireFacts) {
        facts.pitch = capture_number(&self.fb_pitch, lowered);
        facts.untwist_a = capture_number(&self.fb_untwist_a, lowered);
        facts.untwist_b = capture_number(&self.fb_untwist_b, lowered);
        facts.twist_length = capture_number(&self.fb_twist_length, lowered);
    }
}

fn capture_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
}

fn neighbors_contain(tokens: &[&str], i: usize, word: &str) -> bool {
    let start = i.saturating_sub(2);
    let end = (i + 3).min(tokens.len());
    tokens[start..end]
        .iter()
        .enumerate()
        .any(|(j, t)| start + j != i && *t == word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom::extract::normalize_wire_id;

    #[test]
    fn test_token_walk_extracts_measurements() {
        let facts = NlpExtractor::new()
            .extract("Twist 45(2) wh 46(1) bu, S, pitch 10.0, untwist 5.0 a, untwist 6.0 b, twist length 100.0");
        assert_eq!(facts.wires, vec!["45(2)".to_string(), "46(1)".to_string()]);
        assert_eq!(facts.pitch, Some(10.0));
        assert_eq!(facts.untwist_a, Some(5.0));
        assert_eq!(facts.untwist_b, Some(6.0));
        assert_eq!(facts.twist_length, Some(100.0));
        assert_eq!(facts.direction.as_deref(), Some("S"));
        assert_eq!(facts.colors, vec!["WH".to_string(), "BU".to_string()]);
        assert_eq!(facts.confidence, 1.0);
    }

    #[test]
    fn test_bare_length_is_not_twist_length() {
        let facts = NlpExtractor::new().extract("length 200.0");
        assert_eq!(facts.twist_length, None);
        // Nothing extracted at all, so the fallback path marks this run
        assert_eq!(facts.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_length_of_twist_is_anchored() {
        let facts = NlpExtractor::new().extract("twist length 100.0");
        assert_eq!(facts.twist_length, Some(100.0));
        assert_eq!(facts.confidence, 1.0);
    }

    #[test]
    fn test_fallback_labeled_patterns() {
        // Labeled A/B values are invisible to the token walk (the letter
        // sits before the number) and only the fallback catches them
        let facts = NlpExtractor::new().extract("Untwist A: 5.0, Untwist B: 6.0");
        assert_eq!(facts.untwist_a, Some(5.0));
        assert_eq!(facts.untwist_b, Some(6.0));
        assert_eq!(facts.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_partial_description_still_yields_facts() {
        let facts = NlpExtractor::new().extract("Twist 45(2), pitch: 10.0");
        assert_eq!(facts.wires, vec!["45(2)".to_string()]);
        assert_eq!(facts.pitch, Some(10.0));
        assert_eq!(facts.untwist_a, None);
        assert!(facts.confidence >= FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_loose_wire_pattern_and_normalization() {
        let facts = NlpExtractor::new().extract("Twist 45 (2) only");
        assert_eq!(facts.wires.len(), 1);
        assert_eq!(normalize_wire_id(&facts.wires[0]), "45(2)");
    }

    #[test]
    fn test_empty_description_never_fails() {
        let facts = NlpExtractor::new().extract("");
        assert!(facts.wires.is_empty());
        assert!(!facts.has_measurements());
        assert_eq!(facts.confidence, FALLBACK_CONFIDENCE);
    }
}
