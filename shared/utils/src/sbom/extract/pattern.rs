//! Deterministic description extractor.
//!
//! Scans a description for the four labeled geometry fields and the
//! `Twist …` wire-list prefix. A description missing any required piece
//! is not a twisted-wire record as far as this extractor is concerned and
//! yields `None`; the caller skips it silently.

use regex::Regex;

use veriloom_models::TwistSpec;

pub struct PatternExtractor {
    pitch: Regex,
    untwist_a: Regex,
    untwist_b: Regex,
    twist_length: Regex,
    wire_group: Regex,
    wire_id: Regex,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self {
            pitch: Regex::new(r"Pitch:\s*([\d.]+)").unwrap(),
            untwist_a: Regex::new(r"Untwist A:\s*([\d.]+)").unwrap(),
            untwist_b: Regex::new(r"Untwist B:\s*([\d.]+)").unwrap(),
            twist_length: Regex::new(r"Twist length:\s*([\d.]+)").unwrap(),
            // Comma-joined list following the word "Twist"
            wire_group: Regex::new(r"Twist\s+([^,]+(?:,[^,]+)*)").unwrap(),
            wire_id: Regex::new(r"(\d+\(\d+\))").unwrap(),
        }
    }
}

impl PatternExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, description: &str) -> Option<TwistSpec> {
        let pitch = self.capture_number(&self.pitch, description)?;
        let untwist_a = self.capture_number(&self.untwist_a, description)?;
        let untwist_b = self.capture_number(&self.untwist_b, description)?;
        let twist_length = self.capture_number(&self.twist_length, description)?;

        let mut wires = Vec::new();
        for group in self.wire_group.captures_iter(description) {
            for id in self.wire_id.captures_iter(&group[1]) {
                wires.push(id[1].to_string());
            }
        }
        if wires.is_empty() {
            return None;
        }

        Some(TwistSpec {
            wires,
            pitch,
            untwist_a,
            untwist_b,
            twist_length,
        })
    }

    fn capture_number(&self, pattern: &Regex, description: &str) -> Option<f64> {
        pattern
            .captures(description)
            .and_then(|c| c[1].parse::<f64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FULL: &str =
        "Twist 45(2), 46(1), Pitch: 10.0, Untwist A: 5.0, Untwist B: 6.0, Twist length: 100.0";

    #[test]
    fn test_full_description_extracts() {
        let spec = PatternExtractor::new().extract(FULL).unwrap();
        assert_eq!(spec.wires, vec!["45(2)".to_string(), "46(1)".to_string()]);
        assert_eq!(spec.pitch, 10.0);
        assert_eq!(spec.untwist_a, 5.0);
        assert_eq!(spec.untwist_b, 6.0);
        assert_eq!(spec.twist_length, 100.0);
    }

    #[test]
    fn test_missing_numeric_field_is_skipped() {
        // No Untwist B / Twist length: not a twisted-wire record here
        assert!(PatternExtractor::new()
            .extract("Twist 45(2), pitch: 10.0")
            .is_none());
    }

    #[test]
    fn test_missing_wire_list_is_skipped() {
        assert!(PatternExtractor::new()
            .extract("Pitch: 10.0, Untwist A: 5.0, Untwist B: 6.0, Twist length: 100.0")
            .is_none());
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(PatternExtractor::new()
            .extract("twist 45(2), pitch: 10.0, untwist a: 5.0, untwist b: 6.0, twist length: 100.0")
            .is_none());
    }

    proptest! {
        /// Any description carrying all four labels and at least one wire
        /// id after "Twist" produces a fully-populated record.
        #[test]
        fn prop_complete_descriptions_always_extract(
            n in 1u32..500,
            m in 1u32..10,
            pitch in 0.1f64..999.0,
            a in 0.1f64..999.0,
            b in 0.1f64..999.0,
            len in 0.1f64..9999.0,
        ) {
            let description = format!(
                "Twist {n}({m}), Pitch: {pitch:.2}, Untwist A: {a:.2}, Untwist B: {b:.2}, Twist length: {len:.2}"
            );
            let spec = PatternExtractor::new().extract(&description);
            prop_assert!(spec.is_some());
            let spec = spec.unwrap();
            prop_assert_eq!(&spec.wires[0], &format!("{n}({m})"));
            prop_assert!((spec.pitch - pitch).abs() < 0.01);
        }
    }
}
