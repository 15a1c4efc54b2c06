//! Extracted wire facts.
//!
//! Common output shape of the two description extractors. The
//! deterministic path promises a fully-populated [`TwistSpec`] or nothing;
//! the natural-language path always yields a [`WireFacts`], possibly with
//! every field absent and a confidence marking how it got there.

use serde::{Deserialize, Serialize};

/// Best-effort extraction from one free-text description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFacts {
    /// Wire identifiers of the shape `N(M)`, in order of appearance.
    pub wires: Vec<String>,
    pub pitch: Option<f64>,
    pub untwist_a: Option<f64>,
    pub untwist_b: Option<f64>,
    pub twist_length: Option<f64>,
    /// Twist direction, `S` or `Z`, when stated.
    pub direction: Option<String>,
    /// Two-letter wire color abbreviations, upper-cased.
    pub colors: Vec<String>,
    /// 1.0 when the token-context walk found at least one numeric field,
    /// 0.7 when only the labeled-pattern fallback produced values.
    pub confidence: f64,
}

impl WireFacts {
    pub fn empty() -> Self {
        Self {
            wires: Vec::new(),
            pitch: None,
            untwist_a: None,
            untwist_b: None,
            twist_length: None,
            direction: None,
            colors: Vec::new(),
            confidence: 1.0,
        }
    }

    pub fn has_measurements(&self) -> bool {
        self.pitch.is_some()
            || self.untwist_a.is_some()
            || self.untwist_b.is_some()
            || self.twist_length.is_some()
    }
}

/// A complete twisted-wire record from the deterministic extractor: the
/// wire list plus all four geometry fields, none optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TwistSpec {
    pub wires: Vec<String>,
    pub pitch: f64,
    pub untwist_a: f64,
    pub untwist_b: f64,
    pub twist_length: f64,
}
