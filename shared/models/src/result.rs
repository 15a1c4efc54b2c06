//! Validation result models.
//!
//! The sole output contract of the reconciliation engine. A result is
//! constructed fresh per run and immutable once returned; downstream
//! renderers must not need to re-inspect the source documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal states of one validation run.
///
/// `Error` marks a structural problem (missing sheet or columns, source
/// fault) that prevented a check from running at all. `Fail` marks a run
/// that completed but found discrepancies. Per-item data issues never
/// produce `Error` on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Success,
    Fail,
    Error,
}

impl ValidationStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "success" => Some(Self::Success),
            "fail" => Some(Self::Fail),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// A run that produced a renderable outcome, discrepancies included.
    pub fn completed(&self) -> bool {
        !matches!(self, ValidationStatus::Error)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Fail => write!(f, "fail"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Aggregated outcome of one validation run.
///
/// Issue strings are human-readable and ordered in discovery order. The
/// three issue lists are independent accumulation channels; any non-empty
/// list drives the overall status to `fail` at finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub message: String,
    /// Wire-level numeric and identity discrepancies from the twisted-wire
    /// check.
    pub mismatches: Vec<String>,
    pub workcenter_validation: Vec<String>,
    pub wire_length_validation: Vec<String>,
    /// Diagnostic notes from the natural-language extraction path.
    /// Non-fatal and empty for deterministic runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nlp_processing_notes: Vec<String>,
}

impl ValidationResult {
    /// Fresh result in the pre-run state: success until a check says
    /// otherwise.
    pub fn new() -> Self {
        Self {
            status: ValidationStatus::Success,
            message: "All values matched.".to_string(),
            mismatches: Vec::new(),
            workcenter_validation: Vec::new(),
            wire_length_validation: Vec::new(),
            nlp_processing_notes: Vec::new(),
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.mismatches.is_empty()
            || !self.workcenter_validation.is_empty()
            || !self.wire_length_validation.is_empty()
    }

    /// Total count of accumulated issue strings across all channels,
    /// diagnostics excluded.
    pub fn issue_count(&self) -> usize {
        self.mismatches.len()
            + self.workcenter_validation.len()
            + self.wire_length_validation.len()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
