//! Caller-supplied validation inputs.

use serde::{Deserialize, Serialize};

/// Expected work-center values for one validation run.
///
/// Every field is optional: an omitted field means the caller did not
/// request that comparison, which the work-center check reports as an
/// informational issue rather than silently skipping it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpectedWorkcenter {
    pub plant_ref: Option<String>,
    pub production_area_ref: Option<String>,
    /// Compared case- and whitespace-insensitively against the export.
    pub single_final_assembly: Option<String>,
}

impl ExpectedWorkcenter {
    pub fn is_empty(&self) -> bool {
        self.plant_ref.is_none()
            && self.production_area_ref.is_none()
            && self.single_final_assembly.is_none()
    }
}

/// Which description-extraction strategy the twisted-wire check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorMode {
    /// Fixed-label pattern matching; descriptions missing any required
    /// field are skipped, comparisons are exact.
    Deterministic,
    /// Token-context extraction with confidence scoring; comparisons use
    /// numeric tolerance and gaps surface as diagnostic notes.
    Nlp,
}

impl Default for ExtractorMode {
    fn default() -> Self {
        ExtractorMode::Deterministic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expectation() {
        assert!(ExpectedWorkcenter::default().is_empty());
        let expected = ExpectedWorkcenter {
            plant_ref: Some("1200".to_string()),
            ..Default::default()
        };
        assert!(!expected.is_empty());
    }
}
