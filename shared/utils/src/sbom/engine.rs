//! Reconciliation Engine
//!
//! Orchestrates one validation run over a loaded SBOM export and
//! specification workbook: work-center attributes, twisted-wire geometry
//! and wire-cut lengths, in that order. Structural problems (missing
//! sheet or columns) end the run with an `error` status; data-level
//! discrepancies accumulate as issue strings and never abort the run; no
//! fault escapes a stage boundary.
//!
//! One `Validator` serves exactly one run. Callers needing per-request
//! isolation construct a fresh instance per request.

use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{VeriloomError, VeriloomResult};
use crate::sbom::extract::{normalize_wire_id, NlpExtractor, PatternExtractor};
use crate::sbom::query::SourceSet;
use crate::sbom::workbook::WorkbookLoader;
use crate::sbom::xml::XmlLoader;
use veriloom_models::{
    CellValue, ExpectedWorkcenter, ExtractorMode, SbomDocument, SpecWorkbook, ValidationResult,
    ValidationStatus,
};

// Fixed vocabulary shared with the upstream data producers. These are
// contract constants, not configuration.
pub const TWISTED_WIRES_SHEET: &str = "Twisted Wires";
pub const WIRES_LENGTHS_SHEET: &str = "Wires Lengths";

const COL_WIRES_NR: &str = "Wires Nr";
const COL_PITCH: &str = "Pitch";
const COL_OPEN_END_1: &str = "Open end Length 1";
const COL_OPEN_END_2: &str = "Open end Length 2";
const COL_LENGTH_OF_TWIST: &str = "Length of twist";

const COL_WIRE_NR: &str = "Wire Nr";
const COL_LENGTH: &str = "Length";

const ATTR_PLANT_REF: &str = "workcenterplantreference";
const ATTR_PRODUCTION_AREA_REF: &str = "workcenterproductionareareference";
const ATTR_SINGLE_FINAL_ASSEMBLY: &str = "workcenter_usesinglefinalassembly";

/// Absolute tolerance for numeric reference comparisons.
pub const NUMERIC_TOLERANCE: f64 = 0.01;

/// Tolerant float comparison: differing by exactly the tolerance still
/// counts as equal.
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= NUMERIC_TOLERANCE
}

/// Parse the two source byte streams into their normalized documents.
/// The underlying buffers can be dropped as soon as this returns.
pub fn load_sources(
    xml_bytes: &[u8],
    workbook_bytes: &[u8],
) -> VeriloomResult<(SbomDocument, SpecWorkbook)> {
    let sbom = XmlLoader::default().parse_bytes(xml_bytes)?;
    let workbook = WorkbookLoader::default().parse_bytes(workbook_bytes)?;
    Ok((sbom, workbook))
}

/// Reference values for one wire from the "Twisted Wires" sheet. Cells
/// stay unparsed so a non-numeric value surfaces as a per-wire format
/// issue at comparison time rather than at load time.
struct ReferenceRow {
    pitch: CellValue,
    open_end1: CellValue,
    open_end2: CellValue,
    twist_len: CellValue,
}

pub struct Validator {
    sources: SourceSet,
    pattern: PatternExtractor,
    nlp: NlpExtractor,
    cut_wire_re: Regex,
}

impl Validator {
    pub fn new(sbom: SbomDocument, workbook: SpecWorkbook) -> Self {
        Self {
            sources: SourceSet::new(sbom, workbook),
            pattern: PatternExtractor::new(),
            nlp: NlpExtractor::new(),
            cut_wire_re: Regex::new(r"(?i)(\d+\(\d+\))\s+CUT\b").unwrap(),
        }
    }

    /// Run the full check pipeline and return the aggregated result.
    ///
    /// Stage order: work-center, twisted wires, wire lengths. A
    /// structural failure in the twisted-wire stage returns early with an
    /// `error` status and the wire-length list untouched.
    pub fn validate(
        &self,
        expected: &ExpectedWorkcenter,
        mode: ExtractorMode,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        debug!(?mode, "Starting validation run");

        self.check_workcenter(expected, &mut result);

        if !self.check_twisted_wires(mode, &mut result) {
            warn!(message = %result.message, "Validation run aborted on structural error");
            return result;
        }

        self.check_wire_lengths(&mut result);

        if result.has_issues() {
            result.status = ValidationStatus::Fail;
            result.message = "Validation completed with mismatches".to_string();
        }

        debug!(
            status = %result.status,
            issues = result.issue_count(),
            "Validation run finished"
        );
        result
    }

    // ------------------------------------------------------------------
    // Stage 1: work-center attributes
    // ------------------------------------------------------------------

    fn check_workcenter(&self, expected: &ExpectedWorkcenter, result: &mut ValidationResult) {
        if let Err(e) = self.workcenter_inner(expected, result) {
            result
                .workcenter_validation
                .push(format!("Error validating work center attributes: {e}"));
        }
    }

    fn workcenter_inner(
        &self,
        expected: &ExpectedWorkcenter,
        result: &mut ValidationResult,
    ) -> VeriloomResult<()> {
        let all_attributes = self.sources.sbom_attributes()?;
        // Single-record assumption: only the first record carries the
        // work-center identity.
        let attributes = all_attributes
            .first()
            .ok_or_else(|| VeriloomError::internal("No SBOM attributes found in XML data"))?;

        check_exact(
            "Workcenter Plant Reference",
            expected.plant_ref.as_deref(),
            attributes.get(ATTR_PLANT_REF).map(String::as_str),
            &mut result.workcenter_validation,
        );
        check_exact(
            "Workcenter Production Area Reference",
            expected.production_area_ref.as_deref(),
            attributes.get(ATTR_PRODUCTION_AREA_REF).map(String::as_str),
            &mut result.workcenter_validation,
        );
        check_relaxed(
            "Workcenter Use Single Final Assembly",
            expected.single_final_assembly.as_deref(),
            attributes
                .get(ATTR_SINGLE_FINAL_ASSEMBLY)
                .map(String::as_str),
            &mut result.workcenter_validation,
        );

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage 2: twisted-wire geometry
    // ------------------------------------------------------------------

    /// Returns whether the run may continue. Any fault inside the stage
    /// converts into an `error` status here; it never reaches the caller.
    fn check_twisted_wires(&self, mode: ExtractorMode, result: &mut ValidationResult) -> bool {
        match self.twisted_wires_inner(mode, result) {
            Ok(proceed) => proceed,
            Err(e) => {
                result.status = ValidationStatus::Error;
                result.message = format!("Error during twisted wires validation: {e}");
                false
            }
        }
    }

    fn twisted_wires_inner(
        &self,
        mode: ExtractorMode,
        result: &mut ValidationResult,
    ) -> VeriloomResult<bool> {
        let cost_results = self.sources.cost_results()?;
        if cost_results.is_empty() {
            result.status = ValidationStatus::Error;
            result.message = "No cost results found in SBOM XML.".to_string();
            return Ok(false);
        }

        let Some(sheet) = self.sources.sheet_by_name(TWISTED_WIRES_SHEET)? else {
            result.status = ValidationStatus::Error;
            result.message = format!("'{TWISTED_WIRES_SHEET}' sheet not found in Excel.");
            return Ok(false);
        };

        let wire_idx = sheet.column_index(COL_WIRES_NR);
        let pitch_idx = sheet.column_index(COL_PITCH);
        let open1_idx = sheet.column_index(COL_OPEN_END_1);
        let open2_idx = sheet.column_index(COL_OPEN_END_2);
        let twist_idx = sheet.column_index(COL_LENGTH_OF_TWIST);

        let (Some(wire_idx), Some(pitch_idx), Some(open1_idx), Some(open2_idx), Some(twist_idx)) =
            (wire_idx, pitch_idx, open1_idx, open2_idx, twist_idx)
        else {
            let missing: Vec<&str> = [
                (COL_WIRES_NR, wire_idx),
                (COL_PITCH, pitch_idx),
                (COL_OPEN_END_1, open1_idx),
                (COL_OPEN_END_2, open2_idx),
                (COL_LENGTH_OF_TWIST, twist_idx),
            ]
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(column, _)| *column)
            .collect();
            result.status = ValidationStatus::Error;
            result.message = format!("Required columns not found in Excel: {}", missing.join(", "));
            return Ok(false);
        };

        let mut reference: HashMap<String, ReferenceRow> = HashMap::new();
        for row in &sheet.data {
            let wire_cell = row.get(wire_idx).cloned().unwrap_or(CellValue::Empty);
            if wire_cell.is_empty() {
                continue;
            }
            let key = match mode {
                ExtractorMode::Deterministic => wire_cell.as_text(),
                ExtractorMode::Nlp => normalize_wire_id(&wire_cell.as_text()),
            };
            reference.insert(
                key,
                ReferenceRow {
                    pitch: cell_at(row, pitch_idx),
                    open_end1: cell_at(row, open1_idx),
                    open_end2: cell_at(row, open2_idx),
                    twist_len: cell_at(row, twist_idx),
                },
            );
        }

        for cost in cost_results {
            let Some(description) = cost.get("description").filter(|d| !d.is_empty()) else {
                continue;
            };
            match mode {
                ExtractorMode::Deterministic => {
                    self.check_description_deterministic(description, &reference, result);
                }
                ExtractorMode::Nlp => {
                    self.check_description_nlp(description, &reference, result);
                }
            }
        }

        Ok(true)
    }

    /// Deterministic variant: a description missing the wire-list prefix
    /// or any of the four labeled fields is skipped silently; comparisons
    /// are exact.
    fn check_description_deterministic(
        &self,
        description: &str,
        reference: &HashMap<String, ReferenceRow>,
        result: &mut ValidationResult,
    ) {
        let Some(spec) = self.pattern.extract(description) else {
            return;
        };

        for wire in &spec.wires {
            let wire_id = wire.trim();
            let Some(row) = reference.get(wire_id) else {
                result.mismatches.push(format!("{wire_id} missing in Excel"));
                continue;
            };

            let fields = [
                ("Pitch", spec.pitch, &row.pitch),
                ("Open end Length 1 (Untwist A)", spec.untwist_a, &row.open_end1),
                ("Open end Length 2 (Untwist B)", spec.untwist_b, &row.open_end2),
                ("Length of twist", spec.twist_length, &row.twist_len),
            ];
            for (label, sbom_value, cell) in fields {
                match cell.as_f64() {
                    Some(excel_value) => {
                        // Exact equality by contract; both sides were
                        // parsed from the same decimal notation.
                        #[allow(clippy::float_cmp)]
                        if excel_value != sbom_value {
                            result.mismatches.push(format!(
                                "{label} mismatch for {wire_id}: SBOM={sbom_value}, Excel={excel_value}"
                            ));
                        }
                    }
                    None => {
                        result.mismatches.push(format!(
                            "Invalid numeric format in Excel for {wire_id}: {cell}"
                        ));
                        break;
                    }
                }
            }
        }
    }

    /// Natural-language variant: wire ids are normalized before the join,
    /// comparisons are tolerance-based, and extraction gaps become
    /// diagnostic notes instead of mismatches.
    fn check_description_nlp(
        &self,
        description: &str,
        reference: &HashMap<String, ReferenceRow>,
        result: &mut ValidationResult,
    ) {
        let facts = self.nlp.extract(description);
        let preview: String = description.chars().take(50).collect();
        result.nlp_processing_notes.push(format!(
            "Processed description: {preview}... (Confidence: {:.1})",
            facts.confidence
        ));

        for wire in &facts.wires {
            let wire_id = normalize_wire_id(wire);
            let Some(row) = reference.get(&wire_id) else {
                result.mismatches.push(format!("{wire_id} missing in Excel"));
                continue;
            };

            check_nlp_field(result, "pitch", facts.pitch, &row.pitch, &wire_id);
            check_nlp_field(
                result,
                "open end length 1 (untwist A)",
                facts.untwist_a,
                &row.open_end1,
                &wire_id,
            );
            check_nlp_field(
                result,
                "open end length 2 (untwist B)",
                facts.untwist_b,
                &row.open_end2,
                &wire_id,
            );
            check_nlp_field(
                result,
                "twist length",
                facts.twist_length,
                &row.twist_len,
                &wire_id,
            );
        }
    }

    // ------------------------------------------------------------------
    // Stage 3: wire-cut lengths
    // ------------------------------------------------------------------

    fn check_wire_lengths(&self, result: &mut ValidationResult) {
        if let Err(e) = self.wire_lengths_inner(result) {
            result
                .wire_length_validation
                .push(format!("Error during wire length validation: {e}"));
        }
    }

    /// Unlike the twisted-wire stage, a missing sheet or missing columns
    /// degrade to a single note here instead of ending the run.
    fn wire_lengths_inner(&self, result: &mut ValidationResult) -> VeriloomResult<()> {
        let Some(sheet) = self.sources.sheet_by_name(WIRES_LENGTHS_SHEET)? else {
            result
                .wire_length_validation
                .push(format!("'{WIRES_LENGTHS_SHEET}' sheet not found in Excel"));
            return Ok(());
        };

        let wire_idx = sheet.column_index(COL_WIRE_NR);
        let length_idx = sheet.column_index(COL_LENGTH);
        let (Some(wire_idx), Some(length_idx)) = (wire_idx, length_idx) else {
            let missing: Vec<&str> = [(COL_WIRE_NR, wire_idx), (COL_LENGTH, length_idx)]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(column, _)| *column)
                .collect();
            result.wire_length_validation.push(format!(
                "Required columns not found in Excel: {}",
                missing.join(", ")
            ));
            return Ok(());
        };

        let mut reference: HashMap<String, f64> = HashMap::new();
        for row in &sheet.data {
            let wire_cell = row.get(wire_idx).cloned().unwrap_or(CellValue::Empty);
            if wire_cell.is_empty() {
                continue;
            }
            let wire = wire_cell.as_text();
            match row.get(length_idx).and_then(CellValue::as_f64) {
                Some(length) => {
                    reference.insert(wire, length);
                }
                None => result
                    .wire_length_validation
                    .push(format!("Invalid length value for wire {wire} in Excel")),
            }
        }

        for sub in self.sources.subassemblies_flattened()? {
            let name = sub.get("name").map(String::as_str).unwrap_or("");
            let quantity = sub.get("quantity").map(String::as_str).unwrap_or("");
            let unit = sub
                .get("unitofmeasure")
                .map(String::as_str)
                .unwrap_or("")
                .to_lowercase();

            let Some(caps) = self.cut_wire_re.captures(name) else {
                continue;
            };
            if quantity.is_empty() || !matches!(unit.as_str(), "per length" | "length") {
                continue;
            }
            let wire_id = caps[1].to_string();

            let Ok(xml_length) = quantity.trim().parse::<f64>() else {
                result
                    .wire_length_validation
                    .push(format!("Invalid quantity value for wire {wire_id} in XML"));
                continue;
            };

            match reference.get(&wire_id) {
                Some(&excel_length) => {
                    if !approx_equal(xml_length, excel_length) {
                        result.wire_length_validation.push(format!(
                            "Wire length mismatch for {wire_id}: XML={xml_length}, Excel={excel_length}"
                        ));
                    }
                }
                None => result.wire_length_validation.push(format!(
                    "Wire {wire_id} not found in Excel Wires Length sheet"
                )),
            }
        }

        Ok(())
    }
}

fn cell_at(row: &[CellValue], idx: usize) -> CellValue {
    row.get(idx).cloned().unwrap_or(CellValue::Empty)
}

/// Exact string comparison against the export. A supplied-but-absent XML
/// value is a missing-value issue; an unsupplied check is still recorded
/// as an informational issue, which inflates the issue count by design.
fn check_exact(label: &str, input: Option<&str>, xml: Option<&str>, issues: &mut Vec<String>) {
    match input {
        Some(input) => match xml {
            None => issues.push(format!("{label} missing in XML")),
            Some(xml) if input != xml => {
                issues.push(format!("{label} mismatch: Input={input}, XML={xml}"));
            }
            Some(_) => {}
        },
        None => issues.push(format!("No {label} input provided for validation")),
    }
}

/// Case- and whitespace-insensitive comparison for the
/// single-final-assembly flag.
fn check_relaxed(label: &str, input: Option<&str>, xml: Option<&str>, issues: &mut Vec<String>) {
    match input {
        Some(input) => match xml {
            None => issues.push(format!("{label} missing in XML")),
            Some(xml) => {
                if input.trim().to_lowercase() != xml.trim().to_lowercase() {
                    issues.push(format!("{label} mismatch: Input={input}, XML={xml}"));
                }
            }
        },
        None => issues.push(format!("No {label} input provided for validation")),
    }
}

fn check_nlp_field(
    result: &mut ValidationResult,
    field_name: &str,
    extracted: Option<f64>,
    cell: &CellValue,
    wire_id: &str,
) {
    let Some(sbom_value) = extracted else {
        result.nlp_processing_notes.push(format!(
            "Could not extract {field_name} for wire {wire_id} from XML description"
        ));
        return;
    };

    if cell.is_empty() {
        result.mismatches.push(format!(
            "{} missing in Excel for wire {wire_id}",
            capitalize(field_name)
        ));
        return;
    }

    match cell.as_f64() {
        Some(excel_value) => {
            if !approx_equal(sbom_value, excel_value) {
                result.mismatches.push(format!(
                    "{} mismatch for {wire_id}: XML={sbom_value}, Excel={excel_value}",
                    capitalize(field_name)
                ));
            }
        }
        None => result.mismatches.push(format!(
            "Invalid {field_name} value in Excel for wire {wire_id}: {cell}"
        )),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
