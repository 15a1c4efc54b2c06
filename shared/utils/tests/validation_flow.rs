//! End-to-end validation flow tests: raw XML bytes through the loader,
//! query layer and reconciliation engine to a serialized result.

use std::collections::HashMap;

use veriloom_models::{
    CellValue, ExpectedWorkcenter, ExtractorMode, Sheet, SpecWorkbook, ValidationStatus,
};
use veriloom_utils::{Validator, XmlLoader};

const EXPORT: &str = r#"<export>
    <sbom workcenterplantreference="1200" workcenterproductionareareference="PA-7" workcenter_usesinglefinalassembly="true">
        <sbomsubassembly subid="1" name="45(2) CUT" quantity="120.5" unitofmeasure="Per Length"/>
        <sbomsubassembly subid="2" parentsubid="1" name="46(1) CUT" quantity="80.0" unitofmeasure="Length"/>
        <costs>
            <costresult description="Twist 45(2), 46(1), Pitch: 10.0, Untwist A: 5.0, Untwist B: 6.0, Twist length: 100.0"/>
        </costs>
    </sbom>
</export>"#;

fn sheet(name: &str, index: usize, headers: &[&str], data: Vec<Vec<CellValue>>) -> Sheet {
    Sheet {
        name: name.to_string(),
        index,
        headers: headers.iter().map(|h| h.to_string()).collect(),
        data,
        empty: false,
    }
}

fn twisted_sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
    sheet(
        "Twisted Wires",
        0,
        &[
            "Wires Nr",
            "Pitch",
            "Open end Length 1",
            "Open end Length 2",
            "Length of twist",
        ],
        rows,
    )
}

fn lengths_sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
    sheet("Wires Lengths", 1, &["Wire Nr", "Length"], rows)
}

fn matching_workbook() -> SpecWorkbook {
    let mut workbook = SpecWorkbook::new();
    workbook.sheets = vec![
        twisted_sheet(vec![
            vec![
                "45(2)".into(),
                CellValue::Number(10.0),
                CellValue::Number(5.0),
                CellValue::Number(6.0),
                CellValue::Number(100.0),
            ],
            vec![
                "46(1)".into(),
                CellValue::Number(10.0),
                CellValue::Number(5.0),
                CellValue::Number(6.0),
                CellValue::Number(100.0),
            ],
        ]),
        lengths_sheet(vec![
            vec!["45(2)".into(), CellValue::Number(120.5)],
            vec!["46(1)".into(), CellValue::Number(80.0)],
        ]),
    ];
    workbook
}

fn expected() -> ExpectedWorkcenter {
    ExpectedWorkcenter {
        plant_ref: Some("1200".to_string()),
        production_area_ref: Some("PA-7".to_string()),
        single_final_assembly: Some("true".to_string()),
    }
}

#[test]
fn test_full_flow_matching_sources_succeed_in_both_modes() {
    let sbom = XmlLoader::default().parse_bytes(EXPORT.as_bytes()).unwrap();
    let validator = Validator::new(sbom, matching_workbook());

    for mode in [ExtractorMode::Deterministic, ExtractorMode::Nlp] {
        let result = validator.validate(&expected(), mode);
        assert_eq!(result.status, ValidationStatus::Success, "mode {mode:?}");
        assert_eq!(result.message, "All values matched.");
        assert!(result.mismatches.is_empty());
        assert!(result.workcenter_validation.is_empty());
        assert!(result.wire_length_validation.is_empty());
    }
}

#[test]
fn test_full_flow_reports_each_discrepancy() {
    let sbom = XmlLoader::default().parse_bytes(EXPORT.as_bytes()).unwrap();
    let mut workbook = matching_workbook();
    // Pitch off for the first wire, second wire row removed entirely,
    // one cut length off beyond tolerance
    workbook.sheets[0].data = vec![vec![
        "45(2)".into(),
        CellValue::Number(11.0),
        CellValue::Number(5.0),
        CellValue::Number(6.0),
        CellValue::Number(100.0),
    ]];
    workbook.sheets[1].data = vec![
        vec!["45(2)".into(), CellValue::Number(119.0)],
        vec!["46(1)".into(), CellValue::Number(80.0)],
    ];

    let result =
        Validator::new(sbom, workbook).validate(&expected(), ExtractorMode::Deterministic);
    assert_eq!(result.status, ValidationStatus::Fail);
    assert_eq!(result.message, "Validation completed with mismatches");
    assert!(result
        .mismatches
        .iter()
        .any(|m| m.contains("Pitch mismatch for 45(2): SBOM=10, Excel=11")));
    assert!(result.mismatches.contains(&"46(1) missing in Excel".to_string()));
    assert!(result
        .wire_length_validation
        .iter()
        .any(|i| i.contains("Wire length mismatch for 45(2)")));
}

#[test]
fn test_missing_wire_reported_per_occurrence() {
    let export = r#"<export>
        <sbom workcenterplantreference="1200" workcenterproductionareareference="PA-7" workcenter_usesinglefinalassembly="true">
            <costresult description="Twist 47(1), Pitch: 1.0, Untwist A: 1.0, Untwist B: 1.0, Twist length: 1.0"/>
            <costresult description="Twist 47(1), Pitch: 2.0, Untwist A: 2.0, Untwist B: 2.0, Twist length: 2.0"/>
        </sbom>
    </export>"#;
    let sbom = XmlLoader::default().parse_bytes(export.as_bytes()).unwrap();

    let result = Validator::new(sbom, matching_workbook())
        .validate(&expected(), ExtractorMode::Deterministic);
    let count = result
        .mismatches
        .iter()
        .filter(|m| *m == &"47(1) missing in Excel".to_string())
        .count();
    assert_eq!(count, 2);
}

#[test]
fn test_structural_error_short_circuits_from_real_xml() {
    let sbom = XmlLoader::default().parse_bytes(EXPORT.as_bytes()).unwrap();
    let mut workbook = SpecWorkbook::new();
    workbook.sheets = vec![lengths_sheet(Vec::new())];

    let result =
        Validator::new(sbom, workbook).validate(&expected(), ExtractorMode::Deterministic);
    assert_eq!(result.status, ValidationStatus::Error);
    assert!(result.message.contains("'Twisted Wires' sheet not found in Excel"));
    assert!(result.wire_length_validation.is_empty());
}

#[test]
fn test_result_serialization_contract() {
    let sbom = XmlLoader::default().parse_bytes(EXPORT.as_bytes()).unwrap();
    let validator = Validator::new(sbom, matching_workbook());

    let deterministic = validator.validate(&expected(), ExtractorMode::Deterministic);
    let json: HashMap<String, serde_json::Value> =
        serde_json::from_str(&serde_json::to_string(&deterministic).unwrap()).unwrap();
    assert_eq!(json["status"], "success");
    // Empty note list is dropped from the wire format
    assert!(!json.contains_key("nlp_processing_notes"));

    let nlp = validator.validate(&expected(), ExtractorMode::Nlp);
    let json: HashMap<String, serde_json::Value> =
        serde_json::from_str(&serde_json::to_string(&nlp).unwrap()).unwrap();
    assert!(json["nlp_processing_notes"]
        .as_array()
        .is_some_and(|notes| !notes.is_empty()));
}
