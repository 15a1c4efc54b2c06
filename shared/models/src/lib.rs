//! # Veriloom Core Domain Models
//!
//! This module contains the core domain models for the Veriloom SBOM
//! validation system. All models implement serialization/deserialization
//! with serde so the validation result can be handed to downstream
//! consumers (report rendering, request layers) as plain data.
//!
//! ## Key Models
//!
//! - **SbomDocument**: Normalized manufacturing bill-of-materials export
//!   parsed from XML, holding assembly records with subassemblies and
//!   cost results
//! - **SpecWorkbook**: Normalized specification workbook with per-sheet
//!   headers and data rows
//! - **ValidationResult**: The single output artifact of a validation run,
//!   carrying an overall status and per-check issue lists
//! - **ExpectedWorkcenter**: Caller-supplied expected work-center values,
//!   each field optional so an omitted check is a first-class branch
//! - **WireFacts**: Structured wire measurements extracted from free-text
//!   cost-result descriptions

pub mod document;
pub mod expected;
pub mod facts;
pub mod result;
pub mod workbook;

pub use document::{AssemblyRecord, SbomDocument, Subassembly};
pub use expected::{ExpectedWorkcenter, ExtractorMode};
pub use facts::{TwistSpec, WireFacts};
pub use result::{ValidationResult, ValidationStatus};
pub use workbook::{CellValue, Sheet, SpecWorkbook};
