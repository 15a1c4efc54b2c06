//! SBOM Cross-Validation
//!
//! Everything needed to check a manufacturing SBOM XML export against
//! its specification workbook: source loaders, the query layer over the
//! normalized documents, the description fact extractors and the
//! reconciliation engine.

pub mod engine;
pub mod extract;
pub mod query;
pub mod workbook;
pub mod xml;

pub use engine::{load_sources, Validator, NUMERIC_TOLERANCE};
pub use extract::{normalize_wire_id, NlpExtractor, PatternExtractor};
pub use query::{FilterOutcome, FilterValue, SheetSelector, SourceSet};
pub use workbook::WorkbookLoader;
pub use xml::XmlLoader;
