//! SBOM document models.
//!
//! Normalized in-memory form of a manufacturing bill-of-materials XML
//! export. The loaders produce these structures; the query layer and the
//! reconciliation engine only ever read them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A full SBOM export: an ordered sequence of assembly records plus load
/// metadata. Attribute mappings are immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SbomDocument {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<AssemblyRecord>,
    pub parse_warnings: Vec<String>,
}

impl SbomDocument {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            records: Vec::new(),
            parse_warnings: Vec::new(),
        }
    }
}

impl Default for SbomDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// One `sbom` element from the export. Only the first record of a document
/// is consulted for work-center validation; the others still contribute
/// cost results and subassemblies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssemblyRecord {
    pub attributes: HashMap<String, String>,
    pub subassemblies: Vec<Subassembly>,
    pub cost_results: Vec<HashMap<String, String>>,
    /// Loaded but not consumed by the current checks.
    pub bom_elements: Vec<HashMap<String, String>>,
}

/// A subassembly with its attribute mapping and a resolved parent
/// reference. Parents form a tree within one record; the source format
/// does not enforce acyclicity but exports are assumed acyclic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subassembly {
    pub attributes: HashMap<String, String>,
    pub parent_id: Option<String>,
}

impl Subassembly {
    /// Merge the attribute mapping with the parent reference into one flat
    /// mapping. The parent key is only present when a parent exists.
    pub fn flattened(&self) -> HashMap<String, String> {
        let mut flat = self.attributes.clone();
        if let Some(parent) = &self.parent_id {
            flat.insert("parent_id".to_string(), parent.clone());
        }
        flat
    }
}
