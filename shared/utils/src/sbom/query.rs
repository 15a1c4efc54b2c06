//! Query Layer
//!
//! Typed read accessors over the normalized source documents. Every
//! accessor fails with a not-loaded error when the relevant source was
//! never parsed; none of them mutate the documents.

use std::collections::HashMap;

use crate::error::{SourceKind, VeriloomError, VeriloomResult};
use veriloom_models::{CellValue, SbomDocument, Sheet, SpecWorkbook, Subassembly};

/// The pair of sources one validation run reads. Constructed per run;
/// never shared across concurrent requests.
#[derive(Debug, Default)]
pub struct SourceSet {
    sbom: Option<SbomDocument>,
    workbook: Option<SpecWorkbook>,
}

/// Sheet selection for [`SourceSet::filter_sheet`]. Exactly one of
/// position index or exact name, enforced by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetSelector<'a> {
    Index(usize),
    Name(&'a str),
}

/// One element of a filtered sheet result: a whole row, or a single cell
/// when a return column was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Row(Vec<CellValue>),
    Cell(CellValue),
}

/// Tagged result of a sheet filter. A single match is unwrapped rather
/// than returned as a one-element sequence; callers depend on this.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// No filter or return column given: the whole sheet.
    Sheet(Sheet),
    Empty,
    Single(FilterValue),
    Many(Vec<FilterValue>),
}

impl SourceSet {
    pub fn new(sbom: SbomDocument, workbook: SpecWorkbook) -> Self {
        Self {
            sbom: Some(sbom),
            workbook: Some(workbook),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_sbom(&mut self, sbom: SbomDocument) {
        self.sbom = Some(sbom);
    }

    pub fn set_workbook(&mut self, workbook: SpecWorkbook) {
        self.workbook = Some(workbook);
    }

    fn sbom(&self) -> VeriloomResult<&SbomDocument> {
        self.sbom
            .as_ref()
            .ok_or_else(|| VeriloomError::not_loaded(SourceKind::Xml))
    }

    fn workbook(&self) -> VeriloomResult<&SpecWorkbook> {
        self.workbook
            .as_ref()
            .ok_or_else(|| VeriloomError::not_loaded(SourceKind::Workbook))
    }

    /// Attribute mapping of every assembly record, in document order.
    pub fn sbom_attributes(&self) -> VeriloomResult<Vec<&HashMap<String, String>>> {
        Ok(self.sbom()?.records.iter().map(|r| &r.attributes).collect())
    }

    /// All subassemblies across all records, nested form.
    pub fn subassemblies(&self) -> VeriloomResult<Vec<&Subassembly>> {
        Ok(self
            .sbom()?
            .records
            .iter()
            .flat_map(|r| r.subassemblies.iter())
            .collect())
    }

    /// All subassemblies with attributes and parent reference merged into
    /// one flat mapping each.
    pub fn subassemblies_flattened(&self) -> VeriloomResult<Vec<HashMap<String, String>>> {
        Ok(self
            .sbom()?
            .records
            .iter()
            .flat_map(|r| r.subassemblies.iter())
            .map(Subassembly::flattened)
            .collect())
    }

    /// All cost-result mappings across all records.
    pub fn cost_results(&self) -> VeriloomResult<Vec<&HashMap<String, String>>> {
        Ok(self
            .sbom()?
            .records
            .iter()
            .flat_map(|r| r.cost_results.iter())
            .collect())
    }

    /// Values at one key across all cost results; a missing key yields an
    /// empty string for that result.
    pub fn cost_result_values(&self, filter_key: &str) -> VeriloomResult<Vec<String>> {
        Ok(self
            .cost_results()?
            .into_iter()
            .map(|r| r.get(filter_key).cloned().unwrap_or_default())
            .collect())
    }

    /// All bom-element mappings across all records.
    pub fn bom_elements(&self) -> VeriloomResult<Vec<&HashMap<String, String>>> {
        Ok(self
            .sbom()?
            .records
            .iter()
            .flat_map(|r| r.bom_elements.iter())
            .collect())
    }

    pub fn sheet_names(&self) -> VeriloomResult<Vec<&str>> {
        Ok(self
            .workbook()?
            .sheets
            .iter()
            .map(|s| s.name.as_str())
            .collect())
    }

    /// Exact-match sheet lookup; `None` when absent.
    pub fn sheet_by_name(&self, name: &str) -> VeriloomResult<Option<&Sheet>> {
        Ok(self.workbook()?.sheets.iter().find(|s| s.name == name))
    }

    /// Filter a sheet's rows, optionally projecting one return column.
    ///
    /// With neither a filter column nor a return column, the whole sheet
    /// is returned. A filter column with no filter value keeps the rows
    /// whose cell in that column is empty. A named column missing from
    /// the headers is a column-not-found error; an unknown selector is an
    /// error as well.
    pub fn filter_sheet(
        &self,
        selector: SheetSelector<'_>,
        filter_column: Option<&str>,
        filter_value: Option<&CellValue>,
        return_column: Option<&str>,
    ) -> VeriloomResult<FilterOutcome> {
        let workbook = self.workbook()?;

        let sheet = match selector {
            SheetSelector::Index(index) => workbook.sheets.get(index).ok_or_else(|| {
                VeriloomError::invalid_argument(format!("sheet index {index} out of range"))
            })?,
            SheetSelector::Name(name) => workbook
                .sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| VeriloomError::sheet_not_found(name))?,
        };

        if filter_column.is_none() && return_column.is_none() {
            return Ok(FilterOutcome::Sheet(sheet.clone()));
        }

        let filter_idx = match filter_column {
            Some(column) => Some(sheet.column_index(column).ok_or_else(|| {
                VeriloomError::column_not_found(sheet.name.clone(), column)
            })?),
            None => None,
        };
        let return_idx = match return_column {
            Some(column) => Some(sheet.column_index(column).ok_or_else(|| {
                VeriloomError::column_not_found(sheet.name.clone(), column)
            })?),
            None => None,
        };

        let mut results = Vec::new();
        for row in &sheet.data {
            let keep = match filter_idx {
                Some(idx) => {
                    let cell = row.get(idx).cloned().unwrap_or(CellValue::Empty);
                    match filter_value {
                        Some(value) => &cell == value,
                        None => cell.is_empty(),
                    }
                }
                None => true,
            };
            if !keep {
                continue;
            }

            match return_idx {
                Some(idx) => results.push(FilterValue::Cell(
                    row.get(idx).cloned().unwrap_or(CellValue::Empty),
                )),
                None => results.push(FilterValue::Row(row.clone())),
            }
        }

        Ok(match results.len() {
            0 => FilterOutcome::Empty,
            1 => FilterOutcome::Single(results.remove(0)),
            _ => FilterOutcome::Many(results),
        })
    }
}
