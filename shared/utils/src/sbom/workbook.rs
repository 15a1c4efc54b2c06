//! Specification Workbook Loader
//!
//! Reads every sheet of an XLSX workbook into the normalized
//! [`SpecWorkbook`] structure. Formula cells arrive as their cached
//! evaluated values, never as formula text.

use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::{SourceKind, VeriloomError, VeriloomResult};
use veriloom_models::{CellValue, Sheet, SpecWorkbook};

/// Workbook source loader.
pub struct WorkbookLoader {
    max_bytes: usize,
}

impl WorkbookLoader {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_bytes: limits.max_workbook_bytes,
        }
    }

    /// Parse workbook bytes. Every sheet is loaded; the first row becomes
    /// the header row unconditionally, fully-empty rows are dropped, and a
    /// sheet with zero rows is marked empty.
    pub fn parse_bytes(&self, data: &[u8]) -> VeriloomResult<SpecWorkbook> {
        if data.len() > self.max_bytes {
            return Err(VeriloomError::parse(
                SourceKind::Workbook,
                format!(
                    "workbook of {} bytes exceeds limit of {} bytes",
                    data.len(),
                    self.max_bytes
                ),
            ));
        }

        let cursor = Cursor::new(data);
        let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)?;

        let mut parsed = SpecWorkbook::new();
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

        for (index, name) in sheet_names.iter().enumerate() {
            let mut sheet = Sheet {
                name: name.clone(),
                index,
                headers: Vec::new(),
                data: Vec::new(),
                empty: true,
            };

            if let Some(range) = workbook.worksheet_range(name) {
                let range = range?;
                let mut rows = range.rows();

                if let Some(header_row) = rows.next() {
                    sheet.empty = false;
                    sheet.headers = header_row
                        .iter()
                        .map(|cell| convert_cell(cell).as_text())
                        .collect();

                    for row in rows {
                        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
                            continue;
                        }
                        sheet.data.push(row.iter().map(convert_cell).collect());
                    }
                }
            }

            parsed.sheets.push(sheet);
        }

        tracing::debug!(sheets = parsed.sheets.len(), "Parsed specification workbook");

        Ok(parsed)
    }
}

impl Default for WorkbookLoader {
    fn default() -> Self {
        Self::new(&crate::config::AppConfig::default().limits)
    }
}

fn convert_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}
