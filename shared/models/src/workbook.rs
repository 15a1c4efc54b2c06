//! Specification workbook models.
//!
//! Normalized spreadsheet content: ordered sheets, each with the first
//! row promoted to headers and the remaining non-empty rows kept as data.
//! Header lookup is by exact string match and column order fixes the
//! positional index into every data row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A loaded specification workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecWorkbook {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub sheets: Vec<Sheet>,
}

impl SpecWorkbook {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            sheets: Vec::new(),
        }
    }
}

impl Default for SpecWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

/// One worksheet identified by name and position index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub index: usize,
    /// First row of the sheet, taken as column labels unconditionally.
    pub headers: Vec<String>,
    /// Remaining rows with fully-empty rows dropped.
    pub data: Vec<Vec<CellValue>>,
    pub empty: bool,
}

impl Sheet {
    /// Position of a column label, exact string match.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Cell at (row, column label), if both exist.
    pub fn cell(&self, row: usize, label: &str) -> Option<&CellValue> {
        let col = self.column_index(label)?;
        self.data.get(row)?.get(col)
    }
}

/// A single evaluated cell value. Formula cells are loaded as their cached
/// results, never as formula text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text cells are parsed after trimming;
    /// boolean and empty cells have no numeric form.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text view of the cell, trimmed. Numbers render without a trailing
    /// `.0` so `45` and `45.0` produce the same join key.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_numeric_views() {
        assert_eq!(CellValue::Number(10.5).as_f64(), Some(10.5));
        assert_eq!(CellValue::Text(" 10.5 ".to_string()).as_f64(), Some(10.5));
        assert_eq!(CellValue::Text("n/a".to_string()).as_f64(), None);
        assert_eq!(CellValue::Empty.as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(45.0).as_text(), "45");
        assert_eq!(CellValue::Number(45.25).as_text(), "45.25");
    }

    #[test]
    fn test_column_lookup_is_exact() {
        let sheet = Sheet {
            name: "Twisted Wires".to_string(),
            headers: vec!["Wires Nr".to_string(), "Pitch".to_string()],
            ..Default::default()
        };
        assert_eq!(sheet.column_index("Pitch"), Some(1));
        assert_eq!(sheet.column_index("pitch"), None);
    }
}
