use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which source document an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Xml,
    Workbook,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml => write!(f, "XML"),
            Self::Workbook => write!(f, "workbook"),
        }
    }
}

/// Error taxonomy of the validation core.
///
/// `Parse` and `NotLoaded` are fatal to the caller; structural problems
/// found mid-run (missing sheets or columns) are normally reported through
/// the `error` status of a [`veriloom_models::ValidationResult`] instead,
/// so these variants only escape from the query layer itself.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VeriloomError {
    #[error("Failed to parse {source_kind} source: {message}")]
    Parse {
        source_kind: SourceKind,
        message: String,
    },

    #[error("No {source_kind} data loaded")]
    NotLoaded { source_kind: SourceKind },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Column '{column}' not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl VeriloomError {
    pub fn parse(source_kind: SourceKind, message: impl Into<String>) -> Self {
        Self::Parse {
            source_kind,
            message: message.into(),
        }
    }

    pub fn not_loaded(source_kind: SourceKind) -> Self {
        Self::NotLoaded { source_kind }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn sheet_not_found(name: impl Into<String>) -> Self {
        Self::SheetNotFound { name: name.into() }
    }

    pub fn column_not_found(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            sheet: sheet.into(),
            column: column.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "PARSE_ERROR",
            Self::NotLoaded { .. } => "NOT_LOADED",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::SheetNotFound { .. } => "SHEET_NOT_FOUND",
            Self::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

pub type VeriloomResult<T> = Result<T, VeriloomError>;

impl From<quick_xml::Error> for VeriloomError {
    fn from(error: quick_xml::Error) -> Self {
        Self::parse(SourceKind::Xml, error.to_string())
    }
}

impl From<calamine::XlsxError> for VeriloomError {
    fn from(error: calamine::XlsxError) -> Self {
        Self::parse(SourceKind::Workbook, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = VeriloomError::not_loaded(SourceKind::Xml);
        assert_eq!(err.error_code(), "NOT_LOADED");
        assert_eq!(err.to_string(), "No XML data loaded");

        let err = VeriloomError::column_not_found("Twisted Wires", "Pitch");
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("Twisted Wires"));
    }
}
