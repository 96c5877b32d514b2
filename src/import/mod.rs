//! Moving transactions in and out of the tracker as JSON or CSV.

use crate::core::StoreError;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    /// The payload is not valid JSON/CSV or a record is malformed.
    Parse(String),
    /// Valid JSON, but not an array of transactions or an export document.
    Format(String),
    /// Two records share an id.
    DuplicateId(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "io error: {e}"),
            ImportError::Parse(e) => write!(f, "parse error: {e}"),
            ImportError::Format(e) => write!(f, "invalid data format: {e}"),
            ImportError::DuplicateId(id) => write!(f, "duplicate transaction id: {id}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Io(e)
    }
}

impl From<StoreError> for ImportError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId(id) => ImportError::DuplicateId(id),
            StoreError::NotFound(id) => ImportError::Format(format!("unknown id {id}")),
        }
    }
}

pub mod csv;
pub mod json;
