use thiserror::Error;

/// A syntax error in WKT input, located by byte offset into the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("WKT syntax error at offset {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        ParseError {
            position,
            message: message.into(),
        }
    }
}

/// Errors produced while resolving CRS definitions or transforming points.
///
/// The enum is `Clone` so that every caller waiting on a shared EPSG lookup can be handed
/// the same failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid CRS definition, field `{field}`: {reason}")]
    Validation { field: String, reason: String },
    #[error("EPSG:{code} not found (HTTP status {status})")]
    NotFound { code: String, status: u16 },
    #[error("lookup of EPSG:{code} failed: {cause}")]
    Transport { code: String, cause: String },
    #[error("unsupported projection method: {0}")]
    UnsupportedProjection(String),
    #[error("PROJJSON document could not be decoded: {0}")]
    Json(String),
    #[error("coordinate outside the valid domain: {0}")]
    OutOfDomain(String),
}

impl CrsError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CrsError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_domain(reason: impl Into<String>) -> Self {
        CrsError::OutOfDomain(reason.into())
    }
}

impl From<serde_json::Error> for CrsError {
    fn from(e: serde_json::Error) -> Self {
        CrsError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrsError>;
