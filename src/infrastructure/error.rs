// Typed errors for talking to Tableau Server
use reqwest::StatusCode;
use std::fmt;

/// `<error>` element of a failed `tsResponse`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: String,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.summary, self.detail)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableauError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workbook file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Expected HTTP {expected}, got {status}{}", api_error_suffix(.api_error))]
    UnexpectedStatus {
        status: StatusCode,
        expected: StatusCode,
        api_error: Option<ApiError>,
    },

    #[error("The {kind} '{name}' could not be found")]
    NotFound { kind: &'static str, name: String },

    #[error("The {0} field is missing in the project data")]
    MissingField(&'static str),

    #[error("Unknown capability: {0}")]
    InvalidCapability(String),

    #[error("Unknown capability mode: {0} (expected Allow or Deny)")]
    InvalidMode(String),

    #[error("Not a Tableau workbook file: {0}")]
    InvalidWorkbookFile(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

fn api_error_suffix(api_error: &Option<ApiError>) -> String {
    api_error
        .as_ref()
        .map(|e| format!(" ({})", e))
        .unwrap_or_default()
}

impl TableauError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        TableauError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
