use thiserror::Error;

use crate::request::RequestKind;

/// Malformed or incomplete input, detected before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidField {
        kind: RequestKind,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unable to determine request type. Provide 'query', 'latitude'/'longitude', or 'temperature'/'salinity'/'pressure'.")]
    UnknownShape,
}

impl ValidationError {
    /// The request kind the payload was heading for, when classification got that far.
    pub fn kind(&self) -> Option<RequestKind> {
        match self {
            ValidationError::MissingFields(_) => Some(RequestKind::Bgc),
            ValidationError::InvalidField { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
