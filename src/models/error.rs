use strum_macros::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Discriminant of [`ItineraryError`]. Callers branch on this, not on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr)]
pub enum ErrorKind {
    /// Prompt was empty or whitespace-only.
    ValidationError,
    /// Credential missing at call time. Not user-fixable.
    ConfigurationError,
    /// Anything that went wrong on the way to or from the generation API.
    GenerationError,
}

/// Failure reported by a [`TextGenerator`](crate::traits::text_generator::TextGenerator).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("empty prompt provided")]
    Validation,
    #[error("{0}")]
    Configuration(String),
    #[error("generation API call failed: {0}")]
    Generation(#[source] NetworkError),
}

impl ItineraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ItineraryError::Validation => ErrorKind::ValidationError,
            ItineraryError::Configuration(_) => ErrorKind::ConfigurationError,
            ItineraryError::Generation(_) => ErrorKind::GenerationError,
        }
    }
}

impl From<NetworkError> for ItineraryError {
    fn from(e: NetworkError) -> Self {
        ItineraryError::Generation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn generation_error_carries_cause() {
        let err: ItineraryError = NetworkError::Other("quota exhausted".into()).into();
        assert_eq!(err.kind(), ErrorKind::GenerationError);
        assert!(err.to_string().contains("quota exhausted"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("quota exhausted"));
    }

    #[test]
    fn kind_names_match_variants() {
        assert_eq!(ErrorKind::ValidationError.to_string(), "ValidationError");
        assert_eq!(ErrorKind::ConfigurationError.as_ref(), "ConfigurationError");
        let s: &'static str = ErrorKind::GenerationError.into();
        assert_eq!(s, "GenerationError");
    }
}
