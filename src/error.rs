//! Error kinds surfaced by the registry, router and store.

use std::time::Duration;

use thiserror::Error;

use crate::engine::EngineError;

/// Errors returned by the service core.
///
/// Every variant is surfaced to the caller; nothing is retried or swallowed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required parameter or field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The referenced model is not registered.
    #[error("model not found: {0}")]
    NotFound(String),

    /// The default model cannot be deleted.
    #[error("cannot delete the default model '{0}'")]
    Protected(String),

    /// The inference engine failed to initialize a newly added model.
    #[error("failed to initialize model '{name}': {source}")]
    EngineInit {
        name: String,
        #[source]
        source: EngineError,
    },

    /// The inference engine failed while answering.
    #[error("inference failed: {0}")]
    Inference(#[source] EngineError),

    /// Inference did not finish within the configured bound.
    #[error("inference timed out after {}s", .0.as_secs())]
    EngineTimeout(Duration),

    /// The answer log could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A blocking worker panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// Builds a validation error naming a missing field or parameter.
    pub fn missing(field: &str) -> Self {
        Self::Validation(format!("missing required parameter: {field}"))
    }

    /// Returns true for errors caused by the caller rather than the service.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Protected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_the_field() {
        let err = ServiceError::missing("start");
        assert_eq!(err.to_string(), "missing required parameter: start");
        assert!(err.is_user_error());
    }

    #[test]
    fn engine_init_carries_model_name_and_source() {
        use std::error::Error;

        let err = ServiceError::EngineInit {
            name: "m2".to_string(),
            source: EngineError::Load {
                model: "mod2".to_string(),
                reason: "unreachable".to_string(),
            },
        };

        assert!(err.to_string().contains("'m2'"));
        assert!(err.source().is_some());
        assert!(!err.is_user_error());
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = ServiceError::EngineTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "inference timed out after 30s");
    }

    #[test]
    fn protected_and_not_found_are_user_errors() {
        assert!(ServiceError::Protected("distilled-bert".into()).is_user_error());
        assert!(ServiceError::NotFound("nope".into()).is_user_error());
    }
}
