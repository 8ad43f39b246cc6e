//! Routes a question to a registered model and returns its answer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{ModelRegistry, ServiceError};

/// Default bound on a single inference call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// An answer together with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedAnswer {
    pub answer: String,
    pub model_name: String,
}

/// Resolves models through the registry and runs inference.
///
/// The router does not persist anything; logging the answer is the caller's
/// job.
#[derive(Clone)]
pub struct AnswerRouter {
    registry: Arc<ModelRegistry>,
    timeout: Duration,
}

impl AnswerRouter {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Answers `question` against `context` with `model_name`, or with the
    /// default model when `model_name` is `None`.
    ///
    /// `question` and `context` are forwarded as-is; empty strings are fine.
    /// Inference runs on the blocking pool with no registry lock held.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if `model_name` is not registered
    /// - `ServiceError::Inference` if the backend fails
    /// - `ServiceError::EngineTimeout` if the backend exceeds the timeout; the
    ///   late result is discarded
    pub async fn answer(
        &self,
        model_name: Option<&str>,
        question: String,
        context: String,
    ) -> Result<RoutedAnswer, ServiceError> {
        let entry = self.registry.resolve(model_name)?;
        let model_name = entry.name().to_string();
        debug!(model = %model_name, "routing question");

        let task = tokio::task::spawn_blocking(move || entry.answer(&question, &context));
        let answer = match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined?.map_err(ServiceError::Inference)?,
            Err(_) => {
                warn!(
                    model = %model_name,
                    timeout_secs = self.timeout.as_secs(),
                    "inference timed out"
                );
                return Err(ServiceError::EngineTimeout(self.timeout));
            }
        };

        Ok(RoutedAnswer { answer, model_name })
    }
}
