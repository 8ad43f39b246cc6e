//! Inference backends.
//!
//! An [`InferenceEngine`] turns a (tokenizer, model) identifier pair into a
//! loaded [`Pipeline`]; a pipeline answers a question against a context.
//! Both calls may block for a long time and are always run off the async
//! executor.

mod extractive;
mod ollama;

use thiserror::Error;

use crate::ollama::OllamaError;

pub use extractive::ExtractiveEngine;
pub use ollama::OllamaEngine;

/// Errors raised by inference backends.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The model could not be loaded.
    #[error("cannot load model '{model}': {reason}")]
    Load { model: String, reason: String },

    /// The backend's HTTP API failed.
    #[error(transparent)]
    Ollama(#[from] OllamaError),
}

/// A loaded model, ready to answer questions.
pub trait Pipeline: Send + Sync {
    /// Answers `question` using only `context`.
    fn answer(&self, question: &str, context: &str) -> Result<String, EngineError>;
}

/// A backend able to load question-answering pipelines.
pub trait InferenceEngine: Send + Sync {
    /// Loads the model identified by `tokenizer` and `model`.
    fn load(&self, tokenizer: &str, model: &str) -> Result<Box<dyn Pipeline>, EngineError>;
}

/// Rejects blank backend identifiers before any loading work starts.
fn require_identifier(kind: &str, value: &str, model: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::Load {
            model: model.to_string(),
            reason: format!("{kind} identifier is empty"),
        });
    }
    Ok(())
}
