//! Inference through an Ollama-compatible server.

use std::sync::Arc;

use tracing::debug;

use super::{EngineError, InferenceEngine, Pipeline, require_identifier};
use crate::ollama::OllamaClientTrait;

const PROMPT_TEMPLATE: &str = r#"Answer the question using ONLY the context below. Reply with the shortest span of the context that answers it, without explanation. If the context does not contain the answer, reply with an empty line.

CONTEXT:
{context}

QUESTION:
{question}

ANSWER:"#;

/// Engine whose pipelines delegate to an Ollama server.
pub struct OllamaEngine {
    client: Arc<dyn OllamaClientTrait>,
}

impl OllamaEngine {
    pub fn new(client: Arc<dyn OllamaClientTrait>) -> Self {
        Self { client }
    }
}

impl InferenceEngine for OllamaEngine {
    /// Succeeds only if the server already has `model` pulled.
    ///
    /// Ollama bundles the tokenizer with the model, so `tokenizer` is only
    /// checked for presence.
    fn load(&self, tokenizer: &str, model: &str) -> Result<Box<dyn Pipeline>, EngineError> {
        require_identifier("tokenizer", tokenizer, model)?;
        require_identifier("model", model, model)?;

        let available = self.client.list_models()?;
        if !available.iter().any(|tag| same_model(tag, model)) {
            return Err(EngineError::Load {
                model: model.to_string(),
                reason: "model is not available on the Ollama server".to_string(),
            });
        }

        debug!(model, "ollama model available");
        Ok(Box::new(OllamaPipeline {
            client: Arc::clone(&self.client),
            model: model.to_string(),
        }))
    }
}

struct OllamaPipeline {
    client: Arc<dyn OllamaClientTrait>,
    model: String,
}

impl Pipeline for OllamaPipeline {
    fn answer(&self, question: &str, context: &str) -> Result<String, EngineError> {
        let prompt = PROMPT_TEMPLATE
            .replace("{context}", context)
            .replace("{question}", question);

        let response = self.client.generate(&self.model, &prompt)?;
        Ok(response.trim().to_string())
    }
}

/// Ollama reports `name:tag`; an untagged name means `:latest`.
fn same_model(available: &str, requested: &str) -> bool {
    let normalize = |s: &str| {
        if s.contains(':') {
            s.to_string()
        } else {
            format!("{s}:latest")
        }
    };
    normalize(available) == normalize(requested)
}
