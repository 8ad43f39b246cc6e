/// HTTP client for Ollama-compatible inference servers.
///
/// Used by the `ollama` inference backend; handles timeouts, retries and
/// error classification.
mod client;

pub use client::{
    DEFAULT_OLLAMA_HOST, OllamaClient, OllamaClientBuilder, OllamaClientTrait, OllamaError,
    retry_with_backoff,
};
