pub mod answerer;
pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod ollama;
pub mod registry;
pub mod store;
pub mod utils;

pub use answerer::{AnswerRouter, RoutedAnswer};
pub use db::Database;
pub use engine::{EngineError, ExtractiveEngine, InferenceEngine, OllamaEngine, Pipeline};
pub use error::ServiceError;
pub use models::{AnswerRecord, ModelSpec};
pub use ollama::{OllamaClient, OllamaClientBuilder, OllamaClientTrait, OllamaError};
pub use registry::{ModelEntry, ModelRegistry};
pub use store::AnswerStore;
