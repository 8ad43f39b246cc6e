//! Server configuration.
//!
//! Every option can be given on the command line or through the environment;
//! `main` also loads a `.env` file before parsing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::ModelSpec;
use crate::engine::{ExtractiveEngine, InferenceEngine, OllamaEngine};
use crate::ollama::{OllamaClient, OllamaClientBuilder};
use crate::utils::get_database_path;

pub const DEFAULT_MODEL_NAME: &str = "distilled-bert";
pub const DEFAULT_MODEL_ID: &str = "distilbert-base-uncased-distilled-squad";

/// Inference backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Built-in sentence extraction, no external service
    Extractive,
    /// Ollama-compatible HTTP server
    Ollama,
}

/// Options for `askd serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Address to bind
    #[arg(long, env = "ASKD_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite file for the answer log [default: {data_dir}/askd/answers.db]
    #[arg(long, env = "ASKD_DATABASE", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Inference backend
    #[arg(long, env = "ASKD_BACKEND", value_enum, default_value_t = Backend::Extractive)]
    pub backend: Backend,

    /// Base URL of the Ollama server (ollama backend only)
    #[arg(long, env = "OLLAMA_HOST", value_name = "URL")]
    pub ollama_host: Option<String>,

    /// Name of the protected default model
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    pub default_model_name: String,

    /// Tokenizer identifier of the default model
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub default_tokenizer: String,

    /// Backend model identifier of the default model
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub default_model: String,

    /// Upper bound on a single inference call, in seconds
    #[arg(long, env = "ASKD_INFERENCE_TIMEOUT", default_value_t = 30)]
    pub inference_timeout_secs: u64,
}

impl ServeConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    pub fn default_spec(&self) -> ModelSpec {
        ModelSpec::new(
            self.default_model_name.clone(),
            self.default_tokenizer.clone(),
            self.default_model.clone(),
        )
    }

    /// The configured database path, or the per-user default.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => get_database_path(),
        }
    }

    /// Builds the selected inference backend.
    ///
    /// The ollama backend owns a blocking HTTP client, so this must not be
    /// called from inside an async runtime.
    pub fn build_engine(&self) -> Result<Arc<dyn InferenceEngine>> {
        match self.backend {
            Backend::Extractive => Ok(Arc::new(ExtractiveEngine::new())),
            Backend::Ollama => {
                let client = self.ollama_client()?;
                Ok(Arc::new(OllamaEngine::new(Arc::new(client))))
            }
        }
    }

    /// Each Ollama request is bounded by the inference timeout.
    fn ollama_client(&self) -> Result<OllamaClient> {
        let mut builder = OllamaClientBuilder::new().timeout(self.inference_timeout());
        if let Some(host) = &self.ollama_host {
            builder = builder.base_url(host);
        }
        builder.build().context("Failed to configure Ollama client")
    }
}
