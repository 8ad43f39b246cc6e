//! Named models available for inference.
//!
//! The registry is built once at startup with a protected default model and
//! shared by reference with every request handler. Reads take a shared lock;
//! `add` and `delete` take the exclusive lock only to edit the mapping, never
//! while a model is loading.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::ModelSpec;
use crate::engine::{EngineError, InferenceEngine, Pipeline};
use crate::error::ServiceError;

/// A registered model together with its loaded pipeline.
///
/// The pipeline belongs to the entry; it is released when the last in-flight
/// request using a deleted entry finishes.
pub struct ModelEntry {
    spec: ModelSpec,
    pipeline: Box<dyn Pipeline>,
}

impl ModelEntry {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Runs the entry's pipeline. Blocks for as long as the backend needs.
    pub fn answer(&self, question: &str, context: &str) -> Result<String, EngineError> {
        self.pipeline.answer(question, context)
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Insertion-ordered, uniquely keyed entries.
#[derive(Default)]
struct Entries {
    by_name: HashMap<String, Arc<ModelEntry>>,
    order: Vec<String>,
}

impl Entries {
    fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn insert(&mut self, entry: ModelEntry) {
        self.order.push(entry.spec.name.clone());
        self.by_name.insert(entry.spec.name.clone(), Arc::new(entry));
    }

    fn remove(&mut self, name: &str) -> Option<Arc<ModelEntry>> {
        let removed = self.by_name.remove(name)?;
        self.order.retain(|n| n != name);
        Some(removed)
    }

    fn specs(&self) -> Vec<ModelSpec> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .map(|entry| entry.spec.clone())
            .collect()
    }
}

/// Registry of named models with one undeletable default.
pub struct ModelRegistry {
    engine: Arc<dyn InferenceEngine>,
    default_name: String,
    entries: RwLock<Entries>,
}

impl ModelRegistry {
    /// Creates the registry holding only `default`, loading it through `engine`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::EngineInit` if the default model fails to load.
    pub fn initialize(
        engine: Arc<dyn InferenceEngine>,
        default: ModelSpec,
    ) -> Result<Self, ServiceError> {
        let pipeline = load(engine.as_ref(), &default)?;
        let default_name = default.name.clone();

        let mut entries = Entries::default();
        entries.insert(ModelEntry {
            spec: default,
            pipeline,
        });
        info!(model = %default_name, "registry initialized with default model");

        Ok(Self {
            engine,
            default_name,
            entries: RwLock::new(entries),
        })
    }

    /// Name of the protected default model.
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Registered models in insertion order.
    pub fn list(&self) -> Vec<ModelSpec> {
        self.entries.read().specs()
    }

    /// Registers `spec`, loading its pipeline first.
    ///
    /// Adding a name that is already registered is a no-op that keeps the
    /// existing entry. On failure the registry is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty name and
    /// `ServiceError::EngineInit` if the engine cannot load the model.
    pub fn add(&self, spec: ModelSpec) -> Result<(), ServiceError> {
        if spec.name.is_empty() {
            return Err(ServiceError::Validation(
                "model name must not be empty".to_string(),
            ));
        }
        if self.entries.read().contains(&spec.name) {
            debug!(model = %spec.name, "model already registered");
            return Ok(());
        }

        // loading can take minutes; no lock is held here
        let pipeline = load(self.engine.as_ref(), &spec)?;

        let mut entries = self.entries.write();
        if entries.contains(&spec.name) {
            debug!(model = %spec.name, "model registered concurrently, discarding duplicate load");
            return Ok(());
        }
        info!(
            model = %spec.name,
            tokenizer = %spec.tokenizer,
            backend_model = %spec.model,
            "model added"
        );
        entries.insert(ModelEntry { spec, pipeline });
        Ok(())
    }

    /// Removes the model called `name`.
    ///
    /// Deleting a name that is not registered succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty name and
    /// `ServiceError::Protected` for the default model.
    pub fn delete(&self, name: &str) -> Result<(), ServiceError> {
        if name.is_empty() {
            return Err(ServiceError::missing("model"));
        }
        if name == self.default_name {
            return Err(ServiceError::Protected(name.to_string()));
        }

        let removed = self.entries.write().remove(name);
        match removed {
            Some(_) => info!(model = %name, "model deleted"),
            None => debug!(model = %name, "delete of unregistered model ignored"),
        }
        Ok(())
    }

    /// Looks up `name`, or the default model when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if `name` is not registered.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<ModelEntry>, ServiceError> {
        let name = name.unwrap_or(&self.default_name);
        self.entries
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }
}

fn load(engine: &dyn InferenceEngine, spec: &ModelSpec) -> Result<Box<dyn Pipeline>, ServiceError> {
    engine
        .load(&spec.tokenizer, &spec.model)
        .map_err(|source| ServiceError::EngineInit {
            name: spec.name.clone(),
            source,
        })
}
