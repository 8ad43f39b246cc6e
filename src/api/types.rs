//! Wire types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::{ModelSpec, ServiceError};

/// `PUT /models` body. Fields are optional so that a missing one is reported
/// by name instead of as a generic decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct AddModelRequest {
    pub name: Option<String>,
    pub tokenizer: Option<String>,
    pub model: Option<String>,
}

impl AddModelRequest {
    pub fn into_spec(self) -> Result<ModelSpec, ServiceError> {
        let name = self.name.ok_or_else(|| ServiceError::missing("name"))?;
        let tokenizer = self
            .tokenizer
            .ok_or_else(|| ServiceError::missing("tokenizer"))?;
        let model = self.model.ok_or_else(|| ServiceError::missing("model"))?;
        Ok(ModelSpec::new(name, tokenizer, model))
    }
}

/// `POST /answer` body.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerRequest {
    pub question: Option<String>,
    pub context: Option<String>,
}

impl AnswerRequest {
    /// Returns `(question, context)`; empty strings are accepted.
    pub fn into_parts(self) -> Result<(String, String), ServiceError> {
        let question = self
            .question
            .ok_or_else(|| ServiceError::missing("question"))?;
        let context = self.context.ok_or_else(|| ServiceError::missing("context"))?;
        Ok((question, context))
    }
}

/// `?model=NAME` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ModelParam {
    pub model: Option<String>,
}

/// `GET /answer?start=..&end=..&model=..` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub model: Option<String>,
}

impl RangeParams {
    pub fn start(&self) -> Result<Option<i64>, ServiceError> {
        parse_epoch("start", self.start.as_deref())
    }

    pub fn end(&self) -> Result<Option<i64>, ServiceError> {
        parse_epoch("end", self.end.as_deref())
    }
}

fn parse_epoch(field: &str, value: Option<&str>) -> Result<Option<i64>, ServiceError> {
    value
        .map(|v| {
            v.trim().parse::<i64>().map_err(|_| {
                ServiceError::Validation(format!("{field} must be an integer epoch timestamp"))
            })
        })
        .transpose()
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
