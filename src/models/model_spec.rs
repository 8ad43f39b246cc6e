use serde::{Deserialize, Serialize};

/// Identity of a registered model as it appears on the wire.
///
/// `tokenizer` and `model` are backend identifiers; they are handed to the
/// inference engine untouched and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub tokenizer: String,
    pub model: String,
}

impl ModelSpec {
    /// Creates a new model spec.
    ///
    /// # Examples
    ///
    /// ```
    /// use askd::ModelSpec;
    ///
    /// let spec = ModelSpec::new("m2", "tok2", "mod2");
    /// assert_eq!(spec.name, "m2");
    /// assert_eq!(spec.tokenizer, "tok2");
    /// assert_eq!(spec.model, "mod2");
    /// ```
    pub fn new(
        name: impl Into<String>,
        tokenizer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tokenizer: tokenizer.into(),
            model: model.into(),
        }
    }
}
