use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One logged answer.
///
/// Records are immutable once appended to the store. `model_name` names the
/// model that produced the answer at the time it was produced; the model may
/// have been deleted since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub context: String,
    pub answer: String,
    #[serde(rename = "model")]
    pub model_name: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl AnswerRecord {
    /// Creates a record stamped with the current time.
    pub fn now(
        question: impl Into<String>,
        context: impl Into<String>,
        answer: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            answer: answer.into(),
            model_name: model_name.into(),
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}
