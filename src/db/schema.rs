/// Schema for the answer log.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
pub const INITIAL_SCHEMA: &str = r#"
-- Answers table: append-only log of every answered question
CREATE TABLE IF NOT EXISTS answers (
    id INTEGER PRIMARY KEY,
    question TEXT NOT NULL,
    context TEXT NOT NULL,
    model TEXT NOT NULL,
    answer TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

-- Index for range queries over answer time
CREATE INDEX IF NOT EXISTS idx_answers_timestamp ON answers(timestamp);

-- Index for range queries restricted to one model
CREATE INDEX IF NOT EXISTS idx_answers_model_timestamp ON answers(model, timestamp);
"#;
