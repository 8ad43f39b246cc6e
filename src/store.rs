//! Durable, append-only log of answers.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Row, params};
use tracing::debug;

use crate::{AnswerRecord, Database, ServiceError};

/// Append-only answer log backed by SQLite.
///
/// A single connection sits behind a mutex, so concurrent appends are
/// serialized and never interleave. There is no update or delete.
pub struct AnswerStore {
    db: Mutex<Database>,
}

impl AnswerStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Opens (or creates) the log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Opens a throwaway in-memory log.
    pub fn in_memory() -> Result<Self, ServiceError> {
        Ok(Self::new(Database::in_memory()?))
    }

    /// Persists `record` as a single row.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the insert fails; nothing is written
    /// in that case.
    pub fn append(&self, record: &AnswerRecord) -> Result<(), ServiceError> {
        let db = self.db.lock();
        db.connection().execute(
            "INSERT INTO answers (question, context, model, answer, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.question,
                record.context,
                record.model_name,
                record.answer,
                record.timestamp
            ],
        )?;
        debug!(model = %record.model_name, timestamp = record.timestamp, "answer logged");
        Ok(())
    }

    /// Returns every record with `start <= timestamp <= end`, optionally
    /// restricted to one model name.
    ///
    /// Results come back ordered by timestamp, then by insertion.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `start` or `end` is missing and
    /// `ServiceError::Storage` if the read fails.
    pub fn query(
        &self,
        start: Option<i64>,
        end: Option<i64>,
        model_name: Option<&str>,
    ) -> Result<Vec<AnswerRecord>, ServiceError> {
        let start = start.ok_or_else(|| ServiceError::missing("start"))?;
        let end = end.ok_or_else(|| ServiceError::missing("end"))?;

        let db = self.db.lock();
        let mut stmt = db.connection().prepare_cached(
            "SELECT question, context, answer, model, timestamp
             FROM answers
             WHERE timestamp >= ?1 AND timestamp <= ?2
               AND (?3 IS NULL OR model = ?3)
             ORDER BY timestamp, id",
        )?;

        let records = stmt
            .query_map(params![start, end, model_name], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AnswerRecord> {
    Ok(AnswerRecord {
        question: row.get(0)?,
        context: row.get(1)?,
        answer: row.get(2)?,
        model_name: row.get(3)?,
        timestamp: row.get(4)?,
    })
}
