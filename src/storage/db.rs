use chrono::SecondsFormat;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{
    error::{Result, ReviewError},
    storage::models::{Decision, DecisionStats, ReviewDecision},
};

/// Local journal of reviewer decisions.
pub struct Database {
    conn: Connection,
}

const DECISION_COLUMNS: &str =
    "id, document_id, batch_id, decision, score, note, decided_at";

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS review_decisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id TEXT NOT NULL,
                batch_id TEXT NOT NULL,
                decision TEXT NOT NULL,
                score TEXT NOT NULL,
                note TEXT,
                decided_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_decisions_document ON review_decisions(document_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_decisions_batch ON review_decisions(batch_id)",
            [],
        )?;

        Ok(())
    }

    /// Append a decision; returns its row id.
    pub fn save_decision(&self, decision: &ReviewDecision) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO review_decisions
             (document_id, batch_id, decision, score, note, decided_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                decision.document_id,
                decision.batch_id,
                decision.decision.to_string(),
                decision.score,
                decision.note,
                decision.decided_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent decision for a document, if any.
    pub fn latest_decision(&self, document_id: &str) -> Result<Option<ReviewDecision>> {
        let query = format!(
            "SELECT {} FROM review_decisions
             WHERE document_id = ?1
             ORDER BY decided_at DESC, id DESC
             LIMIT 1",
            DECISION_COLUMNS
        );
        let decision = self
            .conn
            .query_row(&query, [document_id], row_to_decision)
            .optional()?;
        Ok(decision)
    }

    pub fn get_decisions(
        &self,
        batch_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ReviewDecision>> {
        let mut query = format!("SELECT {} FROM review_decisions", DECISION_COLUMNS);
        if batch_id.is_some() {
            query.push_str(" WHERE batch_id = ?1");
        }
        query.push_str(" ORDER BY decided_at DESC, id DESC");
        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut stmt = self.conn.prepare(&query)?;
        let rows = match batch_id {
            Some(batch) => stmt.query_map([batch], row_to_decision)?,
            None => stmt.query_map([], row_to_decision)?,
        };
        let decisions = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(decisions)
    }

    pub fn get_stats(&self) -> Result<DecisionStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(DecisionStats {
            total: count("SELECT COUNT(*) FROM review_decisions")?,
            approved: count("SELECT COUNT(*) FROM review_decisions WHERE decision = 'Approved'")?,
            declined: count("SELECT COUNT(*) FROM review_decisions WHERE decision = 'Declined'")?,
            documents: count("SELECT COUNT(DISTINCT document_id) FROM review_decisions")?,
        })
    }
}

fn row_to_decision(row: &Row<'_>) -> rusqlite::Result<ReviewDecision> {
    let decision: String = row.get(3)?;
    let decided_at: String = row.get(6)?;

    Ok(ReviewDecision {
        id: row.get(0)?,
        document_id: row.get(1)?,
        batch_id: row.get(2)?,
        decision: decision
            .parse::<Decision>()
            .map_err(|e| conversion_error(3, e))?,
        score: row.get(4)?,
        note: row.get(5)?,
        decided_at: decided_at
            .parse()
            .map_err(|e: chrono::ParseError| conversion_error(6, e.to_string()))?,
    })
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(ReviewError::MalformedData(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_save_and_latest() {
        let db = Database::in_memory().unwrap();
        let first = ReviewDecision::new("doc-1", "u1", Decision::Declined, "WARNING");
        let mut second = ReviewDecision::new("doc-1", "u1", Decision::Approved, "WARNING")
            .with_note(Some("name verified by phone".to_string()));
        second.decided_at = first.decided_at + Duration::seconds(5);

        db.save_decision(&first).unwrap();
        let id = db.save_decision(&second).unwrap();

        let latest = db.latest_decision("doc-1").unwrap().unwrap();
        assert_eq!(latest.id, id);
        assert_eq!(latest.decision, Decision::Approved);
        assert_eq!(latest.note.as_deref(), Some("name verified by phone"));
        assert!(db.latest_decision("doc-2").unwrap().is_none());
    }

    #[test]
    fn test_decisions_filtered_by_batch() {
        let db = Database::in_memory().unwrap();
        db.save_decision(&ReviewDecision::new("a", "u1", Decision::Approved, "NORMAL")).unwrap();
        db.save_decision(&ReviewDecision::new("b", "u1", Decision::Declined, "HIGH_RISK")).unwrap();
        db.save_decision(&ReviewDecision::new("c", "u2", Decision::Approved, "TRUSTED")).unwrap();

        assert_eq!(db.get_decisions(Some("u1"), None).unwrap().len(), 2);
        assert_eq!(db.get_decisions(None, None).unwrap().len(), 3);
        assert_eq!(db.get_decisions(None, Some(1)).unwrap().len(), 1);

        let stats = db.get_stats().unwrap();
        assert_eq!(
            stats,
            DecisionStats { total: 3, approved: 2, declined: 1, documents: 3 }
        );
    }

    #[test]
    fn test_blank_note_is_dropped() {
        let decision = ReviewDecision::new("a", "u1", Decision::Approved, "NORMAL")
            .with_note(Some("   ".to_string()));
        assert_eq!(decision.note, None);
        assert!(decision.decided_at <= Utc::now());
    }

    #[test]
    fn test_decisions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new(path).unwrap();
            db.save_decision(&ReviewDecision::new("a", "u1", Decision::Approved, "NORMAL"))
                .unwrap();
        }

        let db = Database::new(path).unwrap();
        let latest = db.latest_decision("a").unwrap().unwrap();
        assert_eq!(latest.decision, Decision::Approved);
        assert_eq!(latest.batch_id, "u1");
    }
}
