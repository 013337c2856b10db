//! Current-version analysis persistence
//!
//! Exactly one [`StoredAnalysis`] is current per `(case_id, kind)`. A write
//! deletes the previous record and inserts the new one inside a single
//! immediate transaction, carrying the version number forward, so readers
//! never see two current records or a half-written one.

use backon::{BlockingRetryable, ExponentialBuilder};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::SharedDatabase;
use crate::ai::validation::{AnalysisSchema, FieldShape};
use crate::constants::store as store_constants;
use crate::types::{
    AnalysisKind, CaseError, CaseId, FieldSource, ParseWithDefault, Result, StoredAnalysis,
    capitalize_first, log_filter_warn,
};

/// A finished payload waiting to become the current analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDraft {
    pub payload: Value,
    pub confidence_score: f64,
    pub sources: BTreeMap<String, FieldSource>,
}

/// Busy-retry policy for writes
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts after the first
    pub busy_retries: usize,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            busy_retries: store_constants::BUSY_RETRIES,
            initial_backoff: Duration::from_millis(store_constants::BUSY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_backoff)
            .with_max_delay(Duration::from_millis(store_constants::BUSY_BACKOFF_MAX_MS))
            .with_max_times(self.busy_retries)
            .with_jitter()
    }
}

#[derive(Clone)]
pub struct AnalysisStore {
    db: SharedDatabase,
    retry: RetryPolicy,
}

impl AnalysisStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self::with_retry(db, RetryPolicy::default())
    }

    pub fn with_retry(db: SharedDatabase, retry: RetryPolicy) -> Self {
        Self { db, retry }
    }

    /// Make `draft` the current analysis for `(case_id, kind)`.
    ///
    /// Busy or locked databases are retried with exponential backoff; once
    /// retries run out the failure becomes `PersistenceConflict`.
    #[instrument(skip_all, fields(case_id = %case_id, kind = %kind))]
    pub fn replace(
        &self,
        case_id: CaseId,
        kind: AnalysisKind,
        draft: &AnalysisDraft,
    ) -> Result<StoredAnalysis> {
        let attempt = || self.try_replace(case_id, kind, draft);
        let outcome = attempt
            .retry(self.retry.backoff())
            .sleep(std::thread::sleep)
            .when(CaseError::is_busy)
            .notify(|err, delay| warn!(error = %err, ?delay, "Store busy, retrying"))
            .call();

        match outcome {
            Err(err) if err.is_busy() => Err(CaseError::PersistenceConflict {
                case_id: case_id.get(),
                kind: kind.as_str().to_string(),
                attempts: self.retry.busy_retries + 1,
            }),
            other => other,
        }
    }

    fn try_replace(
        &self,
        case_id: CaseId,
        kind: AnalysisKind,
        draft: &AnalysisDraft,
    ) -> Result<StoredAnalysis> {
        let payload = serde_json::to_string(&draft.payload)?;
        let sources = serde_json::to_string(&draft.sources)?;
        let content = render_summary(kind, &draft.payload);

        self.db.transaction(|conn| {
            let previous: Option<u32> = conn
                .query_row(
                    "SELECT version FROM stored_analyses WHERE case_id = ?1 AND kind = ?2",
                    params![case_id.get(), kind.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            conn.execute(
                "DELETE FROM stored_analyses WHERE case_id = ?1 AND kind = ?2",
                params![case_id.get(), kind.as_str()],
            )?;

            let stored = StoredAnalysis {
                id: uuid::Uuid::new_v4().to_string(),
                case_id: case_id.get(),
                kind,
                version: previous.map_or(1, |v| v + 1),
                content,
                structured_payload: draft.payload.clone(),
                confidence_score: draft.confidence_score.clamp(0.0, 1.0),
                sources: draft.sources.clone(),
                generated_at: Utc::now(),
            };
            conn.execute(
                r#"
                INSERT INTO stored_analyses
                    (id, case_id, kind, version, content, structured_payload, confidence_score, sources, generated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    stored.id,
                    stored.case_id,
                    kind.as_str(),
                    stored.version,
                    stored.content,
                    payload,
                    stored.confidence_score,
                    sources,
                    stored.generated_at.to_rfc3339(),
                ],
            )?;
            debug!(version = stored.version, "Stored analysis");
            Ok(stored)
        })
    }

    pub fn get_current(&self, case_id: CaseId, kind: AnalysisKind) -> Result<Option<StoredAnalysis>> {
        let conn = self.db.connection()?;
        let row = conn
            .query_row(
                &format!("{} WHERE case_id = ?1 AND kind = ?2", SELECT_COLUMNS),
                params![case_id.get(), kind.as_str()],
                map_row,
            )
            .optional()?;
        row.map(StoredRow::into_analysis).transpose()
    }

    /// Current analyses of a case, in kind order
    pub fn list_for_case(&self, case_id: CaseId) -> Result<Vec<StoredAnalysis>> {
        let conn = self.db.connection()?;
        let rows = query_rows(&conn, case_id)?;
        let mut analyses: Vec<StoredAnalysis> = rows
            .into_iter()
            .filter_map(|row| log_filter_warn(row.into_analysis(), "Skipping unreadable analysis"))
            .collect();
        analyses.sort_by_key(|a| a.kind);
        Ok(analyses)
    }

    /// Remove the current analysis; returns whether one existed
    pub fn delete(&self, case_id: CaseId, kind: AnalysisKind) -> Result<bool> {
        let deleted = self.db.transaction(|conn| {
            Ok(conn.execute(
                "DELETE FROM stored_analyses WHERE case_id = ?1 AND kind = ?2",
                params![case_id.get(), kind.as_str()],
            )?)
        })?;
        Ok(deleted > 0)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

const SELECT_COLUMNS: &str = "SELECT id, case_id, kind, version, content, structured_payload, confidence_score, sources, generated_at FROM stored_analyses";

struct StoredRow {
    id: String,
    case_id: i64,
    kind: String,
    version: u32,
    content: String,
    payload: String,
    confidence_score: f64,
    sources: String,
    generated_at: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        case_id: row.get(1)?,
        kind: row.get(2)?,
        version: row.get(3)?,
        content: row.get(4)?,
        payload: row.get(5)?,
        confidence_score: row.get(6)?,
        sources: row.get(7)?,
        generated_at: row.get(8)?,
    })
}

fn query_rows(conn: &Connection, case_id: CaseId) -> Result<Vec<StoredRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE case_id = ?1", SELECT_COLUMNS))?;
    let rows = stmt
        .query_map(params![case_id.get()], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

impl StoredRow {
    fn into_analysis(self) -> Result<StoredAnalysis> {
        let kind: AnalysisKind = self.kind.parse()?;
        let raw_sources: BTreeMap<String, String> = serde_json::from_str(&self.sources)?;
        let sources = raw_sources
            .into_iter()
            .map(|(field, source)| (field, FieldSource::parse_or_default(&source)))
            .collect();
        let generated_at = DateTime::parse_from_rfc3339(&self.generated_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CaseError::Storage(format!("Bad generated_at '{}': {}", self.generated_at, e)))?;

        Ok(StoredAnalysis {
            id: self.id,
            case_id: self.case_id,
            kind,
            version: self.version,
            content: self.content,
            structured_payload: serde_json::from_str(&self.payload)?,
            confidence_score: self.confidence_score,
            sources,
            generated_at,
        })
    }
}

// =============================================================================
// Summary Rendering
// =============================================================================

/// Plain-text digest of a payload: one heading per required field, list
/// entries named by their identity field.
pub fn render_summary(kind: AnalysisKind, payload: &Value) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.label());

    for spec in AnalysisSchema::for_kind(kind).fields {
        let Some(value) = payload.get(spec.name) else {
            continue;
        };
        let _ = write!(out, "\n{}\n", capitalize_first(&spec.name.replace('_', " ")));
        match (spec.shape, value) {
            (FieldShape::List, Value::Array(items)) => {
                for item in items {
                    let _ = writeln!(out, "- {}", entry_label(item, spec.identity));
                }
            }
            (FieldShape::Object, Value::Object(map)) => {
                for (key, v) in map {
                    let _ = writeln!(out, "- {}: {}", key.replace('_', " "), scalar_text(v));
                }
            }
            (_, v) => {
                let _ = writeln!(out, "{}", scalar_text(v));
            }
        }
    }
    out.trim_end().to_string()
}

fn entry_label(item: &Value, identity: Option<&str>) -> String {
    match (item, identity) {
        (Value::Object(map), Some(key)) => map
            .get(key)
            .map(scalar_text)
            .unwrap_or_else(|| scalar_text(item)),
        _ => scalar_text(item),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, PoolConfig};
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> AnalysisStore {
        AnalysisStore::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn draft(approach: &str) -> AnalysisDraft {
        let mut sources = BTreeMap::new();
        sources.insert("winning_strategy".to_string(), FieldSource::Primary);
        AnalysisDraft {
            payload: json!({"winning_strategy": {"primary_approach": approach}}),
            confidence_score: 0.85,
            sources,
        }
    }

    #[test]
    fn test_replace_then_get_current() {
        let store = store();
        let stored = store
            .replace(CaseId::new(7), AnalysisKind::AdvancedStrategy, &draft("Suppress"))
            .unwrap();
        assert_eq!(stored.version, 1);

        let current = store
            .get_current(CaseId::new(7), AnalysisKind::AdvancedStrategy)
            .unwrap()
            .unwrap();
        assert_eq!(current, stored);
        assert_eq!(current.source_of("winning_strategy"), Some(FieldSource::Primary));
    }

    #[test]
    fn test_replace_supersedes_and_bumps_version() {
        let store = store();
        let first = store
            .replace(CaseId::new(1), AnalysisKind::AdvancedStrategy, &draft("First"))
            .unwrap();
        let second = store
            .replace(CaseId::new(1), AnalysisKind::AdvancedStrategy, &draft("Second"))
            .unwrap();

        assert_eq!(second.version, 2);
        assert_ne!(first.id, second.id);
        assert!(second.generated_at >= first.generated_at);

        let all = store.list_for_case(CaseId::new(1)).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].structured_payload["winning_strategy"]["primary_approach"],
            "Second"
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let store = store();
        store
            .replace(CaseId::new(1), AnalysisKind::AdvancedStrategy, &draft("A"))
            .unwrap();
        store
            .replace(CaseId::new(2), AnalysisKind::AdvancedStrategy, &draft("B"))
            .unwrap();
        assert!(store.get_current(CaseId::new(1), AnalysisKind::CourtScript).unwrap().is_none());
        assert_eq!(store.list_for_case(CaseId::new(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let store = store();
        store
            .replace(CaseId::new(3), AnalysisKind::AdvancedStrategy, &draft("A"))
            .unwrap();
        assert!(store.delete(CaseId::new(3), AnalysisKind::AdvancedStrategy).unwrap());
        assert!(!store.delete(CaseId::new(3), AnalysisKind::AdvancedStrategy).unwrap());
        assert!(store.get_current(CaseId::new(3), AnalysisKind::AdvancedStrategy).unwrap().is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let store = store();
        let mut d = draft("A");
        d.confidence_score = 1.7;
        let stored = store.replace(CaseId::new(4), AnalysisKind::AdvancedStrategy, &d).unwrap();
        assert_eq!(stored.confidence_score, 1.0);
    }

    #[test]
    fn test_concurrent_writers_leave_one_current() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Arc::new(Database::open(dir.path().join("a.db")).unwrap());
        let store = AnalysisStore::new(db);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.replace(
                        CaseId::new(9),
                        AnalysisKind::AdvancedStrategy,
                        &draft(&format!("writer {}", i)),
                    )
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        let all = store.list_for_case(CaseId::new(9)).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].version, 8);
    }

    #[test]
    fn test_exhausted_busy_retries_become_conflict() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("locked.db");
        let db = Database::open_with_config(
            &path,
            PoolConfig {
                busy_timeout: Duration::from_millis(5),
                ..PoolConfig::default()
            },
        )
        .unwrap();
        let store = AnalysisStore::with_retry(
            Arc::new(db),
            RetryPolicy {
                busy_retries: 1,
                initial_backoff: Duration::from_millis(1),
            },
        );
        let first = store
            .replace(CaseId::new(5), AnalysisKind::AdvancedStrategy, &draft("Kept"))
            .unwrap();

        let other_writer = Connection::open(&path).unwrap();
        other_writer.execute_batch("BEGIN IMMEDIATE").unwrap();

        let err = store
            .replace(CaseId::new(5), AnalysisKind::AdvancedStrategy, &draft("Blocked"))
            .unwrap_err();
        match &err {
            CaseError::PersistenceConflict {
                case_id,
                kind,
                attempts,
            } => {
                assert_eq!(*case_id, 5);
                assert_eq!(kind, "advanced_strategy");
                assert_eq!(*attempts, 2);
            }
            other => panic!("expected PersistenceConflict, got {other:?}"),
        }
        assert!(err.is_user_visible());

        other_writer.execute_batch("ROLLBACK").unwrap();
        let current = store
            .get_current(CaseId::new(5), AnalysisKind::AdvancedStrategy)
            .unwrap()
            .unwrap();
        assert_eq!(current, first);
        assert_eq!(current.version, 1);
    }

    #[test]
    fn test_render_summary() {
        let payload = json!({
            "rights_assessment": [
                {"right_violated": "Fourth Amendment Rights", "severity": "High"},
                {"right_violated": "Fifth Amendment Rights"}
            ],
            "case_law_suggestions": [{"case_name": "Terry v. Ohio"}],
            "winning_strategy": {"primary_approach": "Suppress", "timing_strategy": "Early"}
        });
        let text = render_summary(AnalysisKind::RightsAndCaseLaw, &payload);
        assert!(text.starts_with("Rights & Case Law"));
        assert!(text.contains("Rights assessment\n- Fourth Amendment Rights\n- Fifth Amendment Rights"));
        assert!(text.contains("Case law suggestions\n- Terry v. Ohio"));
        assert!(text.contains("- primary approach: Suppress"));
    }

    #[test]
    fn test_render_summary_scalars() {
        let payload = json!({
            "success_probability": 0.5,
            "confidence_level": "Medium",
            "key_factors": ["Evidence quality"],
            "improvement_suggestions": ["Gather records"]
        });
        let text = render_summary(AnalysisKind::SuccessProbability, &payload);
        assert!(text.contains("Success probability\n0.5"));
        assert!(text.contains("Key factors\n- Evidence quality"));
    }
}
