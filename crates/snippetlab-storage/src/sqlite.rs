//! SQLite implementation of [`SnippetStore`].
//!
//! [`SqliteStore`] persists snippets in a SQLite database with WAL mode,
//! an immediate transaction around every write, and automatic schema
//! migrations. Field-scoped patches become a single `UPDATE` naming only the
//! patched columns; run invalidation compares the new artifacts with the old
//! row inside the same statement.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

use snippetlab_core::{RunState, Snippet, SnippetId};

use crate::convert::{decode_language, decode_run, encode_language, encode_run, RunColumns};
use crate::error::StorageError;
use crate::traits::SnippetStore;
use crate::types::SnippetPatch;

const SELECT_COLUMNS: &str = "SELECT id, title, description, language, code, test_code, \
     code_feedback, test_feedback, run_status, run_outcome, run_message, run_fingerprint, \
     created_at, updated_at FROM snippets";

/// SQLite-backed implementation of [`SnippetStore`].
///
/// The connection is guarded by a mutex so the store can be shared across
/// async tasks; SQLite's own locking covers other processes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// A row exactly as read, before decoding into the core model.
struct RawSnippet {
    id: i64,
    title: String,
    description: String,
    language: String,
    code: String,
    test_code: String,
    code_feedback: String,
    test_feedback: String,
    run: RunColumns,
    created_at: String,
    updated_at: String,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<RawSnippet> {
        Ok(RawSnippet {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            language: row.get(3)?,
            code: row.get(4)?,
            test_code: row.get(5)?,
            code_feedback: row.get(6)?,
            test_feedback: row.get(7)?,
            run: RunColumns {
                status: row.get(8)?,
                outcome: row.get(9)?,
                message: row.get(10)?,
                fingerprint: row.get(11)?,
            },
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn decode(raw: RawSnippet) -> Result<Snippet, StorageError> {
        let id = SnippetId(raw.id);
        let corrupt = |reason: String| StorageError::Corrupt { id, reason };

        Ok(Snippet {
            id,
            title: raw.title,
            description: raw.description,
            language: decode_language(&raw.language).map_err(|e| corrupt(e.to_string()))?,
            code: raw.code,
            test_code: raw.test_code,
            code_feedback: raw.code_feedback,
            test_feedback: raw.test_feedback,
            last_run: decode_run(raw.run).map_err(|e| corrupt(e.to_string()))?,
            created_order: raw.id,
            created_at: parse_timestamp(&raw.created_at).map_err(corrupt)?,
            updated_at: parse_timestamp(&raw.updated_at).map_err(corrupt)?,
        })
    }

    fn fetch(conn: &Connection, id: SnippetId) -> Result<Snippet, StorageError> {
        let raw = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.0],
                Self::read_row,
            )
            .optional()?
            .ok_or(StorageError::SnippetNotFound(id))?;
        Self::decode(raw)
    }

    /// Builds the `SET` clause and bound values for a patch.
    fn assignments(patch: &SnippetPatch, now: DateTime<Utc>) -> (Vec<String>, Vec<Value>) {
        let mut sets = Vec::new();
        let mut values = Vec::new();
        let mut assign = |column: &str, value: Value| -> usize {
            values.push(value);
            sets.push(format!("{} = ?{}", column, values.len()));
            values.len()
        };
        let text = |value: &str| Value::Text(value.to_string());
        let optional = |value: Option<String>| value.map(Value::Text).unwrap_or(Value::Null);

        if let Some(title) = &patch.title {
            assign("title", text(title));
        }
        if let Some(description) = &patch.description {
            assign("description", text(description));
        }
        if let Some(language) = patch.language {
            assign("language", text(encode_language(Some(language))));
        }
        // Bound parameter positions of the new artifacts, compared against
        // the stored ones below.
        let mut artifact_params = Vec::new();
        if let Some(code) = &patch.code {
            artifact_params.push(("code", assign("code", text(code))));
        }
        if let Some(test_code) = &patch.test_code {
            artifact_params.push(("test_code", assign("test_code", text(test_code))));
        }
        if let Some(feedback) = &patch.code_feedback {
            assign("code_feedback", text(feedback));
        }
        if let Some(feedback) = &patch.test_feedback {
            assign("test_feedback", text(feedback));
        }

        let mut invalidate = false;
        match &patch.last_run {
            Some(state) => {
                let columns = encode_run(state);
                assign("run_status", text(&columns.status));
                assign("run_outcome", optional(columns.outcome));
                assign("run_message", text(&columns.message));
                assign("run_fingerprint", optional(columns.fingerprint));
            }
            None => invalidate = patch.touches_artifacts(),
        }
        if !patch.is_empty() {
            assign("updated_at", text(&format_timestamp(now)));
        }

        if invalidate {
            // SET expressions read the pre-update row, so `code` here is the
            // stored value and an identical re-save keeps the run.
            let changed = artifact_params
                .iter()
                .map(|(column, param)| format!("{} IS NOT ?{}", column, param))
                .collect::<Vec<_>>()
                .join(" OR ");
            sets.push(format!(
                "run_status = CASE WHEN run_status IN ('pass', 'fail', 'error') \
                 AND ({}) THEN 'stale' ELSE run_status END",
                changed
            ));
        }
        (sets, values)
    }
}

impl SnippetStore for SqliteStore {
    fn create(&self) -> Result<Snippet, StorageError> {
        let mut conn = self.lock()?;
        let now = format_timestamp(Utc::now());
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO snippets (created_at, updated_at) VALUES (?1, ?2)",
            params![now, now],
        )?;
        let id = SnippetId(tx.last_insert_rowid());
        let snippet = Self::fetch(&tx, id)?;
        tx.commit()?;
        Ok(snippet)
    }

    fn get(&self, id: SnippetId) -> Result<Snippet, StorageError> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn upsert_fields(
        &self,
        id: SnippetId,
        patch: &SnippetPatch,
    ) -> Result<Snippet, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (sets, mut values) = Self::assignments(patch, Utc::now());
        if sets.is_empty() {
            let snippet = Self::fetch(&tx, id)?;
            tx.commit()?;
            return Ok(snippet);
        }

        values.push(Value::Integer(id.0));
        let sql = format!(
            "UPDATE snippets SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len()
        );
        let changed = tx.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StorageError::SnippetNotFound(id));
        }

        let mut snippet = Self::fetch(&tx, id)?;
        if snippet.code.is_empty() && snippet.last_run != RunState::NotRun {
            // A snippet without code has no run.
            tx.execute(
                "UPDATE snippets SET run_status = 'none', run_outcome = NULL, \
                 run_message = '', run_fingerprint = NULL WHERE id = ?1",
                params![id.0],
            )?;
            snippet.last_run = RunState::NotRun;
        }
        tx.commit()?;
        Ok(snippet)
    }

    fn delete(&self, id: SnippetId) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM snippets WHERE id = ?1", params![id.0])?;
        if changed == 0 {
            return Err(StorageError::SnippetNotFound(id));
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Snippet>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::read_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(Self::decode(row?)?);
        }
        Ok(result)
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", text, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snippetlab_core::{Fingerprint, Language, RunOutcome, RunResult, RunStatus};

    fn passing_run(snippet: &Snippet) -> RunState {
        RunState::Completed(RunResult {
            outcome: RunOutcome::Pass,
            message: "Code Executed Successfully".into(),
            fingerprint: snippet.fingerprint(),
        })
    }

    #[test]
    fn create_get_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let created = store.create().unwrap();
        let loaded = store.get(created.id).unwrap();
        assert_eq!(created, loaded);
        assert_eq!(loaded.language, None);
        assert_eq!(loaded.last_run, RunState::NotRun);
        assert_eq!(loaded.created_order, loaded.id.0);
    }

    #[test]
    fn patch_writes_only_named_fields() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        store
            .upsert_fields(
                s.id,
                &SnippetPatch::new()
                    .description("add numbers")
                    .code("def add(a, b): return a + b"),
            )
            .unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().language(Language::Python))
            .unwrap();

        assert_eq!(s.description, "add numbers");
        assert_eq!(s.code, "def add(a, b): return a + b");
        assert_eq!(s.language, Some(Language::Python));
        assert_eq!(s.title, "");
    }

    #[test]
    fn run_state_persists_and_goes_stale_on_code_change() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("x = 1").test_code("assert x"))
            .unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().last_run(passing_run(&s)))
            .unwrap();
        assert_eq!(s.last_run.status(), RunStatus::Pass);

        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().title("unrelated"))
            .unwrap();
        assert_eq!(s.last_run.status(), RunStatus::Pass);

        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().test_code("assert x == 1"))
            .unwrap();
        assert_eq!(s.last_run.status(), RunStatus::Stale);
        assert_eq!(
            s.last_run.result().unwrap().message,
            "Code Executed Successfully"
        );
    }

    #[test]
    fn identical_resave_keeps_failing_run() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("x = 1").test_code("assert x == 2"))
            .unwrap();
        let failing = RunState::Completed(RunResult {
            outcome: RunOutcome::Fail,
            message: "AssertionError".into(),
            fingerprint: s.fingerprint(),
        });
        store
            .upsert_fields(s.id, &SnippetPatch::new().last_run(failing))
            .unwrap();

        let s = store
            .upsert_fields(
                s.id,
                &SnippetPatch::new()
                    .title("renamed")
                    .code("x = 1")
                    .test_code("assert x == 2"),
            )
            .unwrap();
        assert_eq!(s.title, "renamed");
        assert_eq!(s.last_run.status(), RunStatus::Fail);
        assert!(s.regenerate_enabled());

        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("x = 1").test_code("assert x"))
            .unwrap();
        assert_eq!(s.last_run.status(), RunStatus::Stale);
    }

    #[test]
    fn artifact_change_without_run_stays_none() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("print('hi')"))
            .unwrap();
        assert_eq!(s.last_run, RunState::NotRun);
    }

    #[test]
    fn emptied_code_clears_run() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("x = 1").test_code("assert x"))
            .unwrap();
        store
            .upsert_fields(s.id, &SnippetPatch::new().last_run(passing_run(&s)))
            .unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code(""))
            .unwrap();
        assert_eq!(s.last_run, RunState::NotRun);
    }

    #[test]
    fn list_is_insertion_ordered_and_delete_is_hard() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.create().unwrap();
        let b = store.create().unwrap();
        let c = store.create().unwrap();
        store
            .upsert_fields(a.id, &SnippetPatch::new().title("touched last"))
            .unwrap();
        store.delete(b.id).unwrap();

        let ids: Vec<_> = store.list().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert!(matches!(
            store.get(b.id),
            Err(StorageError::SnippetNotFound(_))
        ));
        assert!(matches!(
            store.delete(b.id),
            Err(StorageError::SnippetNotFound(_))
        ));

        let d = store.create().unwrap();
        assert!(d.id > c.id, "ids are never reused");
    }

    #[test]
    fn update_of_missing_snippet_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store
            .upsert_fields(SnippetId(404), &SnippetPatch::new().title("x"))
            .unwrap_err();
        assert!(matches!(err, StorageError::SnippetNotFound(SnippetId(404))));
        let err = store
            .upsert_fields(SnippetId(404), &SnippetPatch::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::SnippetNotFound(_)));
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snippets.db");
        let path = path.to_string_lossy().to_string();

        let id = {
            let store = SqliteStore::new(&path).unwrap();
            let s = store.create().unwrap();
            store
                .upsert_fields(s.id, &SnippetPatch::new().title("kept"))
                .unwrap();
            s.id
        };

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get(id).unwrap().title, "kept");
    }

    #[test]
    fn fingerprint_survives_storage() {
        let store = SqliteStore::in_memory().unwrap();
        let s = store.create().unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().code("a").test_code("b"))
            .unwrap();
        let s = store
            .upsert_fields(s.id, &SnippetPatch::new().last_run(passing_run(&s)))
            .unwrap();
        assert_eq!(
            s.last_run.result().unwrap().fingerprint,
            Fingerprint::of("a", "b")
        );
    }
}
