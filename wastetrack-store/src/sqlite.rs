//! SQLite entity store.
//!
//! One `records` table holds every kind: identity in the rowid column, the
//! payload as JSON text, and created/modified timestamps maintained by the
//! store. Filters and ordering are pushed down as `json_extract` expressions;
//! commits run inside a single transaction. Uniqueness constraints are
//! partial indexes over extracted fields, created per kind on demand.

use crate::filter::{pointer_to_json_path, Filter, QuerySpec, SortDirection};
use crate::{CommitReceipt, EntityStore, StagedBatch, StoreError, StoreResult, StoredRecord};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    modified_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
";

/// Rusqlite-backed store. The connection is mutex-guarded; callers that must
/// not block an async context wrap calls in `spawn_blocking`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) a database file and ensures the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "opened entity store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Used by tests and previews.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Ensures a uniqueness constraint: within `kind`, no two rows may hold
    /// the same value at `pointer`. Implemented as a partial unique index
    /// over the extracted field.
    pub fn ensure_unique_index(&self, kind: &str, pointer: &str) -> StoreResult<()> {
        validate_kind(kind)?;
        let path = pointer_to_json_path(pointer)?;
        let index_name: String = format!("uniq_{kind}_{}", &pointer[1..])
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {index_name} \
             ON records (json_extract(data, '{path}')) WHERE kind = '{kind}'"
        );
        self.lock().execute_batch(&sql)?;
        debug!(kind, pointer, "unique index ensured");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite store lock poisoned")
    }
}

/// Kind keys are compile-time constants; reject anything that could not have
/// come from one before splicing it into index DDL.
fn validate_kind(kind: &str) -> StoreResult<()> {
    let well_formed = !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if well_formed {
        Ok(())
    } else {
        Err(StoreError::InvalidData(format!("invalid kind key: {kind:?}")))
    }
}

/// Distinguishes constraint failures from other database errors so `save`
/// callers can surface them as such.
fn map_db_err(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::Constraint(
                msg.clone().unwrap_or_else(|| "constraint failed".to_string()),
            );
        }
    }
    StoreError::Database(e)
}

fn bind_scalar(value: &Value) -> StoreResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(StoreError::InvalidData(format!("unsupported number: {n}")))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        other => Err(StoreError::InvalidData(format!(
            "filter operand must be a scalar, got {other}"
        ))),
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Renders a filter into a WHERE fragment plus its bind parameters.
fn render_filter(filter: &Filter, params: &mut Vec<SqlValue>) -> StoreResult<String> {
    let comparison = |path: &str,
                      op: &str,
                      value: &Value,
                      params: &mut Vec<SqlValue>|
     -> StoreResult<String> {
        let json_path = pointer_to_json_path(path)?;
        params.push(bind_scalar(value)?);
        Ok(format!("json_extract(data, '{json_path}') {op} ?"))
    };

    match filter {
        Filter::All => Ok("1".to_string()),
        Filter::Eq(path, value) if value.is_null() => {
            let json_path = pointer_to_json_path(path)?;
            Ok(format!("json_extract(data, '{json_path}') IS NULL"))
        }
        Filter::Ne(path, value) if value.is_null() => {
            let json_path = pointer_to_json_path(path)?;
            Ok(format!("json_extract(data, '{json_path}') IS NOT NULL"))
        }
        Filter::Eq(path, value) => comparison(path, "=", value, params),
        Filter::Ne(path, value) => {
            let json_path = pointer_to_json_path(path)?;
            params.push(bind_scalar(value)?);
            // json_extract yields SQL NULL for a missing or null field; plain
            // <> would drop such rows, the blob evaluator keeps them.
            Ok(format!(
                "(json_extract(data, '{json_path}') <> ? \
                 OR json_extract(data, '{json_path}') IS NULL)"
            ))
        }
        Filter::Gt(path, value) => comparison(path, ">", value, params),
        Filter::Ge(path, value) => comparison(path, ">=", value, params),
        Filter::Lt(path, value) => comparison(path, "<", value, params),
        Filter::Le(path, value) => comparison(path, "<=", value, params),
        Filter::Contains(path, needle) => {
            let json_path = pointer_to_json_path(path)?;
            params.push(SqlValue::Text(format!("%{}%", escape_like(needle))));
            Ok(format!(
                "json_extract(data, '{json_path}') LIKE ? ESCAPE '\\'"
            ))
        }
        Filter::And(parts) => render_junction(parts, " AND ", "1", params),
        Filter::Or(parts) => render_junction(parts, " OR ", "0", params),
        // COALESCE collapses SQL three-valued logic to two values before the
        // NOT, so a predicate that is NULL on a missing field negates to true
        // exactly like the blob evaluator.
        Filter::Not(inner) => Ok(format!(
            "NOT COALESCE(({}), 0)",
            render_filter(inner, params)?
        )),
    }
}

fn render_junction(
    parts: &[Filter],
    joiner: &str,
    empty: &str,
    params: &mut Vec<SqlValue>,
) -> StoreResult<String> {
    if parts.is_empty() {
        return Ok(empty.to_string());
    }
    let rendered: Vec<String> = parts
        .iter()
        .map(|f| render_filter(f, params))
        .collect::<StoreResult<_>>()?;
    Ok(format!("({})", rendered.join(joiner)))
}

fn render_order(spec: &QuerySpec) -> StoreResult<String> {
    let mut keys = Vec::with_capacity(spec.order.len() + 1);
    for key in &spec.order {
        let path = pointer_to_json_path(&key.field)?;
        let dir = match key.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        // Missing and null values sort last regardless of direction, matching
        // the in-memory comparator.
        keys.push(format!(
            "json_extract(data, '{path}') IS NULL, json_extract(data, '{path}') {dir}"
        ));
    }
    // Id order as the final tiebreak keeps scans deterministic.
    keys.push("id ASC".to_string());
    Ok(format!(" ORDER BY {}", keys.join(", ")))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl EntityStore for SqliteStore {
    fn get(&self, kind: &str, id: i64) -> StoreResult<Option<StoredRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT data FROM records WHERE kind = ?1 AND id = ?2")?;
        let mut rows = stmt.query(rusqlite::params![kind, id])?;
        match rows.next()? {
            Some(row) => {
                let text: String = row.get(0)?;
                Ok(Some(StoredRecord {
                    id,
                    data: serde_json::from_str(&text)?,
                }))
            }
            None => Ok(None),
        }
    }

    fn scan(&self, kind: &str, spec: &QuerySpec) -> StoreResult<Vec<StoredRecord>> {
        let mut params: Vec<SqlValue> = vec![SqlValue::Text(kind.to_string())];
        let mut sql = String::from("SELECT id, data FROM records WHERE kind = ?");
        if let Some(filter) = &spec.filter {
            let clause = render_filter(filter, &mut params)?;
            sql.push_str(" AND (");
            sql.push_str(&clause);
            sql.push(')');
        }
        sql.push_str(&render_order(spec)?);
        match (spec.limit, spec.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {}", offset.unwrap_or(0)));
            }
            (None, Some(offset)) => {
                sql.push_str(&format!(" LIMIT -1 OFFSET {offset}"));
            }
            (None, None) => {}
        }

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let text: String = row.get(1)?;
            records.push(StoredRecord {
                id,
                data: serde_json::from_str(&text)?,
            });
        }
        Ok(records)
    }

    fn commit(&self, kind: &str, batch: StagedBatch) -> StoreResult<CommitReceipt> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut receipt = CommitReceipt::default();
        let now = now_millis();

        for (temp_id, data) in batch.inserts() {
            tx.execute(
                "INSERT INTO records (kind, data, created_at, modified_at) VALUES (?1, ?2, ?3, ?3)",
                rusqlite::params![kind, serde_json::to_string(data)?, now],
            )
            .map_err(map_db_err)?;
            receipt.assigned.push((*temp_id, tx.last_insert_rowid()));
        }

        for (id, data) in batch.updates() {
            let affected = tx
                .execute(
                    "UPDATE records SET data = ?1, modified_at = ?2 WHERE id = ?3 AND kind = ?4",
                    rusqlite::params![serde_json::to_string(data)?, now, id, kind],
                )
                .map_err(map_db_err)?;
            if affected == 0 {
                return Err(StoreError::NotFound(format!("{kind}/{id}")));
            }
        }

        for id in batch.deletes() {
            let affected = tx
                .execute(
                    "DELETE FROM records WHERE id = ?1 AND kind = ?2",
                    rusqlite::params![id, kind],
                )
                .map_err(map_db_err)?;
            if affected == 0 {
                return Err(StoreError::NotFound(format!("{kind}/{id}")));
            }
        }

        tx.commit()?;
        debug!(kind, ops = batch.len(), "sqlite commit applied");
        Ok(receipt)
    }
}
