use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{apply_query, scalar_text, Filter, Order, Record, RecordStore, StoreError};

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "record_collections_v1",
    sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    record_id TEXT NOT NULL,
    body_json TEXT NOT NULL,
    UNIQUE (collection, record_id)
);

CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection, seq);
"#,
}];

/// Local stand-in for the hosted store: every collection is a set of JSON
/// documents keyed by their `id` field.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut conn = Connection::open(path)?;
        configure_for_speed(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl RecordStore for SqliteStore {
    fn select(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError> {
        let conn = self.lock()?;
        let rows = load_collection(&conn, collection)?
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        Ok(apply_query(rows, filters, order))
    }

    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(records.len());
        for mut record in records {
            let has_id = record.get("id").is_some_and(|id| !id.is_null());
            if !has_id {
                record.insert("id".to_string(), Value::String(Uuid::now_v7().to_string()));
            }
            let record_id = record
                .get("id")
                .and_then(scalar_text)
                .ok_or_else(|| StoreError::InvalidRecord("id must be a scalar".to_string()))?;
            tx.execute(
                "INSERT INTO records (collection, record_id, body_json) VALUES (?1, ?2, ?3)",
                params![collection, record_id, serde_json::to_string(&record)?],
            )?;
            inserted.push(record);
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn update(
        &self,
        collection: &str,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut updated = Vec::new();
        for (seq, mut record) in load_collection(&tx, collection)? {
            if !filters.iter().all(|filter| filter.matches(&record)) {
                continue;
            }
            for (key, value) in &patch {
                record.insert(key.clone(), value.clone());
            }
            tx.execute(
                "UPDATE records SET body_json = ?1 WHERE seq = ?2",
                params![serde_json::to_string(&record)?, seq],
            )?;
            updated.push(record);
        }
        tx.commit()?;
        Ok(updated)
    }
}

fn load_collection(conn: &Connection, collection: &str) -> Result<Vec<(i64, Record)>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
SELECT seq, body_json
FROM records
WHERE collection = ?1
ORDER BY seq ASC
"#,
    )?;
    let mut rows = stmt.query(params![collection])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let seq: i64 = row.get(0)?;
        let body: String = row.get(1)?;
        match serde_json::from_str::<Value>(&body)? {
            Value::Object(record) => result.push((seq, record)),
            other => {
                return Err(StoreError::InvalidRecord(format!(
                    "row {seq} in '{collection}' is not an object: {other}"
                )))
            }
        }
    }
    Ok(result)
}

fn configure_for_speed(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, applied_at()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    tx.commit()
}

fn applied_at() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
