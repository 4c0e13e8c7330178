use std::path::Path;

use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use crate::error::{CommissionError, Result};
use crate::models::{Field, TransactionRecord};

/// A ledger row: the record plus bookkeeping columns.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub record: TransactionRecord,
}

/// One TEXT column per record field, named by its key. Override flags are
/// session state and are not stored.
pub fn schema() -> String {
    let columns: Vec<String> = Field::ALL
        .iter()
        .map(|f| format!("    \"{}\" TEXT NOT NULL DEFAULT ''", f.key()))
        .collect();
    format!(
        "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
{},
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
",
        columns.join(",\n")
    )
}

fn column_list() -> String {
    Field::ALL
        .iter()
        .map(|f| format!("\"{}\"", f.key()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn field_values(record: &TransactionRecord) -> Vec<Value> {
    Field::ALL
        .iter()
        .map(|f| Value::Text(record.text(*f)))
        .collect()
}

fn select_sql() -> String {
    format!(
        "SELECT id, {}, created_at, updated_at FROM transactions",
        column_list()
    )
}

fn row_to_stored(row: &Row) -> rusqlite::Result<StoredRecord> {
    let mut record = TransactionRecord::default();
    for (i, field) in Field::ALL.iter().enumerate() {
        let value: String = row.get(i + 1)?;
        record.set(*field, &value);
    }
    let n = Field::ALL.len();
    Ok(StoredRecord {
        id: row.get(0)?,
        created_at: row.get::<_, Option<String>>(n + 1)?.unwrap_or_default(),
        updated_at: row.get::<_, Option<String>>(n + 2)?.unwrap_or_default(),
        record,
    })
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(&schema())?;
    Ok(())
}

pub fn insert_record(conn: &Connection, record: &TransactionRecord) -> Result<i64> {
    let placeholders = (1..=Field::ALL.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!(
            "INSERT INTO transactions ({}) VALUES ({placeholders})",
            column_list()
        ),
        params_from_iter(field_values(record)),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_record(conn: &Connection, id: i64, record: &TransactionRecord) -> Result<()> {
    let assignments = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| format!("\"{}\" = ?{}", f.key(), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let mut values = field_values(record);
    values.push(Value::Integer(id));
    let changed = conn.execute(
        &format!(
            "UPDATE transactions SET {assignments}, updated_at = datetime('now') WHERE id = ?{}",
            values.len()
        ),
        params_from_iter(values),
    )?;
    if changed == 0 {
        return Err(CommissionError::RecordNotFound(id));
    }
    Ok(())
}

pub fn get_record(conn: &Connection, id: i64) -> Result<StoredRecord> {
    conn.query_row(
        &format!("{} WHERE id = ?1", select_sql()),
        [id],
        row_to_stored,
    )
    .optional()?
    .ok_or(CommissionError::RecordNotFound(id))
}

pub fn delete_record(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(CommissionError::RecordNotFound(id));
    }
    Ok(())
}

/// All records, oldest closing first. `brokerage` filters case-insensitively.
pub fn list_records(conn: &Connection, brokerage: Option<&str>) -> Result<Vec<StoredRecord>> {
    let order = "ORDER BY \"closingDate\", id";
    let rows = match brokerage {
        Some(b) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE upper(\"brokerage\") = upper(?1) {order}",
                select_sql()
            ))?;
            let rows = stmt
                .query_map([b.trim()], row_to_stored)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(&format!("{} {order}", select_sql()))?;
            let rows = stmt
                .query_map([], row_to_stored)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
}

pub fn get_metadata(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |r| r.get(0))
        .ok()
}

pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}

/// Copy the open ledger to `dest` with SQLite's online backup and return the
/// number of records the copy holds.
pub fn backup_ledger(conn: &Connection, dest: &Path) -> Result<i64> {
    {
        let mut dest_conn = Connection::open(dest)?;
        let backup = Backup::new(conn, &mut dest_conn)?;
        backup.run_to_completion(100, Duration::from_millis(10), None)?;
    }
    count_records(&get_connection(dest)?)
}
