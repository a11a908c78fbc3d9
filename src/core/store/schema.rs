//! Database schema initialization and migration of legacy files

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use super::queries::DATE_FORMAT;
use super::{BathtubStore, StoreError, SCHEMA_VERSION};
use crate::core::metrics::{DerivedMetrics, Measurements};

/// Columns that mark a `bathtubs` table written by the earlier bathtub tools
const LEGACY_COLUMNS: [&str; 3] = ["top_length", "bottom_length", "side_incline_degrees"];

/// Name the legacy table is moved to while its rows are copied
const LEGACY_TABLE: &str = "bathtubs_legacy";

const CREATE_TABLES: &str = r#"
    -- Schema version tracking
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER PRIMARY KEY
    );

    -- AUTOINCREMENT keeps deleted ids from being handed out again
    CREATE TABLE IF NOT EXISTS bathtubs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        top_width REAL NOT NULL,
        bottom_width REAL NOT NULL,
        width REAL NOT NULL,
        height REAL NOT NULL,
        incline_degrees REAL NOT NULL,
        liters REAL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bathtubs_name ON bathtubs(name);
"#;

impl BathtubStore {
    /// Create tables if missing, migrate a legacy table and check the schema version
    pub(super) fn init_schema(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        let legacy = has_legacy_layout(&tx)?;
        if legacy {
            tx.execute_batch(&format!("ALTER TABLE bathtubs RENAME TO {LEGACY_TABLE};"))?;
        }

        tx.execute_batch(CREATE_TABLES)?;

        if legacy {
            let rows = migrate_legacy(&tx)?;
            tracing::info!(rows, "migrated bathtubs from the legacy table layout");
        }

        let stored: Option<i32> = tx
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        match stored {
            None => {
                tx.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(found) if found > SCHEMA_VERSION => {
                return Err(StoreError::SchemaVersion {
                    found,
                    expected: SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }

        tx.commit()?;
        Ok(())
    }
}

fn has_legacy_layout(conn: &Connection) -> Result<bool, StoreError> {
    let mut stmt = conn.prepare("PRAGMA table_info(bathtubs)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LEGACY_COLUMNS
        .iter()
        .all(|legacy| columns.iter().any(|column| column == legacy)))
}

/// Copy legacy rows into the current table, keeping their ids
///
/// Derived values are recomputed from the legacy measurements; the stored
/// free-text liters are discarded. Rows whose measurements cannot be derived
/// keep their legacy incline so the read path reports them as corrupt.
fn migrate_legacy(conn: &Connection) -> Result<usize, StoreError> {
    let high_water: Option<i64> = conn.query_row(
        "SELECT MAX(seq) FROM sqlite_sequence WHERE name IN ('bathtubs', ?1)",
        params![LEGACY_TABLE],
        |row| row.get(0),
    )?;

    let rows = {
        let mut select = conn.prepare(&format!(
            "SELECT id, name, top_length, bottom_length, width, height, \
             side_incline_degrees, created_at FROM {LEGACY_TABLE} ORDER BY id"
        ))?;
        let rows = select
            .query_map([], |row| {
                Ok([
                    row.get::<_, Value>(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ])
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut insert = conn.prepare(
        r#"INSERT INTO bathtubs
           (id, name, top_width, bottom_width, width, height, incline_degrees, liters, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
    )?;
    let migrated = rows.len();
    for [id, name, top, bottom, width, height, incline, created] in rows {
        let (incline, liters) = match legacy_derived(&top, &bottom, &width, &height) {
            Some(derived) => (
                Value::Real(derived.incline_degrees),
                derived.liters.map_or(Value::Null, Value::Real),
            ),
            None => (incline, Value::Null),
        };
        insert.execute(params![
            id,
            name,
            top,
            bottom,
            width,
            height,
            incline,
            liters,
            legacy_date(created),
        ])?;
    }
    drop(insert);

    if let Some(seq) = high_water {
        conn.execute(
            "UPDATE sqlite_sequence SET seq = MAX(seq, ?1) WHERE name = 'bathtubs'",
            params![seq],
        )?;
        conn.execute(
            "INSERT INTO sqlite_sequence (name, seq) SELECT 'bathtubs', ?1 \
             WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'bathtubs')",
            params![seq],
        )?;
    }

    conn.execute_batch(&format!("DROP TABLE {LEGACY_TABLE};"))?;
    Ok(migrated)
}

fn legacy_derived(top: &Value, bottom: &Value, width: &Value, height: &Value) -> Option<DerivedMetrics> {
    let number = |value: &Value| match value {
        Value::Real(v) => Some(*v),
        Value::Integer(v) => Some(*v as f64),
        _ => None,
    };

    Measurements::new(number(top)?, number(bottom)?, number(width)?, number(height)?)
        .derive()
        .ok()
}

/// `CURRENT_TIMESTAMP` text becomes a plain date; anything else is left as is
fn legacy_date(created: Value) -> Value {
    match created {
        Value::Text(s) => {
            match s
                .get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, DATE_FORMAT).ok())
            {
                Some(date) => Value::Text(date.format(DATE_FORMAT).to_string()),
                None => Value::Text(s),
            }
        }
        Value::Null => Value::Text(String::new()),
        other => other,
    }
}
