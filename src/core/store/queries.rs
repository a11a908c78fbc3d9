//! Read path: row decoding, integrity checks and queries
//!
//! Rows are read as untyped SQLite values and checked before they become
//! records, so a tampered row is reported instead of coerced.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{BathtubRecord, BathtubStore, CorruptRecord, Listing, StoreError};
use crate::core::metrics::inclines_match;

pub(super) const SELECT_COLUMNS: &str = "SELECT id, name, top_width, bottom_width, width, height, \
     incline_degrees, liters, created_at FROM bathtubs";

/// Stored date format for `created_at`
pub(super) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Liters are stored with one decimal
const LITERS_TOLERANCE: f64 = 0.05;

/// A row exactly as SQLite returned it
struct RawRow {
    values: [Value; 9],
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            values: [
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ],
        })
    }

    fn id(&self) -> Option<i64> {
        match self.values[0] {
            Value::Integer(id) => Some(id),
            _ => None,
        }
    }

    fn decode(self) -> Result<BathtubRecord, CorruptRecord> {
        let id = self.id();
        let corrupt = |reason: String| CorruptRecord { id, reason };

        let id = id.ok_or_else(|| corrupt("id is not an integer".to_string()))?;
        let [_, name, top, bottom, width, height, incline, liters, created] = self.values;

        let name = match name {
            Value::Text(s) if !s.trim().is_empty() => s,
            Value::Text(_) => return Err(corrupt("name is empty".to_string())),
            other => return Err(corrupt(format!("name has type {}", type_name(&other)))),
        };

        let top_width = dimension(&top, "top_width").map_err(corrupt)?;
        let bottom_width = dimension(&bottom, "bottom_width").map_err(corrupt)?;
        let width = dimension(&width, "width").map_err(corrupt)?;
        let height = dimension(&height, "height").map_err(corrupt)?;
        if bottom_width > top_width {
            return Err(corrupt(format!(
                "bottom_width {} exceeds top_width {}",
                bottom_width, top_width
            )));
        }
        let incline_degrees = real(&incline, "incline_degrees").map_err(corrupt)?;

        let liters = match liters {
            Value::Null => None,
            other => Some(real(&other, "liters").map_err(corrupt)?),
        };

        let created_at = match created {
            Value::Text(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|_| corrupt(format!("created_at '{}' is not a YYYY-MM-DD date", s)))?,
            other => {
                return Err(corrupt(format!(
                    "created_at has type {}",
                    type_name(&other)
                )))
            }
        };

        let record = BathtubRecord {
            id,
            name,
            top_width,
            bottom_width,
            width,
            height,
            incline_degrees,
            liters,
            created_at,
        };
        check_derived(&record).map_err(corrupt)?;

        Ok(record)
    }
}

/// Stored derived values must match a recomputation from stored measurements
fn check_derived(record: &BathtubRecord) -> Result<(), String> {
    let derived = record
        .measurements()
        .derive()
        .map_err(|e| e.to_string())?;

    if !inclines_match(derived.incline_degrees, record.incline_degrees) {
        return Err(format!(
            "stored incline {} does not match measurements ({})",
            record.incline_degrees, derived.incline_degrees
        ));
    }

    let liters_match = match (derived.liters, record.liters) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() < LITERS_TOLERANCE,
        _ => false,
    };
    if !liters_match {
        return Err(format!(
            "stored liters {:?} do not match measurements ({:?})",
            record.liters, derived.liters
        ));
    }

    Ok(())
}

fn real(value: &Value, column: &str) -> Result<f64, String> {
    match value {
        Value::Real(v) if v.is_finite() => Ok(*v),
        Value::Integer(v) => Ok(*v as f64),
        other => Err(format!("{} has type {}", column, type_name(other))),
    }
}

fn dimension(value: &Value, column: &str) -> Result<f64, String> {
    let v = real(value, column)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(format!("{} = {} is not positive", column, v))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(v) if !v.is_finite() => "non-finite real",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

/// Fetch one record, inside or outside a transaction
pub(super) fn fetch(conn: &Connection, id: i64) -> Result<BathtubRecord, StoreError> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            RawRow::from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound { id })?;

    raw.decode().map_err(CorruptRecord::into_error)
}

/// Run a multi-row query, separating valid records from corrupt rows
fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Listing, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, RawRow::from_row)?;

    let mut listing = Listing::default();
    for row in rows {
        match row?.decode() {
            Ok(record) => listing.records.push(record),
            Err(corrupt) => {
                tracing::debug!(id = ?corrupt.id, reason = %corrupt.reason, "skipping corrupt record");
                listing.skipped.push(corrupt);
            }
        }
    }

    Ok(listing)
}

impl BathtubStore {
    /// Get a record by id
    pub fn get(&self, id: i64) -> Result<BathtubRecord, StoreError> {
        fetch(&self.conn, id)
    }

    /// All records ordered by id (insertion order)
    pub fn list(&self) -> Result<Listing, StoreError> {
        collect(&self.conn, &format!("{SELECT_COLUMNS} ORDER BY id ASC"), [])
    }

    /// Case-insensitive substring search on name, ordered by name
    pub fn search(&self, term: &str) -> Result<Listing, StoreError> {
        collect(
            &self.conn,
            &format!(
                "{SELECT_COLUMNS} WHERE instr(lower(name), lower(?1)) > 0 \
                 ORDER BY lower(name) ASC, id ASC"
            ),
            params![term.trim()],
        )
    }

    /// Number of stored rows, including corrupt ones
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bathtubs", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
