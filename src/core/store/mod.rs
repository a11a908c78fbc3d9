//! SQLite-backed bathtub record store
//!
//! The store is the only path by which derived metrics reach disk:
//! - Assigns ids (monotonic, never reused after deletion)
//! - Validates measurements and derives incline and capacity on every write
//! - Runs each add/update/delete in its own transaction
//! - Reports tampered rows on read instead of coercing them
//!
//! A store owns its connection; dropping it releases the database.

mod queries;
mod schema;
mod types;

pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::core::clock::{Clock, SystemClock};
use crate::core::metrics::{DerivedMetrics, MetricError, Measurements};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// How long a write waits for another process holding the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(tubmeter::store::validation))]
    Validation { field: String, reason: String },

    #[error("No bathtub with id {id}")]
    #[diagnostic(
        code(tubmeter::store::not_found),
        help("run `tubmeter list` to see existing ids")
    )]
    NotFound { id: i64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidMeasurement(#[from] MetricError),

    #[error("Corrupt record {id}: {reason}")]
    #[diagnostic(
        code(tubmeter::store::corrupt_record),
        help("the row was modified outside tubmeter; fix or delete it")
    )]
    CorruptRecord { id: String, reason: String },

    #[error("Database schema version {found} is newer than supported version {expected}")]
    #[diagnostic(code(tubmeter::store::schema_version))]
    SchemaVersion { found: i32, expected: i32 },

    #[error("Database error: {0}")]
    #[diagnostic(code(tubmeter::store::database))]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(tubmeter::store::io))]
    Io(#[from] std::io::Error),
}

impl StoreError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Name and measurements that passed validation, with derived metrics
#[derive(Debug, Clone, PartialEq)]
struct ValidatedBathtub {
    name: String,
    measurements: Measurements,
    derived: DerivedMetrics,
}

/// Validate caller input and derive metrics; shared by every write path
///
/// Every input `compute_incline` refuses is already a `Validation` error
/// here, so a write never reaches the engine with a bad height and
/// `StoreError::InvalidMeasurement` only appears if the two checks drift
/// apart. Either way the write is aborted before any row is touched.
fn prepare(name: &str, measurements: Measurements) -> Result<ValidatedBathtub, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::invalid("name", "must not be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(StoreError::invalid(
            "name",
            "must not contain control characters such as tabs or newlines",
        ));
    }

    let Measurements {
        top_width,
        bottom_width,
        width,
        height,
    } = measurements;

    for (field, value) in [
        ("top_width", top_width),
        ("bottom_width", bottom_width),
        ("width", width),
        ("height", height),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(StoreError::invalid(
                field,
                format!("{} cm is not a positive measurement", value),
            ));
        }
    }

    if bottom_width > top_width {
        return Err(StoreError::invalid(
            "bottom_width",
            format!(
                "{} cm is wider than top_width {} cm (a tub must not widen toward the floor)",
                bottom_width, top_width
            ),
        ));
    }

    let derived = measurements.derive()?;

    Ok(ValidatedBathtub {
        name: name.to_string(),
        measurements,
        derived,
    })
}

/// The bathtub record store
pub struct BathtubStore {
    conn: Connection,
    clock: Box<dyn Clock>,
    path: Option<PathBuf>,
}

impl BathtubStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let mut store = Self {
            conn,
            clock: Box::new(SystemClock),
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;

        tracing::debug!(path = %path.display(), "opened bathtub store");
        Ok(store)
    }

    /// Open a throwaway store backed by memory
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut store = Self {
            conn: Connection::open_in_memory()?,
            clock: Box::new(SystemClock),
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Replace the clock used for creation dates
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Database file location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, surfacing any error from SQLite
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))
    }

    /// Add a new bathtub; assigns id and creation date
    pub fn add(
        &mut self,
        name: &str,
        measurements: Measurements,
    ) -> Result<BathtubRecord, StoreError> {
        let valid = prepare(name, measurements)?;
        let created_at = self.clock.today();

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"INSERT INTO bathtubs
               (name, top_width, bottom_width, width, height, incline_degrees, liters, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                valid.name,
                valid.measurements.top_width,
                valid.measurements.bottom_width,
                valid.measurements.width,
                valid.measurements.height,
                valid.derived.incline_degrees,
                valid.derived.liters,
                created_at.format(queries::DATE_FORMAT).to_string(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(id, name = %valid.name, incline = valid.derived.incline_degrees, "added bathtub");

        Ok(BathtubRecord {
            id,
            name: valid.name,
            top_width: valid.measurements.top_width,
            bottom_width: valid.measurements.bottom_width,
            width: valid.measurements.width,
            height: valid.measurements.height,
            incline_degrees: valid.derived.incline_degrees,
            liters: valid.derived.liters,
            created_at,
        })
    }

    /// Apply a partial update and recompute derived fields
    pub fn update(
        &mut self,
        id: i64,
        changes: &BathtubUpdate,
    ) -> Result<BathtubRecord, StoreError> {
        if changes.is_empty() {
            return Err(StoreError::invalid("update", "no fields given"));
        }

        let tx = self.conn.transaction()?;
        let current = queries::fetch(&tx, id)?;
        let (name, measurements) = changes.apply(&current);
        let valid = prepare(&name, measurements)?;

        tx.execute(
            r#"UPDATE bathtubs
               SET name = ?1, top_width = ?2, bottom_width = ?3, width = ?4, height = ?5,
                   incline_degrees = ?6, liters = ?7
               WHERE id = ?8"#,
            params![
                valid.name,
                valid.measurements.top_width,
                valid.measurements.bottom_width,
                valid.measurements.width,
                valid.measurements.height,
                valid.derived.incline_degrees,
                valid.derived.liters,
                id,
            ],
        )?;
        tx.commit()?;

        tracing::debug!(id, incline = valid.derived.incline_degrees, "updated bathtub");

        Ok(BathtubRecord {
            id,
            name: valid.name,
            top_width: valid.measurements.top_width,
            bottom_width: valid.measurements.bottom_width,
            width: valid.measurements.width,
            height: valid.measurements.height,
            incline_degrees: valid.derived.incline_degrees,
            liters: valid.derived.liters,
            created_at: current.created_at,
        })
    }

    /// Delete a record permanently
    pub fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM bathtubs WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::NotFound { id });
        }
        tx.commit()?;

        tracing::debug!(id, "deleted bathtub");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
