use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};

use super::{BucketCount, EventStore};
use crate::model::{EventRecord, Timestamp};

const SCHEMA: &str = "
BEGIN;
CREATE TABLE IF NOT EXISTS operator (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS station (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS qso_log (
    id INTEGER PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    callsign TEXT NOT NULL,
    exchange TEXT NOT NULL DEFAULT '',
    section TEXT NOT NULL DEFAULT '',
    operator_id INTEGER NOT NULL REFERENCES operator(id),
    station_id INTEGER NOT NULL REFERENCES station(id),
    band TEXT NOT NULL,
    mode TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS qso_log_timestamp ON qso_log(timestamp);
COMMIT;";

const SELECT_RECORDS: &str = "
SELECT q.timestamp, q.callsign, q.exchange, q.section, o.name, s.name, q.band, q.mode
FROM qso_log q
JOIN operator o ON o.id = q.operator_id
JOIN station s ON s.id = q.station_id";

/// How long a query waits on a writer (the logger) holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    ReadOnly,
    ReadWrite,
}

/// Contact log stored in SQLite.
///
/// The connection is opened lazily and dropped after any failed query, so a
/// database that does not exist yet (or was replaced underneath us) is picked
/// up again on the next cycle.
pub struct SqliteEventStore {
    path: PathBuf,
    access: Access,
    conn: RefCell<Option<Connection>>,
}

impl std::fmt::Debug for SqliteEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEventStore")
            .field("path", &self.path)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl SqliteEventStore {
    /// Read-only store. Does not touch the file until the first query.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            access: Access::ReadOnly,
            conn: RefCell::new(None),
        }
    }

    /// Opens (creating if needed) a writable store and ensures the schema exists.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            access: Access::ReadWrite,
            conn: RefCell::new(None),
        };
        store
            .with_connection(|conn| conn.execute_batch(SCHEMA))
            .context("create qso_log schema")?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one contact, registering its operator and station names.
    ///
    /// # Errors
    /// Returns an error if the store is read-only or the insert fails.
    pub fn insert(&self, record: &EventRecord) -> Result<()> {
        anyhow::ensure!(
            self.access == Access::ReadWrite,
            "{} was opened read-only",
            self.path.display()
        );
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO operator (name) VALUES (?1)",
                params![record.operator],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO station (name) VALUES (?1)",
                params![record.station],
            )?;
            tx.execute(
                "INSERT INTO qso_log
                    (timestamp, callsign, exchange, section, operator_id, station_id, band, mode)
                 VALUES (?1, ?2, ?3, ?4,
                    (SELECT id FROM operator WHERE name = ?5),
                    (SELECT id FROM station WHERE name = ?6),
                    ?7, ?8)",
                params![
                    record.timestamp,
                    record.callsign,
                    record.exchange,
                    record.section,
                    record.operator,
                    record.station,
                    record.band,
                    record.mode
                ],
            )?;
            tx.commit()
        })
        .context("insert qso")
    }

    fn connect(&self) -> Result<Connection> {
        let flags = match self.access {
            Access::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            Access::ReadWrite => {
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
            }
        };
        let conn = Connection::open_with_flags(&self.path, flags)
            .with_context(|| format!("open database {}", self.path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("set database busy timeout")?;
        Ok(conn)
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let mut slot = self.conn.borrow_mut();
        let conn = match slot.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };
        let result = f(&conn);
        if result.is_ok() {
            *slot = Some(conn);
        }
        result.with_context(|| format!("query {}", self.path.display()))
    }

    fn query_records(&self, sql: &str, window: Option<(Timestamp, Timestamp)>) -> Result<Vec<EventRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = match window {
                Some((start, end)) => stmt.query_map(params![start, end], record_from_row)?,
                None => stmt.query_map([], record_from_row)?,
            };
            rows.collect()
        })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        timestamp: row.get(0)?,
        callsign: row.get(1)?,
        exchange: row.get(2)?,
        section: row.get(3)?,
        operator: row.get(4)?,
        station: row.get(5)?,
        band: row.get(6)?,
        mode: row.get(7)?,
    })
}

impl EventStore for SqliteEventStore {
    fn latest_event(&self) -> Result<Option<EventRecord>> {
        let sql = format!("{SELECT_RECORDS} ORDER BY q.timestamp DESC, q.id DESC LIMIT 1");
        self.with_connection(|conn| conn.query_row(&sql, [], record_from_row).optional())
    }

    fn scan(&self) -> Result<Vec<EventRecord>> {
        let sql = format!("{SELECT_RECORDS} ORDER BY q.timestamp, q.id");
        self.query_records(&sql, None)
    }

    fn scan_window(&self, start: Timestamp, end: Timestamp) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "{SELECT_RECORDS} WHERE q.timestamp >= ?1 AND q.timestamp <= ?2 ORDER BY q.timestamp, q.id"
        );
        self.query_records(&sql, Some((start, end)))
    }

    fn scan_bucketed(&self, bucket_secs: i64) -> Result<Vec<BucketCount>> {
        anyhow::ensure!(bucket_secs > 0, "bucket width must be positive");
        // `%` keeps the dividend's sign, so fold it into [0, bucket) to floor
        // timestamps before the epoch.
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp - ((timestamp % ?1) + ?1) % ?1 AS ts, band, COUNT(*)
                 FROM qso_log GROUP BY ts, band ORDER BY ts, band",
            )?;
            let rows = stmt.query_map(params![bucket_secs], |row| {
                Ok(BucketCount {
                    bucket_start: row.get(0)?,
                    band: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?;
            rows.collect()
        })
    }
}
