// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostics journal: append-only SQLite log of the bridge's lifecycle and
// error events.
//
// Schema:
//   event_journal(
//     id          INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp   TEXT    NOT NULL,   -- RFC 3339
//     kind        TEXT    NOT NULL,   -- "onEvent" | "onError"
//     event_type  TEXT,               -- onEvent only, e.g. "Scan"
//     source      TEXT    NOT NULL,
//     message     TEXT    NOT NULL
//   )
//
// Status updates are not journalled; they are frequent and the last value is
// always available from the relay.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{debug, instrument, warn};

use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::events::{BridgeEvent, EventSink};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS event_journal (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT    NOT NULL,
    kind        TEXT    NOT NULL,
    event_type  TEXT,
    source      TEXT    NOT NULL,
    message     TEXT    NOT NULL
);";

fn db_err(e: rusqlite::Error) -> LabelBridgeError {
    LabelBridgeError::Journal(e.to_string())
}

/// A journalled event, as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: i64,
    pub timestamp: String,
    pub kind: String,
    pub event_type: Option<String>,
    pub source: String,
    pub message: String,
}

/// Append-only event journal backed by SQLite.
///
/// `rusqlite::Connection` is not `Sync`, so it sits behind a mutex to let the
/// journal act as a relay sink.
pub struct EventJournal {
    conn: Mutex<Connection>,
}

impl EventJournal {
    /// Open (or create) the journal database at `path`, in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;
        debug!("event journal opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory journal (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one entry.
    pub fn record(
        &self,
        kind: &str,
        event_type: Option<&str>,
        source: &str,
        message: &str,
    ) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO event_journal (timestamp, kind, event_type, source, message)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![timestamp, kind, event_type, source, message],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<JournalEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, kind, event_type, source, message
                 FROM event_journal
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(JournalEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    kind: row.get(2)?,
                    event_type: row.get(3)?,
                    source: row.get(4)?,
                    message: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    /// Total number of journalled entries.
    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM event_journal", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(n.max(0) as u64)
    }
}

impl EventSink for EventJournal {
    fn emit(&self, event: &BridgeEvent) {
        let outcome = match event {
            BridgeEvent::StatusUpdated { .. } => return,
            BridgeEvent::Event {
                event_type,
                source,
                message,
            } => self.record(event.name(), Some(event_type), source, message),
            BridgeEvent::Error { source, message } => {
                self.record(event.name(), None, source, message)
            }
        };
        if let Err(e) = outcome {
            warn!(error = %e, "failed to journal event");
        }
    }
}
