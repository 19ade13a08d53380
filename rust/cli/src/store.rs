//! SQLite-backed hand history.
//!
//! One row per hand. Every record field lives in its own text column holding
//! its JSON form, so a fetched record is identical to the stored one,
//! player order included.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use handledger_engine::history::{HandRepository, HistoryError};
use handledger_engine::record::HandRecord;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS hands (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    stack_settings TEXT NOT NULL,
    player_roles TEXT NOT NULL,
    hole_cards TEXT NOT NULL,
    action_sequence TEXT NOT NULL,
    winnings TEXT NOT NULL
)";

const COLUMNS: &str =
    "id, created_at, stack_settings, player_roles, hole_cards, action_sequence, winnings";

#[derive(Debug)]
pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let conn = Connection::open(path.as_ref()).map_err(storage)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory().map_err(storage)?)
    }

    fn init(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::StoragePoisoned)
    }
}

impl HandRepository for SqliteHistory {
    fn store(&self, record: HandRecord) -> Result<HandRecord, HistoryError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            &format!("INSERT INTO hands ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                record.id.to_string(),
                serde_json::to_string(&record.created_at)?,
                serde_json::to_string(&record.stack_settings)?,
                serde_json::to_string(&record.player_roles)?,
                serde_json::to_string(&record.hole_cards)?,
                record.action_sequence,
                serde_json::to_string(&record.winnings)?,
            ],
        );

        match inserted {
            Ok(_) => {
                debug!(hand_id = %record.id, "hand stored");
                Ok(record)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(HistoryError::Duplicate(record.id))
            }
            Err(e) => Err(storage(e)),
        }
    }

    fn fetch_all(&self) -> Result<Vec<HandRecord>, HistoryError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM hands ORDER BY rowid"))
            .map_err(storage)?;
        let rows = stmt
            .query_map([], StoredRow::read)
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;

        rows.into_iter().map(StoredRow::into_record).collect()
    }

    fn fetch_by_id(&self, id: &Uuid) -> Result<HandRecord, HistoryError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM hands WHERE id = ?1"),
                params![id.to_string()],
                StoredRow::read,
            )
            .optional()
            .map_err(storage)?;

        row.ok_or(HistoryError::NotFound(*id))?.into_record()
    }
}

fn storage(err: rusqlite::Error) -> HistoryError {
    HistoryError::Storage(err.to_string())
}

/// Raw column values of one row.
struct StoredRow {
    id: String,
    created_at: String,
    stack_settings: String,
    player_roles: String,
    hole_cards: String,
    action_sequence: String,
    winnings: String,
}

impl StoredRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            stack_settings: row.get(2)?,
            player_roles: row.get(3)?,
            hole_cards: row.get(4)?,
            action_sequence: row.get(5)?,
            winnings: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<HandRecord, HistoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| HistoryError::Storage(format!("stored id `{}` is not a uuid: {e}", self.id)))?;
        Ok(HandRecord {
            id,
            created_at: serde_json::from_str(&self.created_at)?,
            stack_settings: serde_json::from_str(&self.stack_settings)?,
            player_roles: serde_json::from_str(&self.player_roles)?,
            hole_cards: serde_json::from_str(&self.hole_cards)?,
            action_sequence: self.action_sequence,
            winnings: serde_json::from_str(&self.winnings)?,
        })
    }
}
