// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::ReviewError;
use crate::store::CardStateStore;
use crate::store::ReviewLog;
use crate::store::ReviewStore;
use crate::types::card_id::CardId;
use crate::types::card_id::LogEntryId;
use crate::types::card_id::UserId;
use crate::types::log_entry::ReviewLogEntry;
use crate::types::state::CardSchedulingState;
use crate::types::timestamp::Timestamp;

/// How long a writer waits for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const STATE_COLUMNS: &str = "card_id, user_id, interval_days, ease_factor, repetition_count, stability, difficulty, last_reviewed_at, next_review_at, version";

const LOG_COLUMNS: &str = "entry_id, card_id, user_id, answered_at, is_correct, practice_mode, quality, interval_days, next_review_at, effort_seconds, user_answer";

/// SQLite-backed card state store and review log.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &Path) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::info!("Creating schema in {}", database_path.display());
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Number of cards with scheduling state.
    pub fn card_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| ErrorReport::new("negative card count"))
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves any open transaction to be
        // rolled back when it is dropped.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CardStateStore for Database {
    fn insert(&self, state: &CardSchedulingState) -> Result<(), ReviewError> {
        log::debug!("Adding card {}", state.card_id);
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let exists: Option<i64> = tx
            .query_row(
                "select 1 from cards where card_id = ?;",
                [&state.card_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(ReviewError::validation(format!(
                "card {} already has scheduling state",
                state.card_id
            )));
        }
        let sql =
            format!("insert into cards ({STATE_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?);");
        tx.execute(
            &sql,
            (
                &state.card_id,
                &state.user_id,
                state.interval_days,
                state.ease_factor,
                state.repetition_count,
                state.stability,
                state.difficulty,
                state.last_reviewed_at,
                state.next_review_at,
                version_to_sql(state.version)?,
            ),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get(&self, card_id: &CardId) -> Result<CardSchedulingState, ReviewError> {
        let conn = self.acquire();
        let sql = format!("select {STATE_COLUMNS} from cards where card_id = ?;");
        conn.query_row(&sql, [card_id], read_state)
            .optional()?
            .ok_or_else(|| ReviewError::NotFound(card_id.clone()))
    }

    fn update(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
    ) -> Result<u64, ReviewError> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let version = update_state(&tx, card_id, expected_version, new_state)?;
        tx.commit()?;
        Ok(version)
    }

    fn due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<CardSchedulingState>, ReviewError> {
        let conn = self.acquire();
        let sql = format!(
            "select {STATE_COLUMNS} from cards where user_id = ? and (next_review_at is null or next_review_at <= ?) order by next_review_at is not null, next_review_at, card_id limit ?;"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map((user_id, now, limit), read_state)?;
        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        Ok(due)
    }

    fn remove(&self, card_id: &CardId) -> Result<(), ReviewError> {
        let conn = self.acquire();
        let changed = conn.execute("delete from cards where card_id = ?;", [card_id])?;
        if changed == 0 {
            return Err(ReviewError::NotFound(card_id.clone()));
        }
        Ok(())
    }
}

impl ReviewLog for Database {
    fn append(&self, entry: &ReviewLogEntry) -> Result<LogEntryId, ReviewError> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        insert_entry(&tx, entry)?;
        tx.commit()?;
        Ok(entry.id.clone())
    }

    fn history(&self, card_id: &CardId) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        self.select_entries("card_id", card_id.as_str())
    }

    fn entries_for_user(&self, user_id: &UserId) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        self.select_entries("user_id", user_id.as_str())
    }
}

impl Database {
    fn select_entries(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        let conn = self.acquire();
        let sql = format!(
            "select {LOG_COLUMNS} from review_log where {column} = ? order by answered_at, rowid;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([value], read_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

impl ReviewStore for Database {
    fn commit_review(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
        entry: &ReviewLogEntry,
    ) -> Result<u64, ReviewError> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let version = update_state(&tx, card_id, expected_version, new_state)?;
        insert_entry(&tx, entry)?;
        tx.commit()?;
        Ok(version)
    }
}

fn version_to_sql(version: u64) -> Result<i64, ReviewError> {
    i64::try_from(version).map_err(|_| ReviewError::validation("version counter overflow"))
}

/// Compare-and-swap on `version`. Dropping the transaction on error rolls
/// it back.
fn update_state(
    tx: &Transaction,
    card_id: &CardId,
    expected_version: u64,
    new_state: &CardSchedulingState,
) -> Result<u64, ReviewError> {
    let version = expected_version.saturating_add(1);
    let sql = "update cards set user_id = ?, interval_days = ?, ease_factor = ?, repetition_count = ?, stability = ?, difficulty = ?, last_reviewed_at = ?, next_review_at = ?, version = ? where card_id = ? and version = ?;";
    let changed = tx.execute(
        sql,
        (
            &new_state.user_id,
            new_state.interval_days,
            new_state.ease_factor,
            new_state.repetition_count,
            new_state.stability,
            new_state.difficulty,
            new_state.last_reviewed_at,
            new_state.next_review_at,
            version_to_sql(version)?,
            card_id,
            version_to_sql(expected_version)?,
        ),
    )?;
    if changed == 1 {
        return Ok(version);
    }
    let exists: Option<i64> = tx
        .query_row("select 1 from cards where card_id = ?;", [card_id], |row| {
            row.get(0)
        })
        .optional()?;
    match exists {
        Some(_) => {
            log::warn!("Version conflict on card {card_id} (expected {expected_version})");
            Err(ReviewError::Conflict(card_id.clone()))
        }
        None => Err(ReviewError::NotFound(card_id.clone())),
    }
}

fn insert_entry(tx: &Transaction, entry: &ReviewLogEntry) -> Result<(), ReviewError> {
    let sql = format!(
        "insert into review_log ({LOG_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);"
    );
    tx.execute(
        &sql,
        (
            &entry.id,
            &entry.card_id,
            &entry.user_id,
            entry.answered_at,
            entry.is_correct,
            entry.practice_mode,
            entry.quality,
            entry.interval_days,
            entry.next_review_at,
            entry.effort_seconds,
            &entry.user_answer,
        ),
    )?;
    Ok(())
}

fn read_state(row: &Row) -> rusqlite::Result<CardSchedulingState> {
    let version: i64 = row.get(9)?;
    Ok(CardSchedulingState {
        card_id: row.get(0)?,
        user_id: row.get(1)?,
        interval_days: row.get(2)?,
        ease_factor: row.get(3)?,
        repetition_count: row.get(4)?,
        stability: row.get(5)?,
        difficulty: row.get(6)?,
        last_reviewed_at: row.get(7)?,
        next_review_at: row.get(8)?,
        version: u64::try_from(version).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                9,
                rusqlite::types::Type::Integer,
                Box::new(e),
            )
        })?,
    })
}

fn read_entry(row: &Row) -> rusqlite::Result<ReviewLogEntry> {
    Ok(ReviewLogEntry {
        id: row.get(0)?,
        card_id: row.get(1)?,
        user_id: row.get(2)?,
        answered_at: row.get(3)?,
        is_correct: row.get(4)?,
        practice_mode: row.get(5)?,
        quality: row.get(6)?,
        interval_days: row.get(7)?,
        next_review_at: row.get(8)?,
        effort_seconds: row.get(9)?,
        user_answer: row.get(10)?,
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
