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

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::error::ReviewError;
use crate::types::card_id::CardId;
use crate::types::card_id::LogEntryId;
use crate::types::card_id::UserId;
use crate::types::log_entry::ReviewLogEntry;
use crate::types::state::CardSchedulingState;
use crate::types::timestamp::Timestamp;

/// Durable per-card scheduling state.
pub trait CardStateStore: Send + Sync {
    /// Stores the state of a newly created card. Fails if the card exists.
    fn insert(&self, state: &CardSchedulingState) -> Result<(), ReviewError>;

    fn get(&self, card_id: &CardId) -> Result<CardSchedulingState, ReviewError>;

    /// Replaces the card's state if its stored version is still
    /// `expected_version`, and returns the new version. A losing writer gets
    /// `Conflict` and nothing is written.
    fn update(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
    ) -> Result<u64, ReviewError>;

    /// The user's due cards: never-reviewed cards first, then by
    /// `next_review_at`.
    fn due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<CardSchedulingState>, ReviewError>;

    /// Drops the state of a deleted card. Its log entries stay.
    fn remove(&self, card_id: &CardId) -> Result<(), ReviewError>;
}

/// Append-only review history.
pub trait ReviewLog: Send + Sync {
    fn append(&self, entry: &ReviewLogEntry) -> Result<LogEntryId, ReviewError>;

    /// A card's entries, oldest first.
    fn history(&self, card_id: &CardId) -> Result<Vec<ReviewLogEntry>, ReviewError>;

    /// A user's entries, oldest first.
    fn entries_for_user(&self, user_id: &UserId) -> Result<Vec<ReviewLogEntry>, ReviewError>;
}

/// A store that can commit a state transition together with its log entry.
pub trait ReviewStore: CardStateStore + ReviewLog {
    /// Applies `update` and `append` atomically: either both take effect or
    /// neither does. Returns the card's new version.
    fn commit_review(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
        entry: &ReviewLogEntry,
    ) -> Result<u64, ReviewError>;
}

/// Due-queue order shared by the stores.
pub(crate) fn due_order(a: &CardSchedulingState, b: &CardSchedulingState) -> Ordering {
    match (a.next_review_at, b.next_review_at) {
        (None, None) => a.card_id.cmp(&b.card_id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.card_id.cmp(&b.card_id)),
    }
}

#[derive(Default)]
struct Inner {
    states: HashMap<CardId, CardSchedulingState>,
    log: Vec<ReviewLogEntry>,
}

/// A store kept in memory, behind a single lock.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> MutexGuard<'_, Inner> {
        // Every mutation is validated before it is applied, so the data
        // behind a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_update(
    inner: &mut Inner,
    card_id: &CardId,
    expected_version: u64,
    new_state: &CardSchedulingState,
) -> Result<u64, ReviewError> {
    let current = inner
        .states
        .get_mut(card_id)
        .ok_or_else(|| ReviewError::NotFound(card_id.clone()))?;
    if current.version != expected_version {
        return Err(ReviewError::Conflict(card_id.clone()));
    }
    let version = expected_version.saturating_add(1);
    *current = CardSchedulingState {
        card_id: card_id.clone(),
        version,
        ..new_state.clone()
    };
    Ok(version)
}

fn sorted_entries<F>(log: &[ReviewLogEntry], keep: F) -> Vec<ReviewLogEntry>
where
    F: Fn(&ReviewLogEntry) -> bool,
{
    let mut entries: Vec<ReviewLogEntry> = log.iter().filter(|e| keep(e)).cloned().collect();
    // Stable, so entries answered at the same instant keep insertion order.
    entries.sort_by_key(|e| e.answered_at);
    entries
}

impl CardStateStore for InMemoryStore {
    fn insert(&self, state: &CardSchedulingState) -> Result<(), ReviewError> {
        let mut inner = self.acquire();
        if inner.states.contains_key(&state.card_id) {
            return Err(ReviewError::validation(format!(
                "card {} already has scheduling state",
                state.card_id
            )));
        }
        inner.states.insert(state.card_id.clone(), state.clone());
        Ok(())
    }

    fn get(&self, card_id: &CardId) -> Result<CardSchedulingState, ReviewError> {
        self.acquire()
            .states
            .get(card_id)
            .cloned()
            .ok_or_else(|| ReviewError::NotFound(card_id.clone()))
    }

    fn update(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
    ) -> Result<u64, ReviewError> {
        let mut inner = self.acquire();
        apply_update(&mut inner, card_id, expected_version, new_state)
    }

    fn due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<CardSchedulingState>, ReviewError> {
        let inner = self.acquire();
        let mut due: Vec<CardSchedulingState> = inner
            .states
            .values()
            .filter(|s| &s.user_id == user_id && s.is_due(now))
            .cloned()
            .collect();
        due.sort_by(due_order);
        due.truncate(limit);
        Ok(due)
    }

    fn remove(&self, card_id: &CardId) -> Result<(), ReviewError> {
        match self.acquire().states.remove(card_id) {
            Some(_) => Ok(()),
            None => Err(ReviewError::NotFound(card_id.clone())),
        }
    }
}

impl ReviewLog for InMemoryStore {
    fn append(&self, entry: &ReviewLogEntry) -> Result<LogEntryId, ReviewError> {
        self.acquire().log.push(entry.clone());
        Ok(entry.id.clone())
    }

    fn history(&self, card_id: &CardId) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        Ok(sorted_entries(&self.acquire().log, |e| &e.card_id == card_id))
    }

    fn entries_for_user(&self, user_id: &UserId) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        Ok(sorted_entries(&self.acquire().log, |e| &e.user_id == user_id))
    }
}

impl ReviewStore for InMemoryStore {
    fn commit_review(
        &self,
        card_id: &CardId,
        expected_version: u64,
        new_state: &CardSchedulingState,
        entry: &ReviewLogEntry,
    ) -> Result<u64, ReviewError> {
        let mut inner = self.acquire();
        let version = apply_update(&mut inner, card_id, expected_version, new_state)?;
        inner.log.push(entry.clone());
        Ok(version)
    }
}
