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

use serde::Serialize;

use crate::algorithm::SchedulingAlgorithm;
use crate::error::ReviewError;
use crate::store::ReviewStore;
use crate::types::card_id::CardId;
use crate::types::card_id::LogEntryId;
use crate::types::card_id::UserId;
use crate::types::log_entry::ReviewLogEntry;
use crate::types::practice_mode::PracticeMode;
use crate::types::quality::Quality;
use crate::types::state::CardSchedulingState;
use crate::types::timestamp::Timestamp;

/// A learner's answer to one card.
#[derive(Clone, Debug)]
pub struct ReviewRequest {
    pub user_id: UserId,
    pub card_id: CardId,
    pub quality: Quality,
    pub practice_mode: PracticeMode,
    pub effort_seconds: u32,
    pub user_answer: Option<String>,
}

impl ReviewRequest {
    pub fn new(
        user_id: UserId,
        card_id: CardId,
        quality: Quality,
        practice_mode: PracticeMode,
    ) -> Self {
        Self {
            user_id,
            card_id,
            quality,
            practice_mode,
            effort_seconds: 0,
            user_answer: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub interval_days: u32,
    pub next_review_at: Timestamp,
    pub log_entry_id: LogEntryId,
    pub log_entry: ReviewLogEntry,
}

/// Records reviews: loads a card's state, runs the configured algorithm,
/// and commits the new state together with a log entry.
pub struct ReviewService<S: ReviewStore> {
    store: S,
    algorithm: Box<dyn SchedulingAlgorithm>,
}

impl<S: ReviewStore> ReviewService<S> {
    pub fn new(store: S, algorithm: Box<dyn SchedulingAlgorithm>) -> Self {
        Self { store, algorithm }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn algorithm(&self) -> &dyn SchedulingAlgorithm {
        self.algorithm.as_ref()
    }

    /// Creates the default scheduling state for a new flashcard.
    pub fn create_card(
        &self,
        card_id: CardId,
        user_id: UserId,
    ) -> Result<CardSchedulingState, ReviewError> {
        let state = CardSchedulingState::new(card_id, user_id);
        self.store.insert(&state)?;
        Ok(state)
    }

    pub fn submit_review(&self, request: ReviewRequest) -> Result<ReviewOutcome, ReviewError> {
        self.submit_review_at(request, Timestamp::now())
    }

    /// Submits a review answered at `now`.
    ///
    /// Nothing is written unless the whole review commits. On `Conflict` the
    /// card was reviewed concurrently and the request may be resubmitted.
    pub fn submit_review_at(
        &self,
        request: ReviewRequest,
        now: Timestamp,
    ) -> Result<ReviewOutcome, ReviewError> {
        let prior = self.load_owned(&request.card_id, &request.user_id)?;
        let schedule = self.algorithm.schedule(&prior, request.quality, now)?;
        let entry = ReviewLogEntry {
            id: LogEntryId::generate(),
            card_id: request.card_id.clone(),
            user_id: request.user_id,
            answered_at: now,
            is_correct: request.quality.is_passing(),
            practice_mode: request.practice_mode,
            quality: request.quality,
            interval_days: schedule.interval_days,
            next_review_at: schedule.next_review_at,
            effort_seconds: request.effort_seconds,
            user_answer: request.user_answer,
        };
        self.store
            .commit_review(&request.card_id, prior.version, &schedule.state, &entry)?;
        log::debug!(
            "{} reviewed ({}, q={}): next review in {}d at {}",
            request.card_id,
            self.algorithm.kind(),
            request.quality,
            schedule.interval_days,
            schedule.next_review_at
        );
        Ok(ReviewOutcome {
            interval_days: schedule.interval_days,
            next_review_at: schedule.next_review_at,
            log_entry_id: entry.id.clone(),
            log_entry: entry,
        })
    }

    /// Like [`Self::submit_review`], but resubmits against fresh state up to
    /// `max_retries` times when another review of the card wins the race.
    pub fn submit_review_with_retry(
        &self,
        request: ReviewRequest,
        max_retries: u32,
    ) -> Result<ReviewOutcome, ReviewError> {
        let mut attempt = 0;
        loop {
            match self.submit_review(request.clone()) {
                Err(ReviewError::Conflict(card_id)) if attempt < max_retries => {
                    attempt += 1;
                    log::warn!("Lost race on card {card_id}, retrying ({attempt}/{max_retries})");
                }
                result => return result,
            }
        }
    }

    /// The interval each grade would produce for the card right now.
    pub fn preview(
        &self,
        card_id: &CardId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<(Quality, u32)>, ReviewError> {
        let state = self.load_owned(card_id, user_id)?;
        self.algorithm.preview(&state, now)
    }

    pub fn due_cards(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<CardSchedulingState>, ReviewError> {
        self.store.due(user_id, now, limit)
    }

    pub fn history(&self, card_id: &CardId) -> Result<Vec<ReviewLogEntry>, ReviewError> {
        self.store.history(card_id)
    }

    /// Another user's card is reported as missing.
    fn load_owned(
        &self,
        card_id: &CardId,
        user_id: &UserId,
    ) -> Result<CardSchedulingState, ReviewError> {
        let state = self.store.get(card_id)?;
        if &state.user_id != user_id {
            return Err(ReviewError::NotFound(card_id.clone()));
        }
        Ok(state)
    }
}
