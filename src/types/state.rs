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

use serde::Deserialize;
use serde::Serialize;

use crate::types::card_id::CardId;
use crate::types::card_id::UserId;
use crate::types::timestamp::Timestamp;

/// The default SM-2 ease factor for a card that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// The ease factor never drops below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// The durable scheduling state attached to one flashcard.
///
/// Holds the fields of both algorithm families; whichever algorithm is
/// configured updates its own fields and leaves the others alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSchedulingState {
    pub card_id: CardId,
    /// The learner who owns the card.
    pub user_id: UserId,
    /// Days between the last review and the next one (SM-2, and the
    /// derived FSRS interval).
    pub interval_days: u32,
    /// SM-2 ease factor.
    pub ease_factor: f64,
    /// Consecutive successful reviews.
    pub repetition_count: u32,
    /// FSRS stability in days. Zero means unset.
    pub stability: f64,
    /// FSRS difficulty. Zero means unset.
    pub difficulty: f64,
    pub last_reviewed_at: Option<Timestamp>,
    pub next_review_at: Option<Timestamp>,
    /// Bumped on every committed update; used for compare-and-swap.
    pub version: u64,
}

impl CardSchedulingState {
    /// Default state for a freshly created card.
    pub fn new(card_id: CardId, user_id: UserId) -> Self {
        Self {
            card_id,
            user_id,
            interval_days: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetition_count: 0,
            stability: 0.0,
            difficulty: 0.0,
            last_reviewed_at: None,
            next_review_at: None,
            version: 0,
        }
    }

    /// Never-reviewed cards are always due.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_review_at {
            None => true,
            Some(next) => next <= now,
        }
    }
}
