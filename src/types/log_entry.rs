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
use crate::types::card_id::LogEntryId;
use crate::types::card_id::UserId;
use crate::types::practice_mode::PracticeMode;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

/// An immutable record of one review. The card is referenced by id only:
/// entries outlive the card they describe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLogEntry {
    pub id: LogEntryId,
    pub card_id: CardId,
    pub user_id: UserId,
    pub answered_at: Timestamp,
    pub is_correct: bool,
    pub practice_mode: PracticeMode,
    pub quality: Quality,
    pub interval_days: u32,
    pub next_review_at: Timestamp,
    /// Seconds the learner spent on the card.
    #[serde(default)]
    pub effort_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
}
