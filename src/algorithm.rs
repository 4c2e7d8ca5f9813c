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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;
use crate::error::ReviewError;
use crate::fsrs::Grade;
use crate::fsrs::compute_fsrs_with_retention;
use crate::sm2::compute_sm2;
use crate::types::quality::Quality;
use crate::types::state::CardSchedulingState;
use crate::types::timestamp::Timestamp;

/// Which scheduling algorithm a deployment uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    #[default]
    Sm2,
    Fsrs,
}

impl AlgorithmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmKind::Sm2 => "sm2",
            AlgorithmKind::Fsrs => "fsrs",
        }
    }

    pub fn build(self, config: &Config) -> Box<dyn SchedulingAlgorithm> {
        match self {
            AlgorithmKind::Sm2 => Box::new(Sm2 {
                max_interval_days: config.max_interval_days,
            }),
            AlgorithmKind::Fsrs => Box::new(Fsrs {
                desired_retention: config.fsrs.desired_retention,
                max_interval_days: config.max_interval_days,
            }),
        }
    }
}

impl Display for AlgorithmKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of scheduling one review.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    /// The card's state after the review. `version` is unchanged; the store
    /// bumps it on commit.
    pub state: CardSchedulingState,
    pub interval_days: u32,
    pub next_review_at: Timestamp,
}

/// A spaced repetition algorithm: maps a card's prior state and a grade to
/// its next state. Implementations are pure.
pub trait SchedulingAlgorithm: Send + Sync {
    fn kind(&self) -> AlgorithmKind;

    /// Schedules a review answered at `now`.
    fn schedule(
        &self,
        state: &CardSchedulingState,
        quality: Quality,
        now: Timestamp,
    ) -> Result<Schedule, ReviewError>;

    /// The interval every grade would produce, lowest grade first.
    fn preview(
        &self,
        state: &CardSchedulingState,
        now: Timestamp,
    ) -> Result<Vec<(Quality, u32)>, ReviewError> {
        Quality::all()
            .map(|quality| {
                let schedule = self.schedule(state, quality, now)?;
                Ok((quality, schedule.interval_days))
            })
            .collect()
    }
}

/// Builds the new state once an algorithm has settled on an interval:
/// the review happened `now`, so the next one is `now + interval`.
fn finish(
    mut state: CardSchedulingState,
    interval_days: u32,
    max_interval_days: u32,
    now: Timestamp,
) -> Result<Schedule, ReviewError> {
    let interval_days = interval_days.clamp(1, max_interval_days.max(1));
    let next_review_at = now.plus_days(interval_days)?;
    state.interval_days = interval_days;
    state.last_reviewed_at = Some(now);
    state.next_review_at = Some(next_review_at);
    Ok(Schedule {
        state,
        interval_days,
        next_review_at,
    })
}

#[derive(Clone, Debug)]
pub struct Sm2 {
    pub max_interval_days: u32,
}

impl SchedulingAlgorithm for Sm2 {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Sm2
    }

    fn schedule(
        &self,
        state: &CardSchedulingState,
        quality: Quality,
        now: Timestamp,
    ) -> Result<Schedule, ReviewError> {
        let out = compute_sm2(
            state.interval_days,
            state.ease_factor,
            state.repetition_count,
            quality,
        )?;
        log::debug!(
            "{} q={} EF={:.2} n={} I={}d",
            state.card_id,
            quality,
            out.ease_factor,
            out.repetition_count,
            out.interval_days
        );
        let mut next = state.clone();
        next.ease_factor = out.ease_factor;
        next.repetition_count = out.repetition_count;
        finish(next, out.interval_days, self.max_interval_days, now)
    }
}

#[derive(Clone, Debug)]
pub struct Fsrs {
    pub desired_retention: f64,
    pub max_interval_days: u32,
}

impl SchedulingAlgorithm for Fsrs {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Fsrs
    }

    fn schedule(
        &self,
        state: &CardSchedulingState,
        quality: Quality,
        now: Timestamp,
    ) -> Result<Schedule, ReviewError> {
        let (prev_stability, elapsed_days) = match state.last_reviewed_at {
            // Clock skew can put the last review in the future.
            Some(last) => (state.stability, now.days_since(last).max(0.0)),
            None => (0.0, 0.0),
        };
        let out = compute_fsrs_with_retention(
            prev_stability,
            state.difficulty,
            elapsed_days,
            quality,
            self.desired_retention,
        )?;
        let diff_percent = ((out.difficulty - 1.0) / 9.0) * 100.0;
        log::debug!(
            "{} q={} ({}) S={:.2}d D={:.2}% I={}d",
            state.card_id,
            quality,
            Grade::from(quality).as_str(),
            out.stability,
            diff_percent,
            out.interval_days
        );
        let mut next = state.clone();
        next.stability = out.stability;
        next.difficulty = out.difficulty;
        next.repetition_count = if quality.is_passing() {
            state.repetition_count.saturating_add(1)
        } else {
            0
        };
        finish(next, out.interval_days, self.max_interval_days, now)
    }
}
