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

//! The SuperMemo 2 algorithm.
//!
//! The ease factor is updated on every review, pass or fail, with the
//! canonical formula `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`.
//! The formula already penalises low grades, so failures use it too instead
//! of a separate penalty.

use crate::error::ReviewError;
use crate::types::quality::Quality;
use crate::types::state::MIN_EASE_FACTOR;

/// Interval after the first successful repetition.
const FIRST_INTERVAL: u32 = 1;

/// Interval after the second successful repetition.
const SECOND_INTERVAL: u32 = 6;

/// Interval after a failed review.
const RELEARN_INTERVAL: u32 = 1;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Sm2Outcome {
    pub interval_days: u32,
    pub ease_factor: f64,
    pub repetition_count: u32,
}

/// Computes the next SM-2 parameters.
///
/// Fails if the previous ease factor is below the 1.3 floor or not finite;
/// those can only come from corrupted state.
pub fn compute_sm2(
    prev_interval_days: u32,
    prev_ease_factor: f64,
    prev_repetition_count: u32,
    quality: Quality,
) -> Result<Sm2Outcome, ReviewError> {
    if !prev_ease_factor.is_finite() || prev_ease_factor < MIN_EASE_FACTOR {
        return Err(ReviewError::validation(format!(
            "ease factor must be at least {MIN_EASE_FACTOR}, got {prev_ease_factor}"
        )));
    }

    let ease_factor = next_ease_factor(prev_ease_factor, quality);

    if !quality.is_passing() {
        return Ok(Sm2Outcome {
            interval_days: RELEARN_INTERVAL,
            ease_factor,
            repetition_count: 0,
        });
    }

    let repetition_count = prev_repetition_count.saturating_add(1);
    let interval_days = match repetition_count {
        1 => FIRST_INTERVAL,
        2 => SECOND_INTERVAL,
        _ => {
            let next = (f64::from(prev_interval_days) * ease_factor).round();
            // `as` saturates at u32::MAX.
            (next as u32).max(FIRST_INTERVAL)
        }
    };
    Ok(Sm2Outcome {
        interval_days,
        ease_factor,
        repetition_count,
    })
}

fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    let delta = 0.1 - miss * (0.08 + miss * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}
