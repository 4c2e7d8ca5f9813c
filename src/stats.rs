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

use std::collections::HashSet;

use chrono::Days;
use chrono::NaiveDate;
use serde::Serialize;

use crate::types::log_entry::ReviewLogEntry;
use crate::types::practice_mode::PracticeMode;

/// What a learner did on one (UTC) day.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_answers: usize,
    /// Answers given in `review` mode.
    pub review_answers: usize,
    /// Answers given in `new` mode.
    pub new_answers: usize,
    /// Percentage of correct answers, to one decimal place.
    pub correct_rate: f64,
    pub total_minutes: u64,
}

pub fn daily_stats(entries: &[ReviewLogEntry], date: NaiveDate) -> DailyStats {
    let day: Vec<&ReviewLogEntry> = entries
        .iter()
        .filter(|e| e.answered_at.date() == date)
        .collect();
    let total_answers = day.len();
    let review_answers = day
        .iter()
        .filter(|e| e.practice_mode == PracticeMode::Review)
        .count();
    let new_answers = day
        .iter()
        .filter(|e| e.practice_mode == PracticeMode::New)
        .count();
    let correct = day.iter().filter(|e| e.is_correct).count();
    let correct_rate = if total_answers > 0 {
        let percent = correct as f64 / total_answers as f64 * 100.0;
        (percent * 10.0).round() / 10.0
    } else {
        0.0
    };
    let total_seconds: u64 = day.iter().map(|e| u64::from(e.effort_seconds)).sum();
    let total_minutes = (total_seconds as f64 / 60.0).round() as u64;
    DailyStats {
        date,
        total_answers,
        review_answers,
        new_answers,
        correct_rate,
        total_minutes,
    }
}

/// Consecutive days, ending today, with at least one answer.
pub fn streak(entries: &[ReviewLogEntry], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = entries.iter().map(|e| e.answered_at.date()).collect();
    let mut count = 0;
    let mut day = today;
    while active.contains(&day) {
        count += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::store::tests::entry;
    use crate::types::timestamp::Timestamp;

    fn at(d: u32, h: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 5, d, h, 0, 0).unwrap())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_empty() {
        let stats = daily_stats(&[], day(1));
        assert_eq!(stats.total_answers, 0);
        assert_eq!(stats.correct_rate, 0.0);
        assert_eq!(streak(&[], day(1)), 0);
    }

    #[test]
    fn test_daily_stats() {
        let mut a = entry("a", "u", at(3, 9));
        a.effort_seconds = 100;
        let mut b = entry("b", "u", at(3, 10));
        b.practice_mode = PracticeMode::New;
        b.is_correct = false;
        b.effort_seconds = 50;
        let mut c = entry("c", "u", at(3, 23));
        c.practice_mode = PracticeMode::Cram;
        c.effort_seconds = 30;
        let other_day = entry("d", "u", at(4, 1));

        let stats = daily_stats(&[a, b, c, other_day], day(3));
        assert_eq!(stats.total_answers, 3);
        assert_eq!(stats.review_answers, 1);
        assert_eq!(stats.new_answers, 1);
        assert_eq!(stats.correct_rate, 66.7);
        assert_eq!(stats.total_minutes, 3);
    }

    #[test]
    fn test_streak() {
        let entries = vec![
            entry("a", "u", at(10, 8)),
            entry("a", "u", at(9, 8)),
            entry("b", "u", at(9, 20)),
            entry("a", "u", at(8, 8)),
            entry("a", "u", at(6, 8)),
        ];
        assert_eq!(streak(&entries, day(10)), 3);
        assert_eq!(streak(&entries, day(6)), 1);
        // Nothing yet today.
        assert_eq!(streak(&entries, day(11)), 0);
    }
}
