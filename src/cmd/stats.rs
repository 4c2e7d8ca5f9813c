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

use chrono::NaiveDate;
use serde::Serialize;

use crate::cmd::open_service;
use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::stats::DailyStats;
use crate::stats::daily_stats;
use crate::stats::streak;
use crate::store::ReviewLog;
use crate::types::card_id::UserId;
use crate::types::timestamp::Timestamp;

pub fn user_stats(config: &Config, user_id: &str, today: NaiveDate) -> Fallible<Stats> {
    let service = open_service(config)?;
    let db: &Database = service.store();
    let entries = db.entries_for_user(&UserId::new(user_id))?;
    let stats = Stats {
        cards_in_db_count: db.card_count()?,
        streak_days: streak(&entries, today),
        today: daily_stats(&entries, today),
    };
    Ok(stats)
}

pub fn print_user_stats(config: &Config, user_id: &str) -> Fallible<()> {
    let stats = user_stats(config, user_id, Timestamp::now().date())?;
    let stats_json = serde_json::to_string_pretty(&stats)?;
    println!("{}", stats_json);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    cards_in_db_count: usize,
    streak_days: u32,
    today: DailyStats,
}
