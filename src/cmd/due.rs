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

use crate::cmd::open_service;
use crate::config::Config;
use crate::error::Fallible;
use crate::types::card_id::UserId;
use crate::types::state::CardSchedulingState;
use crate::types::timestamp::Timestamp;

pub fn due_cards(
    config: &Config,
    user_id: &str,
    now: Timestamp,
    limit: usize,
) -> Fallible<Vec<CardSchedulingState>> {
    let service = open_service(config)?;
    let cards = service.due_cards(&UserId::new(user_id), now, limit)?;
    Ok(cards)
}

pub fn print_due_cards(config: &Config, user_id: &str, limit: usize) -> Fallible<()> {
    let cards = due_cards(config, user_id, Timestamp::now(), limit)?;
    println!("{}", serde_json::to_string_pretty(&cards)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::add::add_card;
    use crate::cmd::review::ReviewArgs;
    use crate::cmd::review::review_card;
    use crate::cmd::tests::temp_config;
    use crate::types::card_id::CardId;
    use crate::types::practice_mode::PracticeMode;

    #[test]
    fn test_due_cards() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        add_card(&config, "c2", "alice")?;
        add_card(&config, "c3", "bob")?;
        review_card(
            &config,
            ReviewArgs {
                card_id: "c1".to_string(),
                user_id: "alice".to_string(),
                quality: 5,
                mode: PracticeMode::Review,
                effort_seconds: 0,
                answer: None,
            },
        )?;

        // Only the unreviewed card is due now.
        let now = Timestamp::now();
        let due = due_cards(&config, "alice", now, 10)?;
        let ids: Vec<CardId> = due.into_iter().map(|s| s.card_id).collect();
        assert_eq!(ids, vec![CardId::new("c2")]);

        // Both are due in two days.
        let later = now.plus_days(2)?;
        assert_eq!(due_cards(&config, "alice", later, 10)?.len(), 2);
        assert_eq!(due_cards(&config, "alice", later, 1)?.len(), 1);
        Ok(())
    }
}
