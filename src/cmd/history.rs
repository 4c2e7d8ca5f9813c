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
use crate::types::card_id::CardId;
use crate::types::log_entry::ReviewLogEntry;

pub fn card_history(config: &Config, card_id: &str) -> Fallible<Vec<ReviewLogEntry>> {
    let service = open_service(config)?;
    let history = service.history(&CardId::new(card_id))?;
    Ok(history)
}

pub fn print_card_history(config: &Config, card_id: &str) -> Fallible<()> {
    let history = card_history(config, card_id)?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::add::add_card;
    use crate::cmd::review::ReviewArgs;
    use crate::cmd::review::review_card;
    use crate::cmd::tests::temp_config;
    use crate::types::practice_mode::PracticeMode;
    use crate::types::quality::Quality;

    #[test]
    fn test_history_in_order() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        for (quality, answer) in [(5, "one"), (2, "two"), (4, "three")] {
            review_card(
                &config,
                ReviewArgs {
                    card_id: "c1".to_string(),
                    user_id: "alice".to_string(),
                    quality,
                    mode: PracticeMode::Learn,
                    effort_seconds: 3,
                    answer: Some(answer.to_string()),
                },
            )?;
        }
        let history = card_history(&config, "c1")?;
        let answers: Vec<Option<&str>> = history.iter().map(|e| e.user_answer.as_deref()).collect();
        assert_eq!(answers, vec![Some("one"), Some("two"), Some("three")]);
        assert_eq!(history[1].quality, Quality::new(2)?);
        assert!(!history[1].is_correct);
        assert_eq!(history[1].interval_days, 1);
        Ok(())
    }

    #[test]
    fn test_history_of_unknown_card_is_empty() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        assert!(card_history(&config, "nope")?.is_empty());
        Ok(())
    }
}
