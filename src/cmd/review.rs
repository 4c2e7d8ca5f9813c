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
use crate::service::ReviewOutcome;
use crate::service::ReviewRequest;
use crate::types::card_id::CardId;
use crate::types::card_id::UserId;
use crate::types::practice_mode::PracticeMode;
use crate::types::quality::Quality;

pub struct ReviewArgs {
    pub card_id: String,
    pub user_id: String,
    pub quality: i64,
    pub mode: PracticeMode,
    pub effort_seconds: u32,
    pub answer: Option<String>,
}

/// Submits one review, retrying on conflicts as configured.
pub fn review_card(config: &Config, args: ReviewArgs) -> Fallible<ReviewOutcome> {
    // Validate before touching the database.
    let quality = Quality::new(args.quality)?;
    let service = open_service(config)?;
    let request = ReviewRequest {
        user_id: UserId::new(args.user_id),
        card_id: CardId::new(args.card_id),
        quality,
        practice_mode: args.mode,
        effort_seconds: args.effort_seconds,
        user_answer: args.answer,
    };
    let outcome = service.submit_review_with_retry(request, config.max_conflict_retries)?;
    Ok(outcome)
}

pub fn print_review(config: &Config, args: ReviewArgs) -> Fallible<()> {
    let outcome = review_card(config, args)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmKind;
    use crate::cmd::add::add_card;
    use crate::cmd::tests::temp_config;
    use crate::store::ReviewLog;

    fn args(quality: i64) -> ReviewArgs {
        ReviewArgs {
            card_id: "c1".to_string(),
            user_id: "alice".to_string(),
            quality,
            mode: PracticeMode::Review,
            effort_seconds: 5,
            answer: None,
        }
    }

    #[test]
    fn test_review_sm2() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        assert_eq!(review_card(&config, args(5))?.interval_days, 1);
        assert_eq!(review_card(&config, args(5))?.interval_days, 6);
        let history = open_service(&config)?.history(&CardId::new("c1"))?;
        assert_eq!(history.len(), 2);
        Ok(())
    }

    #[test]
    fn test_review_fsrs() -> Fallible<()> {
        let (_dir, mut config) = temp_config()?;
        config.algorithm = AlgorithmKind::Fsrs;
        add_card(&config, "c1", "alice")?;
        let outcome = review_card(&config, args(4))?;
        assert_eq!(outcome.interval_days, 3);
        Ok(())
    }

    #[test]
    fn test_invalid_quality_writes_nothing() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        assert!(review_card(&config, args(6)).is_err());
        assert!(review_card(&config, args(-1)).is_err());
        let service = open_service(&config)?;
        assert!(service.store().entries_for_user(&UserId::new("alice"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_card() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        let err = review_card(&config, args(4)).unwrap_err();
        assert_eq!(err.to_string(), "error: card not found: c1");
        Ok(())
    }

    #[test]
    fn test_outcome_json() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        let outcome = review_card(&config, args(4))?;
        let json: serde_json::Value = serde_json::to_value(&outcome)?;
        assert_eq!(json["intervalDays"], 1);
        assert_eq!(json["logEntryId"], outcome.log_entry_id.as_str());
        assert!(json["nextReviewAt"].is_string());
        assert_eq!(json["logEntry"]["practiceMode"], "review");
        assert_eq!(json["logEntry"]["isCorrect"], true);
        Ok(())
    }
}
