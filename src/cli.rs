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

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::algorithm::AlgorithmKind;
use crate::cmd::add::add_card;
use crate::cmd::due::print_due_cards;
use crate::cmd::history::print_card_history;
use crate::cmd::review::ReviewArgs;
use crate::cmd::review::print_review;
use crate::cmd::stats::print_user_stats;
use crate::config::Config;
use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::Fallible;
use crate::types::practice_mode::PracticeMode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Override the configured scheduling algorithm.
    #[arg(long, global = true)]
    algorithm: Option<AlgorithmKind>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start scheduling a new card.
    Add {
        /// The card's identifier.
        card_id: String,
        /// The owning user.
        #[arg(long)]
        user: String,
    },
    /// Record an answer to a card.
    Review {
        /// The card's identifier.
        card_id: String,
        /// Recall quality, from 0 (blackout) to 5 (perfect).
        #[arg(allow_hyphen_values = true)]
        quality: i64,
        /// The reviewing user.
        #[arg(long)]
        user: String,
        /// How the card was practiced.
        #[arg(long, value_enum, default_value_t = PracticeMode::Review)]
        mode: PracticeMode,
        /// Seconds spent answering.
        #[arg(long, default_value_t = 0)]
        effort: u32,
        /// What the user answered.
        #[arg(long)]
        answer: Option<String>,
    },
    /// List a user's due cards.
    Due {
        #[arg(long)]
        user: String,
        /// Maximum number of cards to list.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print a card's review log.
    History {
        /// The card's identifier.
        card_id: String,
    },
    /// Print today's statistics for a user.
    Stats {
        #[arg(long)]
        user: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;
    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm;
    }
    match cli.command {
        Command::Add { card_id, user } => add_card(&config, &card_id, &user),
        Command::Review {
            card_id,
            quality,
            user,
            mode,
            effort,
            answer,
        } => print_review(
            &config,
            ReviewArgs {
                card_id,
                user_id: user,
                quality,
                mode,
                effort_seconds: effort,
                answer,
            },
        ),
        Command::Due { user, limit } => print_due_cards(&config, &user, limit),
        Command::History { card_id } => print_card_history(&config, &card_id),
        Command::Stats { user } => print_user_stats(&config, &user),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_review() {
        let cli = Cli::try_parse_from([
            "cardsched", "review", "c1", "4", "--user", "alice", "--mode", "cram", "--effort",
            "12",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        match cli.command {
            Command::Review {
                card_id,
                quality,
                user,
                mode,
                effort,
                answer,
            } => {
                assert_eq!(card_id, "c1");
                assert_eq!(quality, 4);
                assert_eq!(user, "alice");
                assert_eq!(mode, PracticeMode::Cram);
                assert_eq!(effort, 12);
                assert_eq!(answer, None);
            }
            _ => panic!("expected review"),
        }
    }

    #[test]
    fn test_parse_negative_quality() {
        // Rejected by validation, not by the parser.
        let cli = Cli::try_parse_from(["cardsched", "review", "c1", "-1", "--user", "u"]).unwrap();
        match cli.command {
            Command::Review { quality, .. } => assert_eq!(quality, -1),
            _ => panic!("expected review"),
        }
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "cardsched",
            "due",
            "--user",
            "alice",
            "--config",
            "other.toml",
            "--algorithm",
            "fsrs",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(cli.algorithm, Some(AlgorithmKind::Fsrs));
    }

    #[test]
    fn test_missing_user() {
        assert!(Cli::try_parse_from(["cardsched", "stats"]).is_err());
    }
}
