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

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::algorithm::AlgorithmKind;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::DEFAULT_DESIRED_RETENTION;

/// The configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cardsched.toml";

/// The longest interval a deployment may configure. A thousand years from
/// now stays well inside the dates the stores can represent.
pub const MAX_INTERVAL_DAYS: u32 = 365_000;

/// Deployment configuration, read once at startup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The scheduling algorithm. Switching it on an existing database is
    /// allowed but the other algorithm's fields will be cold.
    pub algorithm: AlgorithmKind,
    /// Path to the SQLite database.
    pub database: PathBuf,
    pub max_interval_days: u32,
    /// How many times a review is retried after losing a race.
    pub max_conflict_retries: u32,
    pub fsrs: FsrsConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsrsConfig {
    pub desired_retention: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::default(),
            database: PathBuf::from("cardsched.db"),
            max_interval_days: 36500,
            max_conflict_retries: 3,
            fsrs: FsrsConfig::default(),
        }
    }
}

impl Default for FsrsConfig {
    fn default() -> Self {
        Self {
            desired_retention: DEFAULT_DESIRED_RETENTION,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration at `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn validate(&self) -> Fallible<()> {
        let r = self.fsrs.desired_retention;
        if !(r > 0.0 && r < 1.0) {
            return fail(format!(
                "fsrs.desired_retention must be between 0 and 1, got {r}."
            ));
        }
        if self.max_interval_days == 0 || self.max_interval_days > MAX_INTERVAL_DAYS {
            return fail(format!(
                "max_interval_days must be between 1 and {MAX_INTERVAL_DAYS}, got {}.",
                self.max_interval_days
            ));
        }
        Ok(())
    }
}
