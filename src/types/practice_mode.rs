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
use std::str::FromStr;

use clap::ValueEnum;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ReviewError;

/// How the learner was practising when they answered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// A scheduled review of a card that is due.
    #[default]
    Review,
    /// Studying a card outside its schedule.
    Learn,
    /// The first time a card is seen.
    New,
    /// Cramming before a deadline.
    Cram,
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Review => "review",
            PracticeMode::Learn => "learn",
            PracticeMode::New => "new",
            PracticeMode::Cram => "cram",
        }
    }
}

impl Display for PracticeMode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PracticeMode {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(PracticeMode::Review),
            "learn" => Ok(PracticeMode::Learn),
            "new" => Ok(PracticeMode::New),
            "cram" => Ok(PracticeMode::Cram),
            _ => Err(ReviewError::validation(format!(
                "invalid practice mode: {s}"
            ))),
        }
    }
}

impl ToSql for PracticeMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PracticeMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        string
            .parse()
            .map_err(|e: ReviewError| FromSqlError::Other(Box::new(e)))
    }
}
