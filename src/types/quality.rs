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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ReviewError;

/// A recall quality grade on the SM-2 scale:
///
/// - 0: complete blackout
/// - 1: incorrect, but the answer was recognised
/// - 2: incorrect, but the answer seemed easy to recall
/// - 3: correct with serious difficulty
/// - 4: correct after hesitation
/// - 5: perfect recall
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const BLACKOUT: Quality = Quality(0);
    pub const PASSING: Quality = Quality(3);
    pub const PERFECT: Quality = Quality(5);

    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ReviewError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ReviewError::validation(format!(
                "quality grade must be between 0 and {}, got {value}",
                Self::MAX
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Grades of 3 and above count as a successful recall.
    pub fn is_passing(self) -> bool {
        self >= Self::PASSING
    }

    /// Every grade, lowest first.
    pub fn all() -> impl Iterator<Item = Quality> {
        (0..=Self::MAX).map(Quality)
    }
}

impl TryFrom<i64> for Quality {
    type Error = ReviewError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Quality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Quality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let n: i64 = FromSql::column_result(value)?;
        Quality::new(n).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
