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

use chrono::DateTime;
use chrono::Datelike;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::SecondsFormat;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ReviewError;

/// The last year RFC 3339 can write with four digits.
const MAX_YEAR: i32 = 9999;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A UTC instant. Stored and serialized as RFC 3339.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Fails rather than leave the four-digit years the stored text form
    /// relies on.
    pub fn plus_days(self, days: u32) -> Result<Self, ReviewError> {
        self.0
            .checked_add_signed(Duration::days(i64::from(days)))
            .filter(|ts| ts.year() <= MAX_YEAR)
            .map(Self)
            .ok_or_else(|| {
                ReviewError::validation(format!("{self} plus {days} days is out of range"))
            })
    }

    /// Fractional days elapsed from `earlier` to `self`. Negative if
    /// `earlier` is in the future.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        let elapsed = self.0 - earlier.0;
        elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    /// The UTC calendar day this instant falls on.
    pub fn date(self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339()
    }

    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc)))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        // Fixed width, so SQLite can order timestamps as text.
        let str = self.0.to_rfc3339_opts(SecondsFormat::Nanos, true);
        Ok(ToSqlOutput::from(str))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Timestamp::parse(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
