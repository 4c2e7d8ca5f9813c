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

use thiserror::Error;

use crate::types::card_id::CardId;

/// Errors produced while scheduling or recording a review.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    /// Malformed input, such as a quality grade outside `0..=5`. Nothing was
    /// mutated.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The card has no scheduling state, or belongs to another user.
    #[error("card not found: {0}")]
    NotFound(CardId),

    /// Another review of the same card committed first. Retry the whole
    /// review against freshly loaded state.
    #[error("concurrent update to card {0}")]
    Conflict(CardId),

    /// The underlying store failed. Nothing was committed.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl ReviewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ReviewError::Validation(msg.into())
    }

    /// Whether the whole review can safely be submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReviewError::Conflict(_) | ReviewError::Persistence(_))
    }
}

impl From<rusqlite::Error> for ReviewError {
    fn from(value: rusqlite::Error) -> Self {
        ReviewError::Persistence(value.to_string())
    }
}

/// Application-level error, for the binary and configuration layer.
#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl std::error::Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport {
        message: message.into(),
    })
}

impl From<ReviewError> for ErrorReport {
    fn from(value: ReviewError) -> Self {
        ErrorReport::new(&value.to_string())
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(&format!("I/O error: {value}"))
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(value: rusqlite::Error) -> Self {
        ErrorReport::new(&format!("database error: {value}"))
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport::new(&format!("invalid configuration: {value}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::new(&format!("JSON error: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let err: Fallible<()> = fail("directory does not exist.");
        assert_eq!(
            err.unwrap_err().to_string(),
            "error: directory does not exist."
        );
    }

    #[test]
    fn test_retryable() {
        let id = CardId::new("c1");
        assert!(ReviewError::Conflict(id.clone()).is_retryable());
        assert!(ReviewError::Persistence("disk full".into()).is_retryable());
        assert!(!ReviewError::NotFound(id).is_retryable());
        assert!(!ReviewError::validation("quality 9").is_retryable());
    }

    #[test]
    fn test_review_error_into_report() {
        let report: ErrorReport = ReviewError::NotFound(CardId::new("abc")).into();
        assert_eq!(report.to_string(), "error: card not found: abc");
    }
}
