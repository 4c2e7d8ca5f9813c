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

pub mod add;
pub mod due;
pub mod history;
pub mod review;
pub mod stats;

use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::service::ReviewService;

/// Opens the configured database behind a service using the configured
/// algorithm.
pub fn open_service(config: &Config) -> Fallible<ReviewService<Database>> {
    let db = Database::new(&config.database)?;
    let algorithm = config.algorithm.build(config);
    log::debug!(
        "Using {} with database {}",
        algorithm.kind(),
        config.database.display()
    );
    Ok(ReviewService::new(db, algorithm))
}
