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

//! Spaced repetition scheduling: SM-2 and FSRS strategies behind a review
//! service that records every answer in an append-only log.

pub mod algorithm;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fsrs;
pub mod service;
pub mod sm2;
pub mod stats;
pub mod store;
pub mod types;
