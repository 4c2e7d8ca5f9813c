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
use crate::types::card_id::UserId;

pub fn add_card(config: &Config, card_id: &str, user_id: &str) -> Fallible<()> {
    let service = open_service(config)?;
    service.create_card(CardId::new(card_id), UserId::new(user_id))?;
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::tests::temp_config;
    use crate::store::CardStateStore;

    #[test]
    fn test_add_card() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        let state = open_service(&config)?.store().get(&CardId::new("c1"))?;
        assert_eq!(state.user_id, UserId::new("alice"));
        assert_eq!(state.ease_factor, 2.5);
        Ok(())
    }

    #[test]
    fn test_add_card_twice() -> Fallible<()> {
        let (_dir, config) = temp_config()?;
        add_card(&config, "c1", "alice")?;
        assert!(add_card(&config, "c1", "alice").is_err());
        Ok(())
    }
}
