pub mod evolution;
pub mod rewards;

pub use evolution::EvolutionFamily;
pub use rewards::{LevelUp, RewardFailure, RewardPropagator, RewardReport};

use crate::player::AccountId;
use schema::RecordId;
use serde::{Deserialize, Serialize};

/// An account's standing with one catalog creature. Level mirrors wins,
/// except that a record with no wins yet is level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub account_id: AccountId,
    pub species: RecordId,
    pub wins: u32,
    pub level: u32,
}

impl ProgressRecord {
    pub fn new(account_id: AccountId, species: RecordId) -> Self {
        Self {
            account_id,
            species,
            wins: 0,
            level: 1,
        }
    }

    pub fn record_win(&mut self) {
        self.wins += 1;
        self.level = self.wins;
    }
}
