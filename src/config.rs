//! Tunables for opponent selection and combat, loaded from RON.

use crate::errors::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub opponent: OpponentConfig,
    pub combat: CombatConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// How many catalog entries the random fallback samples from.
    pub random_sample_size: usize,
    /// Page size of the typed candidate query.
    pub candidate_page_size: usize,
    /// Aggregate-stat handicap applied to the computer's level.
    pub level_ratio: f64,
    /// Challengers at or below this level only meet root-stage opponents.
    pub root_only_max_level: u32,
    /// Challengers at or below this level get the two-tier gate.
    pub two_tier_max_level: u32,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            random_sample_size: 200,
            candidate_page_size: 50,
            level_ratio: 0.9,
            root_only_max_level: 1,
            two_tier_max_level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Power used for a creature with no base stats at all.
    pub default_power: u32,
    /// Fixed power of the special ability.
    pub ability_power: u32,
    /// Sp. Attack / Sp. Defense used when the stat is absent or zero.
    pub ability_stat_fallback: u16,
    /// Max HP used when the base HP is absent or zero.
    pub default_hp: u16,
    /// Speed used for initiative when the base Speed is absent or zero.
    pub default_speed: u16,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            default_power: 50,
            ability_power: 60,
            ability_stat_fallback: 10,
            default_hp: 50,
            default_speed: 1,
        }
    }
}

impl ArenaConfig {
    pub fn from_ron_str(text: &str) -> ArenaResult<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ArenaResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_ron_str(&text)
    }
}
