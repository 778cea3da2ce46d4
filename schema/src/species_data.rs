use crate::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// National dex number. Shared by every catalog record of the same species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

/// Storage identifier of one catalog record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub english: String,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub chinese: Option<String>,
    #[serde(default)]
    pub french: Option<String>,
}

impl LocalizedName {
    pub fn english(name: impl Into<String>) -> Self {
        Self {
            english: name.into(),
            ..Self::default()
        }
    }
}

/// Base stats as they appear in catalog data. Any stat may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default)]
    pub attack: Option<u16>,
    #[serde(default)]
    pub defense: Option<u16>,
    #[serde(default)]
    pub sp_attack: Option<u16>,
    #[serde(default)]
    pub sp_defense: Option<u16>,
    #[serde(default)]
    pub speed: Option<u16>,
}

impl BaseStats {
    pub fn new(hp: u16, attack: u16, defense: u16, sp_attack: u16, sp_defense: u16, speed: u16) -> Self {
        Self {
            hp: Some(hp),
            attack: Some(attack),
            defense: Some(defense),
            sp_attack: Some(sp_attack),
            sp_defense: Some(sp_defense),
            speed: Some(speed),
        }
    }

    /// The stats that are present, in HP, ATK, DEF, SP.ATK, SP.DEF, SPD order.
    pub fn present(&self) -> impl Iterator<Item = u16> {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
        .into_iter()
        .flatten()
    }

    /// Sum of all six stats, absent stats counting as zero.
    pub fn total(&self) -> u32 {
        self.present().map(u32::from).sum()
    }

    /// True when any present stat is zero. Absent stats are not checked.
    pub fn has_zero_stat(&self) -> bool {
        self.present().any(|stat| stat == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionLink {
    pub species: SpeciesId,
    #[serde(default)]
    pub condition: String,
}

impl EvolutionLink {
    pub fn new(species: SpeciesId, condition: impl Into<String>) -> Self {
        Self {
            species,
            condition: condition.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    #[serde(default)]
    pub prev: Vec<EvolutionLink>,
    #[serde(default)]
    pub next: Vec<EvolutionLink>,
}

impl Evolution {
    /// The direct pre-evolution, if any. Only the first `prev` entry counts.
    pub fn predecessor(&self) -> Option<SpeciesId> {
        self.prev.first().map(|link| link.species)
    }

    /// Root-stage (stage 1) creatures have no pre-evolution.
    pub fn is_root(&self) -> bool {
        self.prev.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    #[serde(default)]
    pub record_id: RecordId,
    pub species_id: SpeciesId,
    pub name: LocalizedName,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub evolution: Evolution,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub description: String,
}

impl Creature {
    pub fn display_name(&self) -> &str {
        &self.name.english
    }

    /// The ability shown when the creature uses its special move: the first
    /// hidden ability, falling back to the first listed one.
    pub fn signature_ability(&self) -> Option<&str> {
        self.abilities
            .iter()
            .find(|ability| ability.hidden)
            .or_else(|| self.abilities.first())
            .map(|ability| ability.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_stats_count_as_zero_in_total() {
        let stats = BaseStats {
            hp: Some(45),
            attack: Some(49),
            defense: Some(49),
            sp_attack: None,
            sp_defense: None,
            speed: Some(45),
        };
        assert_eq!(stats.total(), 188);
        assert_eq!(stats.present().count(), 4);
        assert!(!stats.has_zero_stat());
    }

    #[test]
    fn test_zero_stat_detection() {
        let stats = BaseStats::new(1, 0, 5, 5, 5, 5);
        assert!(stats.has_zero_stat());
    }

    #[test]
    fn test_signature_ability_prefers_hidden() {
        let mut creature: Creature = ron::from_str(
            r#"(
                species_id: 1,
                name: (english: "Bulbasaur"),
                types: [Grass, Poison],
                base_stats: (hp: Some(45), attack: Some(49), defense: Some(49), sp_attack: Some(65), sp_defense: Some(65), speed: Some(45)),
                evolution: (next: [(species: 2, condition: "Level 16")]),
                abilities: [(name: "Overgrow"), (name: "Chlorophyll", hidden: true)],
            )"#,
        )
        .expect("creature should parse");

        assert!(creature.record_id.is_empty());
        assert!(creature.evolution.is_root());
        assert_eq!(creature.signature_ability(), Some("Chlorophyll"));

        creature.abilities.retain(|ability| !ability.hidden);
        assert_eq!(creature.signature_ability(), Some("Overgrow"));

        creature.abilities.clear();
        assert_eq!(creature.signature_ability(), None);
    }
}
