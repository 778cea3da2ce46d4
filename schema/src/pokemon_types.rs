use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// The types this attacking type deals super-effective damage to.
    pub fn strong_against(self) -> &'static [PokemonType] {
        use PokemonType::*;

        match self {
            Normal => &[],
            Fire => &[Grass, Ice, Bug, Steel],
            Water => &[Fire, Ground, Rock],
            Electric => &[Water, Flying],
            Grass => &[Water, Ground, Rock],
            Ice => &[Grass, Ground, Flying, Dragon],
            Fighting => &[Normal, Ice, Rock, Dark, Steel],
            Poison => &[Grass, Fairy],
            Ground => &[Fire, Electric, Poison, Rock, Steel],
            Flying => &[Grass, Fighting, Bug],
            Psychic => &[Fighting, Poison],
            Bug => &[Grass, Psychic, Dark],
            Rock => &[Fire, Ice, Flying, Bug],
            Ghost => &[Psychic, Ghost],
            Dragon => &[Dragon],
            Dark => &[Psychic, Ghost],
            Steel => &[Ice, Rock, Fairy],
            Fairy => &[Fighting, Dragon, Dark],
        }
    }

    pub fn is_strong_against(self, defending: PokemonType) -> bool {
        self.strong_against().contains(&defending)
    }

    /// Every type that is super-effective against at least one of `defending`,
    /// in table order.
    pub fn counters_of(defending: &[PokemonType]) -> Vec<PokemonType> {
        PokemonType::iter()
            .filter(|attacking| defending.iter().any(|d| attacking.is_strong_against(*d)))
            .collect()
    }

    /// Every type, in effectiveness-table order.
    pub fn all() -> impl Iterator<Item = PokemonType> {
        PokemonType::iter()
    }

    /// 1-based position of the type in the effectiveness table.
    pub fn ordinal_id(self) -> u16 {
        PokemonType::iter()
            .position(|t| t == self)
            .map(|index| index as u16 + 1)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_strong_against_is_inclusion_based() {
        assert!(PokemonType::Fire.is_strong_against(PokemonType::Grass));
        assert!(!PokemonType::Grass.is_strong_against(PokemonType::Fire));
        assert!(PokemonType::Normal.strong_against().is_empty());
    }

    #[test]
    fn test_counters_of_dual_type() {
        let counters = PokemonType::counters_of(&[PokemonType::Grass, PokemonType::Poison]);
        assert_eq!(
            counters,
            vec![
                PokemonType::Fire,
                PokemonType::Ice,
                PokemonType::Poison,
                PokemonType::Ground,
                PokemonType::Flying,
                PokemonType::Psychic,
                PokemonType::Bug,
            ]
        );
    }

    #[test]
    fn test_only_fighting_counters_normal() {
        assert_eq!(
            PokemonType::counters_of(&[PokemonType::Normal]),
            vec![PokemonType::Fighting]
        );
        assert!(PokemonType::counters_of(&[]).is_empty());
    }

    #[test]
    fn test_ordinal_ids_follow_table_order() {
        assert_eq!(PokemonType::Normal.ordinal_id(), 1);
        assert_eq!(PokemonType::Fighting.ordinal_id(), 7);
        assert_eq!(PokemonType::Fairy.ordinal_id(), 18);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(PokemonType::from_str("psychic").unwrap(), PokemonType::Psychic);
        assert_eq!(PokemonType::Dragon.to_string(), "Dragon");
        assert!(PokemonType::from_str("Shadow").is_err());
    }
}
