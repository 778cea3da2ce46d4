use crate::player::AccountId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::Creature;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(pub Uuid);

impl BattleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BattleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(BattleId)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    PlayerTurn,
    ComputerTurn,
    Finished,
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattleStatus::PlayerTurn => "player_turn",
            BattleStatus::ComputerTurn => "computer_turn",
            BattleStatus::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Computer,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Computer,
            Side::Computer => Side::Player,
        }
    }

    /// The status in which this side is the one to act.
    pub fn turn_status(self) -> BattleStatus {
        match self {
            Side::Player => BattleStatus::PlayerTurn,
            Side::Computer => BattleStatus::ComputerTurn,
        }
    }
}

/// One side of a battle: an owned snapshot of the catalog creature plus the
/// mutable battle numbers. Catalog edits after creation never reach it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Combatant {
    pub creature: Creature,
    pub level: u32,
    current_hp: u16,
    max_hp: u16,
    pub ability_available: bool,
}

impl Combatant {
    pub fn new(creature: Creature, level: u32, default_hp: u16) -> Self {
        let max_hp = creature
            .base_stats
            .hp
            .filter(|hp| *hp > 0)
            .unwrap_or(default_hp);
        Self {
            creature,
            level,
            current_hp: max_hp,
            max_hp,
            ability_available: true,
        }
    }

    pub fn name(&self) -> &str {
        self.creature.display_name()
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u16 {
        self.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Sets HP, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Applies damage, clamping at zero. Returns true if this damage caused fainting.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_fainted = self.is_fainted();
        let remaining = u32::from(self.current_hp).saturating_sub(damage);
        self.current_hp = remaining as u16;
        !was_fainted && self.is_fainted()
    }
}

/// Everything worth narrating in a battle. Rendered into the session log.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted {
        player: String,
        player_level: u32,
        computer: String,
        computer_level: u32,
    },
    Initiative {
        side: Side,
        pokemon: String,
    },
    ComputerMoving {
        pokemon: String,
    },
    AttackMissed {
        attacker: String,
    },
    AttackHit {
        attacker: String,
        level: u32,
        power: u32,
        damage: u32,
        defender: String,
        random_factor: f64,
    },
    AbilityMissed {
        attacker: String,
    },
    AbilityHit {
        attacker: String,
        ability: String,
        damage: u32,
        defender: String,
    },
    PokemonFainted {
        pokemon: String,
    },
    PlayerDefeated {
        pokemon: String,
    },
    PlayerTurnBegins,
    Surrendered,
    LevelUp {
        pokemon: String,
        level: u32,
        wins: u32,
    },
    /// A family member's win could not be saved.
    RewardNotSaved {
        pokemon: String,
    },
    /// The family could not be resolved, so nobody was rewarded.
    RewardsNotGranted,
    RecordNotUpdated,
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::BattleStarted {
                player,
                player_level,
                computer,
                computer_level,
            } => write!(
                f,
                "Battle started between {} (lvl={}) and {} (lvl={}).",
                player, player_level, computer, computer_level
            ),
            BattleEvent::Initiative { side, pokemon } => match side {
                Side::Player => write!(f, "Player's {} moves first!", pokemon),
                Side::Computer => write!(f, "Computer's {} moves first!", pokemon),
            },
            BattleEvent::ComputerMoving { pokemon } => {
                write!(f, "Computer's {} is making a move!", pokemon)
            }
            BattleEvent::AttackMissed { attacker } => write!(f, "{} missed!", attacker),
            BattleEvent::AttackHit {
                attacker,
                level,
                power,
                damage,
                defender,
                random_factor,
            } => write!(
                f,
                "{} (lvl={}, pwr={}) deals {} dmg to {} (rf={:.2})",
                attacker, level, power, damage, defender, random_factor
            ),
            BattleEvent::AbilityMissed { attacker } => {
                write!(f, "{} tried special ability but missed!", attacker)
            }
            BattleEvent::AbilityHit {
                attacker,
                ability,
                damage,
                defender,
            } => write!(
                f,
                "{} uses SPECIAL ABILITY ({})! Deals {} dmg to {}",
                attacker, ability, damage, defender
            ),
            BattleEvent::PokemonFainted { pokemon } => write!(f, "{} fainted!", pokemon),
            BattleEvent::PlayerDefeated { pokemon } => {
                write!(f, "Your {} has fainted! You lost the battle.", pokemon)
            }
            BattleEvent::PlayerTurnBegins => f.write_str("It's now the player's turn."),
            BattleEvent::Surrendered => f.write_str("Player surrendered!"),
            BattleEvent::LevelUp {
                pokemon,
                level,
                wins,
            } => write!(
                f,
                "Your Pokémon {} is now level {} (wins={})",
                pokemon, level, wins
            ),
            BattleEvent::RewardNotSaved { pokemon } => {
                write!(f, "Progress for {} could not be saved.", pokemon)
            }
            BattleEvent::RewardsNotGranted => f.write_str("Victory rewards could not be granted."),
            BattleEvent::RecordNotUpdated => {
                f.write_str("Your win/loss record could not be updated.")
            }
        }
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Random(StdRng),
    /// Scripted unit-interval values, shared between forks so a test script
    /// is consumed in order across operations.
    Scripted(Arc<Mutex<VecDeque<f64>>>),
}

/// Source of every random decision in a battle.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
}

impl BattleRng {
    pub fn new_random() -> Self {
        Self {
            source: RngSource::Random(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Random(StdRng::seed_from_u64(seed)),
        }
    }

    /// Replays `outcomes` in order. Values should lie in `[0, 1)`.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted(Arc::new(Mutex::new(outcomes.into()))),
        }
    }

    /// An independent generator for one unit of work. Scripted generators
    /// keep sharing the same script.
    pub fn fork(&mut self) -> BattleRng {
        let source = match &mut self.source {
            RngSource::Random(rng) => RngSource::Random(StdRng::from_rng(rng)),
            RngSource::Scripted(outcomes) => RngSource::Scripted(Arc::clone(outcomes)),
        };
        BattleRng { source }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_unit(&mut self, reason: &str) -> f64 {
        match &mut self.source {
            RngSource::Random(rng) => rng.random::<f64>(),
            RngSource::Scripted(outcomes) => {
                let mut outcomes = outcomes.lock().unwrap_or_else(PoisonError::into_inner);
                match outcomes.pop_front() {
                    Some(outcome) => {
                        #[cfg(test)]
                        println!("[RNG] Consumed {} for: {}", outcome, reason);
                        outcome
                    }
                    None => panic!(
                        "BattleRng exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                        reason
                    ),
                }
            }
        }
    }

    /// Uniform index into a collection of `len` items. Collections of zero or
    /// one item do not consume a draw.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        if len <= 1 {
            return 0;
        }
        let unit = self.next_unit(reason);
        ((unit * len as f64) as usize).min(len - 1)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSession {
    pub id: BattleId,
    pub account_id: AccountId,
    pub player: Combatant,
    pub computer: Combatant,
    pub status: BattleStatus,
    pub log: Vec<String>,
}

impl BattleSession {
    pub fn new(
        id: BattleId,
        account_id: AccountId,
        player: Combatant,
        computer: Combatant,
        status: BattleStatus,
    ) -> Self {
        Self {
            id,
            account_id,
            player,
            computer,
            status,
            log: Vec::new(),
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Computer => &self.computer,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Computer => &mut self.computer,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished
    }

    /// Appends the event's narration to the log.
    pub fn record(&mut self, event: BattleEvent) {
        tracing::debug!(battle = %self.id, "{}", event);
        self.log.push(event.to_string());
    }

    pub fn view(&self) -> BattleView {
        BattleView {
            id: self.id,
            status: self.status,
            player: CombatantView::from(&self.player),
            computer: CombatantView::from(&self.computer),
            log: self.log.clone(),
        }
    }
}

/// Compact, serializable summary of a session for callers.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BattleView {
    pub id: BattleId,
    pub status: BattleStatus,
    pub player: CombatantView,
    pub computer: CombatantView,
    pub log: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CombatantView {
    pub name: String,
    pub species: schema::SpeciesId,
    pub level: u32,
    pub current_hp: u16,
    pub max_hp: u16,
    pub ability_available: bool,
}

impl From<&Combatant> for CombatantView {
    fn from(combatant: &Combatant) -> Self {
        Self {
            name: combatant.name().to_string(),
            species: combatant.creature.species_id,
            level: combatant.level,
            current_hp: combatant.current_hp(),
            max_hp: combatant.max_hp(),
            ability_available: combatant.ability_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCreatureBuilder;
    use pretty_assertions::assert_eq;
    use schema::PokemonType;

    #[test]
    fn test_damage_clamps_at_zero_and_reports_faint_once() {
        let creature = TestCreatureBuilder::new(1, "Bulbasaur", &[PokemonType::Grass])
            .with_stats(20, 49, 49, 65, 65, 45)
            .build();
        let mut combatant = Combatant::new(creature, 5, 50);

        assert!(!combatant.take_damage(15));
        assert_eq!(combatant.current_hp(), 5);
        assert!(combatant.take_damage(40));
        assert_eq!(combatant.current_hp(), 0);
        assert!(!combatant.take_damage(1));
    }

    #[test]
    fn test_missing_or_zero_hp_uses_default() {
        let creature = TestCreatureBuilder::new(1, "Missingno", &[PokemonType::Normal])
            .with_stats(0, 10, 10, 10, 10, 10)
            .build();
        let combatant = Combatant::new(creature, 1, 50);
        assert_eq!(combatant.max_hp(), 50);
        assert_eq!(combatant.current_hp(), 50);
    }

    #[test]
    fn test_set_hp_is_clamped_to_max() {
        let creature = TestCreatureBuilder::new(4, "Charmander", &[PokemonType::Fire])
            .with_stats(39, 52, 43, 60, 50, 65)
            .build();
        let mut combatant = Combatant::new(creature, 1, 50);
        combatant.set_hp(500);
        assert_eq!(combatant.current_hp(), 39);
    }

    #[test]
    fn test_event_text_samples() {
        let hit = BattleEvent::AttackHit {
            attacker: "Pikachu".to_string(),
            level: 3,
            power: 53,
            damage: 4,
            defender: "Geodude".to_string(),
            random_factor: 0.5,
        };
        assert_eq!(
            hit.to_string(),
            "Pikachu (lvl=3, pwr=53) deals 4 dmg to Geodude (rf=0.50)"
        );
        assert_eq!(
            BattleEvent::Initiative {
                side: Side::Computer,
                pokemon: "Jolteon".to_string()
            }
            .to_string(),
            "Computer's Jolteon moves first!"
        );
        assert_eq!(BattleEvent::Surrendered.to_string(), "Player surrendered!");
    }

    #[test]
    fn test_scripted_rng_is_shared_between_forks() {
        let mut rng = BattleRng::new_for_test(vec![0.1, 0.2, 0.9]);
        let mut fork = rng.fork();
        assert_eq!(fork.next_unit("first"), 0.1);
        assert_eq!(rng.next_unit("second"), 0.2);
        assert_eq!(rng.pick_index(3, "third"), 2);
        assert_eq!(rng.pick_index(1, "no draw"), 0);
    }

    #[test]
    fn test_seeded_rng_stays_in_unit_interval() {
        let mut rng = BattleRng::seeded(7);
        for _ in 0..1000 {
            let value = rng.next_unit("range check");
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    #[should_panic(expected = "BattleRng exhausted")]
    fn test_exhausted_script_panics() {
        let mut rng = BattleRng::new_for_test(vec![]);
        rng.next_unit("nothing left");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BattleStatus::ComputerTurn).unwrap();
        assert_eq!(json, "\"computer_turn\"");
    }
}
