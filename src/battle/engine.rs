//! The turn state machine: player actions, the computer's reply, fainting and surrender.

use crate::battle::calculators::{
    ability_damage, basic_attack_damage, combat_power, round_to_hundredths,
};
use crate::battle::state::{BattleEvent, BattleRng, BattleSession, BattleStatus, Side};
use crate::config::CombatConfig;
use crate::errors::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ability name used when a creature lists none.
const FALLBACK_ABILITY: &str = "Struggle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Attack,
    Ability,
}

impl FromStr for PlayerAction {
    type Err = ArenaError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "attack" => Ok(PlayerAction::Attack),
            "ability" => Ok(PlayerAction::Ability),
            other => Err(ArenaError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Attack => f.write_str("attack"),
            PlayerAction::Ability => f.write_str("ability"),
        }
    }
}

/// What a resolved turn means for the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    PlayerVictory,
    PlayerDefeat,
}

impl TurnOutcome {
    pub fn is_terminal(self) -> bool {
        self != TurnOutcome::Continue
    }
}

/// Checks that `action` may be applied right now. Never mutates.
pub fn validate_action(session: &BattleSession, action: PlayerAction) -> ArenaResult<()> {
    match session.status {
        BattleStatus::Finished => Err(ArenaError::BattleAlreadyFinished),
        BattleStatus::ComputerTurn => Err(ArenaError::NotPlayerTurn(session.status)),
        BattleStatus::PlayerTurn => {
            if action == PlayerAction::Ability && !session.player.ability_available {
                return Err(ArenaError::AbilityUnavailable);
            }
            Ok(())
        }
    }
}

/// Applies a player action and, unless it ended the battle, the computer's
/// reply. On success the session is either finished or back in `PlayerTurn`.
pub fn apply_action(
    session: &mut BattleSession,
    action: PlayerAction,
    rng: &mut BattleRng,
    config: &CombatConfig,
) -> ArenaResult<TurnOutcome> {
    validate_action(session, action)?;

    let outcome = match action {
        PlayerAction::Attack => resolve_attack(session, Side::Player, rng, config),
        PlayerAction::Ability => resolve_ability(session, rng, config),
    };
    if outcome.is_terminal() {
        return Ok(outcome);
    }

    Ok(run_computer_turn(session, rng, config))
}

/// Runs the computer's basic attack if, and only if, it is the computer's turn.
/// Safe to call on a session in any state.
pub fn run_computer_turn(
    session: &mut BattleSession,
    rng: &mut BattleRng,
    config: &CombatConfig,
) -> TurnOutcome {
    if session.status != BattleStatus::ComputerTurn {
        return TurnOutcome::Continue;
    }

    let pokemon = session.computer.name().to_string();
    session.record(BattleEvent::ComputerMoving { pokemon });

    let outcome = resolve_attack(session, Side::Computer, rng, config);
    if !outcome.is_terminal() {
        session.record(BattleEvent::PlayerTurnBegins);
    }
    outcome
}

/// Ends the battle without rewards. Returns false if it was already over.
pub fn surrender(session: &mut BattleSession) -> bool {
    if session.is_finished() {
        return false;
    }
    session.record(BattleEvent::Surrendered);
    session.status = BattleStatus::Finished;
    true
}

fn resolve_attack(
    session: &mut BattleSession,
    side: Side,
    rng: &mut BattleRng,
    config: &CombatConfig,
) -> TurnOutcome {
    let attacker = session.combatant(side);
    let defender = session.combatant(side.opponent());

    let level = attacker.level.max(1);
    let attacker_power = combat_power(&attacker.creature.base_stats, config.default_power);
    let defender_power = combat_power(&defender.creature.base_stats, config.default_power);
    let attacker_name = attacker.name().to_string();
    let defender_name = defender.name().to_string();

    let random_factor = round_to_hundredths(rng.next_unit("attack random factor"));
    let event = if random_factor == 0.0 {
        BattleEvent::AttackMissed {
            attacker: attacker_name,
        }
    } else {
        let damage = basic_attack_damage(level, attacker_power, defender_power, random_factor);
        session.combatant_mut(side.opponent()).take_damage(damage);
        BattleEvent::AttackHit {
            attacker: attacker_name,
            level,
            power: attacker_power,
            damage,
            defender: defender_name,
            random_factor,
        }
    };
    session.record(event);

    finish_or_pass_turn(session, side)
}

fn resolve_ability(
    session: &mut BattleSession,
    rng: &mut BattleRng,
    config: &CombatConfig,
) -> TurnOutcome {
    let attacker = &session.player;
    let defender = &session.computer;
    let attacker_name = attacker.name().to_string();

    // The miss check uses the raw draw; basic attacks round first.
    let random_factor = rng.next_unit("ability random factor");
    let event = if random_factor == 0.0 {
        BattleEvent::AbilityMissed {
            attacker: attacker_name,
        }
    } else {
        let fallback = config.ability_stat_fallback;
        let sp_attack = attacker
            .creature
            .base_stats
            .sp_attack
            .filter(|stat| *stat > 0)
            .unwrap_or(fallback);
        let sp_defense = defender
            .creature
            .base_stats
            .sp_defense
            .filter(|stat| *stat > 0)
            .unwrap_or(fallback);
        let damage = ability_damage(
            attacker.level.max(1),
            config.ability_power,
            sp_attack,
            sp_defense,
            random_factor,
        );
        let ability = attacker
            .creature
            .signature_ability()
            .unwrap_or(FALLBACK_ABILITY)
            .to_string();
        let defender_name = defender.name().to_string();

        session.computer.take_damage(damage);
        BattleEvent::AbilityHit {
            attacker: attacker_name,
            ability,
            damage,
            defender: defender_name,
        }
    };
    session.record(event);
    session.player.ability_available = false;

    finish_or_pass_turn(session, Side::Player)
}

/// Faint check after `acting` dealt damage.
fn finish_or_pass_turn(session: &mut BattleSession, acting: Side) -> TurnOutcome {
    let defender = session.combatant(acting.opponent());
    if !defender.is_fainted() {
        session.status = acting.opponent().turn_status();
        return TurnOutcome::Continue;
    }

    let pokemon = defender.name().to_string();
    session.status = BattleStatus::Finished;
    session.record(BattleEvent::PokemonFainted {
        pokemon: pokemon.clone(),
    });

    match acting {
        Side::Player => TurnOutcome::PlayerVictory,
        Side::Computer => {
            session.record(BattleEvent::PlayerDefeated { pokemon });
            TurnOutcome::PlayerDefeat
        }
    }
}
