use crate::battle::state::BattleStatus;
use schema::BaseStats;

/// Floor average of the stats that are present; `default_power` when none are.
pub fn combat_power(stats: &BaseStats, default_power: u32) -> u32 {
    let (sum, count) = stats
        .present()
        .fold((0u32, 0u32), |(sum, count), stat| (sum + u32::from(stat), count + 1));
    if count == 0 {
        default_power
    } else {
        sum / count
    }
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shared level/power curve of both attack kinds.
fn scaled_damage(level: u32, power: f64, stat_ratio: f64, random_factor: f64) -> u32 {
    let level_factor = 2.0 * f64::from(level) / 5.0 + 2.0;
    let base = (level_factor * power * stat_ratio) / 50.0 + 2.0;
    (base * random_factor).floor().max(0.0) as u32
}

/// Basic attack: the attacker's averaged power, scaled by its ratio to the defender's.
pub fn basic_attack_damage(
    level: u32,
    attacker_power: u32,
    defender_power: u32,
    random_factor: f64,
) -> u32 {
    let attacker_power = f64::from(attacker_power);
    let defender_power = f64::from(defender_power.max(1));
    scaled_damage(
        level,
        attacker_power,
        attacker_power / defender_power,
        random_factor,
    )
}

/// Special ability: fixed power, Sp. Attack against Sp. Defense.
pub fn ability_damage(
    level: u32,
    power: u32,
    sp_attack: u16,
    sp_defense: u16,
    random_factor: f64,
) -> u32 {
    let ratio = f64::from(sp_attack) / f64::from(sp_defense.max(1));
    scaled_damage(level, f64::from(power), ratio, random_factor)
}

/// Level for the computer's creature so that its total stats times level sit
/// `ratio` below the challenger's. Never below 1.
pub fn opponent_level(
    challenger_total: u32,
    challenger_level: u32,
    opponent_total: u32,
    ratio: f64,
) -> u32 {
    if opponent_total == 0 {
        return 1;
    }
    let level = (f64::from(challenger_total) * f64::from(challenger_level) * ratio
        / f64::from(opponent_total))
    .floor();
    (level as u32).max(1)
}

/// Strictly faster side moves first; ties go to the challenger.
pub fn initiative(player_speed: u16, computer_speed: u16) -> BattleStatus {
    if computer_speed > player_speed {
        BattleStatus::ComputerTurn
    } else {
        BattleStatus::PlayerTurn
    }
}
