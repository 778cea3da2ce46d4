//! Creature Arena Battle Engine
//!
//! Turn-based battles between an account's creature and a computer-picked,
//! type-advantaged opponent, with victories propagated through the winner's
//! whole evolution family.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod player;
pub mod progression;
pub mod stores;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    Ability, BaseStats, Creature, Evolution, EvolutionLink, LocalizedName, PokemonType, RecordId,
    SpeciesId,
};

// --- From this crate's modules (`src/`) ---

// Turn engine and session model.
pub use battle::ai::OpponentSelector;
pub use battle::engine::{PlayerAction, TurnOutcome};
pub use battle::runner::BattleRunner;
pub use battle::state::{BattleEvent, BattleId, BattleRng, BattleSession, BattleStatus, BattleView};

// Accounts, progress and storage.
pub use player::{Account, AccountId, NewAccount};
pub use progression::{EvolutionFamily, ProgressRecord, RewardPropagator, RewardReport};
pub use stores::{
    AccountStore, BattleStore, CreatureCatalog, MemoryAccountStore, MemoryBattleStore,
    MemoryCatalog, MemoryProgressStore, ProgressStore,
};

// Configuration, errors and result types.
pub use config::ArenaConfig;
pub use errors::{ArenaError, ArenaResult, ErrorKind};
