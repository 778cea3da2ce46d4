//! Capability traits for everything the arena reads from or writes to storage.
//!
//! The engine only ever talks to these traits. `memory` holds the in-process
//! implementations used by the binaries and tests.

pub mod memory;

use crate::battle::state::{BattleId, BattleSession};
use crate::errors::ArenaResult;
use crate::player::{Account, AccountId, NewAccount};
use crate::progression::ProgressRecord;
use schema::{Creature, PokemonType, RecordId, SpeciesId};

pub use memory::{MemoryAccountStore, MemoryBattleStore, MemoryCatalog, MemoryProgressStore};

/// Evolutionary-stage restriction applied to catalog queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StageGate {
    #[default]
    Any,
    /// Only creatures with no pre-evolution.
    RootOnly,
    /// Root creatures, or creatures whose direct predecessor is one of these ids.
    RootOrPredecessorIn(Vec<SpeciesId>),
}

impl StageGate {
    pub fn admits(&self, creature: &Creature) -> bool {
        match self {
            StageGate::Any => true,
            StageGate::RootOnly => creature.evolution.is_root(),
            StageGate::RootOrPredecessorIn(ids) => match creature.evolution.predecessor() {
                None => true,
                Some(prev) => ids.contains(&prev),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub creature_type: Option<PokemonType>,
    pub stage: StageGate,
}

impl CatalogFilter {
    pub fn of_type(creature_type: PokemonType, stage: StageGate) -> Self {
        Self {
            creature_type: Some(creature_type),
            stage,
        }
    }

    pub fn matches(&self, creature: &Creature) -> bool {
        let type_ok = self
            .creature_type
            .map_or(true, |wanted| creature.types.contains(&wanted));
        type_ok && self.stage.admits(creature)
    }
}

/// A 1-based page of query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub limit: usize,
}

impl Page {
    pub fn first(limit: usize) -> Self {
        Self { number: 1, limit }
    }

    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1) * self.limit
    }
}

#[allow(async_fn_in_trait)]
pub trait AccountStore {
    async fn get(&self, id: AccountId) -> ArenaResult<Option<Account>>;
    async fn get_by_address(&self, address: &str) -> ArenaResult<Option<Account>>;
    async fn create(&self, fields: NewAccount) -> ArenaResult<Account>;
    async fn update(&self, account: &Account) -> ArenaResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait CreatureCatalog {
    async fn get(&self, id: &RecordId) -> ArenaResult<Option<Creature>>;
    async fn get_by_species_id(&self, species: SpeciesId) -> ArenaResult<Option<Creature>>;
    /// Matching creatures for one page, plus the total number of matches.
    async fn query(&self, filter: &CatalogFilter, page: Page)
        -> ArenaResult<(Vec<Creature>, usize)>;
    async fn create(&self, creature: Creature) -> ArenaResult<Creature>;
    async fn update(&self, creature: &Creature) -> ArenaResult<()>;
}

/// Per-(account, creature record) win tallies.
#[allow(async_fn_in_trait)]
pub trait ProgressStore {
    async fn get(
        &self,
        account: AccountId,
        species: &RecordId,
    ) -> ArenaResult<Option<ProgressRecord>>;
    async fn get_all_for_account(&self, account: AccountId) -> ArenaResult<Vec<ProgressRecord>>;
    async fn create(&self, record: ProgressRecord) -> ArenaResult<ProgressRecord>;
    async fn update(&self, record: &ProgressRecord) -> ArenaResult<()>;
    /// Fetches the record, creating a level 1 / 0 wins record if there is none.
    async fn upsert(&self, account: AccountId, species: &RecordId) -> ArenaResult<ProgressRecord>;
    /// Adds one win (creating the record if needed) as a single atomic step
    /// and returns the updated record.
    async fn increment_wins(
        &self,
        account: AccountId,
        species: &RecordId,
    ) -> ArenaResult<ProgressRecord>;
}

#[allow(async_fn_in_trait)]
pub trait BattleStore {
    async fn create(&self, session: &BattleSession) -> ArenaResult<()>;
    async fn get(&self, id: BattleId) -> ArenaResult<Option<BattleSession>>;
    async fn update(&self, session: &BattleSession) -> ArenaResult<()>;
}
