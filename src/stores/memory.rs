//! In-process stores backed by tokio locks.

use super::{AccountStore, BattleStore, CatalogFilter, CreatureCatalog, Page, ProgressStore};
use crate::battle::state::{BattleId, BattleSession};
use crate::errors::{ArenaError, ArenaResult};
use crate::player::{Account, AccountId, NewAccount};
use crate::progression::ProgressRecord;
use schema::{Creature, RecordId, SpeciesId};
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    async fn get(&self, id: AccountId) -> ArenaResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn get_by_address(&self, address: &str) -> ArenaResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.address.as_deref() == Some(address))
            .cloned())
    }

    async fn create(&self, fields: NewAccount) -> ArenaResult<Account> {
        let mut accounts = self.accounts.write().await;
        if let Some(address) = fields.address.as_deref() {
            if accounts
                .values()
                .any(|account| account.address.as_deref() == Some(address))
            {
                return Err(ArenaError::Store(format!(
                    "address {} is already registered",
                    address
                )));
            }
        }
        let account = Account::from_new(AccountId::new(), fields);
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> ArenaResult<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.id) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(ArenaError::AccountNotFound(account.id)),
        }
    }
}

/// Catalog kept in insertion order, so queries page deterministically.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    creatures: RwLock<Vec<Creature>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from creatures, assigning record ids where missing.
    pub fn from_creatures(creatures: Vec<Creature>) -> ArenaResult<Self> {
        let mut seeded: Vec<Creature> = Vec::with_capacity(creatures.len());
        for creature in creatures {
            let creature = prepare_new(&seeded, creature)?;
            seeded.push(creature);
        }
        Ok(Self {
            creatures: RwLock::new(seeded),
        })
    }

    /// Parses a RON list of creatures.
    pub fn from_ron_str(text: &str) -> ArenaResult<Self> {
        let creatures: Vec<Creature> = ron::from_str(text)?;
        Self::from_creatures(creatures)
    }

    pub async fn len(&self) -> usize {
        self.creatures.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.creatures.read().await.is_empty()
    }
}

fn prepare_new(existing: &[Creature], mut creature: Creature) -> ArenaResult<Creature> {
    if existing
        .iter()
        .any(|known| known.species_id == creature.species_id)
    {
        return Err(ArenaError::Store(format!(
            "species {} is already in the catalog",
            creature.species_id
        )));
    }
    if creature.record_id.is_empty() {
        creature.record_id = RecordId::new(Uuid::new_v4().to_string());
    } else if existing
        .iter()
        .any(|known| known.record_id == creature.record_id)
    {
        return Err(ArenaError::Store(format!(
            "record {} is already in the catalog",
            creature.record_id.as_str()
        )));
    }
    Ok(creature)
}

impl CreatureCatalog for MemoryCatalog {
    async fn get(&self, id: &RecordId) -> ArenaResult<Option<Creature>> {
        let creatures = self.creatures.read().await;
        Ok(creatures
            .iter()
            .find(|creature| &creature.record_id == id)
            .cloned())
    }

    async fn get_by_species_id(&self, species: SpeciesId) -> ArenaResult<Option<Creature>> {
        let creatures = self.creatures.read().await;
        Ok(creatures
            .iter()
            .find(|creature| creature.species_id == species)
            .cloned())
    }

    async fn query(
        &self,
        filter: &CatalogFilter,
        page: Page,
    ) -> ArenaResult<(Vec<Creature>, usize)> {
        let creatures = self.creatures.read().await;
        let matching: Vec<&Creature> = creatures
            .iter()
            .filter(|creature| filter.matches(creature))
            .collect();
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn create(&self, creature: Creature) -> ArenaResult<Creature> {
        let mut creatures = self.creatures.write().await;
        let creature = prepare_new(&creatures, creature)?;
        creatures.push(creature.clone());
        Ok(creature)
    }

    async fn update(&self, creature: &Creature) -> ArenaResult<()> {
        let mut creatures = self.creatures.write().await;
        match creatures
            .iter_mut()
            .find(|known| known.record_id == creature.record_id)
        {
            Some(stored) => {
                *stored = creature.clone();
                Ok(())
            }
            None => Err(ArenaError::CreatureNotFound(creature.record_id.clone())),
        }
    }
}

/// Progress records behind one mutex, so a read-modify-write never interleaves.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Mutex<HashMap<(AccountId, RecordId), ProgressRecord>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    async fn get(
        &self,
        account: AccountId,
        species: &RecordId,
    ) -> ArenaResult<Option<ProgressRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(&(account, species.clone())).cloned())
    }

    async fn get_all_for_account(&self, account: AccountId) -> ArenaResult<Vec<ProgressRecord>> {
        let records = self.records.lock().await;
        let mut owned: Vec<ProgressRecord> = records
            .values()
            .filter(|record| record.account_id == account)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.species.as_str().cmp(b.species.as_str()));
        Ok(owned)
    }

    async fn create(&self, record: ProgressRecord) -> ArenaResult<ProgressRecord> {
        let mut records = self.records.lock().await;
        let key = (record.account_id, record.species.clone());
        if records.contains_key(&key) {
            return Err(ArenaError::Store(format!(
                "progress for {} on {} already exists",
                record.account_id,
                record.species.as_str()
            )));
        }
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &ProgressRecord) -> ArenaResult<()> {
        let mut records = self.records.lock().await;
        match records.get_mut(&(record.account_id, record.species.clone())) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(ArenaError::Store(format!(
                "no progress for {} on {}",
                record.account_id,
                record.species.as_str()
            ))),
        }
    }

    async fn upsert(&self, account: AccountId, species: &RecordId) -> ArenaResult<ProgressRecord> {
        let mut records = self.records.lock().await;
        let record = records
            .entry((account, species.clone()))
            .or_insert_with(|| ProgressRecord::new(account, species.clone()));
        Ok(record.clone())
    }

    async fn increment_wins(
        &self,
        account: AccountId,
        species: &RecordId,
    ) -> ArenaResult<ProgressRecord> {
        let mut records = self.records.lock().await;
        let record = records
            .entry((account, species.clone()))
            .or_insert_with(|| ProgressRecord::new(account, species.clone()));
        record.record_win();
        Ok(record.clone())
    }
}

/// Sessions stored as postcard bytes; every read decodes a fresh copy.
#[derive(Debug, Default)]
pub struct MemoryBattleStore {
    sessions: RwLock<HashMap<BattleId, Vec<u8>>>,
}

impl MemoryBattleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BattleStore for MemoryBattleStore {
    async fn create(&self, session: &BattleSession) -> ArenaResult<()> {
        let bytes = postcard::to_allocvec(session)?;
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(ArenaError::Store(format!(
                "battle {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id, bytes);
        Ok(())
    }

    async fn get(&self, id: BattleId) -> ArenaResult<Option<BattleSession>> {
        let sessions = self.sessions.read().await;
        match sessions.get(&id) {
            Some(bytes) => Ok(Some(postcard::from_bytes(bytes)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &BattleSession) -> ArenaResult<()> {
        let bytes = postcard::to_allocvec(session)?;
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = bytes;
                Ok(())
            }
            None => Err(ArenaError::BattleNotFound(session.id)),
        }
    }
}
