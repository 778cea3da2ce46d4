use crate::battle::runner::BattleRunner;
use crate::battle::state::{BattleId, BattleRng, BattleSession, BattleStatus, Combatant};
use crate::config::ArenaConfig;
use crate::errors::{ArenaError, ArenaResult};
use crate::player::{Account, AccountId, NewAccount};
use crate::progression::ProgressRecord;
use crate::stores::{
    AccountStore, BattleStore, MemoryAccountStore, MemoryBattleStore, MemoryCatalog,
    MemoryProgressStore, ProgressStore,
};
use schema::{
    Ability, BaseStats, Creature, Evolution, EvolutionLink, LocalizedName, PokemonType, RecordId,
    SpeciesId,
};

/// A builder for catalog creatures with common defaults.
///
/// Stats default to 50 across the board, the record id to `rec-NNN` and the
/// ability list to empty.
///
/// # Example
/// ```ignore
/// let machop = TestCreatureBuilder::new(66, "Machop", &[PokemonType::Fighting])
///     .with_stats(70, 80, 50, 35, 35, 35)
///     .with_next(&[67])
///     .build();
/// ```
pub struct TestCreatureBuilder {
    species_id: u16,
    name: String,
    types: Vec<PokemonType>,
    base_stats: BaseStats,
    prev: Vec<u16>,
    next: Vec<u16>,
    abilities: Vec<Ability>,
    record_id: Option<String>,
}

impl TestCreatureBuilder {
    pub fn new(species_id: u16, name: &str, types: &[PokemonType]) -> Self {
        Self {
            species_id,
            name: name.to_string(),
            types: types.to_vec(),
            base_stats: BaseStats::new(50, 50, 50, 50, 50, 50),
            prev: Vec::new(),
            next: Vec::new(),
            abilities: Vec::new(),
            record_id: None,
        }
    }

    pub fn with_stats(
        mut self,
        hp: u16,
        attack: u16,
        defense: u16,
        sp_attack: u16,
        sp_defense: u16,
        speed: u16,
    ) -> Self {
        self.base_stats = BaseStats::new(hp, attack, defense, sp_attack, sp_defense, speed);
        self
    }

    /// Replaces the stats wholesale, e.g. to leave some absent.
    pub fn with_base_stats(mut self, base_stats: BaseStats) -> Self {
        self.base_stats = base_stats;
        self
    }

    pub fn with_speed(mut self, speed: u16) -> Self {
        self.base_stats.speed = Some(speed);
        self
    }

    pub fn with_prev(mut self, species_id: u16) -> Self {
        self.prev.push(species_id);
        self
    }

    pub fn with_next(mut self, species_ids: &[u16]) -> Self {
        self.next.extend_from_slice(species_ids);
        self
    }

    pub fn with_ability(mut self, name: &str, hidden: bool) -> Self {
        self.abilities.push(Ability {
            name: name.to_string(),
            hidden,
        });
        self
    }

    pub fn with_record_id(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }

    pub fn build(self) -> Creature {
        let link = |id: u16| EvolutionLink::new(SpeciesId(id), "Level");
        Creature {
            record_id: RecordId::new(
                self.record_id
                    .unwrap_or_else(|| format!("rec-{:03}", self.species_id)),
            ),
            species_id: SpeciesId(self.species_id),
            name: LocalizedName::english(self.name),
            types: self.types,
            base_stats: self.base_stats,
            evolution: Evolution {
                prev: self.prev.into_iter().map(link).collect(),
                next: self.next.into_iter().map(link).collect(),
            },
            abilities: self.abilities,
            description: String::new(),
        }
    }
}

/// Igglybuff -> Jigglypuff -> Wigglytuff, all Normal type.
pub fn jigglypuff_family() -> Vec<Creature> {
    vec![
        TestCreatureBuilder::new(174, "Igglybuff", &[PokemonType::Normal])
            .with_stats(90, 30, 15, 40, 20, 15)
            .with_next(&[39])
            .build(),
        TestCreatureBuilder::new(39, "Jigglypuff", &[PokemonType::Normal])
            .with_stats(115, 45, 20, 45, 25, 20)
            .with_prev(174)
            .with_next(&[40])
            .build(),
        TestCreatureBuilder::new(40, "Wigglytuff", &[PokemonType::Normal])
            .with_stats(140, 70, 45, 85, 50, 45)
            .with_prev(39)
            .build(),
    ]
}

/// A level 1 vs level 1 session in `PlayerTurn` with an empty log.
pub fn create_test_session(player: Creature, computer: Creature) -> BattleSession {
    create_test_session_at_levels(player, 1, computer, 1)
}

pub fn create_test_session_at_levels(
    player: Creature,
    player_level: u32,
    computer: Creature,
    computer_level: u32,
) -> BattleSession {
    let default_hp = ArenaConfig::default().combat.default_hp;
    BattleSession::new(
        BattleId::new(),
        AccountId::new(),
        Combatant::new(player, player_level, default_hp),
        Combatant::new(computer, computer_level, default_hp),
        BattleStatus::PlayerTurn,
    )
}

/// A `BattleRng` with a long list of mid-range values (0.5).
/// Useful for tests where the specific outcome is not important, preventing panics from exhaustion.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(vec![0.5; 100])
}

pub type TestRunner =
    BattleRunner<MemoryAccountStore, MemoryCatalog, MemoryProgressStore, MemoryBattleStore>;

/// A runner over in-memory stores seeded with `creatures`, replaying
/// `script` for every random draw, plus one registered account.
pub async fn create_test_runner(creatures: Vec<Creature>, script: Vec<f64>) -> (TestRunner, AccountId) {
    create_runner_with(
        MemoryAccountStore::new(),
        MemoryProgressStore::new(),
        MemoryBattleStore::new(),
        creatures,
        script,
    )
    .await
}

/// Like `create_test_runner`, but over caller-supplied account, progress and
/// battle stores.
pub async fn create_runner_with<A, P, B>(
    accounts: A,
    progress: P,
    battles: B,
    creatures: Vec<Creature>,
    script: Vec<f64>,
) -> (BattleRunner<A, MemoryCatalog, P, B>, AccountId)
where
    A: AccountStore,
    P: ProgressStore,
    B: BattleStore,
{
    let catalog = assert_ok(MemoryCatalog::from_creatures(creatures));
    let runner = BattleRunner::new(accounts, catalog, progress, battles, ArenaConfig::default())
        .with_rng(BattleRng::new_for_test(script));
    let account = assert_ok(runner.accounts().create(NewAccount::named("tester")).await);
    (runner, account.id)
}

/// Progress store whose `increment_wins` fails for one record id.
pub struct FlakyProgressStore {
    pub inner: MemoryProgressStore,
    pub broken: RecordId,
}

impl FlakyProgressStore {
    pub fn refusing(record_id: &str) -> Self {
        Self {
            inner: MemoryProgressStore::new(),
            broken: RecordId::new(record_id),
        }
    }
}

impl ProgressStore for FlakyProgressStore {
    async fn get(&self, account: AccountId, species: &RecordId) -> ArenaResult<Option<ProgressRecord>> {
        self.inner.get(account, species).await
    }

    async fn get_all_for_account(&self, account: AccountId) -> ArenaResult<Vec<ProgressRecord>> {
        self.inner.get_all_for_account(account).await
    }

    async fn create(&self, record: ProgressRecord) -> ArenaResult<ProgressRecord> {
        self.inner.create(record).await
    }

    async fn update(&self, record: &ProgressRecord) -> ArenaResult<()> {
        self.inner.update(record).await
    }

    async fn upsert(&self, account: AccountId, species: &RecordId) -> ArenaResult<ProgressRecord> {
        self.inner.upsert(account, species).await
    }

    async fn increment_wins(
        &self,
        account: AccountId,
        species: &RecordId,
    ) -> ArenaResult<ProgressRecord> {
        if species == &self.broken {
            return Err(ArenaError::Store("disk full".to_string()));
        }
        self.inner.increment_wins(account, species).await
    }
}

/// Account store that accepts new accounts but refuses every update.
pub struct FrozenAccountStore {
    pub inner: MemoryAccountStore,
}

impl AccountStore for FrozenAccountStore {
    async fn get(&self, id: AccountId) -> ArenaResult<Option<Account>> {
        self.inner.get(id).await
    }

    async fn get_by_address(&self, address: &str) -> ArenaResult<Option<Account>> {
        self.inner.get_by_address(address).await
    }

    async fn create(&self, fields: NewAccount) -> ArenaResult<Account> {
        self.inner.create(fields).await
    }

    async fn update(&self, _account: &Account) -> ArenaResult<()> {
        Err(ArenaError::Store("read-only replica".to_string()))
    }
}

/// Battle store that yields to the scheduler between reading and writing, so
/// requests running on one task interleave at their store calls.
pub struct YieldingBattleStore {
    pub inner: MemoryBattleStore,
}

impl BattleStore for YieldingBattleStore {
    async fn create(&self, session: &BattleSession) -> ArenaResult<()> {
        self.inner.create(session).await
    }

    async fn get(&self, id: BattleId) -> ArenaResult<Option<BattleSession>> {
        let session = self.inner.get(id).await;
        tokio::task::yield_now().await;
        session
    }

    async fn update(&self, session: &BattleSession) -> ArenaResult<()> {
        tokio::task::yield_now().await;
        self.inner.update(session).await
    }
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: ArenaResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
