use crate::battle::ai::OpponentSelector;
use crate::battle::calculators::initiative;
use crate::battle::engine::{self, PlayerAction, TurnOutcome};
use crate::battle::state::{BattleEvent, BattleId, BattleRng, BattleSession, BattleStatus, Combatant, Side};
use crate::config::ArenaConfig;
use crate::errors::{ArenaError, ArenaResult};
use crate::player::AccountId;
use crate::progression::RewardPropagator;
use crate::stores::{AccountStore, BattleStore, CreatureCatalog, ProgressStore};
use schema::{Creature, RecordId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// High-level battle management over the four stores.
///
/// Every operation that mutates a session holds that session's lock for the
/// whole load, resolve and save sequence, so two requests for the same battle
/// never interleave. Different battles proceed independently.
pub struct BattleRunner<A, C, P, B> {
    accounts: A,
    catalog: C,
    progress: P,
    battles: B,
    config: ArenaConfig,
    selector: OpponentSelector,
    rng: Mutex<BattleRng>,
    session_locks: SessionLocks,
}

impl<A, C, P, B> BattleRunner<A, C, P, B>
where
    A: AccountStore,
    C: CreatureCatalog,
    P: ProgressStore,
    B: BattleStore,
{
    pub fn new(accounts: A, catalog: C, progress: P, battles: B, config: ArenaConfig) -> Self {
        let selector = OpponentSelector::new(&config.opponent);
        Self {
            accounts,
            catalog,
            progress,
            battles,
            config,
            selector,
            rng: Mutex::new(BattleRng::new_random()),
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the randomness source, e.g. with a seeded or scripted one.
    pub fn with_rng(self, rng: BattleRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    pub fn battles(&self) -> &B {
        &self.battles
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Starts a battle for `account_id` with one of its catalog creatures.
    /// If the computer moves first, its opening turn is already resolved in
    /// the returned session.
    pub async fn create_battle(
        &self,
        account_id: AccountId,
        creature_id: &RecordId,
    ) -> ArenaResult<BattleSession> {
        if creature_id.is_empty() {
            return Err(ArenaError::MissingIdentifier("creature_id"));
        }
        self.accounts
            .get(account_id)
            .await?
            .ok_or(ArenaError::AccountNotFound(account_id))?;
        let challenger = self
            .catalog
            .get(creature_id)
            .await?
            .ok_or_else(|| ArenaError::CreatureNotFound(creature_id.clone()))?;

        let progress = self.progress.upsert(account_id, &challenger.record_id).await?;
        let player_level = progress.level.max(1);

        let mut rng = self.fork_rng();
        let (opponent, opponent_level) = self
            .selector
            .select(&challenger, player_level, &self.catalog, &mut rng)
            .await?;

        let status = initiative(self.speed_of(&challenger), self.speed_of(&opponent));
        let player = Combatant::new(challenger, player_level, self.config.combat.default_hp);
        let computer = Combatant::new(opponent, opponent_level, self.config.combat.default_hp);
        let mut session = BattleSession::new(BattleId::new(), account_id, player, computer, status);

        session.record(BattleEvent::BattleStarted {
            player: session.player.name().to_string(),
            player_level,
            computer: session.computer.name().to_string(),
            computer_level: opponent_level,
        });
        let first = match status {
            BattleStatus::ComputerTurn => Side::Computer,
            _ => Side::Player,
        };
        session.record(BattleEvent::Initiative {
            side: first,
            pokemon: session.combatant(first).name().to_string(),
        });

        let _guard = self.lock_session(session.id).await;

        self.battles.create(&session).await?;
        tracing::info!(
            battle = %session.id,
            account = %account_id,
            player = session.player.name(),
            computer = session.computer.name(),
            status = %session.status,
            "Battle created"
        );

        if session.status == BattleStatus::ComputerTurn {
            let outcome = engine::run_computer_turn(&mut session, &mut rng, &self.config.combat);
            self.settle(&mut session, outcome).await;
            self.battles.update(&session).await?;
        }

        Ok(session)
    }

    /// Current state of a battle. A session left in `ComputerTurn` by an
    /// interrupted request has its computer turn resolved first.
    pub async fn battle_state(&self, id: BattleId) -> ArenaResult<BattleSession> {
        let _guard = self.lock_session(id).await;

        let mut session = self.load(id).await?;
        if session.status == BattleStatus::ComputerTurn {
            tracing::warn!(battle = %id, "Resuming interrupted computer turn");
            let mut rng = self.fork_rng();
            let outcome = engine::run_computer_turn(&mut session, &mut rng, &self.config.combat);
            self.settle(&mut session, outcome).await;
            self.battles.update(&session).await?;
        }
        Ok(session)
    }

    /// Applies a player action token (`attack` or `ability`) and the
    /// computer's reply as one unit.
    pub async fn submit_action(&self, id: BattleId, token: &str) -> ArenaResult<BattleSession> {
        let _guard = self.lock_session(id).await;

        let mut session = self.load(id).await?;
        if session.is_finished() {
            return Err(ArenaError::BattleAlreadyFinished);
        }
        let action: PlayerAction = token.trim().parse()?;

        let mut rng = self.fork_rng();
        let outcome = engine::apply_action(&mut session, action, &mut rng, &self.config.combat)?;
        tracing::debug!(battle = %id, %action, ?outcome, "Action applied");

        self.settle(&mut session, outcome).await;
        self.battles.update(&session).await?;
        Ok(session)
    }

    /// Ends the battle without rewards. Surrendering a finished battle
    /// returns it unchanged.
    pub async fn surrender(&self, id: BattleId) -> ArenaResult<BattleSession> {
        let _guard = self.lock_session(id).await;

        let mut session = self.load(id).await?;
        if engine::surrender(&mut session) {
            tracing::info!(battle = %id, "Player surrendered");
            self.battles.update(&session).await?;
        }
        Ok(session)
    }

    async fn load(&self, id: BattleId) -> ArenaResult<BattleSession> {
        self.battles
            .get(id)
            .await?
            .ok_or(ArenaError::BattleNotFound(id))
    }

    /// Post-battle bookkeeping for a terminal outcome. Store failures here do
    /// not undo the battle result; they are logged and narrated instead.
    async fn settle(&self, session: &mut BattleSession, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Continue => {}
            TurnOutcome::PlayerVictory => {
                let species = session.player.creature.species_id;
                match RewardPropagator::propagate_victory(
                    session.account_id,
                    species,
                    &self.catalog,
                    &self.progress,
                )
                .await
                {
                    Ok(report) => {
                        for level_up in report.level_ups {
                            session.record(BattleEvent::LevelUp {
                                pokemon: level_up.name,
                                level: level_up.level,
                                wins: level_up.wins,
                            });
                        }
                        if !report.failures.is_empty() {
                            tracing::warn!(
                                battle = %session.id,
                                failed = report.failures.len(),
                                "Some family members were not rewarded"
                            );
                        }
                        for failure in report.failures {
                            session.record(BattleEvent::RewardNotSaved {
                                pokemon: failure.name,
                            });
                        }
                    }
                    Err(err) => {
                        tracing::warn!(battle = %session.id, error = %err, "Reward propagation failed");
                        session.record(BattleEvent::RewardsNotGranted);
                    }
                }
                self.tally(session, true).await;
            }
            TurnOutcome::PlayerDefeat => self.tally(session, false).await,
        }
    }

    async fn tally(&self, session: &mut BattleSession, won: bool) {
        if let Err(err) = self.try_tally(session.account_id, won).await {
            tracing::warn!(account = %session.account_id, error = %err, "Failed to update win/loss tally");
            session.record(BattleEvent::RecordNotUpdated);
        }
    }

    async fn try_tally(&self, account_id: AccountId, won: bool) -> ArenaResult<()> {
        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or(ArenaError::AccountNotFound(account_id))?;
        account.record_battle(won);
        self.accounts.update(&account).await
    }

    fn speed_of(&self, creature: &Creature) -> u16 {
        creature
            .base_stats
            .speed
            .filter(|speed| *speed > 0)
            .unwrap_or(self.config.combat.default_speed)
    }

    fn fork_rng(&self) -> BattleRng {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fork()
    }

    /// Waits for exclusive use of one battle. The registry entry lives only
    /// while some request holds or awaits it.
    async fn lock_session(&self, id: BattleId) -> SessionGuard<'_> {
        let lock = {
            let mut locks = self
                .session_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };
        SessionGuard {
            locks: &self.session_locks,
            id,
            held: Some(lock.lock_owned().await),
        }
    }
}

type SessionLocks = Mutex<HashMap<BattleId, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive hold on one battle. Dropping it releases the lock and forgets
/// the registry entry once no other request shares it.
struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    id: BattleId,
    held: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters hold a clone, so a count of one means only the registry is left.
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
    }
}
