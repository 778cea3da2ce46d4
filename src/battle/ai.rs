//! Picks the computer's creature for a new battle.

use crate::battle::calculators::opponent_level;
use crate::battle::state::BattleRng;
use crate::config::OpponentConfig;
use crate::errors::{ArenaError, ArenaResult};
use crate::stores::{CatalogFilter, CreatureCatalog, Page, StageGate};
use schema::{Creature, PokemonType, SpeciesId};

/// Chooses a type-advantaged opponent and a level that keeps it slightly
/// weaker than the challenger in aggregate stats.
#[derive(Debug, Clone)]
pub struct OpponentSelector {
    config: OpponentConfig,
}

impl OpponentSelector {
    pub fn new(config: &OpponentConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Returns the opponent and its level. Only an empty catalog makes this fail.
    pub async fn select<C: CreatureCatalog>(
        &self,
        challenger: &Creature,
        challenger_level: u32,
        catalog: &C,
        rng: &mut BattleRng,
    ) -> ArenaResult<(Creature, u32)> {
        let opponent = match self.pick_countering(challenger, challenger_level, catalog, rng).await? {
            Some(creature) => creature,
            None => self.pick_random(catalog, rng).await?,
        };

        let level = opponent_level(
            challenger.base_stats.total(),
            challenger_level,
            opponent.base_stats.total(),
            self.config.level_ratio,
        );
        tracing::debug!(
            challenger = challenger.display_name(),
            opponent = opponent.display_name(),
            level,
            "Opponent selected"
        );
        Ok((opponent, level))
    }

    /// Stage restriction for a challenger of the given level.
    ///
    /// The middle tier admits second stages whose predecessor's dex number is
    /// one of the type table's ordinals (1 to 18), whatever type was drawn.
    pub fn stage_gate(&self, challenger_level: u32) -> StageGate {
        if challenger_level <= self.config.root_only_max_level {
            StageGate::RootOnly
        } else if challenger_level <= self.config.two_tier_max_level {
            // Loose heuristic: type ordinals are compared against dex numbers.
            StageGate::RootOrPredecessorIn(
                PokemonType::all()
                    .map(|t| SpeciesId(t.ordinal_id()))
                    .collect(),
            )
        } else {
            StageGate::Any
        }
    }

    async fn pick_countering<C: CreatureCatalog>(
        &self,
        challenger: &Creature,
        challenger_level: u32,
        catalog: &C,
        rng: &mut BattleRng,
    ) -> ArenaResult<Option<Creature>> {
        let candidate_types = PokemonType::counters_of(&challenger.types);
        if candidate_types.is_empty() {
            tracing::debug!(
                challenger = challenger.display_name(),
                "No countering types, using random opponent"
            );
            return Ok(None);
        }

        let index = rng.pick_index(candidate_types.len(), "opponent type");
        let chosen_type = candidate_types[index];
        let filter = CatalogFilter::of_type(chosen_type, self.stage_gate(challenger_level));
        let (page, _) = catalog
            .query(&filter, Page::first(self.config.candidate_page_size))
            .await?;

        for _ in 0..page.len() {
            let candidate = &page[rng.pick_index(page.len(), "opponent candidate")];
            if !candidate.base_stats.has_zero_stat() {
                return Ok(Some(candidate.clone()));
            }
        }

        tracing::warn!(
            opponent_type = %chosen_type,
            candidates = page.len(),
            "No usable countering candidate, using random opponent"
        );
        Ok(None)
    }

    async fn pick_random<C: CreatureCatalog>(
        &self,
        catalog: &C,
        rng: &mut BattleRng,
    ) -> ArenaResult<Creature> {
        let (sample, _) = catalog
            .query(
                &CatalogFilter::default(),
                Page::first(self.config.random_sample_size),
            )
            .await?;
        if sample.is_empty() {
            return Err(ArenaError::NoOpponentFound);
        }
        let index = rng.pick_index(sample.len(), "random opponent");
        Ok(sample[index].clone())
    }
}
