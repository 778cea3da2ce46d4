use crate::errors::ArenaResult;
use crate::player::AccountId;
use crate::progression::EvolutionFamily;
use crate::stores::{CreatureCatalog, ProgressStore};
use schema::{RecordId, SpeciesId};
use serde::Serialize;

/// One family member's progress after a victory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub species: SpeciesId,
    pub record_id: RecordId,
    pub name: String,
    pub level: u32,
    pub wins: u32,
}

/// A family member whose progress could not be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardFailure {
    pub species: SpeciesId,
    pub name: String,
    pub message: String,
}

/// Outcome of one propagation. Updates are independent: a failure leaves
/// the members before it updated and does not stop the ones after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewardReport {
    pub level_ups: Vec<LevelUp>,
    pub failures: Vec<RewardFailure>,
}

impl RewardReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Hands a victory to every member of the winner's evolution family.
pub struct RewardPropagator;

impl RewardPropagator {
    pub async fn propagate_victory<C, P>(
        account: AccountId,
        species: SpeciesId,
        catalog: &C,
        progress: &P,
    ) -> ArenaResult<RewardReport>
    where
        C: CreatureCatalog,
        P: ProgressStore,
    {
        let family = EvolutionFamily::resolve(catalog, species).await?;
        let mut report = RewardReport::default();

        for member in family.members() {
            let name = member.display_name().to_string();
            match progress.increment_wins(account, &member.record_id).await {
                Ok(record) => {
                    tracing::info!(
                        account = %account,
                        species = %member.species_id,
                        level = record.level,
                        wins = record.wins,
                        "{} leveled up",
                        name
                    );
                    report.level_ups.push(LevelUp {
                        species: member.species_id,
                        record_id: member.record_id.clone(),
                        name,
                        level: record.level,
                        wins: record.wins,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        account = %account,
                        species = %member.species_id,
                        error = %err,
                        "Failed to record win for {}",
                        name
                    );
                    report.failures.push(RewardFailure {
                        species: member.species_id,
                        name,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
