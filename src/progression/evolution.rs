//! Evolution family resolution over the catalog.

use crate::errors::ArenaResult;
use crate::stores::CreatureCatalog;
use schema::{Creature, SpeciesId};
use std::collections::HashSet;

/// A root creature and everything reachable from it through `next` links,
/// in pre-order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionFamily {
    members: Vec<Creature>,
}

impl EvolutionFamily {
    /// Walks up from `start` to its root, then collects the family below it.
    ///
    /// Malformed data is tolerated: a missing predecessor ends the upward walk
    /// at the last creature found, missing successors are skipped, and a
    /// visited set breaks cycles in either direction. An unknown `start`
    /// yields an empty family.
    pub async fn resolve<C: CreatureCatalog>(catalog: &C, start: SpeciesId) -> ArenaResult<Self> {
        let Some(start) = catalog.get_by_species_id(start).await? else {
            return Ok(Self::default());
        };
        let root = find_root(catalog, start).await?;

        let mut members = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(creature) = stack.pop() {
            if !visited.insert(creature.species_id) {
                continue;
            }
            // Reverse so the first listed evolution is visited first.
            for link in creature.evolution.next.iter().rev() {
                if visited.contains(&link.species) {
                    continue;
                }
                match catalog.get_by_species_id(link.species).await? {
                    Some(next) => stack.push(next),
                    None => tracing::warn!(
                        species = %link.species,
                        from = %creature.species_id,
                        "Evolution target missing from catalog"
                    ),
                }
            }
            members.push(creature);
        }

        Ok(Self { members })
    }

    pub fn root(&self) -> Option<&Creature> {
        self.members.first()
    }

    pub fn members(&self) -> &[Creature] {
        &self.members
    }

    pub fn species_ids(&self) -> Vec<SpeciesId> {
        self.members.iter().map(|creature| creature.species_id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

async fn find_root<C: CreatureCatalog>(catalog: &C, start: Creature) -> ArenaResult<Creature> {
    let mut visited = HashSet::from([start.species_id]);
    let mut current = start;
    while let Some(prev) = current.evolution.predecessor() {
        if !visited.insert(prev) {
            tracing::warn!(species = %prev, "Evolution cycle detected while seeking root");
            break;
        }
        match catalog.get_by_species_id(prev).await? {
            Some(creature) => current = creature,
            None => {
                tracing::warn!(species = %prev, "Pre-evolution missing from catalog");
                break;
            }
        }
    }
    Ok(current)
}
