//! Merge resolution
//!
//! Turns raw contact batches into merges. The resolver owns the side table that maps
//! physics handles to tiers; anything missing from it (walls, foreign bodies) is not
//! a game piece and is ignored.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Contact, InstanceHandle, PhysicsWorld};
use crate::catalog::{TierCatalog, TierIndex};
use crate::midpoint;

/// What a merge produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeResult {
    /// A new piece of the next tier
    Promoted {
        tier: TierIndex,
        handle: InstanceHandle,
    },
    /// Two top-tier pieces vanished
    Terminal,
}

/// One resolved merge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Tier of the two consumed pieces
    pub tier: TierIndex,
    pub removed: [InstanceHandle; 2],
    pub point: Vec2,
    pub result: MergeResult,
}

impl MergeOutcome {
    /// Tier reached by this merge; a terminal merge ranks above every tier
    pub fn resulting_tier(&self) -> TierIndex {
        match self.result {
            MergeResult::Promoted { tier, .. } => tier,
            MergeResult::Terminal => self.tier + 1,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.result, MergeResult::Terminal)
    }
}

/// Tier side table plus the per-batch merge bookkeeping
#[derive(Debug, Clone, Default)]
pub struct MergeResolver {
    tiers: BTreeMap<InstanceHandle, TierIndex>,
    consumed: HashSet<InstanceHandle>,
}

impl MergeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game piece
    pub fn track(&mut self, handle: InstanceHandle, tier: TierIndex) {
        self.tiers.insert(handle, tier);
    }

    /// Tier of a tracked piece
    pub fn tier_of(&self, handle: InstanceHandle) -> Option<TierIndex> {
        self.tiers.get(&handle).copied()
    }

    /// Tracked pieces in handle order
    pub fn tracked(&self) -> impl Iterator<Item = (InstanceHandle, TierIndex)> + '_ {
        self.tiers.iter().map(|(&h, &t)| (h, t))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Forget pieces the physics world no longer has
    pub fn prune(&mut self, world: &dyn PhysicsWorld) -> usize {
        let before = self.tiers.len();
        self.tiers.retain(|&handle, _| world.position(handle).is_some());
        let pruned = before - self.tiers.len();
        if pruned > 0 {
            log::debug!("Pruned {} pieces missing from the physics world", pruned);
        }
        pruned
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
        self.consumed.clear();
    }

    /// Resolve one contact batch in order. Each piece merges at most once per batch.
    pub fn resolve_batch(
        &mut self,
        contacts: &[Contact],
        world: &mut dyn PhysicsWorld,
        catalog: &TierCatalog,
    ) -> Vec<MergeOutcome> {
        self.consumed.clear();
        contacts
            .iter()
            .filter_map(|contact| self.resolve_contact(*contact, world, catalog))
            .collect()
    }

    fn resolve_contact(
        &mut self,
        contact: Contact,
        world: &mut dyn PhysicsWorld,
        catalog: &TierCatalog,
    ) -> Option<MergeOutcome> {
        let Contact { a, b } = contact;
        if a == b {
            return None;
        }
        let (Some(tier_a), Some(tier_b)) = (self.tier_of(a), self.tier_of(b)) else {
            log::trace!("Contact {:?}/{:?} involves a non-piece body", a, b);
            return None;
        };
        if tier_a != tier_b {
            return None;
        }
        if self.consumed.contains(&a) || self.consumed.contains(&b) {
            log::debug!("Skipping {:?}/{:?}: already merged this batch", a, b);
            return None;
        }
        if catalog.get(tier_a).is_none() {
            log::warn!("Skipping {:?}/{:?}: tier {} not in catalog", a, b, tier_a);
            return None;
        }
        let (Some(pos_a), Some(pos_b)) = (world.position(a), world.position(b)) else {
            log::warn!("Skipping {:?}/{:?}: body missing from physics world", a, b);
            return None;
        };

        self.consumed.insert(a);
        self.consumed.insert(b);
        self.tiers.remove(&a);
        self.tiers.remove(&b);
        world.remove_instances(&[a, b]);

        let point = midpoint(pos_a, pos_b);
        let result = match catalog.promote(tier_a) {
            Some(next) => {
                let radius = catalog.get(next).map_or(0.0, |t| t.radius);
                let handle = world.add_instance(point, radius);
                self.tiers.insert(handle, next);
                MergeResult::Promoted { tier: next, handle }
            }
            None => MergeResult::Terminal,
        };

        log::debug!(
            "Merged tier {} at ({:.1}, {:.1}) -> {:?}",
            tier_a,
            point.x,
            point.y,
            result
        );
        Some(MergeOutcome {
            tier: tier_a,
            removed: [a, b],
            point,
            result,
        })
    }
}
