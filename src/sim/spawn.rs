//! Spawn sequencing
//!
//! Holds the piece waiting in the launcher and the preview piece behind it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::catalog::{Stage, TierIndex};

#[derive(Debug, Clone)]
pub struct SpawnSequencer {
    rng: Pcg32,
    current: Option<TierIndex>,
    next: TierIndex,
    shoot_locked: bool,
}

impl SpawnSequencer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: None,
            next: 0,
            shoot_locked: true,
        }
    }

    /// Load the launcher for `stage` and unlock shooting.
    ///
    /// The first call after construction or [`Self::force_redraw`] draws both tiers;
    /// later calls promote the preview piece.
    pub fn prepare_next(&mut self, stage: &Stage) {
        let range = stage.spawn_range.max(1);
        let current = match self.current {
            Some(_) => self.next.min(range - 1),
            None => self.rng.random_range(0..range),
        };
        self.current = Some(current);
        self.next = self.rng.random_range(0..range);
        self.shoot_locked = false;
    }

    /// Forget both pieces so the next `prepare_next` draws fresh ones
    pub fn force_redraw(&mut self) {
        self.current = None;
        self.shoot_locked = true;
    }

    pub fn current(&self) -> Option<TierIndex> {
        self.current
    }

    pub fn next(&self) -> TierIndex {
        self.next
    }

    pub fn is_locked(&self) -> bool {
        self.shoot_locked
    }

    pub fn lock(&mut self) {
        self.shoot_locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StageCatalog;
    use proptest::prelude::*;

    #[test]
    fn test_first_call_draws_both() {
        let stages = StageCatalog::default();
        let stage = stages.get(0).unwrap();
        let mut spawn = SpawnSequencer::new(7);
        assert!(spawn.current().is_none());
        assert!(spawn.is_locked());

        spawn.prepare_next(stage);
        assert!(spawn.current().unwrap() < stage.spawn_range);
        assert!(spawn.next() < stage.spawn_range);
        assert!(!spawn.is_locked());
    }

    #[test]
    fn test_promotes_preview() {
        let stages = StageCatalog::default();
        let stage = stages.get(2).unwrap();
        let mut spawn = SpawnSequencer::new(42);
        spawn.prepare_next(stage);

        for _ in 0..50 {
            let preview = spawn.next();
            spawn.lock();
            spawn.prepare_next(stage);
            assert_eq!(spawn.current(), Some(preview));
        }
    }

    #[test]
    fn test_force_redraw_clears_current() {
        let stages = StageCatalog::default();
        let mut spawn = SpawnSequencer::new(3);
        spawn.prepare_next(stages.get(3).unwrap());
        spawn.force_redraw();
        assert!(spawn.current().is_none());
        assert!(spawn.is_locked());

        // Narrow stage: both pieces must fit the new range
        spawn.prepare_next(stages.get(0).unwrap());
        assert!(spawn.current().unwrap() < 3);
        assert!(spawn.next() < 3);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let stages = StageCatalog::default();
        let stage = stages.get(2).unwrap();
        let mut a = SpawnSequencer::new(99);
        let mut b = SpawnSequencer::new(99);
        for _ in 0..20 {
            a.prepare_next(stage);
            b.prepare_next(stage);
            assert_eq!(a.current(), b.current());
            assert_eq!(a.next(), b.next());
        }
    }

    proptest! {
        #[test]
        fn prop_draws_stay_in_range(
            seed in any::<u64>(),
            range in 1usize..=10,
            calls in 1usize..40
        ) {
            let mut stage = StageCatalog::default().get(0).unwrap().clone();
            stage.spawn_range = range;
            let mut spawn = SpawnSequencer::new(seed);
            for _ in 0..calls {
                spawn.prepare_next(&stage);
                prop_assert!(spawn.current().unwrap() < range);
                prop_assert!(spawn.next() < range);
            }
        }
    }
}
