//! Combo scoring
//!
//! Each merge bumps the combo; the award is `base * min(combo, cap)`. A single
//! combo-reset timer is armed per merge, replacing whichever one was pending.

use serde::{Deserialize, Serialize};

use super::timer::{Scheduler, TimerEvent, TimerId};
use crate::Millis;

/// Points granted by one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeAward {
    pub base: u64,
    pub multiplier: u32,
    pub points: u64,
    pub combo: u32,
}

/// Running score, combo streak and best score
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    score: u64,
    combo: u32,
    high_score: u64,
    combo_timer: Option<TimerId>,
    combo_window_ms: Millis,
    max_multiplier: u32,
}

impl ScoreEngine {
    /// Fresh engine seeded with the stored best score
    pub fn new(high_score: u64, combo_window_ms: Millis, max_multiplier: u32) -> Self {
        Self {
            score: 0,
            combo: 0,
            high_score,
            combo_timer: None,
            combo_window_ms,
            max_multiplier: max_multiplier.max(1),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Multiplier the next merge would get
    pub fn next_multiplier(&self) -> u32 {
        (self.combo + 1).min(self.max_multiplier)
    }

    /// Score a merge and re-arm the combo timer
    pub fn on_merge(&mut self, base: u64, now: Millis, scheduler: &mut Scheduler) -> MergeAward {
        self.combo += 1;
        let multiplier = self.combo.min(self.max_multiplier);
        let points = base.saturating_mul(u64::from(multiplier));
        self.score = self.score.saturating_add(points);

        if let Some(id) = self.combo_timer.take() {
            scheduler.cancel(id);
        }
        let deadline = now.saturating_add(self.combo_window_ms);
        self.combo_timer = Some(scheduler.schedule(deadline, TimerEvent::ComboReset));

        MergeAward {
            base,
            multiplier,
            points,
            combo: self.combo,
        }
    }

    /// Flat points, no combo effect
    pub fn add_bonus(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Handle a fired combo timer. Returns true if the combo was reset; stale ids
    /// (already replaced by a later merge) are ignored.
    pub fn on_combo_timer(&mut self, id: TimerId) -> bool {
        if self.combo_timer != Some(id) {
            log::debug!("Ignoring stale combo timer {:?}", id);
            return false;
        }
        self.combo_timer = None;
        self.combo = 0;
        true
    }

    /// Raise the best score if beaten. Returns the new best.
    pub fn update_high_score(&mut self) -> Option<u64> {
        if self.score > self.high_score {
            self.high_score = self.score;
            Some(self.high_score)
        } else {
            None
        }
    }

    /// Zero score and combo for a new run; the best score is kept
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.combo_timer.take() {
            scheduler.cancel(id);
        }
        self.score = 0;
        self.combo = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{COMBO_WINDOW_MS, MAX_COMBO_MULTIPLIER};
    use proptest::prelude::*;

    fn engine() -> ScoreEngine {
        ScoreEngine::new(0, COMBO_WINDOW_MS, MAX_COMBO_MULTIPLIER)
    }

    #[test]
    fn test_combo_multiplier_grows_and_caps() {
        let mut scheduler = Scheduler::new();
        let mut score = engine();

        let awards: Vec<u32> = (0..7)
            .map(|i| score.on_merge(10, i * 100, &mut scheduler).multiplier)
            .collect();
        assert_eq!(awards, vec![1, 2, 3, 4, 5, 5, 5]);
        assert_eq!(score.score(), 10 * (1 + 2 + 3 + 4 + 5 + 5 + 5));
        assert_eq!(score.combo(), 7);
    }

    #[test]
    fn test_only_one_combo_timer_pending() {
        let mut scheduler = Scheduler::new();
        let mut score = engine();
        score.on_merge(10, 0, &mut scheduler);
        score.on_merge(10, 1000, &mut scheduler);
        score.on_merge(10, 2000, &mut scheduler);
        assert_eq!(scheduler.count(TimerEvent::ComboReset), 1);

        // Fires 1500ms after the last merge, not the first
        assert!(scheduler.pop_due(3499).is_none());
        let due = scheduler.pop_due(3500).unwrap();
        assert!(score.on_combo_timer(due.id));
        assert_eq!(score.combo(), 0);
        assert_eq!(score.next_multiplier(), 1);
    }

    #[test]
    fn test_stale_timer_ignored() {
        let mut scheduler = Scheduler::new();
        let mut score = engine();
        score.on_merge(10, 0, &mut scheduler);
        let stale = scheduler.schedule(5, TimerEvent::ComboReset);
        assert!(!score.on_combo_timer(stale));
        assert_eq!(score.combo(), 1);
    }

    #[test]
    fn test_bonus_not_multiplied() {
        let mut scheduler = Scheduler::new();
        let mut score = engine();
        score.on_merge(10, 0, &mut scheduler);
        score.on_merge(10, 10, &mut scheduler);
        score.add_bonus(1000);
        assert_eq!(score.score(), 10 + 20 + 1000);
    }

    #[test]
    fn test_combo_deadline_saturates() {
        let mut scheduler = Scheduler::new();
        let mut score = ScoreEngine::new(0, Millis::MAX, MAX_COMBO_MULTIPLIER);
        score.on_merge(10, 5, &mut scheduler);
        // Parked at the end of the timeline, not wrapped to the start
        assert!(scheduler.pop_due(Millis::MAX - 1).is_none());
        assert_eq!(scheduler.pop_due(Millis::MAX).unwrap().event, TimerEvent::ComboReset);
        assert_eq!(score.combo(), 1);
    }

    #[test]
    fn test_high_score_tracking() {
        let mut scheduler = Scheduler::new();
        let mut score = ScoreEngine::new(25, COMBO_WINDOW_MS, MAX_COMBO_MULTIPLIER);
        score.on_merge(10, 0, &mut scheduler);
        assert_eq!(score.update_high_score(), None);
        score.on_merge(10, 10, &mut scheduler);
        assert_eq!(score.update_high_score(), Some(30));
        assert_eq!(score.high_score(), 30);
    }

    #[test]
    fn test_reset_cancels_timer() {
        let mut scheduler = Scheduler::new();
        let mut score = engine();
        score.on_merge(50, 0, &mut scheduler);
        score.reset(&mut scheduler);
        assert_eq!(score.score(), 0);
        assert_eq!(score.combo(), 0);
        assert!(scheduler.is_empty());
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(
            merges in prop::collection::vec((0u64..2000, 0u64..3000), 1..60)
        ) {
            let mut scheduler = Scheduler::new();
            let mut score = engine();
            let mut now = 0;
            let mut last = 0;
            for (base, gap) in merges {
                now += gap;
                while let Some(due) = scheduler.pop_due(now) {
                    score.on_combo_timer(due.id);
                }
                let expected_multiplier = (score.combo() + 1).min(MAX_COMBO_MULTIPLIER);
                let award = score.on_merge(base, now, &mut scheduler);
                prop_assert_eq!(award.multiplier, expected_multiplier);
                prop_assert_eq!(award.points, base * u64::from(expected_multiplier));
                prop_assert!((1..=MAX_COMBO_MULTIPLIER).contains(&award.multiplier));
                prop_assert!(score.score() >= last);
                last = score.score();
            }
        }
    }
}
