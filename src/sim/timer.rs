//! Deferred session work
//!
//! A single-threaded queue of timed events. Every pending entry has an id that can be
//! cancelled; entries fire in deadline order, ties broken by scheduling order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Millis;

/// Handle for a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Work the session defers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Combo streak expired
    ComboReset,
    /// Move on after a stage clear
    StageAdvance,
    /// Launcher cooldown finished
    ShootReady,
    /// Periodic loss detection
    LossCheck,
}

/// A fired entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTimer {
    pub id: TimerId,
    pub deadline: Millis,
    pub event: TimerEvent,
}

/// Pending timed events, earliest deadline first
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: BTreeMap<(Millis, TimerId), TimerEvent>,
    next_id: u64,
}

impl Scheduler {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` to fire once `now >= deadline`
    pub fn schedule(&mut self, deadline: Millis, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((deadline, id), event);
        id
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&(_, pending_id), _| pending_id != id);
        self.pending.len() != before
    }

    /// Whether `id` is still waiting to fire
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|&(_, pending_id)| pending_id == id)
    }

    /// Pop the earliest entry due at `now`. Call repeatedly; handlers may schedule or
    /// cancel between pops.
    pub fn pop_due(&mut self, now: Millis) -> Option<DueTimer> {
        let (&(deadline, _), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let ((deadline, id), event) = self.pending.pop_first()?;
        Some(DueTimer {
            id,
            deadline,
            event,
        })
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending entries of one kind
    pub fn count(&self, event: TimerEvent) -> usize {
        self.pending.values().filter(|&&e| e == event).count()
    }
}
