//! Game session
//!
//! Owns every engine component and the physics collaborator, and is the only entry
//! point for the input layer. All calls run to completion on one logical timeline;
//! callers pass the current time in milliseconds and drain [`GameEvent`]s afterward.

use glam::Vec2;

use super::events::{GameEvent, GameOverReason, StageInfo};
use super::loss::LossDetector;
use super::merge::{MergeOutcome, MergeResolver};
use super::physics::{Contact, InstanceHandle, PhysicsWorld};
use super::score::ScoreEngine;
use super::spawn::SpawnSequencer;
use super::stage::{Advance, StagePhase, StageProgress};
use super::timer::{Scheduler, TimerEvent, TimerId};
use crate::Millis;
use crate::catalog::{Stage, TierIndex};
use crate::error::{ConfigError, ShootError};
use crate::highscores::{HighScoreStore, MemoryHighScore};
use crate::tuning::GameConfig;

/// One player's game: engine state plus the physics world it drives
pub struct GameSession<W: PhysicsWorld, S: HighScoreStore = MemoryHighScore> {
    world: W,
    store: S,
    config: GameConfig,
    /// Copy of the catalog entry being played
    active_stage: Stage,
    scheduler: Scheduler,
    spawn: SpawnSequencer,
    score: ScoreEngine,
    resolver: MergeResolver,
    stage: StageProgress,
    loss: LossDetector,
    shoot_timer: Option<TimerId>,
    game_over: Option<GameOverReason>,
    events: Vec<GameEvent>,
}

impl<W: PhysicsWorld, S: HighScoreStore> GameSession<W, S> {
    /// Build a session. The run does not begin until [`Self::start`].
    pub fn new(world: W, config: GameConfig, seed: u64, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let active_stage = config.stages.get(0).cloned().ok_or(ConfigError::NoStages)?;
        let high_score = store.load().unwrap_or_else(|e| {
            log::warn!("Could not read high score, starting from 0: {}", e);
            0
        });
        let tuning = &config.tuning;
        let score = ScoreEngine::new(
            high_score,
            tuning.combo_window_ms,
            tuning.max_combo_multiplier,
        );
        let loss = LossDetector::new(tuning.rest_speed_threshold);

        Ok(Self {
            world,
            store,
            active_stage,
            scheduler: Scheduler::new(),
            spawn: SpawnSequencer::new(seed),
            score,
            resolver: MergeResolver::new(),
            stage: StageProgress::new(),
            loss,
            shoot_timer: None,
            game_over: None,
            events: Vec::new(),
            config,
        })
    }

    /// Begin stage 1
    pub fn start(&mut self, now: Millis) {
        log::info!("Starting run");
        self.begin_run(now);
    }

    /// Throw away the current run and start over at stage 1
    pub fn reset(&mut self, now: Millis) {
        log::info!("Session reset (score was {})", self.score.score());
        self.begin_run(now);
    }

    fn begin_run(&mut self, now: Millis) {
        self.scheduler.clear();
        self.shoot_timer = None;
        self.world.clear_all();
        self.resolver.clear();
        self.stage.reset();
        self.score.reset(&mut self.scheduler);
        self.game_over = None;
        if let Some(first) = self.config.stages.get(0) {
            self.active_stage = first.clone();
        }
        self.spawn.force_redraw();

        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::ComboChanged(0));
        self.enter_stage();

        let interval = self.config.tuning.loss_check_interval_ms.max(1);
        self.scheduler.schedule(now.saturating_add(interval), TimerEvent::LossCheck);
    }

    /// Apply the active stage's physics and load the launcher
    fn enter_stage(&mut self) {
        let tuning = &self.config.tuning;
        let gravity = Vec2::new(0.0, tuning.base_gravity_y * self.active_stage.gravity_scale);
        self.world.set_gravity(gravity);
        self.spawn.prepare_next(&self.active_stage);

        let index = self.stage.stage_index();
        log::info!(
            "Stage {} ({}) started: spawn range {}, gravity x{}",
            self.active_stage.id,
            self.active_stage.name,
            self.active_stage.spawn_range,
            self.active_stage.gravity_scale
        );
        self.events.push(GameEvent::StageStarted(StageInfo::new(index, &self.active_stage)));
        self.events.push(GameEvent::NextTierChanged(self.spawn.next()));
    }

    /// Launch the loaded piece from `launch_x`
    pub fn shoot(&mut self, launch_x: f32, now: Millis) -> Result<InstanceHandle, ShootError> {
        self.advance(now);
        if self.game_over.is_some() {
            return Err(ShootError::GameOver);
        }
        if self.spawn.is_locked() || self.stage.phase() != StagePhase::Playing {
            return Err(ShootError::Locked);
        }
        let Some(tier) = self.spawn.current() else {
            return Err(ShootError::Locked);
        };

        let tuning = &self.config.tuning;
        let radius = self.config.tiers.get(tier).map_or(0.0, |t| t.radius);
        let position = Vec2::new(tuning.clamp_launch_x(launch_x, radius), tuning.launcher_y);
        let handle = self.world.add_instance(position, radius);
        self.world.set_velocity(handle, Vec2::new(0.0, -tuning.launch_speed));
        self.resolver.track(handle, tier);

        self.spawn.lock();
        let ready_at = now.saturating_add(tuning.shoot_cooldown_ms);
        self.shoot_timer = Some(self.scheduler.schedule(ready_at, TimerEvent::ShootReady));

        log::debug!("Shot tier {} from x={:.1}", tier, position.x);
        self.events.push(GameEvent::Shot {
            handle,
            tier,
            position,
        });
        Ok(handle)
    }

    /// Place a piece directly, bypassing the launcher (scripted setups, testing)
    pub fn place_piece(&mut self, tier: TierIndex, position: Vec2) -> Option<InstanceHandle> {
        if self.game_over.is_some() {
            return None;
        }
        let radius = self.config.tiers.get(tier)?.radius;
        let handle = self.world.add_instance(position, radius);
        self.resolver.track(handle, tier);
        Some(handle)
    }

    /// Feed one physics step's contacts. Returns the number of merges performed.
    pub fn handle_collisions(&mut self, contacts: &[Contact], now: Millis) -> usize {
        self.advance(now);
        if self.game_over.is_some() {
            return 0;
        }
        let outcomes = self.resolver.resolve_batch(contacts, &mut self.world, &self.config.tiers);
        for outcome in &outcomes {
            self.apply_merge(outcome, now);
        }
        outcomes.len()
    }

    fn apply_merge(&mut self, outcome: &MergeOutcome, now: Millis) {
        let base = self
            .config
            .tiers
            .get(outcome.tier)
            .map_or(0, |t| t.score_value);
        let award = self.score.on_merge(base, now, &mut self.scheduler);
        let mut points = award.points;
        if outcome.is_terminal() {
            let bonus = self.config.tuning.terminal_merge_bonus;
            self.score.add_bonus(bonus);
            points += bonus;
            log::info!("Top-tier merge! +{} bonus", bonus);
        }

        self.events.push(GameEvent::Merged {
            tier: outcome.tier,
            point: outcome.point,
            terminal: outcome.is_terminal(),
            points,
        });
        self.events.push(GameEvent::ScoreChanged(self.score.score()));
        self.events.push(GameEvent::ComboChanged(award.combo));
        self.record_high_score();

        if self.active_stage.counts_toward_goal(outcome.resulting_tier())
            && self.stage.record_goal_progress(&self.active_stage)
        {
            self.on_stage_clear(now);
        }
    }

    fn record_high_score(&mut self) {
        if let Some(best) = self.score.update_high_score() {
            if let Err(e) = self.store.save(best) {
                log::warn!("Failed to save high score: {}", e);
            }
            self.events.push(GameEvent::HighScoreChanged(best));
        }
    }

    fn on_stage_clear(&mut self, now: Millis) {
        self.spawn.lock();
        if let Some(id) = self.shoot_timer.take() {
            self.scheduler.cancel(id);
        }
        let delay = self.config.tuning.stage_advance_delay_ms;
        self.scheduler.schedule(now.saturating_add(delay), TimerEvent::StageAdvance);

        let index = self.stage.stage_index();
        let stage = StageInfo::new(index, &self.active_stage);
        let next = self
            .config
            .stages
            .get(index + 1)
            .map(|s| StageInfo::new(index + 1, s));
        log::info!(
            "Stage {} cleared ({} goal merges)",
            self.active_stage.id,
            self.stage.goal_progress()
        );
        self.events.push(GameEvent::StageCleared { stage, next });
    }

    /// Fire every timer due at `now`, in deadline order
    pub fn advance(&mut self, now: Millis) {
        while let Some(due) = self.scheduler.pop_due(now) {
            if self.game_over.is_some() {
                break;
            }
            match due.event {
                TimerEvent::ComboReset => {
                    if self.score.on_combo_timer(due.id) {
                        self.events.push(GameEvent::ComboChanged(0));
                    }
                }
                TimerEvent::StageAdvance => self.finish_stage_clear(),
                TimerEvent::ShootReady => {
                    if self.shoot_timer == Some(due.id) {
                        self.shoot_timer = None;
                        if self.stage.phase() == StagePhase::Playing {
                            self.spawn.prepare_next(&self.active_stage);
                            self.events.push(GameEvent::NextTierChanged(self.spawn.next()));
                        }
                    }
                }
                TimerEvent::LossCheck => {
                    self.check_loss();
                    if self.game_over.is_none() {
                        let interval = self.config.tuning.loss_check_interval_ms.max(1);
                        let deadline = due.deadline.saturating_add(interval);
                        // Polling stops once the timeline is exhausted
                        if deadline > due.deadline {
                            self.scheduler.schedule(deadline, TimerEvent::LossCheck);
                        }
                    }
                }
            }
        }
    }

    fn finish_stage_clear(&mut self) {
        match self.stage.complete_advance(&self.config.stages) {
            Advance::NextStage(index) => {
                self.world.clear_all();
                self.resolver.clear();
                if let Some(id) = self.shoot_timer.take() {
                    self.scheduler.cancel(id);
                }
                if let Some(next) = self.config.stages.get(index) {
                    self.active_stage = next.clone();
                }
                self.spawn.force_redraw();
                self.enter_stage();
            }
            Advance::Victory => {
                log::info!("All stages cleared!");
                self.end_run(GameOverReason::Victory);
            }
        }
    }

    fn check_loss(&mut self) {
        self.resolver.prune(&self.world);
        let stuck = self.loss.find_stuck(
            self.resolver.tracked().map(|(handle, _)| handle),
            &self.world,
            self.active_stage.loss_line_y,
        );
        if let Some(handle) = stuck {
            log::info!(
                "Piece {:?} settled past the loss line ({})",
                handle,
                self.active_stage.loss_line_y
            );
            self.end_run(GameOverReason::Loss);
        }
    }

    fn end_run(&mut self, reason: GameOverReason) {
        self.game_over = Some(reason);
        self.scheduler.clear();
        self.shoot_timer = None;
        self.spawn.lock();
        let final_score = self.score.score();
        log::info!("Game over ({:?}), final score {}", reason, final_score);
        self.events.push(GameEvent::GameOver {
            final_score,
            reason,
        });
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u64 {
        self.score.score()
    }

    pub fn combo(&self) -> u32 {
        self.score.combo()
    }

    pub fn high_score(&self) -> u64 {
        self.score.high_score()
    }

    pub fn stage_index(&self) -> usize {
        self.stage.stage_index()
    }

    pub fn active_stage(&self) -> &Stage {
        &self.active_stage
    }

    pub fn stage_phase(&self) -> StagePhase {
        self.stage.phase()
    }

    pub fn goal_progress(&self) -> u32 {
        self.stage.goal_progress()
    }

    pub fn is_stage_cleared(&self) -> bool {
        self.stage.is_cleared()
    }

    pub fn current_tier(&self) -> Option<TierIndex> {
        self.spawn.current()
    }

    pub fn next_tier(&self) -> TierIndex {
        self.spawn.next()
    }

    pub fn is_shoot_locked(&self) -> bool {
        self.spawn.is_locked()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    /// Tier of a live piece, `None` for anything that is not a game piece
    pub fn tier_of(&self, handle: InstanceHandle) -> Option<TierIndex> {
        self.resolver.tier_of(handle)
    }

    /// Live pieces in handle order
    pub fn pieces(&self) -> impl Iterator<Item = (InstanceHandle, TierIndex)> + '_ {
        self.resolver.tracked()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timers(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// For the physics driver to step the simulation
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
