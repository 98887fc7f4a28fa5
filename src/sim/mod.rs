//! Merge-progression engine
//!
//! All gameplay rules live here. The module is driven entirely by its caller:
//! - Physics contacts come in through [`GameSession::handle_collisions`]
//! - Time only moves when the caller passes a timestamp
//! - Deferred work sits in a cancellable [`Scheduler`]
//! - No rendering, audio or platform dependencies

pub mod events;
pub mod loss;
pub mod merge;
pub mod physics;
pub mod score;
pub mod session;
pub mod spawn;
pub mod stage;
pub mod timer;

pub use events::{GameEvent, GameOverReason, StageInfo};
pub use loss::LossDetector;
pub use merge::{MergeOutcome, MergeResolver, MergeResult};
pub use physics::{Body, Contact, HeadlessWorld, InstanceHandle, PhysicsWorld};
pub use score::{MergeAward, ScoreEngine};
pub use session::GameSession;
pub use spawn::SpawnSequencer;
pub use stage::{Advance, StagePhase, StageProgress};
pub use timer::{DueTimer, Scheduler, TimerEvent, TimerId};
