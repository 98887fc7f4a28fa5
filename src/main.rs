//! Veggie Merge headless runner
//!
//! Plays a run against the built-in kinematic world with a bot that drops pieces at
//! random positions. Handy for balance checks without a browser.

use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use veggie_merge::sim::{GameEvent, GameSession, HeadlessWorld};
use veggie_merge::{GameConfig, HighScoreStore, JsonFileHighScore, MemoryHighScore, Millis};

/// Wall-clock length of one physics step (~60 Hz)
const STEP_MS: Millis = 16;

#[derive(Parser, Debug)]
#[command(name = "veggie-merge", about = "Headless Veggie Merge autoplay")]
struct Args {
    /// Seed for spawn draws and bot aim
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Physics steps to run before giving up
    #[arg(long, default_value_t = 20_000)]
    steps: u64,

    /// JSON config overriding tuning and catalogs
    #[arg(long)]
    config: Option<PathBuf>,

    /// High score file (in-memory when omitted)
    #[arg(long)]
    high_score: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let result = match &args.high_score {
        Some(path) => run(&args, config, JsonFileHighScore::new(path)),
        None => run(&args, config, MemoryHighScore::default()),
    };
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run<S: HighScoreStore>(
    args: &Args,
    config: GameConfig,
    store: S,
) -> Result<(), veggie_merge::ConfigError> {
    let tuning = config.tuning.clone();
    let world = HeadlessWorld::new(tuning.arena_width, tuning.arena_height);
    let mut session = GameSession::new(world, config, args.seed, store)?;
    let mut bot = Pcg32::seed_from_u64(args.seed ^ 0x9e37_79b9_7f4a_7c15);

    log::info!("Veggie Merge (headless) seed={} steps={}", args.seed, args.steps);
    session.start(0);

    let mut merges = 0usize;
    let mut stages_cleared = 0usize;
    let mut now = 0;
    for step in 0..args.steps {
        now = step * STEP_MS;
        if !session.is_shoot_locked() && !session.is_game_over() {
            let x = bot.random_range(0.0..tuning.arena_width);
            if let Err(e) = session.shoot(x, now) {
                log::debug!("Shot rejected: {}", e);
            }
        }

        let contacts = session.world_mut().step();
        merges += session.handle_collisions(&contacts, now);

        for event in session.drain_events() {
            if let GameEvent::StageCleared { .. } = event {
                stages_cleared += 1;
            }
        }
        if session.is_game_over() {
            break;
        }
    }

    println!(
        "t={}ms stage={} score={} best={} merges={} cleared={} outcome={:?}",
        now,
        session.active_stage().id,
        session.score(),
        session.high_score(),
        merges,
        stages_cleared,
        session.game_over_reason()
    );
    Ok(())
}
