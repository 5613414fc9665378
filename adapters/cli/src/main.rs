#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Don't Blink experience.
//!
//! The binary runs a headless session: a scripted tracker blinks on a fixed
//! cadence while the world, the encounter and the heartbeat advance frame by
//! frame, and a summary is printed once the session ends.

mod config;
mod logging;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use dont_blink_world::{query, LevelId, World};
use log::info;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config::Tuning,
    session::{BlinkScript, HeadlessBackend, SessionOptions},
};

/// Headless Don't Blink session runner.
#[derive(Debug, Parser)]
#[command(name = "dont-blink", author, version, about, long_about = None)]
struct Args {
    /// Level to play.
    #[arg(long, value_enum, default_value_t = LevelArg::Crypt)]
    level: LevelArg,
    /// TOML tuning file overriding encounter and heartbeat defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for enemy placement; a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 1_200)]
    frames: u64,
    /// Length of one frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Blink once every this many milliseconds; never blink when omitted.
    #[arg(long)]
    blink_every_ms: Option<u64>,
    /// Hide the face from the tracker starting at this many milliseconds.
    #[arg(long)]
    face_lost_at_ms: Option<u64>,
    /// How long the face stays hidden, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    face_lost_for_ms: u64,
    /// Restart the level this many times after it ends.
    #[arg(long, default_value_t = 0)]
    retries: u32,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Training,
    Crypt,
}

impl From<LevelArg> for LevelId {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Training => Self::Training,
            LevelArg::Crypt => Self::Crypt,
        }
    }
}

/// Entry point for the Don't Blink command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");

    let tuning = match &args.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let level = LevelId::from(args.level);
    let mut world = World::from_builtin(level)
        .with_context(|| format!("failed to build the {level:?} level"))?;
    println!("{}", query::welcome_banner(&world));

    let frame = Duration::from_millis(args.frame_ms);
    let mut script = BlinkScript::new(frame, args.blink_every_ms.map(Duration::from_millis));
    if let Some(start) = args.face_lost_at_ms {
        script = script.with_face_lost(
            Duration::from_millis(start),
            Duration::from_millis(args.face_lost_for_ms),
        );
    }
    let options = SessionOptions {
        encounter: tuning.encounter_config(),
        heartbeat: tuning.heartbeat_config(),
        script,
    };
    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => {
            info!("placing the enemy with seed {seed}");
            Box::new(ChaCha8Rng::seed_from_u64(seed))
        }
        None => Box::new(rand::thread_rng()),
    };

    let summary = session::run(
        &mut world,
        HeadlessBackend::new(args.frames, frame).with_retries(args.retries),
        options,
        rng.as_mut(),
    )?;
    println!("{summary}");
    Ok(())
}
