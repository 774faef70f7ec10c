use std::path::PathBuf;

use anyhow::{anyhow, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    config::Config,
};
use clap::Parser;
use deepq::{
    env::Player,
    gym::{Pong, PongAction},
    DeepQLearner, LearnerConfig,
};
use log::{info, LevelFilter};
use strum::VariantArray;

type Backend = Autodiff<NdArray>;

/// Train a deep Q learner to play Pong from raw pixels
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of game ticks to play
    #[arg(short, long, default_value_t = 100_000)]
    ticks: u64,

    /// JSON file holding the learner configuration, defaults are used if absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory checkpoints are written to and restored from
    #[arg(long)]
    checkpoint_dir: Option<String>,

    /// Restore the network from the checkpoint directory before playing
    #[arg(short, long)]
    restore: bool,

    /// Never write checkpoints
    #[arg(long)]
    no_save: bool,

    /// Seed for the learner and the game
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LearnerConfig::load(path)
            .map_err(|err| anyhow!("failed to load {}: {err:?}", path.display()))?,
        None => LearnerConfig::new(),
    };
    if let Some(dir) = args.checkpoint_dir {
        config.checkpoint_dir = dir;
    }
    config.restore |= args.restore;
    config.save &= !args.no_save;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let learner = DeepQLearner::with_backend::<Backend>(
        PongAction::VARIANTS.to_vec(),
        config,
        &NdArrayDevice::default(),
    )?;
    let mut player = Player::new(Pong::new(args.seed), learner);

    info!("playing {} ticks", args.ticks);
    player.run(args.ticks)?;

    let (own, opponent) = player.env().score();
    info!("final score {own} - {opponent}");
    Ok(())
}
