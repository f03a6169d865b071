//! Trains two vehicles to cross an intersection with the kinematic simulator.
mod config;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use config::RunConfig;
use crossing_core::{
    record::{AggregateRecorder, NullRecorder},
    sim::KinematicSim,
    Coordinator, IndependentTopology, JointTopology, RunStats, Topology, TrainOption,
    ValueFunction,
};
use crossing_tch_agent::{JointQ, JointQConfig, LocalQ, QNet, QNetConfig};
use crossing_tensorboard::TensorboardRecorder;
use log::info;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TopologyArg {
    /// Each vehicle reads its own features.
    Independent,
    /// Each vehicle also reads the master input.
    Joint,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TrainOptionArg {
    /// Train after every step.
    Step,
    /// Train at the end of every episode.
    Trajectory,
    /// Train on a batch of episodes.
    Batch,
}

/// Train Q-networks of two vehicles crossing an intersection
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration of the run
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network topology
    #[arg(long, value_enum, default_value_t = TopologyArg::Independent)]
    topology: TopologyArg,

    /// Vehicles take turns in training
    #[arg(short, long, default_value_t = false)]
    alternate: bool,

    /// When the networks are trained
    #[arg(long, value_enum)]
    train_option: Option<TrainOptionArg>,

    /// Number of episodes per batch with `--train-option batch`
    #[arg(long, default_value_t = 10)]
    batch_episodes: usize,

    /// Number of episodes
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Snapshot directory loaded before training
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Name of the saved snapshot
    #[arg(short, long)]
    tag: Option<String>,

    /// Random seed of exploration, simulator and network initialization
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write records to TensorBoard
    #[arg(long, default_value_t = false)]
    tensorboard: bool,
}

/// Merges command-line options into the configuration.
fn apply_args(args: &Args, mut config: RunConfig) -> RunConfig {
    let mut coordinator = config.experiment.coordinator;
    if args.alternate {
        let period = coordinator.alternate_period;
        coordinator = coordinator.alternate(period);
    }
    if let Some(v) = args.train_option {
        coordinator = coordinator.train_option(match v {
            TrainOptionArg::Step => TrainOption::Step,
            TrainOptionArg::Trajectory => TrainOption::Trajectory,
            TrainOptionArg::Batch => TrainOption::BatchOfTrajectories {
                episodes: args.batch_episodes,
            },
        });
    }
    if let Some(v) = args.episodes {
        coordinator = coordinator.max_episodes(v);
    }
    if let Some(v) = &args.load {
        coordinator = coordinator.load_weights(v);
    }
    if let Some(v) = &args.tag {
        coordinator = coordinator.tag(v.as_str());
    }
    config.experiment.coordinator = coordinator;

    if let Some(seed) = args.seed {
        config.experiment.explorer = config.experiment.explorer.seed(seed);
        config.experiment.sim = config.experiment.sim.seed(seed);
    }
    config
}

fn create_recorder(args: &Args, config: &RunConfig) -> Box<dyn AggregateRecorder> {
    match args.tensorboard {
        true => {
            let coordinator = &config.experiment.coordinator;
            let logdir = coordinator
                .weights_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("experiments"))
                .join(&coordinator.experiment_id)
                .join("tensorboard");
            info!("Write records to {:?}", logdir);
            Box::new(TensorboardRecorder::new(logdir))
        }
        false => Box::new(NullRecorder::default()),
    }
}

fn train<Q, T>(
    config: &RunConfig,
    qnet: Q,
    topology: T,
    recorder: &mut dyn AggregateRecorder,
) -> Result<RunStats>
where
    Q: ValueFunction,
    T: Topology,
{
    let sim = KinematicSim::build(config.experiment.sim.clone());
    let mut coordinator = Coordinator::build(&config.experiment, sim, qnet, topology);
    coordinator.run(recorder)
}

fn run(args: &Args, config: &RunConfig) -> Result<RunStats> {
    let mut recorder = create_recorder(args, config);
    let layout = config.experiment.master_layout;

    match args.topology {
        TopologyArg::Independent => {
            let qnet: QNet<LocalQ> = QNet::build(
                QNetConfig::new(LocalQ::default_config())
                    .opt_config(config.optimizer.clone())
                    .device(config.device),
            );
            train(config, qnet, IndependentTopology, recorder.as_mut())
        }
        TopologyArg::Joint => {
            let qnet: QNet<JointQ> = QNet::build(
                QNetConfig::new(JointQConfig::new(layout))
                    .opt_config(config.optimizer.clone())
                    .device(config.device),
            );
            train(config, qnet, JointTopology::new(layout), recorder.as_mut())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let config = apply_args(&args, config);
    if let Some(seed) = args.seed {
        tch::manual_seed(seed as i64);
    }

    let stats = run(&args, &config)?;
    info!("{:?}", stats);

    Ok(())
}
