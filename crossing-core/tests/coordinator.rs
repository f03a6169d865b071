use anyhow::Result;
use crossing_core::{
    dummy::DummyValueFunction,
    keys,
    record::{BufferedRecorder, NullRecorder},
    sim::{KinematicSim, KinematicSimConfig},
    Coordinator, CoordinatorConfig, EpisodeOutcome, EpsilonGreedyConfig, ExperimentConfig,
    IndependentTopology, JointTopology, Simulator, Telemetry, TrainOption, VehicleControls,
    VehicleId,
};
use std::time::Duration;
use tempdir::TempDir;

type Coord<S, T> = Coordinator<S, DummyValueFunction, T>;

fn config(coordinator: CoordinatorConfig) -> ExperimentConfig {
    ExperimentConfig::default()
        .coordinator(coordinator.settle_delay_ms(0).weights_root(None))
        .explorer(EpsilonGreedyConfig::default().eps_start(0.0).seed(42))
}

// Car 2 starts far enough never to meet car 1.
fn far_sim() -> KinematicSim {
    KinematicSim::build(KinematicSimConfig::default().pose(VehicleId::Car2, [0.0, -5000.0], 90.0))
}

// Greedy action is always `Fast`.
fn fast() -> DummyValueFunction {
    DummyValueFunction::constant([1.0, 0.0])
}

#[test]
fn test_same_speed_ends_in_collision() -> Result<()> {
    let config = config(CoordinatorConfig::default());
    let sim = KinematicSim::build(config.sim.clone());
    let mut coord: Coord<_, _> = Coordinator::build(&config, sim, fast(), IndependentTopology);

    let summary = coord.run_episode(&mut NullRecorder::default())?;
    assert_eq!(summary.outcome, EpisodeOutcome::Collided);
    assert!(summary.total_reward <= -1000.0);
    assert_eq!(coord.networks().active().n_fits(), 1);
    assert!(coord.store().is_empty());
    Ok(())
}

#[test]
fn test_goal_reached() -> Result<()> {
    let config = config(CoordinatorConfig::default());
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), JointTopology::default());

    let summary = coord.run_episode(&mut NullRecorder::default())?;
    assert_eq!(summary.outcome, EpisodeOutcome::GoalReached);
    assert!(coord.sim().position(VehicleId::Car1)[0] > 10.0);

    // The fitted batch holds both vehicles of every step.
    let (input, _) = coord.networks().active().last_fit().unwrap();
    assert_eq!(input.len(), 2 * summary.steps);
    assert_eq!(input.joint.as_ref().unwrap().dim(), 7);
    Ok(())
}

#[test]
fn test_step_cadence() -> Result<()> {
    let config = config(
        CoordinatorConfig::default()
            .max_steps(5)
            .train_option(TrainOption::Step),
    );
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);

    let s = coord.step()?;
    assert_eq!(s.transitions.len(), 2);
    assert!(s.loss.is_some());
    assert!(!s.explored);
    let (input, _) = coord.networks().active().last_fit().unwrap();
    assert_eq!(input.len(), 2);

    let mut recorder = BufferedRecorder::new();
    let summary = coord.run_episode(&mut recorder)?;
    assert_eq!(summary.outcome, EpisodeOutcome::StepLimitReached);
    assert_eq!(summary.steps, 5);
    assert_eq!(coord.networks().active().n_fits(), 6);
    assert!(coord.store().is_empty());
    Ok(())
}

#[test]
fn test_zero_max_steps_takes_no_step() -> Result<()> {
    let config = config(CoordinatorConfig::default().max_steps(0));
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);

    let summary = coord.run_episode(&mut NullRecorder::default())?;
    assert_eq!(summary.outcome, EpisodeOutcome::StepLimitReached);
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.loss, None);
    assert_eq!(coord.networks().active().n_fits(), 0);
    assert_eq!(coord.sim().position(VehicleId::Car1), far_sim().position(VehicleId::Car1));
    Ok(())
}

#[test]
fn test_batch_of_trajectories_cadence() -> Result<()> {
    let config = config(
        CoordinatorConfig::default()
            .max_episodes(3)
            .max_steps(3)
            .train_option(TrainOption::BatchOfTrajectories { episodes: 2 }),
    );
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);

    let stats = coord.run(&mut NullRecorder::default())?;
    assert_eq!(stats.episodes, 3);
    assert_eq!(stats.step_limits, 3);
    assert_eq!(coord.networks().active().n_fits(), 1);
    let (input, _) = coord.networks().active().last_fit().unwrap();
    assert_eq!(input.len(), 2 * 2 * 3);
    assert_eq!(coord.store().n_archived(), 1);
    Ok(())
}

#[test]
fn test_epsilon_decays_per_step() -> Result<()> {
    let mut config = config(CoordinatorConfig::default().max_steps(10));
    config.explorer = EpsilonGreedyConfig::default().eps_start(0.5).seed(1);
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);

    coord.run_episode(&mut NullRecorder::default())?;
    let state = coord.policy_state();
    assert_eq!(state.steps, 10);
    assert!((state.epsilon - 0.5 * 0.98 * 0.98).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_alternation_swaps_training_vehicle() -> Result<()> {
    let config = config(
        CoordinatorConfig::default()
            .max_episodes(1)
            .max_steps(3)
            .alternate(1),
    );
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);
    assert_eq!(coord.networks().training_vehicle(), VehicleId::Car1);

    coord.run(&mut NullRecorder::default())?;
    let networks = coord.networks();
    assert_eq!(networks.training_vehicle(), VehicleId::Car2);
    assert_eq!(networks.frozen().offset(), networks.active().offset());

    // Only the rows of car 1 were fitted.
    let (input, _) = networks.active().last_fit().unwrap();
    assert_eq!(input.len(), 3);
    Ok(())
}

#[test]
fn test_records_per_episode() -> Result<()> {
    let config = config(CoordinatorConfig::default().max_episodes(2).max_steps(4));
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);
    let mut recorder = BufferedRecorder::new();
    coord.run(&mut recorder)?;

    assert_eq!(recorder.len(), 2);
    for (i, record) in recorder.iter().enumerate() {
        assert_eq!(record.get_scalar("step")?, (i + 1) as f32);
        assert_eq!(record.get_scalar("steps")?, 4.0);
        assert_eq!(record.get_string("outcome")?, "step_limit_reached");
        assert!(record.get_scalar("loss").is_ok());
    }
    Ok(())
}

/// Drops a telemetry field on every read.
struct MissingSpeed(KinematicSim);

impl Simulator for MissingSpeed {
    fn get_vehicle_state(&mut self, vehicle: VehicleId) -> Result<Telemetry> {
        let mut t = self.0.get_vehicle_state(vehicle)?;
        t.remove(keys::V_C2);
        Ok(t)
    }

    fn get_controls(&mut self, vehicle: VehicleId) -> Result<VehicleControls> {
        self.0.get_controls(vehicle)
    }

    fn set_controls(&mut self, vehicle: VehicleId, controls: VehicleControls) -> Result<()> {
        self.0.set_controls(vehicle, controls)
    }

    fn collision_occurred(&mut self) -> Result<bool> {
        self.0.collision_occurred()
    }

    fn reset(&mut self) -> Result<()> {
        self.0.reset()
    }

    fn settle(&mut self, delay: Duration) -> Result<()> {
        self.0.settle(delay)
    }
}

#[test]
fn test_errors_abort_episodes() -> Result<()> {
    let config = config(CoordinatorConfig::default().max_episodes(3));
    let mut coord: Coord<_, _> = Coordinator::build(
        &config,
        MissingSpeed(far_sim()),
        fast(),
        IndependentTopology,
    );
    let stats = coord.run(&mut NullRecorder::default())?;
    assert_eq!(stats.aborted, 3);
    assert_eq!(stats.episodes, 0);
    assert_eq!(coord.networks().active().n_fits(), 0);

    let mut coord: Coord<_, _> = Coordinator::build(
        &config,
        far_sim(),
        DummyValueFunction::failing(),
        IndependentTopology,
    );
    let stats = coord.run(&mut NullRecorder::default())?;
    assert_eq!(stats.aborted, 3);
    assert!(coord.store().is_empty());
    Ok(())
}

#[test]
fn test_save_and_load_snapshot() -> Result<()> {
    let dir = TempDir::new("crossing_snapshot")?;
    let mut config = config(CoordinatorConfig::default().max_episodes(1).max_steps(3));
    config.coordinator = config
        .coordinator
        .weights_root(Some(dir.path().to_path_buf()))
        .experiment_id("local_experiment")
        .tag("test");

    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);
    coord.run(&mut NullRecorder::default())?;
    let snapshot = dir.path().join("local_experiment/weights/test");
    assert!(snapshot.join("qnet.pt").exists());
    let trained = coord.networks().active().offset();

    config.coordinator = config
        .coordinator
        .max_episodes(0)
        .weights_root(None)
        .load_weights(&snapshot);
    let mut coord: Coord<_, _> =
        Coordinator::build(&config, far_sim(), fast(), IndependentTopology);
    coord.run(&mut NullRecorder::default())?;
    assert_eq!(coord.networks().active().offset(), trained);
    Ok(())
}

#[test]
fn test_greedy_follows_predictions() -> Result<()> {
    let config = config(CoordinatorConfig::default());
    let slow = DummyValueFunction::constant([0.0, 1.0]);
    let mut coord: Coord<_, _> = Coordinator::build(&config, far_sim(), slow, IndependentTopology);
    let s = coord.step()?;
    for t in s.transitions.iter() {
        assert_eq!(t.transition.action, crossing_core::Action::Slow);
        assert_eq!(t.step, 0);
    }
    Ok(())
}
