use anyhow::Result;
use crossing_core::{
    record::BufferedRecorder, sim::KinematicSim, Coordinator, CoordinatorConfig,
    EpsilonGreedyConfig, ExperimentConfig, IndependentTopology, JointTopology, MasterLayout,
    TrainOption,
};
use crossing_tch_agent::{JointQ, JointQConfig, LocalQ, QNet, QNetConfig};
use tempdir::TempDir;

fn config(coordinator: CoordinatorConfig) -> ExperimentConfig {
    ExperimentConfig::default()
        .coordinator(coordinator.settle_delay_ms(0).weights_root(None))
        .explorer(EpsilonGreedyConfig::default().seed(7))
}

#[test]
fn test_independent_qnet_runs() -> Result<()> {
    tch::manual_seed(42);
    let config = config(
        CoordinatorConfig::default()
            .max_episodes(3)
            .max_steps(20)
            .record_param_stats_interval(1),
    );
    let qnet: QNet<LocalQ> = QNet::build(QNetConfig::new(LocalQ::default_config()));
    let sim = KinematicSim::build(config.sim.clone());
    let mut coord = Coordinator::build(&config, sim, qnet, IndependentTopology);

    let mut recorder = BufferedRecorder::new();
    let stats = coord.run(&mut recorder)?;
    assert_eq!(stats.episodes + stats.aborted, 3);
    assert_eq!(stats.aborted, 0);
    for record in recorder.iter() {
        assert!(record.get_scalar("loss")?.is_finite());
        assert!(record.get("q.ln0.weight_mean").is_some());
    }
    Ok(())
}

#[test]
fn test_joint_qnet_alternates_and_saves() -> Result<()> {
    tch::manual_seed(42);
    let dir = TempDir::new("joint_qnet")?;
    let layout = MasterLayout::Concatenated;
    let mut config = config(
        CoordinatorConfig::default()
            .max_episodes(2)
            .max_steps(10)
            .train_option(TrainOption::Step)
            .alternate(1),
    )
    .master_layout(layout);
    config.coordinator = config
        .coordinator
        .weights_root(Some(dir.path().to_path_buf()))
        .tag("joint");

    let qnet: QNet<JointQ> = QNet::build(QNetConfig::new(JointQConfig::new(layout)));
    let sim = KinematicSim::build(config.sim.clone());
    let mut coord = Coordinator::build(&config, sim, qnet, JointTopology::new(layout));

    let stats = coord.run(&mut BufferedRecorder::new())?;
    assert_eq!(stats.aborted, 0);

    let snapshot = dir.path().join("global_experiment/weights/joint");
    assert!(snapshot.join("qnet.pt").exists());
    assert!(snapshot.join("qnet_frozen.pt").exists());
    Ok(())
}
