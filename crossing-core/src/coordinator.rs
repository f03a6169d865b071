//! Step and episode loop.
mod config;
use crate::{
    error::CrossingError,
    record::{AggregateRecorder, Record, RecordValue},
    util::snapshot_dir,
    Action, AgentObs, EpsilonGreedy, ExperimentConfig, PolicyState, QNetworks, RewardShaper,
    Simulator, StateFeaturizer, TaggedTransition, Topology, Trainer, TrajectoryStore,
    Transition, ValueFunction, VehicleId, N_ACTIONS,
};
use anyhow::{anyhow, Result};
pub use config::{CoordinatorConfig, TrainOption};
use log::{info, warn};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// The vehicles collided.
    Collided,

    /// Car 1 passed its goal without collision.
    GoalReached,

    /// The episode ran `max_steps` steps.
    StepLimitReached,
}

impl EpisodeOutcome {
    /// Name used in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collided => "collided",
            Self::GoalReached => "goal_reached",
            Self::StepLimitReached => "step_limit_reached",
        }
    }
}

/// Result of [`Coordinator::step`].
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Transitions of car 1 and car 2 appended at this step.
    pub transitions: Vec<TaggedTransition>,

    /// The vehicles collided.
    pub collision: bool,

    /// Car 1 passed its goal.
    pub reached_target: bool,

    /// Reward shared by both transitions.
    pub reward: f32,

    /// The actions were drawn at random.
    pub explored: bool,

    /// Loss of the training done at this step, if any.
    pub loss: Option<f32>,
}

/// Summary of a completed episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Episode number, starting at 1.
    pub episode: usize,

    /// How the episode ended.
    pub outcome: EpisodeOutcome,

    /// The number of steps.
    pub steps: usize,

    /// Sum of the step rewards.
    pub total_reward: f32,

    /// Loss of the training done in the episode, averaged over training calls.
    pub loss: Option<f32>,

    /// Epsilon at the end of the episode.
    pub epsilon: f64,
}

/// Counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Completed episodes.
    pub episodes: usize,

    /// Episodes ended by a collision.
    pub collisions: usize,

    /// Episodes ended at the goal.
    pub goals: usize,

    /// Episodes ended by the step limit.
    pub step_limits: usize,

    /// Episodes aborted by an error.
    pub aborted: usize,

    /// Steps of completed episodes.
    pub total_steps: usize,
}

impl RunStats {
    fn count(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += summary.steps;
        match summary.outcome {
            EpisodeOutcome::Collided => self.collisions += 1,
            EpisodeOutcome::GoalReached => self.goals += 1,
            EpisodeOutcome::StepLimitReached => self.step_limits += 1,
        }
    }
}

fn every(n: usize, interval: usize) -> bool {
    interval > 0 && n % interval == 0
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Drives both vehicles through episodes and trains their value functions.
///
/// # Step
///
/// ```mermaid
/// graph LR
///     S[Simulator]-->|Telemetry|F[StateFeaturizer]
///     F -->|AgentObs|E[EpsilonGreedy]
///     Q[QNetworks]-->|QBatch|E
///     E -->|Action|S
///     S -->|next Telemetry, collision|R[RewardShaper]
///     R -->|TaggedTransition|T[TrajectoryStore]
///     T -->|segment|TR[Trainer]
///     TR -->|fit_step|Q
/// ```
///
/// 1. Read the telemetry of both vehicles and build their observations.
/// 2. Choose the actions of both vehicles with one epsilon-greedy decision.
/// 3. Replace the throttle of each vehicle, keeping its other controls.
/// 4. Let the simulator settle and read the next observations.
/// 5. Compute the reward from the next state of car 1 and the collision flag.
/// 6. Append the transitions of car 1 and car 2, decay epsilon.
/// 7. With [`TrainOption::Step`], train on the transitions of the step.
///
/// # Episode
///
/// An episode starts with a simulator reset and ends on collision, when car 1
/// reaches its goal or after `max_steps` steps. Then its trajectory is trained
/// on ([`TrainOption::Trajectory`]), archived ([`TrainOption::BatchOfTrajectories`])
/// or dropped ([`TrainOption::Step`]).
///
/// Any [`CrossingError`] aborts the running episode: it is logged, its
/// trajectory is dropped and the run goes on with the next episode.
pub struct Coordinator<S, Q, T> {
    config: CoordinatorConfig,
    sim: S,
    networks: QNetworks<Q>,
    trainer: Trainer<T>,
    explorer: EpsilonGreedy,
    policy: PolicyState,
    featurizer: StateFeaturizer,
    shaper: RewardShaper,
    store: TrajectoryStore,
    stats: RunStats,
    episode: usize,
    step_index: usize,
}

impl<S, Q, T> Coordinator<S, Q, T>
where
    S: Simulator,
    Q: ValueFunction,
    T: Topology,
{
    /// Constructs a coordinator.
    pub fn build(config: &ExperimentConfig, sim: S, qnet: Q, topology: T) -> Self {
        let explorer = EpsilonGreedy::build(config.explorer.clone());
        Self {
            networks: QNetworks::new(qnet, config.coordinator.alternate),
            trainer: Trainer::build(config.trainer.clone(), topology),
            policy: explorer.initial_state(),
            explorer,
            featurizer: StateFeaturizer,
            shaper: RewardShaper::build(config.reward.clone()),
            store: TrajectoryStore::new(),
            stats: RunStats::default(),
            episode: 0,
            step_index: 0,
            config: config.coordinator.clone(),
            sim,
        }
    }

    /// Value functions.
    pub fn networks(&self) -> &QNetworks<Q> {
        &self.networks
    }

    /// Exploration state.
    pub fn policy_state(&self) -> &PolicyState {
        &self.policy
    }

    /// Trajectories of the run.
    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    /// Counters of the run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// The simulator.
    pub fn sim(&self) -> &S {
        &self.sim
    }

    fn observe(&mut self) -> Result<[AgentObs; 2], CrossingError> {
        let telemetry = [
            self.sim
                .get_vehicle_state(VehicleId::Car1)
                .map_err(CrossingError::Simulator)?,
            self.sim
                .get_vehicle_state(VehicleId::Car2)
                .map_err(CrossingError::Simulator)?,
        ];
        let topology = self.trainer.topology();
        Ok([
            topology.observe(&self.featurizer, VehicleId::Car1, &telemetry)?,
            topology.observe(&self.featurizer, VehicleId::Car2, &telemetry)?,
        ])
    }

    fn greedy_action(
        networks: &QNetworks<Q>,
        topology: &T,
        vehicle: VehicleId,
        obs: &AgentObs,
    ) -> Result<Action, CrossingError> {
        let input = topology.assemble([obs])?;
        let q = networks
            .for_vehicle(vehicle)
            .predict(&input)
            .map_err(CrossingError::Approximator)?;
        if q.len() != 1 || q.dim() != N_ACTIONS {
            return Err(CrossingError::Approximator(anyhow!(
                "Expected 1 row of {} action values, got {} rows of {}",
                N_ACTIONS,
                q.len(),
                q.dim()
            )));
        }
        let ix = q.argmax_of_row(0);
        Action::from_index(ix).ok_or(CrossingError::InvalidAction(ix))
    }

    /// Performs one step of both vehicles.
    pub fn step(&mut self) -> Result<StepOutcome, CrossingError> {
        let obs = self.observe()?;

        let decision = {
            let networks = &self.networks;
            let topology = self.trainer.topology();
            self.explorer.select_actions(&self.policy, |vehicle| {
                Self::greedy_action(networks, topology, vehicle, &obs[vehicle.index()])
            })?
        };

        for vehicle in VehicleId::ALL {
            let controls = self
                .sim
                .get_controls(vehicle)
                .map_err(CrossingError::Simulator)?;
            self.sim
                .set_controls(vehicle, decision.action(vehicle).apply(controls))
                .map_err(CrossingError::Simulator)?;
        }
        self.sim
            .settle(self.config.settle_delay())
            .map_err(CrossingError::Simulator)?;

        let next_obs = self.observe()?;
        let collision = self
            .sim
            .collision_occurred()
            .map_err(CrossingError::Simulator)?;
        let reward = self
            .shaper
            .reward(&next_obs[VehicleId::Car1.index()].local, collision);
        let is_terminal = collision || reward.goal_reached;

        let step = self.step_index;
        let transitions: Vec<TaggedTransition> = VehicleId::ALL
            .into_iter()
            .zip(obs)
            .zip(next_obs)
            .map(|((vehicle, state), next_state)| TaggedTransition {
                vehicle,
                step,
                transition: Transition {
                    state,
                    action: decision.action(vehicle),
                    next_state,
                    reward: reward.value,
                    is_terminal,
                },
            })
            .collect();
        for t in transitions.iter() {
            self.store.push(t.clone())?;
        }

        self.explorer.decay(&mut self.policy);
        self.step_index += 1;

        let loss = match self.config.train_option {
            TrainOption::Step => self
                .trainer
                .train_on_trajectory(&mut self.networks, self.store.last_step())?,
            _ => None,
        };

        Ok(StepOutcome {
            transitions,
            collision,
            reached_target: reward.goal_reached,
            reward: reward.value,
            explored: decision.explored,
            loss,
        })
    }

    /// Runs an episode from the current simulator state.
    ///
    /// The caller resets the simulator beforehand. Transitions left over from
    /// steps taken outside of an episode are dropped. Losses of per-step training
    /// are stored in `recorder` as `step_loss`.
    pub fn run_episode(
        &mut self,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<EpisodeSummary, CrossingError> {
        self.step_index = 0;
        self.store.discard();
        let mut total_reward = 0.0;
        let mut losses = vec![];

        let outcome = loop {
            if self.step_index >= self.config.max_steps {
                break EpisodeOutcome::StepLimitReached;
            }
            let s = self.step()?;
            total_reward += s.reward;
            if let Some(loss) = s.loss {
                losses.push(loss);
                recorder.store(Record::from_scalar("step_loss", loss));
            }
            if s.collision {
                break EpisodeOutcome::Collided;
            } else if s.reached_target {
                break EpisodeOutcome::GoalReached;
            }
        };

        match self.config.train_option {
            TrainOption::Step => self.store.discard(),
            TrainOption::Trajectory => {
                let loss = self
                    .trainer
                    .train_on_trajectory(&mut self.networks, self.store.all())?;
                losses.extend(loss);
                self.store.discard();
            }
            TrainOption::BatchOfTrajectories { episodes } => {
                self.store.archive();
                if self.store.n_archived() >= episodes.max(1) {
                    let batch = self.store.take_archived();
                    info!("Training on {} archived transitions", batch.len());
                    let loss = self.trainer.train_on_trajectory(&mut self.networks, &batch)?;
                    losses.extend(loss);
                }
            }
        }

        let loss = match losses.len() {
            0 => None,
            n => Some(losses.iter().sum::<f32>() / n as f32),
        };

        Ok(EpisodeSummary {
            episode: self.episode,
            outcome,
            steps: self.step_index,
            total_reward,
            loss,
            epsilon: self.policy.epsilon,
        })
    }

    fn episode_record(&self, summary: &EpisodeSummary) -> Record {
        let mut record = Record::from_slice(&[
            ("episode", RecordValue::Scalar(summary.episode as f32)),
            ("episode_reward", RecordValue::Scalar(summary.total_reward)),
            ("steps", RecordValue::Scalar(summary.steps as f32)),
            ("epsilon", RecordValue::Scalar(summary.epsilon as f32)),
            ("collisions", RecordValue::Scalar(self.stats.collisions as f32)),
            (
                "outcome",
                RecordValue::String(summary.outcome.as_str().to_string()),
            ),
        ]);
        if let Some(loss) = summary.loss {
            record.insert("loss", RecordValue::Scalar(loss));
        }
        record
    }

    /// Saves the value functions under `<weights_root>/<experiment_id>/weights/<tag>`.
    ///
    /// Does nothing if `weights_root` is `None`.
    pub fn save(&self) -> Result<()> {
        if let Some(root) = &self.config.weights_root {
            let dir = snapshot_dir(root, &self.config.experiment_id, &self.config.tag);
            self.networks.save(&dir)?;
        }
        Ok(())
    }

    /// Runs `max_episodes` episodes.
    ///
    /// Aborted episodes are counted and skipped. Errors while loading or
    /// saving snapshots, or resetting the simulator, end the run.
    pub fn run(&mut self, recorder: &mut dyn AggregateRecorder) -> Result<RunStats> {
        if let Some(dir) = self.config.load_weights.clone() {
            self.networks.load(&dir)?;
        }
        info!(
            "Start {} episodes, topology = {}, train option = {:?}, alternate = {}",
            self.config.max_episodes,
            self.trainer.topology().name(),
            self.config.train_option,
            self.config.alternate
        );

        for _ in 0..self.config.max_episodes {
            self.sim.reset()?;
            self.episode += 1;

            match self.run_episode(recorder) {
                Ok(summary) => {
                    self.stats.count(&summary);
                    info!(
                        "Episode {}: {} after {} steps, reward = {:.1}, epsilon = {:.4}, loss = {:?}",
                        summary.episode,
                        summary.outcome.as_str(),
                        summary.steps,
                        summary.total_reward,
                        summary.epsilon,
                        summary.loss
                    );
                    recorder.store(self.episode_record(&summary));
                }
                Err(e) => {
                    self.store.discard();
                    self.stats.aborted += 1;
                    warn!("Episode {} aborted: {}", self.episode, e);
                }
            }

            if every(self.episode, self.config.record_param_stats_interval) {
                recorder.store(self.networks.active().param_stats());
            }
            recorder.flush(self.episode as i64);

            if self.networks.is_alternating() && every(self.episode, self.config.alternate_period) {
                self.networks.promote();
                self.networks.swap_roles();
            }

            if every(self.episode, self.config.save_interval) {
                self.save()?;
            }
        }

        self.save()?;
        info!(
            "Finished: {} episodes, {} collisions, {} goals, {} step limits, {} aborted",
            self.stats.episodes,
            self.stats.collisions,
            self.stats.goals,
            self.stats.step_limits,
            self.stats.aborted
        );
        Ok(self.stats.clone())
    }
}
