//! Epsilon-greedy exploration.
use crate::{error::CrossingError, Action, VehicleId, N_ACTIONS};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How random actions are drawn when a step explores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RandomActionMode {
    /// One random action applied to both vehicles.
    Shared,

    /// One random action per vehicle.
    Independent,
}

impl Default for RandomActionMode {
    fn default() -> Self {
        Self::Shared
    }
}

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Initial epsilon.
    pub eps_start: f64,

    /// Factor applied to epsilon every `decay_interval` steps.
    pub eps_decay: f64,

    /// Number of steps between two decays.
    pub decay_interval: usize,

    /// Lower bound of epsilon.
    pub eps_min: f64,

    /// How random actions are drawn.
    pub random_action: RandomActionMode,

    /// Seed of the random number generator. Taken from entropy if `None`.
    pub seed: Option<u64>,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            eps_start: 0.9,
            eps_decay: 0.98,
            decay_interval: 5,
            eps_min: 0.0,
            random_action: RandomActionMode::Shared,
            seed: None,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial epsilon.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Sets the decay factor.
    pub fn eps_decay(mut self, v: f64) -> Self {
        self.eps_decay = v;
        self
    }

    /// Sets the number of steps between two decays.
    pub fn decay_interval(mut self, v: usize) -> Self {
        self.decay_interval = v;
        self
    }

    /// Sets the lower bound of epsilon.
    pub fn eps_min(mut self, v: f64) -> Self {
        self.eps_min = v;
        self
    }

    /// Sets how random actions are drawn.
    pub fn random_action(mut self, v: RandomActionMode) -> Self {
        self.random_action = v;
        self
    }

    /// Sets the seed of the random number generator.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = Some(v);
        self
    }
}

/// Exploration state kept across episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyState {
    /// Probability of exploring at the next step.
    pub epsilon: f64,

    /// Number of decay calls so far.
    pub steps: usize,
}

/// Actions chosen for both vehicles at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Actions indexed by [`VehicleId::index`].
    pub actions: [Action; 2],

    /// The actions were drawn at random.
    pub explored: bool,
}

impl Decision {
    /// Action of `vehicle`.
    pub fn action(&self, vehicle: VehicleId) -> Action {
        self.actions[vehicle.index()]
    }
}

/// Epsilon-greedy action selection for both vehicles.
///
/// A single Bernoulli draw decides whether the whole step explores. Epsilon is
/// not owned here: it lives in a [`PolicyState`] passed by the caller.
pub struct EpsilonGreedy {
    config: EpsilonGreedyConfig,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Constructs the explorer.
    pub fn build(config: EpsilonGreedyConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Configuration.
    pub fn config(&self) -> &EpsilonGreedyConfig {
        &self.config
    }

    /// State at the start of a run.
    pub fn initial_state(&self) -> PolicyState {
        PolicyState {
            epsilon: self.config.eps_start,
            steps: 0,
        }
    }

    /// Chooses the actions of both vehicles.
    ///
    /// `greedy` returns the arg-max action of a vehicle under its value
    /// function. It is called once per vehicle, and only when the step does
    /// not explore.
    pub fn select_actions<F>(
        &mut self,
        state: &PolicyState,
        mut greedy: F,
    ) -> Result<Decision, CrossingError>
    where
        F: FnMut(VehicleId) -> Result<Action, CrossingError>,
    {
        if self.rng.gen::<f64>() < state.epsilon {
            let actions = match self.config.random_action {
                RandomActionMode::Shared => {
                    let a = self.random_action();
                    [a, a]
                }
                RandomActionMode::Independent => [self.random_action(), self.random_action()],
            };
            log::trace!("Random actions: {:?}", actions);
            Ok(Decision {
                actions,
                explored: true,
            })
        } else {
            let actions = [greedy(VehicleId::Car1)?, greedy(VehicleId::Car2)?];
            Ok(Decision {
                actions,
                explored: false,
            })
        }
    }

    /// Counts a step and decays epsilon every `decay_interval` steps.
    pub fn decay(&self, state: &mut PolicyState) {
        state.steps += 1;
        if self.config.decay_interval > 0 && state.steps % self.config.decay_interval == 0 {
            state.epsilon = (state.epsilon * self.config.eps_decay).max(self.config.eps_min);
        }
    }

    fn random_action(&mut self) -> Action {
        // The index is always in range.
        Action::from_index(self.rng.gen_range(0..N_ACTIONS)).unwrap_or(Action::Fast)
    }
}
