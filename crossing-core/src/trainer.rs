//! Temporal-difference training of value functions.
mod config;
mod networks;
use crate::{
    error::CrossingError, deinterleave, reinterleave, Columns, QBatch, TaggedTransition,
    Topology, ValueFunction, VehicleId, N_ACTIONS,
};
pub use config::TrainerConfig;
use log::trace;
pub use networks::QNetworks;

/// Moves `q[action]` a fraction `lr` of the way toward `target`.
///
/// Other components are left unchanged, so they contribute no gradient when
/// the result is used as a regression target.
pub fn soft_td_update(q: &mut [f32], action: usize, target: f32, lr: f32) {
    q[action] += lr * (target - q[action]);
}

/// Fits value functions on trajectory segments.
///
/// For every row the Bellman target `reward + discount * max(next_q)` is
/// computed, the predicted value of the taken action is softly moved toward
/// it and the approximator does one fit step on the whole batch. Terminal
/// rows are bootstrapped like any other row.
pub struct Trainer<T> {
    config: TrainerConfig,
    topology: T,
}

impl<T: Topology> Trainer<T> {
    /// Constructs the trainer.
    pub fn build(config: TrainerConfig, topology: T) -> Self {
        Self { config, topology }
    }

    /// Configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Topology the inputs are assembled with.
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// Predicts the values of `states` and `next_states` of the given rows.
    fn predict_group<Q: ValueFunction>(
        &self,
        qnet: &Q,
        columns: &Columns,
        ixs: &[usize],
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), CrossingError> {
        let states = self.topology.assemble(ixs.iter().map(|&i| columns.states[i]))?;
        let next_states = self
            .topology
            .assemble(ixs.iter().map(|&i| columns.next_states[i]))?;
        let q = qnet.predict(&states).map_err(CrossingError::Approximator)?;
        let next_q = qnet
            .predict(&next_states)
            .map_err(CrossingError::Approximator)?;
        let rows = |b: QBatch| b.rows().map(|r| r.to_vec()).collect::<Vec<_>>();
        Ok((rows(q), rows(next_q)))
    }

    /// Trains the value functions on `segment` and returns the loss.
    ///
    /// Rows are grouped per vehicle, predicted with that vehicle's value
    /// function and scattered back, so row `i` of every batch belongs to
    /// `segment[i]`. With alternation only the rows of the training vehicle
    /// are fitted. Returns `None` if there is nothing to fit.
    pub fn train_on_trajectory<Q: ValueFunction>(
        &self,
        networks: &mut QNetworks<Q>,
        segment: &[TaggedTransition],
    ) -> Result<Option<f32>, CrossingError> {
        let fitted: Vec<usize> = segment
            .iter()
            .enumerate()
            .filter(|(_, t)| networks.trains(t.vehicle))
            .map(|(i, _)| i)
            .collect();
        if fitted.is_empty() {
            return Ok(None);
        }

        let columns = Columns::from_segment(segment);
        let mut q_groups = vec![];
        let mut next_q_groups = vec![];
        for (vehicle, ixs) in VehicleId::ALL.into_iter().zip(deinterleave(segment)) {
            if ixs.is_empty() {
                continue;
            }
            let (q, next_q) = self.predict_group(networks.for_vehicle(vehicle), &columns, &ixs)?;
            q_groups.push((ixs.clone(), q));
            next_q_groups.push((ixs, next_q));
        }
        let mut current_q = reinterleave(q_groups)?;
        let next_q = reinterleave(next_q_groups)?;

        let gamma = self.config.discount_factor;
        let lr = self.config.td_learning_rate;
        for &i in fitted.iter() {
            if !next_q[i].iter().all(|v| v.is_finite()) {
                return Err(CrossingError::NonFiniteTarget { row: i });
            }
            let max_next = next_q[i].iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let target = columns.rewards[i] + gamma * max_next;
            soft_td_update(&mut current_q[i], columns.actions[i].index(), target, lr);
            if !current_q[i].iter().all(|v| v.is_finite()) {
                return Err(CrossingError::NonFiniteTarget { row: i });
            }
        }

        let input = self
            .topology
            .assemble(fitted.iter().map(|&i| columns.states[i]))?;
        let target = QBatch::from_rows(N_ACTIONS, fitted.iter().map(|&i| current_q[i].as_slice()));
        let loss = networks
            .active_mut()
            .fit_step(&input, &target)
            .map_err(CrossingError::Approximator)?;
        trace!("Fitted {} of {} rows, loss = {}", fitted.len(), segment.len(), loss);

        Ok(Some(loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::DummyValueFunction, Action, AgentObs, IndependentTopology, Transition,
        LOCAL_DIM,
    };

    fn obs(v: f32) -> AgentObs {
        AgentObs {
            joint: None,
            local: [v; LOCAL_DIM].into(),
        }
    }

    fn transition(
        vehicle: VehicleId,
        step: usize,
        action: Action,
        reward: f32,
    ) -> TaggedTransition {
        TaggedTransition {
            vehicle,
            step,
            transition: Transition {
                state: obs(0.0),
                action,
                next_state: obs(1.0),
                reward,
                is_terminal: false,
            },
        }
    }

    // Values [0.1, 0.3] for states, [0.2, 0.5] for next states.
    fn qnet() -> DummyValueFunction {
        DummyValueFunction::from_fn(|x| {
            if x[0] == 0.0 {
                [0.1, 0.3]
            } else {
                [0.2, 0.5]
            }
        })
    }

    fn trainer() -> Trainer<IndependentTopology> {
        Trainer::build(TrainerConfig::default(), IndependentTopology)
    }

    #[test]
    fn test_soft_td_update() {
        let mut q = [0.1, 0.3];
        soft_td_update(&mut q, 1, 0.375, 0.003);
        assert!((q[1] - 0.300225).abs() < 1e-6);
        assert_eq!(q[0], 0.1);
    }

    #[test]
    fn test_fixed_point() {
        let mut q = [0.1, 0.3];
        soft_td_update(&mut q, 0, 0.1, 0.003);
        assert_eq!(q, [0.1, 0.3]);
    }

    #[test]
    fn test_train_on_trajectory_target() {
        let mut networks = QNetworks::new(qnet(), false);
        let segment = vec![transition(VehicleId::Car1, 0, Action::Slow, -0.1)];
        let loss = trainer()
            .train_on_trajectory(&mut networks, &segment)
            .unwrap();
        assert!(loss.is_some());

        let (_, target) = networks.active().last_fit().unwrap();
        assert_eq!(target.len(), 1);
        assert!((target.row(0)[0] - 0.1).abs() < 1e-7);
        assert!((target.row(0)[1] - 0.300225).abs() < 1e-6);
    }

    #[test]
    fn test_empty_segment_is_noop() {
        let mut networks = QNetworks::new(qnet(), false);
        let loss = trainer().train_on_trajectory(&mut networks, &[]).unwrap();
        assert_eq!(loss, None);
        assert_eq!(networks.active().n_fits(), 0);
    }

    #[test]
    fn test_alternating_fits_training_vehicle_rows() {
        let mut networks = QNetworks::new(qnet(), true);
        let segment: Vec<_> = (0..3)
            .flat_map(|step| {
                VehicleId::ALL
                    .into_iter()
                    .map(move |v| transition(v, step, Action::Fast, 1.0))
            })
            .collect();
        trainer()
            .train_on_trajectory(&mut networks, &segment)
            .unwrap();
        let (input, _) = networks.active().last_fit().unwrap();
        assert_eq!(input.len(), 3);

        networks.swap_roles();
        let car1_only = vec![transition(VehicleId::Car1, 0, Action::Fast, 1.0)];
        let n_fits = networks.active().n_fits();
        let loss = trainer()
            .train_on_trajectory(&mut networks, &car1_only)
            .unwrap();
        assert_eq!(loss, None);
        assert_eq!(networks.active().n_fits(), n_fits);
    }

    #[test]
    fn test_non_finite_target() {
        let mut networks = QNetworks::new(qnet(), false);
        let segment = vec![
            transition(VehicleId::Car1, 0, Action::Fast, 0.0),
            transition(VehicleId::Car2, 0, Action::Fast, f32::NAN),
        ];
        let r = trainer().train_on_trajectory(&mut networks, &segment);
        assert!(matches!(r, Err(CrossingError::NonFiniteTarget { row: 1 })));
        assert_eq!(networks.active().n_fits(), 0);
    }

    #[test]
    fn test_non_finite_predictions() {
        let segment = vec![transition(VehicleId::Car1, 0, Action::Fast, 0.0)];

        // NaN among the next values, even one that max would skip.
        let nan_next = DummyValueFunction::from_fn(|x| {
            if x[0] == 0.0 {
                [0.1, 0.3]
            } else {
                [f32::NAN, 0.5]
            }
        });
        let mut networks = QNetworks::new(nan_next, false);
        let r = trainer().train_on_trajectory(&mut networks, &segment);
        assert!(matches!(r, Err(CrossingError::NonFiniteTarget { row: 0 })));

        // NaN in the current value of an action not taken.
        let nan_current = DummyValueFunction::from_fn(|x| {
            if x[0] == 0.0 {
                [0.1, f32::NAN]
            } else {
                [0.2, 0.5]
            }
        });
        let mut networks = QNetworks::new(nan_current, false);
        let r = trainer().train_on_trajectory(&mut networks, &segment);
        assert!(matches!(r, Err(CrossingError::NonFiniteTarget { row: 0 })));
        assert_eq!(networks.active().n_fits(), 0);
    }

    #[test]
    fn test_promote_copies_active() {
        let mut networks = QNetworks::new(qnet(), true);
        let segment = vec![transition(VehicleId::Car1, 0, Action::Fast, 100.0)];
        trainer()
            .train_on_trajectory(&mut networks, &segment)
            .unwrap();

        let input = IndependentTopology.assemble([&obs(0.0)]).unwrap();
        let active = networks.active().predict(&input).unwrap();
        assert_ne!(networks.frozen().predict(&input).unwrap(), active);
        networks.promote();
        assert_eq!(networks.frozen().predict(&input).unwrap(), active);
    }
}
