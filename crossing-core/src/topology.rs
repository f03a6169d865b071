//! Input topologies of value functions.
use crate::{
    error::CrossingError, AgentObs, InputBatch, MasterLayout, RowBatch, StateFeaturizer,
    Telemetry, VehicleId, LOCAL_DIM,
};

/// Decides what a vehicle observes and how observations are batched for the
/// value function.
///
/// The topology is a type parameter of the coordinator and the trainer, fixed
/// at construction.
pub trait Topology: Clone {
    /// Name used in logs and records.
    fn name(&self) -> &'static str;

    /// Observation of `vehicle`.
    ///
    /// `telemetry` holds the snapshots requested for car 1 and car 2, in this
    /// order.
    fn observe(
        &self,
        featurizer: &StateFeaturizer,
        vehicle: VehicleId,
        telemetry: &[Telemetry; 2],
    ) -> Result<AgentObs, CrossingError>;

    /// Stacks observations into a batch, one row per observation.
    fn assemble<'a, I>(&self, obs: I) -> Result<InputBatch, CrossingError>
    where
        I: IntoIterator<Item = &'a AgentObs>;

    /// Arity of the master input, `None` if there is none.
    fn joint_dim(&self) -> Option<usize>;
}

/// Each vehicle sees only its local features.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndependentTopology;

impl Topology for IndependentTopology {
    fn name(&self) -> &'static str {
        "independent"
    }

    fn observe(
        &self,
        featurizer: &StateFeaturizer,
        vehicle: VehicleId,
        telemetry: &[Telemetry; 2],
    ) -> Result<AgentObs, CrossingError> {
        Ok(AgentObs {
            joint: None,
            local: featurizer.local(vehicle, &telemetry[vehicle.index()])?,
        })
    }

    fn assemble<'a, I>(&self, obs: I) -> Result<InputBatch, CrossingError>
    where
        I: IntoIterator<Item = &'a AgentObs>,
    {
        Ok(InputBatch {
            joint: None,
            local: RowBatch::from_rows(LOCAL_DIM, obs.into_iter().map(|o| o.local.as_slice())),
        })
    }

    fn joint_dim(&self) -> Option<usize> {
        None
    }
}

/// Each vehicle sees a master input describing both vehicles, next to its
/// local features.
#[derive(Debug, Clone, Copy, Default)]
pub struct JointTopology {
    layout: MasterLayout,
}

impl JointTopology {
    /// Constructs the topology with the given master input layout.
    pub fn new(layout: MasterLayout) -> Self {
        Self { layout }
    }

    /// Layout of the master input.
    pub fn layout(&self) -> MasterLayout {
        self.layout
    }
}

impl Topology for JointTopology {
    fn name(&self) -> &'static str {
        "joint"
    }

    fn observe(
        &self,
        featurizer: &StateFeaturizer,
        vehicle: VehicleId,
        telemetry: &[Telemetry; 2],
    ) -> Result<AgentObs, CrossingError> {
        Ok(AgentObs {
            joint: Some(featurizer.joint(self.layout, &telemetry[0], &telemetry[1])?),
            local: featurizer.local(vehicle, &telemetry[vehicle.index()])?,
        })
    }

    fn assemble<'a, I>(&self, obs: I) -> Result<InputBatch, CrossingError>
    where
        I: IntoIterator<Item = &'a AgentObs>,
    {
        let mut joint = RowBatch::new(self.layout.dim());
        let mut local = RowBatch::new(LOCAL_DIM);
        for o in obs {
            match &o.joint {
                Some(j) if j.len() == joint.dim() => joint.push_row(j.as_slice()),
                _ => return Err(CrossingError::TopologyMismatch(self.name())),
            }
            local.push_row(o.local.as_slice());
        }
        Ok(InputBatch {
            joint: Some(joint),
            local,
        })
    }

    fn joint_dim(&self) -> Option<usize> {
        Some(self.layout.dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    fn snapshots() -> [Telemetry; 2] {
        let base = |right: f64, left: f64| -> Telemetry {
            vec![
                (keys::X_C1, -20.0),
                (keys::Y_C1, 0.0),
                (keys::X_C2, 0.0),
                (keys::Y_C2, -20.0),
                (keys::V_C1, 1.0),
                (keys::V_C2, 2.0),
                (keys::DIST_C1_C2, 28.3),
                (keys::RIGHT, right),
                (keys::LEFT, left),
                (keys::FORWARD, 0.0),
                (keys::BACKWARD, 0.0),
            ]
            .into_iter()
            .collect()
        };
        [base(1.0, 0.0), base(0.0, 1.0)]
    }

    #[test]
    fn test_independent_uses_own_snapshot() {
        let t = IndependentTopology;
        let obs = t
            .observe(&StateFeaturizer, VehicleId::Car2, &snapshots())
            .unwrap();
        assert!(obs.joint.is_none());
        // right/left flags come from car 2's snapshot
        assert_eq!(obs.local.as_slice()[5], 0.0);
        assert_eq!(obs.local.as_slice()[6], 1.0);
    }

    #[test]
    fn test_joint_assemble() {
        let t = JointTopology::new(MasterLayout::Concatenated);
        let s = snapshots();
        let o1 = t.observe(&StateFeaturizer, VehicleId::Car1, &s).unwrap();
        let o2 = t.observe(&StateFeaturizer, VehicleId::Car2, &s).unwrap();
        let batch = t.assemble([&o1, &o2]).unwrap();
        assert_eq!(batch.len(), 2);
        let joint = batch.joint.unwrap();
        assert_eq!(joint.dim(), 18);
        assert_eq!(joint.row(0), joint.row(1));
    }

    #[test]
    fn test_joint_rejects_local_only() {
        let s = snapshots();
        let o = IndependentTopology
            .observe(&StateFeaturizer, VehicleId::Car1, &s)
            .unwrap();
        let r = JointTopology::default().assemble([&o]);
        assert!(matches!(r, Err(CrossingError::TopologyMismatch("joint"))));
    }
}
