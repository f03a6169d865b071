//! Per-episode storage of transitions.
use crate::{error::CrossingError, Action, FeatureVector, JointFeatureVector, VehicleId};

/// What a vehicle observes at a step.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentObs {
    /// Master input, present only with the joint topology.
    pub joint: Option<JointFeatureVector>,

    /// Features of the vehicle itself.
    pub local: FeatureVector,
}

/// One step of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation before the action.
    pub state: AgentObs,

    /// Action taken.
    pub action: Action,

    /// Observation after the simulator settled.
    pub next_state: AgentObs,

    /// Reward of the step.
    pub reward: f32,

    /// The step ended the episode.
    pub is_terminal: bool,
}

/// A [`Transition`] together with the vehicle and the step it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTransition {
    /// Vehicle that took the action.
    pub vehicle: VehicleId,

    /// Step index within the episode, starting at 0.
    pub step: usize,

    /// The transition.
    pub transition: Transition,
}

impl TaggedTransition {
    fn key(&self) -> (usize, VehicleId) {
        (self.step, self.vehicle)
    }
}

/// Column view of a slice of transitions, rows in stored order.
#[derive(Debug)]
pub struct Columns<'a> {
    /// Vehicles.
    pub vehicles: Vec<VehicleId>,

    /// Observations before the actions.
    pub states: Vec<&'a AgentObs>,

    /// Actions.
    pub actions: Vec<Action>,

    /// Observations after the actions.
    pub next_states: Vec<&'a AgentObs>,

    /// Rewards.
    pub rewards: Vec<f32>,
}

impl<'a> Columns<'a> {
    /// Splits `segment` into parallel arrays.
    pub fn from_segment(segment: &'a [TaggedTransition]) -> Self {
        let n = segment.len();
        let mut columns = Self {
            vehicles: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
            actions: Vec::with_capacity(n),
            next_states: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
        };
        for t in segment {
            columns.vehicles.push(t.vehicle);
            columns.states.push(&t.transition.state);
            columns.actions.push(t.transition.action);
            columns.next_states.push(&t.transition.next_state);
            columns.rewards.push(t.transition.reward);
        }
        columns
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if there is no row.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Row indices of each vehicle in `segment`, indexed by [`VehicleId::index`].
///
/// Relative order within a vehicle is preserved.
pub fn deinterleave(segment: &[TaggedTransition]) -> [Vec<usize>; 2] {
    let mut groups = [vec![], vec![]];
    for (i, t) in segment.iter().enumerate() {
        groups[t.vehicle.index()].push(i);
    }
    groups
}

/// Inverse of [`deinterleave`].
///
/// Each group pairs the original row indices with the items computed for
/// them. The `k`-th item of a group lands at the `k`-th index of the same
/// group. Fails with [`CrossingError::RowCoverage`] unless the indices cover
/// `0..n` exactly once and every group has one item per index.
pub fn reinterleave<T>(groups: Vec<(Vec<usize>, Vec<T>)>) -> Result<Vec<T>, CrossingError> {
    let n = groups.iter().map(|(ixs, _)| ixs.len()).sum();
    let mut slots: Vec<Option<T>> = (0..n).map(|_| None).collect();
    for (ixs, items) in groups {
        if ixs.len() != items.len() {
            let row = ixs.get(items.len()).copied().unwrap_or(n);
            return Err(CrossingError::RowCoverage { row, n });
        }
        for (ix, item) in ixs.into_iter().zip(items) {
            match slots.get_mut(ix) {
                Some(slot) if slot.is_none() => *slot = Some(item),
                _ => return Err(CrossingError::RowCoverage { row: ix, n }),
            }
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(row, slot)| slot.ok_or(CrossingError::RowCoverage { row, n }))
        .collect()
}

/// Append-only sequence of the transitions of the running episode.
///
/// Transitions are ordered by step, then by vehicle. Finished trajectories can
/// be archived for batch training.
#[derive(Debug, Default)]
pub struct TrajectoryStore {
    current: Vec<TaggedTransition>,
    archive: Vec<Vec<TaggedTransition>>,
}

impl TrajectoryStore {
    /// Constructs an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transition.
    ///
    /// Fails with [`CrossingError::OutOfOrder`] unless the transition comes
    /// after the last stored one.
    pub fn push(&mut self, t: TaggedTransition) -> Result<(), CrossingError> {
        if let Some(last) = self.current.last() {
            if t.key() <= last.key() {
                return Err(CrossingError::OutOfOrder {
                    vehicle: t.vehicle,
                    step: t.step,
                    last: last.step,
                });
            }
        }
        self.current.push(t);
        Ok(())
    }

    /// The number of transitions of the running episode.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` if the running episode has no transition.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// All transitions of the running episode.
    pub fn all(&self) -> &[TaggedTransition] {
        &self.current
    }

    /// Transitions of the last stored step, one per vehicle.
    pub fn last_step(&self) -> &[TaggedTransition] {
        match self.current.last() {
            None => &[],
            Some(last) => {
                let step = last.step;
                let start = self
                    .current
                    .iter()
                    .rposition(|t| t.step != step)
                    .map_or(0, |i| i + 1);
                &self.current[start..]
            }
        }
    }

    /// Moves the running trajectory to the archive.
    pub fn archive(&mut self) {
        if !self.current.is_empty() {
            self.archive.push(std::mem::take(&mut self.current));
        }
    }

    /// Drops the running trajectory.
    pub fn discard(&mut self) {
        self.current.clear();
    }

    /// The number of archived trajectories.
    pub fn n_archived(&self) -> usize {
        self.archive.len()
    }

    /// Concatenation of the archived trajectories, emptying the archive.
    ///
    /// Each trajectory keeps its internal order; trajectories follow the order
    /// they were archived in.
    pub fn take_archived(&mut self) -> Vec<TaggedTransition> {
        std::mem::take(&mut self.archive).into_iter().flatten().collect()
    }
}
