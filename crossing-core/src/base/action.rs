//! Discrete throttle actions.
use super::VehicleControls;
use serde::{Deserialize, Serialize};

/// The number of actions, equal to the output dimension of value functions.
pub const N_ACTIONS: usize = 2;

/// Throttle setting chosen for a vehicle at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Index 0, throttle 0.75.
    Fast,

    /// Index 1, throttle 0.4.
    Slow,
}

impl Action {
    /// Returns the action of the given index.
    pub fn from_index(ix: usize) -> Option<Self> {
        match ix {
            0 => Some(Self::Fast),
            1 => Some(Self::Slow),
            _ => None,
        }
    }

    /// Index of the action in value vectors.
    pub fn index(&self) -> usize {
        match self {
            Self::Fast => 0,
            Self::Slow => 1,
        }
    }

    /// Throttle applied by the action.
    pub fn throttle(&self) -> f64 {
        match self {
            Self::Fast => 0.75,
            Self::Slow => 0.4,
        }
    }

    /// Returns `controls` with the throttle replaced.
    pub fn apply(&self, controls: VehicleControls) -> VehicleControls {
        VehicleControls {
            throttle: self.throttle(),
            ..controls
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_other_controls() {
        let controls = VehicleControls {
            throttle: 1.0,
            steering: -0.2,
            brake: 0.1,
        };
        let updated = Action::Slow.apply(controls);
        assert_eq!(updated.throttle, 0.4);
        assert_eq!(updated.steering, -0.2);
        assert_eq!(updated.brake, 0.1);
    }

    #[test]
    fn test_index() {
        for ix in 0..N_ACTIONS {
            assert_eq!(Action::from_index(ix).unwrap().index(), ix);
        }
        assert_eq!(Action::from_index(N_ACTIONS), None);
    }
}
