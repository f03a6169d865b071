//! Simulator.
use crate::error::CrossingError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, thread, time::Duration};

/// Identifies one of the two vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleId {
    /// The lead vehicle, whose goal defines episode success.
    Car1,

    /// The crossing vehicle.
    Car2,
}

impl VehicleId {
    /// Both vehicles, in the order their transitions are stored.
    pub const ALL: [VehicleId; 2] = [VehicleId::Car1, VehicleId::Car2];

    /// Name of the vehicle in the simulator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Car1 => "Car1",
            Self::Car2 => "Car2",
        }
    }

    /// Position of the vehicle in per-vehicle arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Car1 => 0,
            Self::Car2 => 1,
        }
    }

    /// The other vehicle.
    pub fn other(&self) -> Self {
        match self {
            Self::Car1 => Self::Car2,
            Self::Car2 => Self::Car1,
        }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Low-level actuation of a vehicle.
///
/// Only `throttle` is driven by the policy; the other fields are read from the
/// simulator and written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleControls {
    /// Throttle in `[0, 1]`.
    pub throttle: f64,

    /// Steering in `[-1, 1]`.
    pub steering: f64,

    /// Brake in `[0, 1]`.
    pub brake: f64,
}

/// Raw state snapshot reported by the simulator for one vehicle.
///
/// Keys follow [`crate::keys`]. Proximity flags are relative to the vehicle
/// the snapshot was requested for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Telemetry(BTreeMap<String, f64>);

impl Telemetry {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Returns the value of `key`, or [`CrossingError::MissingField`].
    pub fn get(&self, key: &str) -> Result<f64, CrossingError> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| CrossingError::MissingField {
                key: key.to_string(),
            })
    }

    /// Removes a value, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    /// Number of values in the snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the snapshot holds no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Telemetry {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Driving simulator hosting both vehicles.
///
/// Any error returned by these methods aborts the running episode.
pub trait Simulator {
    /// Returns the telemetry seen from `vehicle`.
    fn get_vehicle_state(&mut self, vehicle: VehicleId) -> Result<Telemetry>;

    /// Returns the current controls of `vehicle`.
    fn get_controls(&mut self, vehicle: VehicleId) -> Result<VehicleControls>;

    /// Applies controls to `vehicle`.
    fn set_controls(&mut self, vehicle: VehicleId, controls: VehicleControls) -> Result<()>;

    /// Returns `true` if the vehicles have collided since the last reset.
    fn collision_occurred(&mut self) -> Result<bool>;

    /// Puts both vehicles back to their initial poses.
    fn reset(&mut self) -> Result<()>;

    /// Lets physics settle after new controls were applied.
    ///
    /// A real-time simulator keeps running on its own, so the default blocks
    /// for `delay`. The wait is not interruptible.
    fn settle(&mut self, delay: Duration) -> Result<()> {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }
}
