//! Conversion of simulator telemetry into feature vectors.
use crate::{error::CrossingError, Telemetry, VehicleId};
use serde::{Deserialize, Serialize};

/// Telemetry keys read by [`StateFeaturizer`].
pub mod keys {
    /// x-coordinate of car 1.
    pub const X_C1: &str = "x_c1";
    /// y-coordinate of car 1.
    pub const Y_C1: &str = "y_c1";
    /// x-coordinate of car 2.
    pub const X_C2: &str = "x_c2";
    /// y-coordinate of car 2.
    pub const Y_C2: &str = "y_c2";
    /// Speed of car 1.
    pub const V_C1: &str = "v_c1";
    /// Speed of car 2.
    pub const V_C2: &str = "v_c2";
    /// Distance between the cars.
    pub const DIST_C1_C2: &str = "dist_c1_c2";
    /// The other car is to the right (larger x).
    pub const RIGHT: &str = "right";
    /// The other car is to the left (smaller x).
    pub const LEFT: &str = "left";
    /// The other car is ahead (larger y).
    pub const FORWARD: &str = "forward";
    /// The other car is behind (smaller y).
    pub const BACKWARD: &str = "backward";
}

/// Arity of a per-vehicle feature vector.
pub const LOCAL_DIM: usize = 9;

/// Arity of the compact global feature vector.
pub const GLOBAL_DIM: usize = 7;

const IX_X: usize = 0;
const IX_DIST: usize = 4;

/// Observable state of one vehicle.
///
/// Local layout: `x_self, y_self, v_self, v_other, dist_c1_c2, right, left,
/// forward, backward`. Global layout: `x_c1, y_c1, x_c2, y_c2, v_c1, v_c2,
/// dist_c1_c2`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Values in field order.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Arity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there is no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// x-coordinate of the vehicle (local layout).
    pub fn x(&self) -> f32 {
        self.0[IX_X]
    }

    /// Distance between the vehicles (local layout).
    pub fn distance(&self) -> f32 {
        self.0[IX_DIST]
    }
}

impl From<[f32; LOCAL_DIM]> for FeatureVector {
    fn from(values: [f32; LOCAL_DIM]) -> Self {
        Self(values.to_vec())
    }
}

/// Master input of the joint topology, describing both vehicles.
#[derive(Debug, Clone, PartialEq)]
pub struct JointFeatureVector(Vec<f32>);

impl JointFeatureVector {
    /// Values in field order.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Arity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there is no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<FeatureVector> for JointFeatureVector {
    fn from(fv: FeatureVector) -> Self {
        Self(fv.0)
    }
}

/// Layout of [`JointFeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MasterLayout {
    /// The 7-element global vector.
    Compact,

    /// Local features of car 1 followed by those of car 2.
    Concatenated,
}

impl MasterLayout {
    /// Arity of the master input.
    pub fn dim(&self) -> usize {
        match self {
            Self::Compact => GLOBAL_DIM,
            Self::Concatenated => 2 * LOCAL_DIM,
        }
    }
}

impl Default for MasterLayout {
    fn default() -> Self {
        Self::Compact
    }
}

/// Builds feature vectors from telemetry.
///
/// Stateless; every method is a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateFeaturizer;

impl StateFeaturizer {
    /// Per-vehicle features of `vehicle`.
    ///
    /// `telemetry` must be the snapshot requested for `vehicle`, since the
    /// proximity flags are relative to the requesting vehicle.
    pub fn local(
        &self,
        vehicle: VehicleId,
        telemetry: &Telemetry,
    ) -> Result<FeatureVector, CrossingError> {
        let (x, y, v_self, v_other) = match vehicle {
            VehicleId::Car1 => (keys::X_C1, keys::Y_C1, keys::V_C1, keys::V_C2),
            VehicleId::Car2 => (keys::X_C2, keys::Y_C2, keys::V_C2, keys::V_C1),
        };
        Self::read(
            telemetry,
            &[
                x,
                y,
                v_self,
                v_other,
                keys::DIST_C1_C2,
                keys::RIGHT,
                keys::LEFT,
                keys::FORWARD,
                keys::BACKWARD,
            ],
        )
    }

    /// Compact global features.
    pub fn global(&self, telemetry: &Telemetry) -> Result<FeatureVector, CrossingError> {
        Self::read(
            telemetry,
            &[
                keys::X_C1,
                keys::Y_C1,
                keys::X_C2,
                keys::Y_C2,
                keys::V_C1,
                keys::V_C2,
                keys::DIST_C1_C2,
            ],
        )
    }

    /// Master input from the snapshots of car 1 and car 2.
    pub fn joint(
        &self,
        layout: MasterLayout,
        car1: &Telemetry,
        car2: &Telemetry,
    ) -> Result<JointFeatureVector, CrossingError> {
        match layout {
            MasterLayout::Compact => Ok(self.global(car1)?.into()),
            MasterLayout::Concatenated => {
                let mut values = self.local(VehicleId::Car1, car1)?.0;
                values.extend(self.local(VehicleId::Car2, car2)?.0);
                Ok(JointFeatureVector(values))
            }
        }
    }

    fn read(telemetry: &Telemetry, fields: &[&str]) -> Result<FeatureVector, CrossingError> {
        let values = fields
            .iter()
            .map(|key| telemetry.get(key).map(|v| v as f32))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureVector(values))
    }
}
