//! Active and frozen value functions.
use crate::{ValueFunction, VehicleId};
use anyhow::Result;
use log::info;
use std::{fs, path::Path};

const ACTIVE_FILE: &str = "qnet.pt";
const FROZEN_FILE: &str = "qnet_frozen.pt";

/// The value functions used by both vehicles.
///
/// Without alternation both vehicles act and train with the `active` set.
/// With alternation the *training vehicle* uses `active` while the other acts
/// with `frozen`, a copy refreshed by [`QNetworks::promote`].
pub struct QNetworks<Q> {
    active: Q,
    frozen: Q,
    alternate: bool,
    training_vehicle: VehicleId,
}

impl<Q: ValueFunction> QNetworks<Q> {
    /// Constructs the sets from an initial value function.
    ///
    /// `frozen` starts as a copy of `active`; car 1 trains first.
    pub fn new(qnet: Q, alternate: bool) -> Self {
        Self {
            frozen: qnet.clone(),
            active: qnet,
            alternate,
            training_vehicle: VehicleId::Car1,
        }
    }

    /// Returns `true` if the vehicles alternate.
    pub fn is_alternating(&self) -> bool {
        self.alternate
    }

    /// Vehicle whose transitions are fitted.
    pub fn training_vehicle(&self) -> VehicleId {
        self.training_vehicle
    }

    /// Returns `true` if transitions of `vehicle` are fitted.
    pub fn trains(&self, vehicle: VehicleId) -> bool {
        !self.alternate || vehicle == self.training_vehicle
    }

    /// Value function `vehicle` acts with.
    pub fn for_vehicle(&self, vehicle: VehicleId) -> &Q {
        if self.trains(vehicle) {
            &self.active
        } else {
            &self.frozen
        }
    }

    /// The active set.
    pub fn active(&self) -> &Q {
        &self.active
    }

    /// The active set, for fitting.
    pub fn active_mut(&mut self) -> &mut Q {
        &mut self.active
    }

    /// The frozen set.
    pub fn frozen(&self) -> &Q {
        &self.frozen
    }

    /// Replaces `frozen` with a copy of `active`.
    pub fn promote(&mut self) {
        self.frozen = self.active.clone();
    }

    /// Hands training over to the other vehicle.
    pub fn swap_roles(&mut self) {
        self.training_vehicle = self.training_vehicle.other();
        info!("Training vehicle is now {}", self.training_vehicle);
    }

    /// Saves both sets in `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        self.active.save_params(&dir.join(ACTIVE_FILE))?;
        self.frozen.save_params(&dir.join(FROZEN_FILE))?;
        info!("Saved parameters in {:?}", dir);
        Ok(())
    }

    /// Loads the sets saved in `dir`.
    ///
    /// If there is no frozen file, `frozen` becomes a copy of the loaded
    /// `active`.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        self.active.load_params(&dir.join(ACTIVE_FILE))?;
        let frozen = dir.join(FROZEN_FILE);
        if frozen.exists() {
            self.frozen.load_params(&frozen)?;
        } else {
            self.promote();
        }
        info!("Loaded parameters from {:?}", dir);
        Ok(())
    }
}
