//! Point-mass simulation of two cars on crossing roads.
use crate::{keys, Simulator, Telemetry, VehicleControls, VehicleId};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of [`KinematicSim`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct KinematicSimConfig {
    /// Initial position of car 1.
    pub car1_position: [f64; 2],

    /// Initial heading of car 1 in degrees, 0 pointing to +x.
    pub car1_yaw: f64,

    /// Initial position of car 2.
    pub car2_position: [f64; 2],

    /// Initial heading of car 2 in degrees.
    pub car2_yaw: f64,

    /// Speed reached at full throttle.
    pub max_speed: f64,

    /// Rate at which speed follows the throttle, per second.
    pub response: f64,

    /// Simulated time of one [`Simulator::settle`] call, in seconds.
    pub dt: f64,

    /// The cars collide when closer than this distance.
    pub collision_distance: f64,

    /// Car 2 starts up to this distance further back along its heading.
    pub car2_jitter: f64,

    /// Seed of the start position jitter.
    pub seed: u64,
}

impl Default for KinematicSimConfig {
    fn default() -> Self {
        Self {
            car1_position: [-20.0, 0.0],
            car1_yaw: 0.0,
            car2_position: [0.0, -20.0],
            car2_yaw: 90.0,
            max_speed: 10.0,
            response: 2.0,
            dt: 0.1,
            collision_distance: 3.0,
            car2_jitter: 0.0,
            seed: 42,
        }
    }
}

impl KinematicSimConfig {
    /// Sets the initial pose of a vehicle.
    pub fn pose(mut self, vehicle: VehicleId, position: [f64; 2], yaw: f64) -> Self {
        match vehicle {
            VehicleId::Car1 => {
                self.car1_position = position;
                self.car1_yaw = yaw;
            }
            VehicleId::Car2 => {
                self.car2_position = position;
                self.car2_yaw = yaw;
            }
        }
        self
    }

    /// Sets the speed reached at full throttle.
    pub fn max_speed(mut self, v: f64) -> Self {
        self.max_speed = v;
        self
    }

    /// Sets the simulated time of a settle call.
    pub fn dt(mut self, v: f64) -> Self {
        self.dt = v;
        self
    }

    /// Sets the collision distance.
    pub fn collision_distance(mut self, v: f64) -> Self {
        self.collision_distance = v;
        self
    }

    /// Sets the jitter of the start position of car 2.
    pub fn car2_jitter(mut self, v: f64) -> Self {
        self.car2_jitter = v;
        self
    }

    /// Sets the seed of the jitter.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Car {
    position: [f64; 2],
    heading: [f64; 2],
    speed: f64,
    controls: VehicleControls,
}

impl Car {
    fn new(position: [f64; 2], yaw: f64) -> Self {
        let yaw = yaw.to_radians();
        Self {
            position,
            heading: [yaw.cos(), yaw.sin()],
            ..Default::default()
        }
    }
}

/// Deterministic simulator of two cars driving straight.
///
/// Speed follows `throttle * max_speed` with first-order lag and the brake
/// scales the target speed down. Time advances only in
/// [`Simulator::settle`], by `dt` per call regardless of the requested delay.
pub struct KinematicSim {
    config: KinematicSimConfig,
    cars: [Car; 2],
    collided: bool,
    rng: fastrand::Rng,
}

impl KinematicSim {
    /// Constructs the simulator with both cars at their initial poses.
    pub fn build(config: KinematicSimConfig) -> Self {
        let rng = fastrand::Rng::new();
        rng.seed(config.seed);
        let mut sim = Self {
            cars: [Car::default(), Car::default()],
            collided: false,
            rng,
            config,
        };
        sim.place_cars();
        sim
    }

    fn place_cars(&mut self) {
        let c = &self.config;
        let mut car2 = Car::new(c.car2_position, c.car2_yaw);
        if c.car2_jitter > 0.0 {
            let back = self.rng.f64() * c.car2_jitter;
            car2.position[0] -= back * car2.heading[0];
            car2.position[1] -= back * car2.heading[1];
        }
        self.cars = [Car::new(c.car1_position, c.car1_yaw), car2];
        self.collided = false;
    }

    /// Position of `vehicle`.
    pub fn position(&self, vehicle: VehicleId) -> [f64; 2] {
        self.cars[vehicle.index()].position
    }

    /// Distance between the cars.
    pub fn distance(&self) -> f64 {
        let [a, b] = &self.cars;
        (a.position[0] - b.position[0]).hypot(a.position[1] - b.position[1])
    }

    fn integrate(&mut self) {
        let dt = self.config.dt;
        let lag = (self.config.response * dt).min(1.0);
        for car in self.cars.iter_mut() {
            let target = car.controls.throttle * (1.0 - car.controls.brake) * self.config.max_speed;
            car.speed += (target - car.speed) * lag;
            car.position[0] += car.heading[0] * car.speed * dt;
            car.position[1] += car.heading[1] * car.speed * dt;
        }
        if self.distance() < self.config.collision_distance {
            self.collided = true;
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl Simulator for KinematicSim {
    fn get_vehicle_state(&mut self, vehicle: VehicleId) -> Result<Telemetry> {
        let [c1, c2] = &self.cars;
        let me = &self.cars[vehicle.index()].position;
        let other = &self.cars[vehicle.other().index()].position;
        let mut t = Telemetry::new();
        t.insert(keys::X_C1, c1.position[0]);
        t.insert(keys::Y_C1, c1.position[1]);
        t.insert(keys::X_C2, c2.position[0]);
        t.insert(keys::Y_C2, c2.position[1]);
        t.insert(keys::V_C1, c1.speed);
        t.insert(keys::V_C2, c2.speed);
        t.insert(keys::DIST_C1_C2, self.distance());
        t.insert(keys::RIGHT, flag(other[0] > me[0]));
        t.insert(keys::LEFT, flag(other[0] < me[0]));
        t.insert(keys::FORWARD, flag(other[1] > me[1]));
        t.insert(keys::BACKWARD, flag(other[1] < me[1]));
        Ok(t)
    }

    fn get_controls(&mut self, vehicle: VehicleId) -> Result<VehicleControls> {
        Ok(self.cars[vehicle.index()].controls.clone())
    }

    fn set_controls(&mut self, vehicle: VehicleId, controls: VehicleControls) -> Result<()> {
        self.cars[vehicle.index()].controls = controls;
        Ok(())
    }

    fn collision_occurred(&mut self) -> Result<bool> {
        Ok(self.collided)
    }

    fn reset(&mut self) -> Result<()> {
        self.place_cars();
        Ok(())
    }

    fn settle(&mut self, _delay: Duration) -> Result<()> {
        self.integrate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    fn drive(sim: &mut KinematicSim, action: Action, n: usize) {
        for vehicle in VehicleId::ALL {
            let c = sim.get_controls(vehicle).unwrap();
            sim.set_controls(vehicle, action.apply(c)).unwrap();
        }
        for _ in 0..n {
            sim.settle(Duration::ZERO).unwrap();
        }
    }

    #[test]
    fn test_initial_telemetry() {
        let mut sim = KinematicSim::build(KinematicSimConfig::default());
        let t1 = sim.get_vehicle_state(VehicleId::Car1).unwrap();
        assert_eq!(t1.get(keys::X_C1).unwrap(), -20.0);
        assert_eq!(t1.get(keys::Y_C2).unwrap(), -20.0);
        assert!((t1.get(keys::DIST_C1_C2).unwrap() - 800f64.sqrt()).abs() < 1e-9);
        // car 2 is to the right of and behind car 1
        assert_eq!(t1.get(keys::RIGHT).unwrap(), 1.0);
        assert_eq!(t1.get(keys::BACKWARD).unwrap(), 1.0);

        let t2 = sim.get_vehicle_state(VehicleId::Car2).unwrap();
        assert_eq!(t2.get(keys::LEFT).unwrap(), 1.0);
        assert_eq!(t2.get(keys::FORWARD).unwrap(), 1.0);
    }

    #[test]
    fn test_same_speed_collides() {
        let mut sim = KinematicSim::build(KinematicSimConfig::default());
        drive(&mut sim, Action::Fast, 100);
        assert!(sim.collision_occurred().unwrap());
        sim.reset().unwrap();
        assert!(!sim.collision_occurred().unwrap());
        assert_eq!(sim.position(VehicleId::Car1), [-20.0, 0.0]);
    }

    #[test]
    fn test_car1_moves_east() {
        let config = KinematicSimConfig::default().pose(VehicleId::Car2, [0.0, -500.0], 90.0);
        let mut sim = KinematicSim::build(config);
        drive(&mut sim, Action::Slow, 50);
        let [x, y] = sim.position(VehicleId::Car1);
        assert!(x > -20.0);
        assert!(y.abs() < 1e-9);
        assert!(!sim.collision_occurred().unwrap());
    }

    #[test]
    fn test_jitter_moves_car2_back() {
        let config = KinematicSimConfig::default().car2_jitter(5.0).seed(3);
        let sim = KinematicSim::build(config);
        let [x, y] = sim.position(VehicleId::Car2);
        assert!(x.abs() < 1e-9);
        assert!((-25.0..=-20.0).contains(&y));
    }
}
