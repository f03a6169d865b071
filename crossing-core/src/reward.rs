//! Reward shaping.
use crate::FeatureVector;
use serde::{Deserialize, Serialize};

/// Constants of [`RewardShaper`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RewardConfig {
    /// Reward given at every step.
    pub starvation: f32,

    /// Reward when the vehicles are closer than `too_close_distance`.
    pub too_close_penalty: f32,

    /// Distance below which `too_close_penalty` applies.
    pub too_close_distance: f32,

    /// Reward when the vehicles are farther than `safe_distance`.
    pub safe_distance_bonus: f32,

    /// Distance above which `safe_distance_bonus` applies.
    pub safe_distance: f32,

    /// Reward when the lead vehicle passes `goal_x`.
    pub goal_reward: f32,

    /// x-coordinate of the goal of the lead vehicle.
    pub goal_x: f32,

    /// Reward on collision.
    pub collision_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            starvation: -0.1,
            too_close_penalty: -150.0,
            too_close_distance: 70.0,
            safe_distance_bonus: 60.0,
            safe_distance: 100.0,
            goal_reward: 1000.0,
            goal_x: 10.0,
            collision_penalty: -1000.0,
        }
    }
}

impl RewardConfig {
    /// Sets the reward given at every step.
    pub fn starvation(mut self, v: f32) -> Self {
        self.starvation = v;
        self
    }

    /// Sets the penalty and the distance threshold for being too close.
    pub fn too_close(mut self, penalty: f32, distance: f32) -> Self {
        self.too_close_penalty = penalty;
        self.too_close_distance = distance;
        self
    }

    /// Sets the bonus and the distance threshold for keeping a safe distance.
    pub fn safe_distance(mut self, bonus: f32, distance: f32) -> Self {
        self.safe_distance_bonus = bonus;
        self.safe_distance = distance;
        self
    }

    /// Sets the goal reward and the goal x-coordinate.
    pub fn goal(mut self, reward: f32, x: f32) -> Self {
        self.goal_reward = reward;
        self.goal_x = x;
        self
    }

    /// Sets the collision penalty.
    pub fn collision_penalty(mut self, v: f32) -> Self {
        self.collision_penalty = v;
        self
    }
}

/// Reward of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reward {
    /// Scalar reward.
    pub value: f32,

    /// The lead vehicle passed its goal.
    pub goal_reached: bool,
}

/// Computes the reward of a step from the next state of the lead vehicle.
///
/// Rules are applied from lowest to highest precedence: starvation, distance
/// penalty or bonus, goal, collision. A later rule replaces the value set by
/// an earlier one. The action taken is not an input.
#[derive(Debug, Clone, Default)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    /// Constructs a reward shaper.
    pub fn build(config: RewardConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Reward for reaching `next_state` of the lead vehicle.
    pub fn reward(&self, next_state: &FeatureVector, collision: bool) -> Reward {
        let c = &self.config;
        let distance = next_state.distance();
        let mut value = c.starvation;
        let mut goal_reached = false;

        if distance < c.too_close_distance {
            value = c.too_close_penalty;
        }
        if distance > c.safe_distance {
            value = c.safe_distance_bonus;
        }

        if next_state.x() > c.goal_x {
            value = c.goal_reward;
            goal_reached = true;
        }

        if collision {
            value = c.collision_penalty;
        }

        Reward {
            value,
            goal_reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(x: f32, distance: f32) -> FeatureVector {
        [x, 0.0, 5.0, 5.0, distance, 0.0, 0.0, 0.0, 0.0].into()
    }

    #[test]
    fn test_starvation_between_thresholds() {
        let r = RewardShaper::default().reward(&lead(-10.0, 80.0), false);
        assert_eq!(r.value, -0.1);
        assert!(!r.goal_reached);
    }

    #[test]
    fn test_safe_distance_bonus() {
        let r = RewardShaper::default().reward(&lead(-10.0, 150.0), false);
        assert_eq!(r.value, 60.0);
        assert!(!r.goal_reached);
    }

    #[test]
    fn test_bonus_wins_over_penalty_on_overlap() {
        let config = RewardConfig::default()
            .too_close(-150.0, 120.0)
            .safe_distance(60.0, 100.0);
        let r = RewardShaper::build(config).reward(&lead(-10.0, 110.0), false);
        assert_eq!(r.value, 60.0);
    }

    #[test]
    fn test_goal_overrides_distance() {
        let shaper = RewardShaper::default();
        for distance in [10.0, 80.0, 150.0] {
            let r = shaper.reward(&lead(10.5, distance), false);
            assert_eq!(r.value, 1000.0);
            assert!(r.goal_reached);
        }
    }

    #[test]
    fn test_collision_dominates() {
        let shaper = RewardShaper::default();
        let r = shaper.reward(&lead(-5.0, 3.0), true);
        assert_eq!(r.value, -1000.0);

        // Goal flag is kept, only the value is replaced.
        let r = shaper.reward(&lead(11.0, 3.0), true);
        assert_eq!(r.value, -1000.0);
        assert!(r.goal_reached);
    }

    #[test]
    fn test_pure() {
        let shaper = RewardShaper::default();
        let s = lead(0.0, 50.0);
        assert_eq!(shaper.reward(&s, false), shaper.reward(&s, false));
    }
}
