//! Crowd simulation
//!
//! Agents flock toward optional goals while keeping apart from each other.
//! An update runs in two phases. The first computes a desired velocity for
//! every agent from a frozen snapshot of last tick's state. The second
//! steers and integrates. No agent ever observes another agent's partially
//! updated state, so results do not depend on iteration order.
//!
//! # Example
//!
//! ```ignore
//! let mut crowd = CrowdSimulation::new();
//! let id = crowd.add_agent(Vec3::ZERO, 0.5, 5.0);
//! crowd.set_agent_goal(id, Vec3::new(20.0, 0.0, 0.0));
//! crowd.update(1.0 / 60.0);
//! ```

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::proximity::ProximityGrid;
use super::registry::{AgentId, Registry};
use super::steering::{
    AgentSnapshot, Alignment, Avoidance, Cohesion, Seek, Separation, SteeringBehavior,
};
use crate::math::VectorExt;

/// Physical limits of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            max_speed: 5.0,
            max_force: 10.0,
        }
    }
}

/// A simulated crowd member
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Target velocity from the last steering pass
    pub desired_velocity: Vec3,
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
}

impl Agent {
    fn new(id: AgentId, position: Vec3, params: AgentParams) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            desired_velocity: Vec3::ZERO,
            radius: params.radius,
            max_speed: params.max_speed,
            max_force: params.max_force,
        }
    }

    /// Current speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            max_speed: self.max_speed,
        }
    }

    /// Steer toward `desired` within `max_force`, then move
    fn integrate(&mut self, desired: Vec3, delta_time: f32) {
        self.desired_velocity = desired;

        let steering = (desired - self.velocity).clamped(self.max_force);
        self.velocity = (self.velocity + steering * delta_time).clamped(self.max_speed);
        self.position += self.velocity * delta_time;
    }
}

/// Weights and radii for the steering blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrowdConfig {
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub avoidance_weight: f32,
    /// Separation radius. Alignment and cohesion look twice as far.
    pub avoidance_radius: f32,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            avoidance_weight: 2.0,
            avoidance_radius: 2.0,
        }
    }
}

impl CrowdConfig {
    /// Set the separation weight
    #[must_use]
    pub fn with_separation_weight(mut self, weight: f32) -> Self {
        self.separation_weight = weight;
        self
    }

    /// Set the alignment weight
    #[must_use]
    pub fn with_alignment_weight(mut self, weight: f32) -> Self {
        self.alignment_weight = weight;
        self
    }

    /// Set the cohesion weight
    #[must_use]
    pub fn with_cohesion_weight(mut self, weight: f32) -> Self {
        self.cohesion_weight = weight;
        self
    }

    /// Set the avoidance weight
    #[must_use]
    pub fn with_avoidance_weight(mut self, weight: f32) -> Self {
        self.avoidance_weight = weight;
        self
    }

    /// Set the separation radius
    #[must_use]
    pub fn with_avoidance_radius(mut self, radius: f32) -> Self {
        self.avoidance_radius = radius;
        self
    }

    /// Radius used by alignment and cohesion
    #[must_use]
    pub fn flocking_radius(&self) -> f32 {
        self.avoidance_radius * 2.0
    }
}

/// A set of agents stepped together
#[derive(Debug, Clone, Default)]
pub struct CrowdSimulation {
    config: CrowdConfig,
    agents: Registry<AgentId, Agent>,
    goals: FxHashMap<AgentId, Vec3>,
}

impl CrowdSimulation {
    /// Create an empty crowd with default weights
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty crowd with the given weights
    #[must_use]
    pub fn with_config(config: CrowdConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current weights and radii
    #[must_use]
    pub fn config(&self) -> &CrowdConfig {
        &self.config
    }

    /// Change the separation weight for later updates
    pub fn set_separation_weight(&mut self, weight: f32) {
        self.config.separation_weight = weight;
    }

    /// Change the alignment weight for later updates
    pub fn set_alignment_weight(&mut self, weight: f32) {
        self.config.alignment_weight = weight;
    }

    /// Change the cohesion weight for later updates
    pub fn set_cohesion_weight(&mut self, weight: f32) {
        self.config.cohesion_weight = weight;
    }

    /// Change the avoidance weight for later updates
    pub fn set_avoidance_weight(&mut self, weight: f32) {
        self.config.avoidance_weight = weight;
    }

    /// Change the separation radius. Alignment and cohesion follow at twice it.
    pub fn set_avoidance_radius(&mut self, radius: f32) {
        self.config.avoidance_radius = radius;
    }

    /// Add an agent at rest with the default max force
    pub fn add_agent(&mut self, position: Vec3, radius: f32, max_speed: f32) -> AgentId {
        self.add_agent_with_params(
            position,
            AgentParams {
                radius,
                max_speed,
                ..AgentParams::default()
            },
        )
    }

    /// Add an agent at rest
    pub fn add_agent_with_params(&mut self, position: Vec3, params: AgentParams) -> AgentId {
        let id = self.agents.peek_next_id();
        let inserted = self.agents.insert(Agent::new(id, position, params));
        debug_assert_eq!(id, inserted);

        log::debug!("Added {id} at {position}");
        id
    }

    /// Remove an agent and its goal
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.goals.remove(&id);
        let removed = self.agents.remove(id);
        if removed.is_some() {
            log::debug!("Removed {id}");
        }
        removed
    }

    /// Set the point an agent seeks. Returns `false` for unknown agents.
    pub fn set_agent_goal(&mut self, id: AgentId, goal: Vec3) -> bool {
        if !self.agents.contains(id) {
            return false;
        }
        self.goals.insert(id, goal);
        true
    }

    /// Stop seeking. Returns the previous goal.
    pub fn clear_agent_goal(&mut self, id: AgentId) -> Option<Vec3> {
        self.goals.remove(&id)
    }

    #[must_use]
    pub fn agent_goal(&self, id: AgentId) -> Option<Vec3> {
        self.goals.get(&id).copied()
    }

    #[must_use]
    pub fn agent_position(&self, id: AgentId) -> Option<Vec3> {
        self.agents.get(id).map(|a| a.position)
    }

    #[must_use]
    pub fn agent_velocity(&self, id: AgentId) -> Option<Vec3> {
        self.agents.get(id).map(|a| a.velocity)
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// All agents, in no particular order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Advance every agent by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        debug_assert!(delta_time >= 0.0, "delta time must not be negative");

        if self.agents.is_empty() {
            return;
        }

        // Phase 1: desired velocities from last tick's state
        let snapshot: Vec<AgentSnapshot> = self.agents.values().map(Agent::snapshot).collect();

        let config = self.config;
        let separation = Separation::new(config.avoidance_radius);
        let alignment = Alignment::new(config.flocking_radius());
        let cohesion = Cohesion::new(config.flocking_radius());

        let shared_reach = config.avoidance_radius.max(config.flocking_radius());
        let max_reach = snapshot
            .iter()
            .map(|agent| Avoidance.query_radius(agent))
            .fold(shared_reach, f32::max);

        let mut grid = ProximityGrid::new(max_reach);
        grid.rebuild(snapshot.iter().map(|agent| agent.position));

        let mut candidate_indices = Vec::new();
        let mut candidates = Vec::new();
        let mut desired = Vec::with_capacity(snapshot.len());

        for agent in &snapshot {
            candidate_indices.clear();
            grid.query(
                agent.position,
                shared_reach.max(Avoidance.query_radius(agent)),
                &mut candidate_indices,
            );

            candidates.clear();
            candidates.extend(candidate_indices.iter().map(|&i| snapshot[i]));

            let seek = Seek::new(self.goals.get(&agent.id).copied());

            let velocity = seek.calculate(agent, &candidates)
                + separation.calculate(agent, &candidates) * config.separation_weight
                + alignment.calculate(agent, &candidates) * config.alignment_weight
                + cohesion.calculate(agent, &candidates) * config.cohesion_weight
                + Avoidance.calculate(agent, &candidates) * config.avoidance_weight;

            desired.push((agent.id, velocity.clamped(agent.max_speed)));
        }

        // Phase 2: steer and integrate
        for (id, velocity) in desired {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.integrate(velocity, delta_time);
            }
        }

        log::trace!("Crowd stepped {} agents by {delta_time}s", snapshot.len());
    }
}
