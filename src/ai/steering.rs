//! Steering behaviors for crowd agents
//!
//! Each behavior turns one agent and a read-only snapshot of nearby agents
//! into a velocity contribution. Behaviors never see partially updated state;
//! the crowd hands them the positions and velocities from the previous tick.

use glam::Vec3;

use super::registry::AgentId;
use crate::math::VectorExt;

/// Below this separation distance two agents are treated as coincident.
const COINCIDENT_DISTANCE: f32 = 0.001;

/// Added to distances before inverting to keep avoidance finite.
const AVOIDANCE_SOFTENING: f32 = 0.001;

/// Frozen copy of the agent state the steering pass reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub max_speed: f32,
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// How far around `agent` this behavior looks for neighbors
    fn query_radius(&self, agent: &AgentSnapshot) -> f32;

    /// Velocity contribution for `agent`.
    ///
    /// `candidates` may contain agents beyond `query_radius` and the agent
    /// itself; behaviors filter them.
    fn calculate(&self, agent: &AgentSnapshot, candidates: &[AgentSnapshot]) -> Vec3;
}

/// Other agents strictly closer than `radius`
fn neighbors_within<'a>(
    agent: &'a AgentSnapshot,
    candidates: &'a [AgentSnapshot],
    radius: f32,
) -> impl Iterator<Item = &'a AgentSnapshot> + 'a {
    candidates
        .iter()
        .filter(move |other| other.id != agent.id && agent.position.distance(other.position) < radius)
}

/// Separation - push away from neighbors, harder the closer they are
#[derive(Debug, Clone, Copy)]
pub struct Separation {
    pub radius: f32,
}

impl Separation {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl SteeringBehavior for Separation {
    fn query_radius(&self, _agent: &AgentSnapshot) -> f32 {
        self.radius
    }

    fn calculate(&self, agent: &AgentSnapshot, candidates: &[AgentSnapshot]) -> Vec3 {
        neighbors_within(agent, candidates, self.radius)
            .filter_map(|other| {
                let diff = agent.position - other.position;
                let dist = diff.length();
                (dist > COINCIDENT_DISTANCE).then(|| diff.normalized() / dist)
            })
            .sum()
    }
}

/// Alignment - match the average velocity of neighbors
#[derive(Debug, Clone, Copy)]
pub struct Alignment {
    pub radius: f32,
}

impl Alignment {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl SteeringBehavior for Alignment {
    fn query_radius(&self, _agent: &AgentSnapshot) -> f32 {
        self.radius
    }

    fn calculate(&self, agent: &AgentSnapshot, candidates: &[AgentSnapshot]) -> Vec3 {
        let (sum, count) = neighbors_within(agent, candidates, self.radius)
            .fold((Vec3::ZERO, 0_u32), |(sum, count), other| (sum + other.velocity, count + 1));

        if count == 0 {
            return Vec3::ZERO;
        }

        sum / count as f32 - agent.velocity
    }
}

/// Cohesion - head toward the neighborhood's center of mass
#[derive(Debug, Clone, Copy)]
pub struct Cohesion {
    pub radius: f32,
}

impl Cohesion {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl SteeringBehavior for Cohesion {
    fn query_radius(&self, _agent: &AgentSnapshot) -> f32 {
        self.radius
    }

    fn calculate(&self, agent: &AgentSnapshot, candidates: &[AgentSnapshot]) -> Vec3 {
        let (sum, count) = neighbors_within(agent, candidates, self.radius)
            .fold((Vec3::ZERO, 0_u32), |(sum, count), other| (sum + other.position, count + 1));

        if count == 0 {
            return Vec3::ZERO;
        }

        (sum / count as f32 - agent.position).normalized()
    }
}

/// Avoidance - strong repulsion while agent disks overlap.
///
/// Looks three radii out from the agent's own radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avoidance;

impl SteeringBehavior for Avoidance {
    fn query_radius(&self, agent: &AgentSnapshot) -> f32 {
        agent.radius * 3.0
    }

    fn calculate(&self, agent: &AgentSnapshot, candidates: &[AgentSnapshot]) -> Vec3 {
        neighbors_within(agent, candidates, self.query_radius(agent))
            .filter_map(|other| {
                let dist = agent.position.distance(other.position);
                (dist < agent.radius + other.radius).then(|| {
                    (agent.position - other.position).normalized() / (dist + AVOIDANCE_SOFTENING)
                })
            })
            .sum()
    }
}

/// Seek - full speed toward a goal, nothing without one
#[derive(Debug, Clone, Copy, Default)]
pub struct Seek {
    pub goal: Option<Vec3>,
}

impl Seek {
    #[must_use]
    pub fn new(goal: Option<Vec3>) -> Self {
        Self { goal }
    }
}

impl SteeringBehavior for Seek {
    fn query_radius(&self, _agent: &AgentSnapshot) -> f32 {
        0.0
    }

    fn calculate(&self, agent: &AgentSnapshot, _candidates: &[AgentSnapshot]) -> Vec3 {
        self.goal.map_or(Vec3::ZERO, |goal| {
            (goal - agent.position).normalized() * agent.max_speed
        })
    }
}
