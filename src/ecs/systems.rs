//! Systems that move data between the world and the AI framework

use hecs::Entity;

use super::components::{Brain, CrowdMember, Transform, Velocity};
use super::world::World;
use crate::ai::{AiFramework, Status};

/// Outcome of one [`sync_crowd_agents`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Entities updated from their agent
    pub synced: usize,
    /// Entities whose crowd or agent no longer exists
    pub stale: usize,
}

/// Copy agent state into `Transform` and `Velocity`.
///
/// Moving agents are turned to face their direction of travel. Stale members
/// are left as they were.
pub fn sync_crowd_agents(world: &mut World, ai: &AiFramework) -> SyncStats {
    let mut stats = SyncStats::default();

    for (_entity, (member, transform, velocity)) in
        world.query_mut::<(&CrowdMember, &mut Transform, &mut Velocity)>()
    {
        let Some(agent) = ai
            .crowd(member.crowd)
            .and_then(|crowd| crowd.agent(member.agent))
        else {
            stats.stale += 1;
            continue;
        };

        transform.position = agent.position;
        transform.face_direction(agent.velocity);
        velocity.0 = agent.velocity;
        stats.synced += 1;
    }

    if stats.stale > 0 {
        log::trace!("{} crowd members point at missing agents", stats.stale);
    }

    stats
}

/// Tick every entity's behavior tree once.
///
/// Entities whose tree was destroyed are skipped.
pub fn run_brains(world: &World, ai: &mut AiFramework) -> Vec<(Entity, Status)> {
    let mut results = Vec::new();

    for (entity, brain) in world.query::<&Brain>().iter() {
        if let Some(tree) = ai.behavior_tree_mut(brain.0) {
            results.push((entity, tree.execute()));
        }
    }

    results
}
