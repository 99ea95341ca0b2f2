//! World wrapper around hecs

use glam::Vec3;
use hecs::Entity;

use super::components::{Brain, CrowdMember, Name, Transform, Velocity};
use crate::ai::{AgentParams, AiFramework, CrowdId, TreeId};

/// Host world holding entities driven by the AI framework
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Add an agent to `crowd` and spawn an entity that mirrors it.
    ///
    /// Returns `None` if the crowd does not exist.
    pub fn spawn_crowd_member(
        &mut self,
        ai: &mut AiFramework,
        crowd: CrowdId,
        name: impl Into<String>,
        position: Vec3,
        params: AgentParams,
    ) -> Option<Entity> {
        let agent = ai
            .crowd_mut(crowd)?
            .add_agent_with_params(position, params);

        Some(self.spawn((
            Name::new(name),
            Transform::from_position(position),
            Velocity::default(),
            CrowdMember { crowd, agent },
        )))
    }

    /// Attach a behavior tree to an entity
    pub fn attach_brain(&mut self, entity: Entity, tree: TreeId) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, Brain(tree))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Despawn an entity and remove its crowd agent, if it has one
    pub fn despawn_crowd_member(
        &mut self,
        ai: &mut AiFramework,
        entity: Entity,
    ) -> Result<(), hecs::NoSuchEntity> {
        if let Ok(member) = self.inner.get::<&CrowdMember>(entity).map(|m| *m)
            && let Some(crowd) = ai.crowd_mut(member.crowd)
        {
            crowd.remove_agent(member.agent);
        }
        self.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_crowd_member() {
        let mut ai = AiFramework::default();
        let crowd = ai.create_crowd();
        let mut world = World::new();

        let entity = world
            .spawn_crowd_member(&mut ai, crowd, "scout", Vec3::new(1.0, 0.0, 1.0), AgentParams::default())
            .unwrap();

        let member = *world.get::<CrowdMember>(entity).unwrap();
        assert_eq!(member.crowd, crowd);
        assert_eq!(
            ai.crowd(crowd).unwrap().agent_position(member.agent),
            Some(Vec3::new(1.0, 0.0, 1.0))
        );
        assert_eq!(world.get::<Name>(entity).unwrap().0, "scout");
    }

    #[test]
    fn test_spawn_into_missing_crowd() {
        let mut ai = AiFramework::default();
        let crowd = ai.create_crowd();
        ai.destroy_crowd(crowd);

        let mut world = World::new();
        assert!(
            world
                .spawn_crowd_member(&mut ai, crowd, "ghost", Vec3::ZERO, AgentParams::default())
                .is_none()
        );
        assert!(world.is_empty());
    }

    #[test]
    fn test_despawn_crowd_member_removes_agent() {
        let mut ai = AiFramework::default();
        let crowd = ai.create_crowd();
        let mut world = World::new();
        let entity = world
            .spawn_crowd_member(&mut ai, crowd, "a", Vec3::ZERO, AgentParams::default())
            .unwrap();

        assert_eq!(world.len(), 1);

        world.despawn_crowd_member(&mut ai, entity).unwrap();

        assert!(!world.contains(entity));
        assert_eq!(world.len(), 0);
        assert_eq!(ai.crowd(crowd).unwrap().agent_count(), 0);
        assert!(world.despawn_crowd_member(&mut ai, entity).is_err());
    }

    #[test]
    fn test_plain_despawn_keeps_agent() {
        let mut ai = AiFramework::default();
        let crowd = ai.create_crowd();
        let mut world = World::new();
        let entity = world
            .spawn_crowd_member(&mut ai, crowd, "a", Vec3::ZERO, AgentParams::default())
            .unwrap();
        world.spawn((Name::new("bystander"),));
        assert_eq!(world.len(), 2);

        world.despawn(entity).unwrap();

        assert_eq!(world.len(), 1);
        assert_eq!(ai.crowd(crowd).unwrap().agent_count(), 1);
    }

    #[test]
    fn test_get_mut_edits_component() {
        let mut world = World::new();
        let entity = world.spawn((Transform::default(), Velocity::default()));

        world.get_mut::<Velocity>(entity).unwrap().0 = Vec3::X;
        world.get_mut::<Transform>(entity).unwrap().position = Vec3::new(2.0, 0.0, 3.0);

        assert_eq!(world.get::<Velocity>(entity).unwrap().0, Vec3::X);
        assert_eq!(
            world.get::<Transform>(entity).unwrap().position,
            Vec3::new(2.0, 0.0, 3.0)
        );
        assert!(world.get_mut::<Name>(entity).is_err());
    }

    #[test]
    fn test_attach_brain() {
        let mut ai = AiFramework::default();
        let tree = ai.create_behavior_tree();
        let mut world = World::new();
        let entity = world.spawn((Name::new("thinker"),));

        world.attach_brain(entity, tree).unwrap();
        assert_eq!(*world.get::<Brain>(entity).unwrap(), Brain(tree));
    }
}
