//! Headless demo exercising the AI framework
//!
//! Usage: `ai_core [config.ron]`

use std::cell::Cell;
use std::rc::Rc;

use ai_core::prelude::*;

const TICKS: u32 = 240;
const DELTA_TIME: f32 = 1.0 / 60.0;
const SQUAD_SIZE: usize = 8;

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            AiConfig::load_ron(path)?
        }
        None => AiConfig::default(),
    };

    let mut ai = AiFramework::new(config);

    demo_nav_mesh(&mut ai);
    demo_grid(&ai);
    demo_crowd(&mut ai);

    ai.shutdown();
    log::info!("Demo finished");
    Ok(())
}

/// Walled courtyard: flat floor with a wall at x = 2 spanning z in [-5, 5]
fn courtyard(p: Vec3) -> bool {
    let on_floor = p.y.abs() < 0.01 && p.x.abs() <= 10.0 && p.z.abs() <= 10.0;
    let in_wall = (p.x - 2.0).abs() < 0.01 && p.z.abs() <= 5.0;
    on_floor && !in_wall
}

fn demo_nav_mesh(ai: &mut AiFramework) {
    let id = ai.create_nav_mesh();
    let Some(mesh) = ai.nav_mesh_mut(id) else {
        return;
    };

    // A 2 x 8 corridor split into quads of two triangles each
    for i in 0..4 {
        let x = i as f32 * 2.0;
        mesh.add_triangle(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + 2.0, 0.0, 0.0),
            Vec3::new(x, 0.0, 2.0),
        );
        mesh.add_triangle(
            Vec3::new(x + 2.0, 0.0, 0.0),
            Vec3::new(x + 2.0, 0.0, 2.0),
            Vec3::new(x, 0.0, 2.0),
        );
    }
    mesh.build_connections();

    let Some(mesh) = ai.nav_mesh(id) else {
        return;
    };
    let path = ai.pathfinder().find_path_navmesh(
        Vec3::new(0.3, 0.0, 0.3),
        Vec3::new(7.7, 0.0, 1.7),
        mesh,
    );
    log::info!(
        "Nav mesh path: {} waypoints, length {:.2}",
        path.len(),
        path.length
    );
}

fn demo_grid(ai: &AiFramework) {
    let pathfinder = ai.pathfinder();

    let path = pathfinder.find_path_astar_default(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), courtyard);
    match path.last() {
        Some(end) => log::info!(
            "Grid path around the wall: {} waypoints ending at {end}",
            path.len()
        ),
        None => log::warn!("Grid path not found"),
    }

    let field = pathfinder.generate_flow_field(Vec3::new(8.0, 0.0, 0.0), courtyard, 1.0, 30.0);
    let sample = Vec3::new(-4.5, 0.0, 0.5);
    log::info!(
        "Flow field: {} cells, direction at {sample} is {}",
        field.len(),
        pathfinder.flow_direction(&field, sample)
    );
}

fn demo_crowd(ai: &mut AiFramework) {
    let crowd = ai.create_crowd();
    let goal = Vec3::new(12.0, 0.0, 0.0);
    let arrived = Rc::new(Cell::new(0_usize));

    let mut world = World::new();
    let mut trackers = Vec::with_capacity(SQUAD_SIZE);
    for i in 0..SQUAD_SIZE {
        let start = Vec3::new(-6.0, 0.0, i as f32 - SQUAD_SIZE as f32 / 2.0);
        let Some(entity) = world.spawn_crowd_member(
            ai,
            crowd,
            format!("squad-{i}"),
            start,
            AgentParams::default(),
        ) else {
            continue;
        };

        if let Ok(member) = world.get::<CrowdMember>(entity).map(|m| *m)
            && let Some(sim) = ai.crowd_mut(crowd)
        {
            sim.set_agent_goal(member.agent, goal);
        }

        // Report arrival once close enough, keep walking otherwise
        let last_position = Rc::new(Cell::new(start));
        let counter = Rc::clone(&arrived);
        let near_goal = {
            let position = Rc::clone(&last_position);
            BehaviorNode::condition(move || position.get().distance(goal) < 2.0)
        };
        let announce = BehaviorNode::action(move || {
            counter.set(counter.get() + 1);
            Status::Success
        });
        let walk = BehaviorNode::action(|| Status::Running);
        let root = BehaviorNode::selector(vec![BehaviorNode::sequence(vec![near_goal, announce]), walk]);

        let tree = ai.create_behavior_tree_with_root(root);
        if world.attach_brain(entity, tree).is_ok() {
            trackers.push((entity, last_position));
        }
    }

    for tick in 1..=TICKS {
        ai.update(DELTA_TIME);
        let stats = sync_crowd_agents(&mut world, ai);

        for (entity, position) in &trackers {
            if let Ok(transform) = world.get::<Transform>(*entity) {
                position.set(transform.position);
            }
        }

        if tick % 60 == 0 {
            arrived.set(0);
            let statuses = run_brains(&world, ai);
            let running = statuses.iter().filter(|(_, s)| s.is_running()).count();
            log::info!(
                "Tick {tick}: {} synced, {} arrived, {running} still walking",
                stats.synced,
                arrived.get()
            );
        }
    }
}
