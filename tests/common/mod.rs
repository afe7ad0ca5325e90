#![allow(dead_code)]

use goap_agent::{
    Agent, AgentConfig, Cell, EntityId, SimRng, SimpleWorld, SpatialIndex, TickOutcome, TileGrid,
    Vec2,
};

/// Simulation step, 60 ticks per second.
pub const DT: f64 = 1.0 / 60.0;

pub const BLOCKING: [&str; 2] = ["mountain", "goblin_den"];

pub fn world_from(map: &str) -> SimpleWorld {
    SimpleWorld::new(TileGrid::from_ascii(map), BLOCKING)
}

/// An open world of `width` x `height` tiles.
pub fn open_world(width: i32, height: i32) -> SimpleWorld {
    SimpleWorld::new(
        TileGrid::new(width, height, TileGrid::DEFAULT_TILE_SIZE),
        BLOCKING,
    )
}

pub fn spawn_npc(world: &mut SimpleWorld, cell: Cell) -> Agent {
    let id = world.spawn_at_cell(cell, ["character"]);
    Agent::new(id, AgentConfig::default()).unwrap()
}

pub fn spawn_monster(world: &mut SimpleWorld, cell: Cell) -> EntityId {
    world.spawn_at_cell(cell, ["monster"])
}

pub fn position(world: &SimpleWorld, agent: &Agent) -> Vec2 {
    world.position(agent.id()).unwrap()
}

/// Ticks `agent` until `done` holds or `max_ticks` have run. Returns every
/// outcome in order.
pub fn run_until<F>(
    agent: &mut Agent,
    world: &mut SimpleWorld,
    rng: &mut SimRng,
    max_ticks: usize,
    mut done: F,
) -> Vec<TickOutcome>
where
    F: FnMut(&Agent, &SimpleWorld) -> bool,
{
    let mut outcomes = Vec::new();
    for tick in 0..max_ticks {
        if done(agent, world) {
            break;
        }
        outcomes.push(agent.tick(world, rng, tick as f64 * DT));
    }
    outcomes
}

/// The distinct actions performed, in order, with repeats collapsed.
pub fn action_sequence(outcomes: &[TickOutcome]) -> Vec<String> {
    let mut sequence: Vec<String> = Vec::new();
    for outcome in outcomes {
        if let TickOutcome::Performed(action) = outcome {
            let name = action.to_string();
            if sequence.last() != Some(&name) {
                sequence.push(name);
            }
        }
    }
    sequence
}
