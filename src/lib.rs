//! # goap-agent
//!
//! Goal-Oriented Action Planning for agents living on a tiled world.
//!
//! - [`FactState`] / [`Action`] / [`ActionCatalog`]: the planning vocabulary
//! - [`Planner`]: A* over fact states, returning the cheapest known [`Plan`]
//! - [`Pathfinder`]: A* over grid cells without corner cutting
//! - [`Agent`]: the per-tick sense, select, plan and act loop of an NPC
//! - [`Spawner`]: a den that produces hostiles on a cooldown
//!
//! Randomness is always injected. [`seeded_rng`] gives a reproducible
//! generator for simulations and tests.

mod action;
mod agent;
mod config;
mod error;
mod goal;
mod grid;
mod npc;
mod pathfinding;
mod perception;
mod planner;
mod search;
mod spawner;
mod state;
mod visualizer;
mod world;

pub use action::{Action, ActionCatalog, CostFn};
pub use agent::{Agent, Health, PathFollower, TickOutcome};
pub use config::{AgentConfig, SearchLimits};
pub use error::{GoapError, Result};
pub use goal::{GoalCondition, GoalRule, GoalSelector};
pub use grid::{Cell, Grid, TileGrid};
pub use npc::{npc_catalog, NpcAction};
pub use pathfinding::{GridPath, Pathfinder};
pub use perception::{facts, Perception};
pub use planner::{plan, Plan, Planner};
pub use search::{
    AStarSearch, DefaultHeuristic, DijkstraSearch, HeuristicStrategy, SearchAlgorithm,
    ZeroHeuristic,
};
pub use spawner::{SpawnRequest, Spawner, SpawnerId};
pub use state::{FactState, FactValue, CANONICAL_SEPARATOR};
pub use visualizer::GoapVisualizer;
/// World-space point or direction.
pub use glam::DVec2 as Vec2;
pub use world::{Entity, EntityId, SimpleWorld, SpatialIndex, World};

use rand::SeedableRng;

/// Deterministic generator used for wandering and spawning.
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Creates a [`SimRng`] from a seed. Equal seeds give equal simulations.
pub fn seeded_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}
