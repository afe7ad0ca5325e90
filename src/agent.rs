//! # Agent Decision Loop
//!
//! An [`Agent`] runs one sense, select, plan and act cycle per call to
//! [`Agent::tick`]:
//!
//! 1. Drop target handles whose entities no longer exist, then sense the fact
//!    vocabulary from the agent's position.
//! 2. Pick a goal with the [`GoalSelector`].
//! 3. Plan from the sensed facts to that goal.
//! 4. Execute only the first action of the plan. The rest is discarded; the
//!    next tick plans again from fresh facts.
//!
//! Movement goes through the grid pathfinder. The computed path is cached in a
//! [`PathFollower`] and reused while the destination cell stays the same.

use crate::npc::{npc_catalog, NpcAction};
use crate::perception::Perception;
use crate::search::AStarSearch;
use crate::{
    ActionCatalog, AgentConfig, Cell, EntityId, FactState, GoalSelector, Grid, Pathfinder, Plan,
    Planner, Result, SpatialIndex, Vec2, World,
};
use rand::Rng;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Hit points of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    /// Full health.
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    /// Heals by `amount`, never above `max`. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The agent's entity is not in the world.
    Absent,
    /// No plan reaches the selected goal.
    Idle,
    /// The selected goal already holds.
    GoalSatisfied,
    /// The first action of the plan was executed.
    Performed(NpcAction),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Wander {
    direction: Vec2,
    expires_at: f64,
}

/// Follows a cached path one movement step at a time.
///
/// Waypoints are stored with the next one last, so consuming a waypoint is a
/// `pop`.
#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    destination: Option<Cell>,
    waypoints: Vec<Vec2>,
}

impl PathFollower {
    const REACHED: f64 = 1e-6;

    /// Replaces the cached path. `waypoints` are in travel order.
    pub fn set_path(&mut self, destination: Cell, mut waypoints: Vec<Vec2>) {
        waypoints.reverse();
        self.destination = Some(destination);
        self.waypoints = waypoints;
    }

    pub fn clear(&mut self) {
        self.destination = None;
        self.waypoints.clear();
    }

    pub fn destination(&self) -> Option<Cell> {
        self.destination
    }

    /// Waypoints left, in travel order.
    pub fn remaining(&self) -> Vec<Vec2> {
        self.waypoints.iter().rev().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoint to head for from `position`, given a movement step of
    /// `step`.
    ///
    /// Reached waypoints are dropped. When the waypoint after the next one is
    /// itself within a single step, the next one is skipped. The final
    /// waypoint is never dropped, so an agent that has arrived keeps getting
    /// its own position back.
    pub fn advance(&mut self, position: Vec2, step: f64) -> Option<Vec2> {
        while self.waypoints.len() >= 2 {
            let next = self.waypoints[self.waypoints.len() - 1];
            let after = self.waypoints[self.waypoints.len() - 2];
            if position.distance(next) <= Self::REACHED || position.distance(after) <= step {
                self.waypoints.pop();
            } else {
                break;
            }
        }
        self.waypoints.last().copied()
    }
}

/// A planning NPC bound to one entity of a [`World`].
pub struct Agent {
    id: EntityId,
    config: AgentConfig,
    planner: Planner,
    goals: GoalSelector,
    pathfinder: Pathfinder,
    health: Health,
    target: Option<EntityId>,
    structure_target: Option<EntityId>,
    wander: Option<Wander>,
    next_attack_at: f64,
    follower: PathFollower,
    facts: FactState,
    goal: FactState,
    plan: Option<Plan>,
}

impl Agent {
    /// Creates an NPC agent with the default catalog and goal rules.
    pub fn new(id: EntityId, config: AgentConfig) -> Result<Self> {
        Ok(Self::with_catalog(id, config, Arc::new(npc_catalog()?)))
    }

    /// Creates an agent planning over a shared catalog. Actions whose names
    /// are not [`NpcAction`]s can be planned with but not executed.
    pub fn with_catalog(id: EntityId, config: AgentConfig, catalog: Arc<ActionCatalog>) -> Self {
        let planner = Planner::from_shared(catalog).with_search_algorithm(Box::new(
            AStarSearch::with_default_heuristic().with_limits(config.plan_limits),
        ));
        let pathfinder =
            Pathfinder::new(config.blocking_tags.iter().cloned()).with_limits(config.path_limits);

        Self {
            id,
            health: Health::new(config.max_health),
            config,
            planner,
            goals: GoalSelector::npc_default(),
            pathfinder,
            target: None,
            structure_target: None,
            wander: None,
            next_attack_at: f64::NEG_INFINITY,
            follower: PathFollower::default(),
            facts: FactState::new(),
            goal: FactState::new(),
            plan: None,
        }
    }

    pub fn with_goals(mut self, goals: GoalSelector) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_health(mut self, current: i32) -> Self {
        self.health.current = current.clamp(0, self.health.max);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health.take_damage(amount);
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn structure_target(&self) -> Option<EntityId> {
        self.structure_target
    }

    /// Facts sensed on the last tick.
    pub fn facts(&self) -> &FactState {
        &self.facts
    }

    /// Goal selected on the last tick.
    pub fn goal(&self) -> &FactState {
        &self.goal
    }

    /// Plan made on the last tick, if any.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn path_follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Runs one decision cycle at time `now` (seconds).
    pub fn tick<W, R>(&mut self, world: &mut W, rng: &mut R, now: f64) -> TickOutcome
    where
        W: World + ?Sized,
        R: Rng,
    {
        self.clear_stale_targets(&*world);

        let Some(facts) = self.perceive(&*world, |p| p.sense(&self.health, self.target)) else {
            self.plan = None;
            return TickOutcome::Absent;
        };
        let goal = self.goals.select(&facts).clone();
        let plan = self.planner.plan(&facts, &goal);
        self.facts = facts;
        self.goal = goal;
        self.plan = plan;

        let Some(first) = self.plan.as_ref().map(Plan::first) else {
            log::debug!("agent {} has no plan for {}", self.id, self.goal);
            return TickOutcome::Idle;
        };
        let Some(first) = first else {
            return TickOutcome::GoalSatisfied;
        };
        let Some(action) = NpcAction::from_name(&first.name) else {
            log::warn!("agent {} cannot execute action {}", self.id, first.name);
            return TickOutcome::Idle;
        };

        log::debug!("agent {} performs {} toward {}", self.id, action, self.goal);
        self.execute(action, world, rng, now);
        TickOutcome::Performed(action)
    }

    fn clear_stale_targets<S: SpatialIndex + ?Sized>(&mut self, world: &S) {
        if let Some(target) = self.target.filter(|id| !world.contains(*id)) {
            log::debug!("agent {} lost target {}", self.id, target);
            self.target = None;
        }
        if let Some(structure) = self.structure_target.filter(|id| !world.contains(*id)) {
            log::debug!("agent {} lost structure {}", self.id, structure);
            self.structure_target = None;
        }
    }

    fn perceive<'a, S, T, F>(&'a self, world: &'a S, query: F) -> Option<T>
    where
        S: SpatialIndex + ?Sized,
        F: FnOnce(&Perception<'a, S>) -> T,
    {
        Perception::new(world, &self.config, self.id).map(|p| query(&p))
    }

    fn execute<W, R>(&mut self, action: NpcAction, world: &mut W, rng: &mut R, now: f64)
    where
        W: World + ?Sized,
        R: Rng,
    {
        match action {
            NpcAction::RunToSafety => {
                if let Some(point) = self.perceive(&*world, |p| p.safe_point()) {
                    self.move_toward(world, rng, now, point);
                }
            }
            NpcAction::LookForConsumable => {
                let nearest = self.perceive(&*world, |p| p.nearest_consumable()).flatten();
                if let Some(point) = nearest.and_then(|id| world.position(id)) {
                    self.move_toward(world, rng, now, point);
                }
            }
            NpcAction::TakeConsumable => {
                let adjacent = self.perceive(&*world, |p| p.adjacent_consumable()).flatten();
                if let Some(id) = adjacent {
                    if world.consume(id) {
                        let healed = self.health.heal(self.config.heal_amount);
                        log::debug!("agent {} consumed {} and healed {}", self.id, id, healed);
                    }
                }
            }
            NpcAction::FindTarget => {
                let nearest = self.perceive(&*world, |p| p.nearest_hostile()).flatten();
                if let Some(id) = nearest {
                    self.target = Some(id);
                    if let Some(point) = world.position(id) {
                        self.move_toward(world, rng, now, point);
                    }
                }
            }
            NpcAction::MoveToTarget => match self.target.and_then(|id| world.position(id)) {
                Some(point) => {
                    self.move_toward(world, rng, now, point);
                }
                None => self.target = None,
            },
            NpcAction::AttackTarget => {
                if let Some(target) = self.target {
                    self.strike(world, target, now);
                }
            }
            NpcAction::MoveToStructure => {
                let nearest = self.perceive(&*world, |p| p.nearest_structure()).flatten();
                if let Some(id) = nearest {
                    self.structure_target = Some(id);
                    if let Some(point) = world.position(id) {
                        self.move_toward(world, rng, now, point);
                    }
                }
            }
            NpcAction::AttackStructure => {
                let range = self.config.attack_range;
                let locked = self.structure_target;
                let structure = self
                    .perceive(&*world, |p| {
                        locked
                            .filter(|id| p.within(*id, range))
                            .or_else(|| p.structure_in_range())
                    })
                    .flatten();
                if let Some(id) = structure {
                    self.structure_target = Some(id);
                    self.strike(world, id, now);
                }
            }
            NpcAction::Wander => {
                self.wander_step(world, rng, now);
            }
        }
    }

    /// Deals damage to `id` if the attack cooldown has elapsed. The cooldown
    /// only restarts when the hit lands.
    fn strike<W: World + ?Sized>(&mut self, world: &mut W, id: EntityId, now: f64) -> bool {
        if now < self.next_attack_at {
            return false;
        }
        if !world.apply_damage(id, self.config.attack_damage) {
            return false;
        }
        self.next_attack_at = now + self.config.attack_cooldown;
        log::debug!(
            "agent {} hit {} for {}",
            self.id,
            id,
            self.config.attack_damage
        );
        true
    }

    /// Takes one movement step toward `point` along a grid path. Falls back to
    /// a wander step when no path exists.
    fn move_toward<W, R>(&mut self, world: &mut W, rng: &mut R, now: f64, point: Vec2) -> bool
    where
        W: World + ?Sized,
        R: Rng,
    {
        let Some(position) = world.position(self.id) else {
            return false;
        };

        let destination = world.world_to_cell(point);
        let drifted = self
            .follower
            .advance(position, self.config.speed)
            .map_or(true, |next| position.distance(next) > self.config.tile_size * 2.0);
        if self.follower.destination() != Some(destination) || drifted {
            if !self.plan_path(&*world, position, point) {
                return self.wander_step(world, rng, now);
            }
        }

        let Some(waypoint) = self.follower.advance(position, self.config.speed) else {
            return self.wander_step(world, rng, now);
        };

        let delta = waypoint - position;
        let distance = delta.length();
        if distance <= PathFollower::REACHED {
            return true;
        }

        let step = if distance <= self.config.speed {
            delta
        } else {
            delta.normalize_or_zero() * self.config.speed
        };
        if world.move_by(self.id, step) {
            true
        } else {
            self.follower.clear();
            false
        }
    }

    /// Computes and caches a path from `position` to `point`.
    fn plan_path<G: Grid + ?Sized>(&mut self, grid: &G, position: Vec2, point: Vec2) -> bool {
        let blocking = self.pathfinder.blocking_tags();
        let start = grid.world_to_cell(position);
        let requested = grid.world_to_cell(point);

        let spacing = self.config.tile_size / 2.0;
        let (end, final_point) = if grid.cell_open(requested, blocking) {
            (requested, point)
        } else if let Some(cell) = nearest_open_neighbor(grid, requested, start, blocking) {
            (cell, grid.cell_center(cell))
        } else if let Some(open) = last_open_point(grid, position, point, spacing, blocking) {
            (grid.world_to_cell(open), open)
        } else {
            self.follower.clear();
            return false;
        };

        let Some(path) = self.pathfinder.find_path(grid, start, end) else {
            log::debug!("agent {} has no path from {} to {}", self.id, start, end);
            self.follower.clear();
            return false;
        };

        let mut waypoints: Vec<Vec2> = path
            .cells()
            .iter()
            .skip(1)
            .map(|cell| grid.cell_center(*cell))
            .collect();
        match waypoints.last_mut() {
            Some(last) => *last = final_point,
            None => waypoints.push(final_point),
        }

        self.follower.set_path(requested, waypoints);
        true
    }

    /// Keeps the current wander direction until it expires or is blocked, then
    /// tries fresh random directions.
    fn wander_step<W, R>(&mut self, world: &mut W, rng: &mut R, now: f64) -> bool
    where
        W: World + ?Sized,
        R: Rng,
    {
        let speed = self.config.speed;

        if let Some(wander) = self.wander.filter(|w| now < w.expires_at) {
            if world.move_by(self.id, wander.direction * speed) {
                return true;
            }
        }

        for _ in 0..self.config.wander_retries {
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            self.wander = Some(Wander {
                direction,
                expires_at: now + self.config.wander_duration,
            });
            if world.move_by(self.id, direction * speed) {
                return true;
            }
        }

        log::debug!("agent {} is boxed in", self.id);
        false
    }
}

/// Walks back from `point` toward `from` in steps of `spacing` and returns the
/// first sample whose cell is open.
fn last_open_point<G: Grid + ?Sized>(
    grid: &G,
    from: Vec2,
    point: Vec2,
    spacing: f64,
    blocking: &[String],
) -> Option<Vec2> {
    let steps = (from.distance(point) / spacing).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| point.lerp(from, i as f64 / steps as f64))
        .find(|sample| grid.cell_open(grid.world_to_cell(*sample), blocking))
}

/// The open neighbour of `cell` closest to `from`.
fn nearest_open_neighbor<G: Grid + ?Sized>(
    grid: &G,
    cell: Cell,
    from: Cell,
    blocking: &[String],
) -> Option<Cell> {
    const AROUND: [(i32, i32); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];

    AROUND
        .iter()
        .map(|(dx, dy)| cell.offset(*dx, *dy))
        .filter(|c| grid.cell_open(*c, blocking))
        .fold(None, |best: Option<Cell>, candidate| match best {
            Some(current) if current.distance(from) <= candidate.distance(from) => Some(current),
            _ => Some(candidate),
        })
}
