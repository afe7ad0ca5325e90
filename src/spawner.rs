//! # Spawner
//!
//! A den that periodically produces hostiles around itself. It does not touch
//! the world: [`Spawner::update`] returns a [`SpawnRequest`] and the caller
//! creates the entity, remembering which spawner it belongs to by
//! [`SpawnerId`].

use crate::Vec2;
use rand::Rng;
use std::f64::consts::TAU;
use std::fmt;

/// Stable handle to a spawner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnerId(pub u32);

impl fmt::Display for SpawnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spawner-{}", self.0)
    }
}

/// Where and by whom a new entity should be created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub spawner: SpawnerId,
    pub position: Vec2,
}

#[derive(Clone, Debug)]
pub struct Spawner {
    id: SpawnerId,
    position: Vec2,
    cooldown: f64,
    max_alive: usize,
    spawn_radius: f64,
    last_spawn_at: Option<f64>,
    alive: usize,
}

impl Spawner {
    pub const DEFAULT_COOLDOWN: f64 = 30.0;
    pub const DEFAULT_MAX_ALIVE: usize = 5;
    pub const DEFAULT_SPAWN_RADIUS: f64 = 64.0;

    pub fn new(id: SpawnerId, position: Vec2) -> Self {
        Self {
            id,
            position,
            cooldown: Self::DEFAULT_COOLDOWN,
            max_alive: Self::DEFAULT_MAX_ALIVE,
            spawn_radius: Self::DEFAULT_SPAWN_RADIUS,
            last_spawn_at: None,
            alive: 0,
        }
    }

    pub fn with_cooldown(mut self, seconds: f64) -> Self {
        self.cooldown = seconds;
        self
    }

    pub fn with_max_alive(mut self, max_alive: usize) -> Self {
        self.max_alive = max_alive;
        self
    }

    pub fn with_spawn_radius(mut self, radius: f64) -> Self {
        self.spawn_radius = radius;
        self
    }

    pub fn id(&self) -> SpawnerId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn alive(&self) -> usize {
        self.alive
    }

    /// Spawns at most one entity when the cooldown has elapsed and the
    /// population is below its cap. The first spawn happens immediately.
    pub fn update<R: Rng>(&mut self, now: f64, rng: &mut R) -> Option<SpawnRequest> {
        let ready = self
            .last_spawn_at
            .map_or(true, |last| now - last >= self.cooldown);
        if !ready || self.alive >= self.max_alive {
            return None;
        }

        let angle = rng.gen_range(0.0..TAU);
        let position = self.position + Vec2::from_angle(angle) * self.spawn_radius;
        self.last_spawn_at = Some(now);
        self.alive += 1;

        log::debug!("{} spawned at ({:.1}, {:.1})", self.id, position.x, position.y);
        Some(SpawnRequest {
            spawner: self.id,
            position,
        })
    }

    /// Records that one of this spawner's entities is gone, freeing a slot.
    pub fn release(&mut self) {
        self.alive = self.alive.saturating_sub(1);
    }
}
