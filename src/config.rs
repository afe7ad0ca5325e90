/// Upper bound on how many nodes a search may expand before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// `None` lets the search run until its open set is exhausted.
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    pub const DEFAULT_PLAN_EXPANSIONS: usize = 4096;
    pub const DEFAULT_PATH_EXPANSIONS: usize = 16_384;

    /// Default cap for the action planner.
    pub fn planner() -> Self {
        Self::with_max_expansions(Self::DEFAULT_PLAN_EXPANSIONS)
    }

    /// Default cap for the grid pathfinder.
    pub fn pathfinder() -> Self {
        Self::with_max_expansions(Self::DEFAULT_PATH_EXPANSIONS)
    }

    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            max_expansions: None,
        }
    }

    /// Whether another expansion is allowed after `expanded` so far.
    pub fn allows(&self, expanded: usize) -> bool {
        self.max_expansions.map_or(true, |max| expanded < max)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::planner()
    }
}

/// Tunable parameters of a planning agent.
///
/// Distances are in world units, times in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Edge length of one grid cell
    pub tile_size: f64,
    /// Distance covered by one movement step
    pub speed: f64,
    pub max_health: i32,
    /// Health below `max_health * low_health_ratio` counts as low
    pub low_health_ratio: f64,
    /// Hostiles within this radius put the agent in danger
    pub danger_radius: f64,
    /// Hostiles and consumables within this radius are noticed
    pub awareness_radius: f64,
    /// Consumables closer than this can be taken
    pub pickup_radius: f64,
    pub attack_range: f64,
    pub attack_damage: i32,
    pub attack_cooldown: f64,
    pub heal_amount: i32,
    /// How far to flee from the hostiles' average position
    pub safety_distance: f64,
    /// How long a wander direction is kept
    pub wander_duration: f64,
    /// Random directions tried before a wander step gives up
    pub wander_retries: usize,
    pub hostile_tag: String,
    pub consumable_tag: String,
    pub structure_tag: String,
    /// Tags of cells the agent cannot enter
    pub blocking_tags: Vec<String>,
    pub plan_limits: SearchLimits,
    pub path_limits: SearchLimits,
}

impl AgentConfig {
    pub const DEFAULT_TILE_SIZE: f64 = 32.0;
    pub const DEFAULT_SPEED: f64 = 2.0;
    pub const DEFAULT_MAX_HEALTH: i32 = 100;
    pub const DEFAULT_LOW_HEALTH_RATIO: f64 = 0.3;
    pub const DEFAULT_DANGER_TILES: f64 = 4.0;
    pub const DEFAULT_AWARENESS_TILES: f64 = 6.0;
    pub const DEFAULT_PICKUP_RADIUS: f64 = 16.0;
    pub const DEFAULT_ATTACK_TILES: f64 = 2.0;
    pub const DEFAULT_ATTACK_DAMAGE: i32 = 20;
    pub const DEFAULT_ATTACK_COOLDOWN: f64 = 2.0;
    pub const DEFAULT_HEAL_AMOUNT: i32 = 20;
    pub const DEFAULT_SAFETY_TILES: f64 = 5.0;
    pub const DEFAULT_WANDER_DURATION: f64 = 5.0;
    pub const DEFAULT_WANDER_RETRIES: usize = 8;

    pub const HOSTILE_TAG: &'static str = "monster";
    pub const CONSUMABLE_TAG: &'static str = "mushroom";
    pub const STRUCTURE_TAG: &'static str = "goblin_den";
    pub const OBSTACLE_TAG: &'static str = "mountain";

    pub fn new() -> Self {
        let tile = Self::DEFAULT_TILE_SIZE;
        Self {
            tile_size: tile,
            speed: Self::DEFAULT_SPEED,
            max_health: Self::DEFAULT_MAX_HEALTH,
            low_health_ratio: Self::DEFAULT_LOW_HEALTH_RATIO,
            danger_radius: Self::DEFAULT_DANGER_TILES * tile,
            awareness_radius: Self::DEFAULT_AWARENESS_TILES * tile,
            pickup_radius: Self::DEFAULT_PICKUP_RADIUS,
            attack_range: Self::DEFAULT_ATTACK_TILES * tile,
            attack_damage: Self::DEFAULT_ATTACK_DAMAGE,
            attack_cooldown: Self::DEFAULT_ATTACK_COOLDOWN,
            heal_amount: Self::DEFAULT_HEAL_AMOUNT,
            safety_distance: Self::DEFAULT_SAFETY_TILES * tile,
            wander_duration: Self::DEFAULT_WANDER_DURATION,
            wander_retries: Self::DEFAULT_WANDER_RETRIES,
            hostile_tag: Self::HOSTILE_TAG.to_string(),
            consumable_tag: Self::CONSUMABLE_TAG.to_string(),
            structure_tag: Self::STRUCTURE_TAG.to_string(),
            blocking_tags: vec![
                Self::OBSTACLE_TAG.to_string(),
                Self::STRUCTURE_TAG.to_string(),
            ],
            plan_limits: SearchLimits::planner(),
            path_limits: SearchLimits::pathfinder(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_attack_cooldown(mut self, seconds: f64) -> Self {
        self.attack_cooldown = seconds;
        self
    }

    pub fn with_blocking_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocking_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_plan_limits(mut self, limits: SearchLimits) -> Self {
        self.plan_limits = limits;
        self
    }

    pub fn with_path_limits(mut self, limits: SearchLimits) -> Self {
        self.path_limits = limits;
        self
    }

    /// Health strictly below this value is low.
    pub fn low_health_threshold(&self) -> f64 {
        f64::from(self.max_health) * self.low_health_ratio
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}
