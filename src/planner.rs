//! # Planner Module for Goal-Oriented Action Planning (GOAP)
//!
//! The planner is the central component of a GOAP system, responsible for:
//! - Finding the cheapest sequence of actions that reaches a goal
//! - Coordinating between fact states and the action catalog
//! - Delegating the graph search to a pluggable [`SearchAlgorithm`]
//!
//! ## Overview
//!
//! The planner searches an implicit graph: each node is a fact state, each edge
//! an action whose preconditions hold in that state. Nodes are identified by
//! their canonical key, so two states with the same facts are the same node no
//! matter how they were reached.
//!
//! Planning is a pure function of `(start, goal, actions)`. Nothing survives
//! between calls, so one `Planner` can be shared by any number of agents.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_agent::{Action, ActionCatalog, FactState, Planner};
//!
//! let find = Action::new("FindTarget", 3.0)
//!     .unwrap()
//!     .precondition("has_target", false)
//!     .precondition("hostiles_nearby", true)
//!     .effect("has_target", true);
//! let approach = Action::new("MoveToTarget", 3.0)
//!     .unwrap()
//!     .precondition("has_target", true)
//!     .precondition("in_attack_range", false)
//!     .effect("in_attack_range", true);
//! let attack = Action::new("AttackTarget", 4.0)
//!     .unwrap()
//!     .precondition("has_target", true)
//!     .precondition("in_attack_range", true)
//!     .effect("has_defeated_target", true);
//!
//! let planner = Planner::new(ActionCatalog::from_actions(vec![find, approach, attack]).unwrap());
//!
//! let start = FactState::new()
//!     .with("has_target", false)
//!     .with("in_attack_range", false)
//!     .with("hostiles_nearby", true);
//! let goal = FactState::new().with("has_defeated_target", true);
//!
//! let plan = planner.plan(&start, &goal).unwrap();
//! assert_eq!(plan.names(), ["FindTarget", "MoveToTarget", "AttackTarget"]);
//! assert_eq!(plan.cost(), 10.0);
//! ```

use crate::search::{AStarSearch, SearchAlgorithm};
use crate::{Action, ActionCatalog, FactState};
use std::fmt;
use std::sync::Arc;

/// An ordered list of actions together with their summed cost.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    actions: Vec<Action>,
    cost: f64,
}

impl Plan {
    pub fn new(actions: Vec<Action>, cost: f64) -> Self {
        Self { actions, cost }
    }

    /// The plan for a goal that already holds.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The action to execute now. Agents replan every tick, so this is the
    /// only step they ever use.
    pub fn first(&self) -> Option<&Action> {
        self.actions.first()
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Replays the plan's effects on top of `start`.
    pub fn final_state(&self, start: &FactState) -> FactState {
        self.actions
            .iter()
            .fold(start.clone(), |state, action| action.successor(&state))
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "(empty plan)");
        }
        write!(f, "{} (cost {})", self.names().join(" -> "), self.cost)
    }
}

/// The core planning component in a GOAP system.
///
/// A `Planner` owns a shared, read-only action catalog and a search algorithm.
/// It holds no per-call state.
///
/// # Examples
///
/// Using Dijkstra's algorithm instead of A*:
///
/// ```
/// use goap_agent::{Action, ActionCatalog, DijkstraSearch, FactState, Planner};
///
/// let catalog = ActionCatalog::from_actions(vec![
///     Action::new("walk", 1.0).unwrap().effect("at_store", true),
/// ])
/// .unwrap();
/// let planner = Planner::new(catalog).with_search_algorithm(Box::new(DijkstraSearch::default()));
///
/// let plan = planner
///     .plan(&FactState::new(), &FactState::new().with("at_store", true))
///     .unwrap();
/// assert_eq!(plan.len(), 1);
/// ```
pub struct Planner {
    /// Available actions that can be used in planning
    catalog: Arc<ActionCatalog>,
    /// The algorithm used to search for a plan
    search_algorithm: Box<dyn SearchAlgorithm>,
}

impl Planner {
    /// Creates a planner over `catalog` using A* with the mismatch heuristic.
    pub fn new(catalog: ActionCatalog) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    /// Creates a planner over a catalog shared with other planners.
    pub fn from_shared(catalog: Arc<ActionCatalog>) -> Self {
        Self {
            catalog,
            search_algorithm: Box::new(AStarSearch::default()),
        }
    }

    /// Replaces the search algorithm.
    pub fn with_search_algorithm(mut self, search_algorithm: Box<dyn SearchAlgorithm>) -> Self {
        self.search_algorithm = search_algorithm;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Finds a plan from `start` to any state satisfying `goal`.
    ///
    /// # Returns
    ///
    /// * `Some(plan)` - possibly empty when `start` already satisfies `goal`
    /// * `None` - the goal is unreachable or the search hit its expansion cap
    pub fn plan(&self, start: &FactState, goal: &FactState) -> Option<Plan> {
        let plan = self
            .search_algorithm
            .search(self.catalog.actions(), start, goal);

        match &plan {
            Some(plan) => log::debug!("planned {} for goal {}", plan, goal),
            None => log::debug!("no plan from {} to {}", start, goal),
        }

        plan
    }
}

/// Plans over a plain action slice with the default A* search.
pub fn plan(start: &FactState, goal: &FactState, actions: &[Action]) -> Option<Plan> {
    AStarSearch::default().search(actions, start, goal)
}
