//! # Actions and the Action Catalog
//!
//! An [`Action`] is an edge of the planner's search graph: it has a name,
//! preconditions that must sub-match the current state, effects that overwrite
//! facts, and a cost function evaluated against the state it is applied to.
//!
//! Actions are registered into an [`ActionCatalog`]. Registration is where
//! malformed definitions are rejected: duplicate names always, and facts
//! outside the catalog vocabulary when one is declared. Once registered the
//! catalog is only read.
//!
//! ```
//! use goap_agent::{Action, ActionCatalog, FactState};
//!
//! let mut catalog = ActionCatalog::with_vocabulary(["has_target", "in_attack_range"]);
//!
//! let mut approach = Action::new("MoveToTarget", 3.0).unwrap();
//! approach.preconditions.set("has_target", true);
//! approach.preconditions.set("in_attack_range", false);
//! approach.effects.set("in_attack_range", true);
//! catalog.register(approach).unwrap();
//!
//! let mut undefined = Action::new("Fly", 1.0).unwrap();
//! undefined.effects.set("airborne", true);
//! assert!(catalog.register(undefined).is_err());
//!
//! let state = FactState::new()
//!     .with("has_target", true)
//!     .with("in_attack_range", false);
//! let action = catalog.get("MoveToTarget").unwrap();
//! assert!(action.can_perform(&state));
//! assert_eq!(action.cost(&state), 3.0);
//! ```

use crate::{FactState, GoapError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Cost of applying an action, given the state it is applied to.
pub type CostFn = Arc<dyn Fn(&FactState) -> f64 + Send + Sync>;

/// A named planning operation with preconditions, effects and a cost.
#[derive(Clone)]
pub struct Action {
    /// The name of the action, unique within a catalog
    pub name: String,
    /// Facts that must hold for the action to be applicable
    pub preconditions: FactState,
    /// Facts the action overwrites
    pub effects: FactState,
    cost_fn: CostFn,
}

impl Action {
    /// Creates an action with a constant cost.
    ///
    /// # Errors
    ///
    /// Returns `GoapError::InvalidActionCost` if `cost` is negative or not finite.
    pub fn new(name: impl Into<String>, cost: f64) -> Result<Self> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(GoapError::InvalidActionCost);
        }

        Ok(Self::with_cost_fn(name, move |_| cost))
    }

    /// Creates an action whose cost depends on the state it is applied to.
    ///
    /// ```
    /// use goap_agent::{Action, FactState};
    ///
    /// // Fleeing gets cheaper the more hurt the agent is.
    /// let flee = Action::with_cost_fn("RunToSafety", |state| {
    ///     if state.is_true("low_health") { 1.0 } else { 5.0 }
    /// });
    /// assert_eq!(flee.cost(&FactState::new().with("low_health", true)), 1.0);
    /// assert_eq!(flee.cost(&FactState::new()), 5.0);
    /// ```
    pub fn with_cost_fn<F>(name: impl Into<String>, cost_fn: F) -> Self
    where
        F: Fn(&FactState) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            preconditions: FactState::new(),
            effects: FactState::new(),
            cost_fn: Arc::new(cost_fn),
        }
    }

    /// Builder-style precondition.
    pub fn precondition(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::FactValue>,
    ) -> Self {
        self.preconditions.set(key, value);
        self
    }

    /// Builder-style effect.
    pub fn effect(mut self, key: impl Into<String>, value: impl Into<crate::FactValue>) -> Self {
        self.effects.set(key, value);
        self
    }

    /// Evaluates the cost of applying this action to `state`.
    pub fn cost(&self, state: &FactState) -> f64 {
        (self.cost_fn)(state)
    }

    /// Checks if the preconditions sub-match `state`.
    pub fn can_perform(&self, state: &FactState) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// Overwrites `state` with this action's effects.
    pub fn apply_effects(&self, state: &mut FactState) {
        state.apply_effects(&self.effects);
    }

    /// Returns the successor state reached by applying this action to `state`.
    pub fn successor(&self, state: &FactState) -> FactState {
        state.applied(&self.effects)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .finish()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ordered, validated collection of actions.
///
/// Iteration order is registration order; the planner expands successors in
/// this order, which keeps plans reproducible for a given catalog.
#[derive(Clone, Debug, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
    vocabulary: Option<BTreeSet<String>>,
}

impl ActionCatalog {
    /// Creates a catalog that accepts any fact name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog that rejects actions mentioning facts outside `vocabulary`.
    pub fn with_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: Vec::new(),
            vocabulary: Some(vocabulary.into_iter().map(Into::into).collect()),
        }
    }

    /// Builds a catalog from actions, validating each one.
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Result<Self> {
        let mut catalog = Self::new();
        for action in actions {
            catalog.register(action)?;
        }
        Ok(catalog)
    }

    /// Registers an action.
    ///
    /// # Errors
    ///
    /// - `GoapError::ActionAlreadyInCollection` if the name is taken
    /// - `GoapError::UndefinedFact` if a precondition or effect names a fact
    ///   outside the vocabulary
    pub fn register(&mut self, action: Action) -> Result<()> {
        if self.get(&action.name).is_some() {
            return Err(GoapError::ActionAlreadyInCollection(action.name));
        }

        if let Some(vocabulary) = &self.vocabulary {
            let undefined = action
                .preconditions
                .keys()
                .chain(action.effects.keys())
                .find(|key| !vocabulary.contains(*key));
            if let Some(fact) = undefined {
                return Err(GoapError::UndefinedFact {
                    action: action.name.clone(),
                    fact: fact.to_string(),
                });
            }
        }

        log::trace!("registered action {}", action.name);
        self.actions.push(action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
