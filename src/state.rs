//! # Fact State
//!
//! A [`FactState`] is the vocabulary the planner, the goal selector and the
//! perception adapter share: a set of named facts, each holding a
//! [`FactValue`].
//!
//! The same structure plays several roles:
//!
//! - **World state**: what an agent currently believes
//! - **Goal state**: a partial state the agent wants to reach
//! - **Preconditions**: what must hold before an action is applicable
//! - **Effects**: the facts an action overwrites
//!
//! ## Matching is asymmetric
//!
//! `state.satisfies(&goal)` only looks at the keys present in `goal`. Keys the
//! goal does not mention are unconstrained, so `a.satisfies(&b)` does not imply
//! `b.satisfies(&a)`.
//!
//! ## Canonical form
//!
//! Search bookkeeping compares states through [`FactState::canonical_key`]:
//! facts sorted by name, rendered as `name:value` and joined by `|`. Two states
//! are the same search node iff their canonical keys are equal.
//!
//! ```
//! use goap_agent::FactState;
//!
//! let mut current = FactState::new();
//! current.set("has_target", true);
//! current.set("in_attack_range", false);
//!
//! let mut goal = FactState::new();
//! goal.set("in_attack_range", true);
//! assert!(!current.satisfies(&goal));
//!
//! let mut effects = FactState::new();
//! effects.set("in_attack_range", true);
//! current.apply_effects(&effects);
//!
//! assert!(current.satisfies(&goal));
//! assert_eq!(current.canonical_key(), "has_target:true|in_attack_range:true");
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Separator between `name:value` pairs in a canonical key.
pub const CANONICAL_SEPARATOR: &str = "|";

/// The value of a single fact.
///
/// A closed set of variants keeps equality and canonicalization total: there
/// is no value that fails to compare or to render.
#[derive(Debug, Clone)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FactValue {
    /// Returns the boolean payload, or `None` for other variants.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric payload, or `None` for other variants.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text payload, or `None` for other variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value for use inside a canonical key.
    ///
    /// Text is quoted so that `Text("true")` never collides with `Bool(true)`
    /// and `Text("3")` never collides with `Number(3.0)`.
    fn canonical(&self) -> String {
        match self {
            FactValue::Bool(b) => b.to_string(),
            FactValue::Number(n) => n.to_string(),
            FactValue::Text(s) => format!("{:?}", s),
        }
    }
}

impl PartialEq for FactValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FactValue::Bool(a), FactValue::Bool(b)) => a == b,
            // Every NaN renders as "NaN", so every NaN is the same value.
            (FactValue::Number(a), FactValue::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.total_cmp(b) == Ordering::Equal
            }
            (FactValue::Text(a), FactValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FactValue {}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Number(n) => write!(f, "{}", n),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Number(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        FactValue::Number(f64::from(value))
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

impl PartialEq<bool> for FactValue {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

/// A set of named facts.
///
/// Backed by a `BTreeMap` so iteration is already in canonical (sorted) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactState {
    values: BTreeMap<String, FactValue>,
}

impl FactState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Sets a fact, overwriting any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FactValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`FactState::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.values.get(key)
    }

    /// Reads a boolean fact. Missing keys and non-boolean values yield `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(FactValue::as_bool)
    }

    /// Reads a boolean fact, treating a missing or non-boolean value as `false`.
    pub fn is_true(&self, key: &str) -> bool {
        self.get_bool(key).unwrap_or(false)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FactValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates facts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Checks whether this state satisfies `required`.
    ///
    /// Every key of `required` must be present here with an equal value. Extra
    /// keys in `self` are ignored.
    ///
    /// ```
    /// use goap_agent::FactState;
    ///
    /// let world = FactState::new()
    ///     .with("has_target", true)
    ///     .with("health", 80);
    /// let goal = FactState::new().with("has_target", true);
    ///
    /// assert!(world.satisfies(&goal));
    /// assert!(!goal.satisfies(&world));
    /// ```
    pub fn satisfies(&self, required: &FactState) -> bool {
        required
            .values
            .iter()
            .all(|(key, value)| self.values.get(key) == Some(value))
    }

    /// Counts the keys of `goal` that this state does not match.
    pub fn mismatch_count(&self, goal: &FactState) -> usize {
        goal.values
            .iter()
            .filter(|(key, value)| self.values.get(*key) != Some(*value))
            .count()
    }

    /// Returns the facts of `other` that this state does not already hold.
    pub fn diff(&self, other: &FactState) -> FactState {
        other
            .values
            .iter()
            .filter(|(key, value)| self.values.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Overwrites this state with every fact in `effects`.
    pub fn apply_effects(&mut self, effects: &FactState) {
        for (key, value) in effects.values.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Returns a copy of this state with `effects` applied.
    pub fn applied(&self, effects: &FactState) -> FactState {
        let mut next = self.clone();
        next.apply_effects(effects);
        next
    }

    /// Renders the order-independent key used to identify this state in search.
    pub fn canonical_key(&self) -> String {
        self.values
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value.canonical()))
            .collect::<Vec<_>>()
            .join(CANONICAL_SEPARATOR)
    }
}

impl<K, V> FromIterator<(K, V)> for FactState
where
    K: Into<String>,
    V: Into<FactValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = FactState::new();
        for (key, value) in iter {
            state.set(key, value);
        }
        state
    }
}

impl fmt::Display for FactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
            first = false;
        }
        write!(f, "}}")
    }
}
