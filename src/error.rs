use thiserror::Error;

/// Errors surfaced by the planning layer.
///
/// Search outcomes ("no plan", "no path") are normally reported as `None` by
/// the planner and the pathfinder. The matching variants exist for callers
/// that prefer to propagate them with `?`.
#[derive(Error, Debug)]
pub enum GoapError {
    /// The planner could not reach a goal-satisfying state
    #[error("No valid plan found to achieve the goal")]
    NoPlanFound,

    /// No connecting sequence of open cells exists
    #[error("No path found between {from:?} and {to:?}")]
    NoPathFound {
        from: (i32, i32),
        to: (i32, i32),
    },

    /// An action with the same name is already registered in the catalog
    #[error("Action already in collection: {0}")]
    ActionAlreadyInCollection(String),

    /// An action references a fact the catalog vocabulary does not define
    #[error("Action {action} references undefined fact: {fact}")]
    UndefinedFact {
        action: String,
        fact: String,
    },

    /// A constant action cost was negative or not finite
    #[error("Action cost must be a non-negative finite number")]
    InvalidActionCost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GoapError>;
