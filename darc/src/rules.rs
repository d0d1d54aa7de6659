use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{DarcError, DarcResult, Expression, Identity};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The distinguished action guarding evolution. Every darc must carry it;
/// identities satisfying its expression may sign the next version.
pub const EVOLVE_ACTION: &str = "_evolve";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The name of an operation guarded by a rule, such as `"read"` or
/// `"_evolve"`.
///
/// The `_` prefix is reserved for distinguished actions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

/// The rules of a darc: a mapping from action name to the expression that
/// guards it.
///
/// The map is ordered by action name (raw byte order), which is also the
/// order the invariant hash consumes, so two rule sets with the same entries
/// always hash identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules(BTreeMap<Action, Expression>);

//--------------------------------------------------------------------------------------------------
// Methods: Action
//--------------------------------------------------------------------------------------------------

impl Action {
    /// Creates an action name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the action name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the distinguished evolution action.
    pub fn is_evolution(&self) -> bool {
        self.0 == EVOLVE_ACTION
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: Rules
//--------------------------------------------------------------------------------------------------

impl Rules {
    /// Creates an empty rule set.
    ///
    /// A darc is only well formed once an evolution rule is present; use
    /// [`Rules::with_owners`] for the usual construction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the genesis rule set: the evolution action mapped to the
    /// disjunction of the owner identities.
    pub fn with_owners<'a>(owners: impl IntoIterator<Item = &'a Identity>) -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(Action::new(EVOLVE_ACTION), Expression::or_of(owners));
        Self(rules)
    }

    /// Adds a new action and its expression. The action must not already
    /// exist, and user-defined actions must not use the reserved `_` prefix.
    pub fn add(&mut self, action: Action, expr: Expression) -> DarcResult<()> {
        if action.as_str().is_empty() {
            return Err(DarcError::MissingField("action name"));
        }
        if action.as_str().starts_with('_') {
            return Err(DarcError::ReservedAction(action.0));
        }
        if self.0.contains_key(&action) {
            return Err(DarcError::ActionExists(action.0));
        }
        self.0.insert(action, expr);
        Ok(())
    }

    /// Replaces the expression of an existing action. The evolution action
    /// cannot be touched through this operation; use
    /// [`Rules::update_evolution`].
    pub fn update(&mut self, action: &Action, expr: Expression) -> DarcResult<()> {
        if action.is_evolution() {
            return Err(DarcError::EvolveForbidden("updated"));
        }
        self.replace(action, expr)
    }

    /// Replaces the evolution expression, changing who may sign future
    /// versions. Take extreme care: a bad expression here locks the darc
    /// forever.
    pub fn update_evolution(&mut self, expr: Expression) -> DarcResult<()> {
        self.replace(&Action::new(EVOLVE_ACTION), expr)
    }

    /// Deletes an action. The evolution action cannot be deleted.
    pub fn delete(&mut self, action: &Action) -> DarcResult<()> {
        if action.is_evolution() {
            return Err(DarcError::EvolveForbidden("deleted"));
        }
        if self.0.remove(action).is_none() {
            return Err(DarcError::MissingAction(action.0.clone()));
        }
        Ok(())
    }

    /// Whether the action is present in the rules.
    pub fn contains(&self, action: &Action) -> bool {
        self.0.contains_key(action)
    }

    /// Returns the expression guarding the given action.
    pub fn get(&self, action: &Action) -> Option<&Expression> {
        self.0.get(action)
    }

    /// Returns the expression guarding evolution, if present.
    pub fn evolution_expr(&self) -> Option<&Expression> {
        self.0.get(&Action::new(EVOLVE_ACTION))
    }

    /// Iterates over the rules in action name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Action, &Expression)> {
        self.0.iter()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the rule set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn replace(&mut self, action: &Action, expr: Expression) -> DarcResult<()> {
        match self.0.get_mut(action) {
            Some(existing) => {
                *existing = expr;
                Ok(())
            }
            None => Err(DarcError::MissingAction(action.0.clone())),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Self(name)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
