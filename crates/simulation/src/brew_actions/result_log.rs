//! Ring-buffer log of recently executed brew actions and their results.
//!
//! Agents and the interactive host read it to see why an action was refused
//! without polling the session every tick.

use bevy::prelude::*;

use super::{ActionResult, BrewAction};

const MAX_ENTRIES: usize = 64;

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionResultLog {
    entries: Vec<(BrewAction, ActionResult)>,
}

impl ActionResultLog {
    /// Record a new action/result pair, evicting the oldest when full.
    pub fn push(&mut self, action: BrewAction, result: ActionResult) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((action, result));
    }

    /// The last `n` entries (or fewer if the log is shorter), oldest first.
    pub fn last_n(&self, n: usize) -> &[(BrewAction, ActionResult)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
