use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::BrewAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSource {
    /// Interactive host input.
    Player,
    Agent,
    /// Generated by a [`crate::pour_script::PourScript`].
    Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub tick: u64,
    pub source: ActionSource,
    pub action: BrewAction,
}

/// Actions waiting for the next fixed tick, in arrival order.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewActionQueue {
    pending: Vec<QueuedAction>,
}

impl BrewActionQueue {
    pub fn push(&mut self, tick: u64, source: ActionSource, action: BrewAction) {
        self.pending.push(QueuedAction {
            tick,
            source,
            action,
        });
    }

    pub fn push_queued(&mut self, queued: QueuedAction) {
        self.pending.push(queued);
    }

    pub fn drain(&mut self) -> Vec<QueuedAction> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Roast;

    #[test]
    fn push_and_drain_preserves_fifo() {
        let mut queue = BrewActionQueue::default();
        queue.push(3, ActionSource::Player, BrewAction::Grind { grams: 18.0 });
        queue.push(3, ActionSource::Agent, BrewAction::StartPour);
        queue.push(
            4,
            ActionSource::Script,
            BrewAction::SetRoast { roast: Roast::Dark },
        );

        assert_eq!(queue.len(), 3);
        assert!(!queue.is_empty());

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert!(queue.is_empty());

        assert_eq!(drained[0].source, ActionSource::Player);
        assert_eq!(drained[0].action, BrewAction::Grind { grams: 18.0 });
        assert_eq!(drained[1].action, BrewAction::StartPour);
        assert_eq!(drained[2].tick, 4);
        assert_eq!(drained[2].source, ActionSource::Script);
    }

    #[test]
    fn drain_on_empty_queue_returns_nothing() {
        let mut queue = BrewActionQueue::default();
        assert!(queue.drain().is_empty());
        queue.push_queued(QueuedAction {
            tick: 0,
            source: ActionSource::Agent,
            action: BrewAction::Finish,
        });
        assert_eq!(queue.len(), 1);
    }
}
