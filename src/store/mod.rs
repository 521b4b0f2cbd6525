// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Application state store
//!
//! The store owns the current [`ApplicationState`] and replaces it wholesale on
//! every dispatched [`Action`]. Subscribers receive each new state through a
//! `tokio::sync::watch` channel.

pub mod action;
pub mod persist;
pub mod reducer;

pub use action::Action;
pub use reducer::{reduce, EntityRef, Outcome, Reduction};

use crate::types::ApplicationState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Receiver side of a store subscription
pub type StateWatcher = watch::Receiver<Arc<ApplicationState>>;

/// Single-owner holder of the application state
#[derive(Debug)]
pub struct Store {
    sender: watch::Sender<Arc<ApplicationState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ApplicationState::default())
    }
}

impl Store {
    /// Create a store seeded with `initial`
    #[must_use]
    pub fn new(initial: ApplicationState) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> Arc<ApplicationState> {
        Arc::clone(&self.sender.borrow())
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> StateWatcher {
        self.sender.subscribe()
    }

    /// Apply `action` and publish the resulting state.
    ///
    /// The reducer runs while the channel lock is held, so concurrent
    /// dispatches never interleave. Subscribers are only woken when the
    /// state actually changed.
    pub fn dispatch(&self, action: Action) -> Outcome {
        let tag = action.tag();
        let mut outcome = Outcome::Applied;
        self.sender.send_if_modified(|current| {
            let reduction = reduce(current, &action);
            outcome = reduction.outcome;
            if Arc::ptr_eq(current, &reduction.state) {
                false
            } else {
                *current = reduction.state;
                true
            }
        });

        match &outcome {
            Outcome::Applied => debug!(action = tag, "dispatched"),
            Outcome::Missing(entity) => warn!(action = tag, "{} not found, state unchanged", entity),
            Outcome::Duplicate(entity) => {
                warn!(action = tag, "{} already exists, state unchanged", entity);
            }
        }
        outcome
    }

    /// Dispatch a sequence of actions, returning each outcome
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) -> Vec<Outcome> {
        actions.into_iter().map(|a| self.dispatch(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LiveModelingState, NodeTemplate};

    #[test]
    fn test_dispatch_publishes_new_state() {
        let store = Store::default();
        let mut watcher = store.subscribe();

        let outcome = store.dispatch(Action::SendPaletteOpened(false));

        assert!(outcome.is_applied());
        assert!(watcher.has_changed().unwrap());
        assert!(!watcher.borrow_and_update().ui.current_palette_opened_state);
    }

    #[test]
    fn test_rejected_action_does_not_notify() {
        let store = Store::default();
        let mut watcher = store.subscribe();
        let before = store.state();

        let outcome = store.dispatch(Action::DeleteNodeTemplate("nope".into()));

        assert!(!outcome.is_applied());
        assert!(!watcher.has_changed().unwrap());
        assert!(Arc::ptr_eq(&before, &store.state()));
        let _ = watcher.borrow_and_update();
    }

    #[test]
    fn test_old_snapshots_stay_unchanged() {
        let store = Store::default();
        let snapshot = store.state();

        store.dispatch(Action::SaveNodeTemplate(NodeTemplate::new("n", "n", "T")));
        store.dispatch(Action::SetLiveModelingState(LiveModelingState::Start));

        assert!(snapshot.topology.node_templates.is_empty());
        assert_eq!(snapshot.live_modeling.state, LiveModelingState::Disabled);
        assert_eq!(store.state().live_modeling.state, LiveModelingState::Start);
    }
}
