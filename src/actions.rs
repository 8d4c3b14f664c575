//! Superseding async actions
//!
//! A [`LatestAction`] runs one future at a time per slot. Starting a new run
//! cancels the previous one, which resolves as [`ActionOutcome::Superseded`]
//! instead of finishing. The registry keys slots by viewer and action name so
//! a fresh analytics or search request replaces the one still in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Analytics report requests
pub const ANALYTICS: &str = "analytics";
/// Order search requests
pub const ORDER_SEARCH: &str = "order-search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Completed(T),
    /// A newer run started before this one finished
    Superseded,
}

impl<T> ActionOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            ActionOutcome::Completed(value) => Some(value),
            ActionOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ActionOutcome::Superseded)
    }
}

#[derive(Default)]
pub struct LatestAction {
    current: Mutex<Option<CancellationToken>>,
}

impl LatestAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut`, cancelling whatever run is still pending in this slot
    pub async fn run<F, T>(&self, fut: F) -> ActionOutcome<T>
    where
        F: Future<Output = T>,
    {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => ActionOutcome::Superseded,
            value = fut => ActionOutcome::Completed(value),
        }
    }

    /// Cancel the pending run, if any
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.take() {
            token.cancel();
        }
    }
}

/// Action slots per (user id, action name)
#[derive(Default)]
pub struct ActionRegistry {
    slots: Mutex<HashMap<(String, &'static str), Arc<LatestAction>>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn slot(&self, user_id: &str, action: &'static str) -> Arc<LatestAction> {
        let mut slots = self.slots.lock().await;
        slots
            .entry((user_id.to_string(), action))
            .or_insert_with(|| Arc::new(LatestAction::new()))
            .clone()
    }

    pub async fn run<F, T>(&self, user_id: &str, action: &'static str, fut: F) -> ActionOutcome<T>
    where
        F: Future<Output = T>,
    {
        let slot = self.slot(user_id, action).await;
        let outcome = slot.run(fut).await;
        if outcome.is_superseded() {
            debug!("{} for {} superseded by a newer request", action, user_id);
        }
        self.release(user_id, action, slot).await;
        outcome
    }

    /// Forget the slot once no other run or caller holds it
    async fn release(&self, user_id: &str, action: &'static str, slot: Arc<LatestAction>) {
        let key = (user_id.to_string(), action);
        let mut slots = self.slots.lock().await;
        let unshared = slots.get(&key).is_some_and(|held| Arc::ptr_eq(held, &slot))
            // the map's reference and ours
            && Arc::strong_count(&slot) == 2;
        if unshared {
            slots.remove(&key);
        }
    }

    /// Slots currently tracked
    pub async fn active_slots(&self) -> usize {
        self.slots.lock().await.len()
    }
}

pub type SharedActions = Arc<ActionRegistry>;
