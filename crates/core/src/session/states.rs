use serde::{Deserialize, Serialize};

use crate::domain::book::BookId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Loading,
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    CatalogSettled { item_count: usize },
    ItemAdded(BookId),
    ItemRemoved(BookId),
    DiscountToggled { applied: bool },
}

impl SessionEvent {
    pub fn is_settle(&self) -> bool {
        matches!(self, Self::CatalogSettled { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: SessionState,
    pub to: SessionState,
    pub event: SessionEvent,
}

/// `Loading -> Ready` on settle, `Ready -> Ready` on every cart or discount change.
pub fn next_state(current: SessionState, event: &SessionEvent) -> Option<SessionState> {
    match (current, event.is_settle()) {
        (SessionState::Loading, true) => Some(SessionState::Ready),
        (SessionState::Ready, false) => Some(SessionState::Ready),
        _ => None,
    }
}
