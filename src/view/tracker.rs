use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use super::state::ViewState;

/// Generation token handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Holds one view's state and drops responses from superseded fetches.
/// Only the most recently issued ticket may commit.
pub struct ViewTracker<T> {
    generation: AtomicU64,
    state: Mutex<ViewState<T>>,
}

impl<T> Default for ViewTracker<T> {
    fn default() -> Self {
        Self { generation: AtomicU64::new(0), state: Mutex::new(ViewState::Loading) }
    }
}

impl<T: Clone> ViewTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let mut state = self.state.lock();
        let g = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = ViewState::Loading;
        Ticket(g)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Apply `next` if `ticket` is still current. Returns false for a stale response.
    pub fn commit(&self, ticket: Ticket, next: ViewState<T>) -> bool {
        let mut state = self.state.lock();
        if !self.is_current(ticket) {
            debug!(target: "view", "discarding stale response generation={} current={}", ticket.0, self.generation.load(Ordering::SeqCst));
            return false;
        }
        *state = next;
        true
    }

    /// Invalidate every outstanding ticket, e.g. when the view goes away.
    pub fn cancel(&self) {
        let _state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> ViewState<T> {
        self.state.lock().clone()
    }
}
