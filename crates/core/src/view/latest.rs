use crate::envelope::EnvelopeError;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    Loading,
    Ready(T),
    /// The fetch succeeded but there is nothing to show.
    Empty,
    Failed(EnvelopeError),
}

impl<T> ScreenState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ScreenState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Identifies one issued fetch. Only the newest ticket may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// A newer fetch was issued after this one.
    Superseded,
    /// The slot was closed while the fetch was outstanding.
    Closed,
}

#[derive(Debug)]
struct Inner<T> {
    issued: u64,
    closed: bool,
    state: ScreenState<T>,
}

/// Latest-issued-wins cell for a screen's state.
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                issued: 0,
                closed: false,
                state: ScreenState::Loading,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fetch: invalidates every earlier ticket and shows `Loading`.
    pub fn issue(&self) -> Ticket {
        let mut inner = self.lock();
        inner.issued += 1;
        if !inner.closed {
            inner.state = ScreenState::Loading;
        }
        Ticket(inner.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let inner = self.lock();
        !inner.closed && inner.issued == ticket.0
    }

    pub fn deliver(&self, ticket: Ticket, state: ScreenState<T>) -> Delivery {
        self.deliver_with(ticket, || state)
    }

    /// Like `deliver`, but `build` only runs when the ticket is still current.
    pub fn deliver_with(&self, ticket: Ticket, build: impl FnOnce() -> ScreenState<T>) -> Delivery {
        let mut inner = self.lock();
        if inner.closed {
            return Delivery::Closed;
        }
        if inner.issued != ticket.0 {
            tracing::debug!(
                ticket = ticket.0,
                latest = inner.issued,
                "dropping superseded response"
            );
            return Delivery::Superseded;
        }
        inner.state = build();
        Delivery::Applied
    }

    /// Tear down: every outstanding and future delivery is dropped.
    pub fn close(&self) {
        self.lock().closed = true;
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn get(&self) -> ScreenState<T> {
        self.lock().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_ticket_cannot_overwrite_newer() {
        let slot = LatestSlot::<u32>::new();
        let first = slot.issue();
        let second = slot.issue();

        assert_eq!(slot.deliver(second, ScreenState::Ready(2)), Delivery::Applied);
        assert_eq!(slot.deliver(first, ScreenState::Ready(1)), Delivery::Superseded);
        assert_eq!(slot.get(), ScreenState::Ready(2));
    }

    #[test]
    fn older_ticket_is_dropped_even_if_it_lands_first() {
        let slot = LatestSlot::<u32>::new();
        let first = slot.issue();
        let second = slot.issue();

        assert_eq!(slot.deliver(first, ScreenState::Ready(1)), Delivery::Superseded);
        assert!(slot.get().is_loading());
        assert_eq!(slot.deliver(second, ScreenState::Empty), Delivery::Applied);
        assert_eq!(slot.get(), ScreenState::Empty);
    }

    #[test]
    fn closed_slot_ignores_late_results() {
        let slot = LatestSlot::<u32>::new();
        let ticket = slot.issue();
        slot.close();
        assert!(!slot.is_current(ticket));
        assert_eq!(slot.deliver(ticket, ScreenState::Ready(7)), Delivery::Closed);
        assert!(slot.get().is_loading());
    }
}
