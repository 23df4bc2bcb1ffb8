//! Fetch ordering and view-lifetime scope
//!
//! Every load takes a [`FetchTicket`] carrying a monotonic sequence number.
//! A response is applied only if its ticket is still the latest one issued
//! and the view's cancellation scope is still open.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    latest: Arc<AtomicU64>,
    scope: CancellationToken,
}

/// Sequence number of one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one
    pub fn issue(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while `ticket` is the latest issued and the scope is open
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        !self.scope.is_cancelled() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Whether the owning view is still mounted
    pub fn is_open(&self) -> bool {
        !self.scope.is_cancelled()
    }

    /// Tear down the scope; outstanding work skips its state writes
    pub fn close(&self) {
        self.scope.cancel();
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_ticket_supersedes_earlier() {
        let guard = FetchGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(second.seq() > first.seq());
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_close_invalidates_all_tickets() {
        let guard = FetchGuard::new();
        let ticket = guard.issue();
        guard.clone().close();
        assert!(!guard.is_current(ticket));
        assert!(!guard.is_open());
        assert!(guard.scope().is_cancelled());
    }
}
