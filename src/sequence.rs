//! Request sequencing for overlapping calls
//!
//! The client never deduplicates or cancels in-flight requests. Two list
//! refreshes fired back to back may resolve in either order, and a caller
//! that simply stores whatever arrives last can end up showing the older
//! data. Every request sent through [`crate::http::ApiClient`] is stamped
//! with a [`RequestTicket`] from the [`RequestSequencer`] of its operation
//! so that a caller can decide to drop stale responses.
//!
//! Two checks are offered:
//!
//! - [`RequestSequencer::is_latest`]: only the most recently issued request
//!   counts.
//! - [`RequestSequencer::accept`]: a response is applied unless a newer one
//!   has already been applied.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing identifier of one outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Numeric value of the ticket; the first ticket issued is `1`.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A value together with the ticket of the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    /// Ticket of the originating request
    pub ticket: RequestTicket,
    /// The response value
    pub value: T,
}

/// Issues tickets and tracks which ones have been applied.
///
/// # Examples
///
/// ```
/// use issuedesk::sequence::RequestSequencer;
///
/// let sequencer = RequestSequencer::new();
/// let first = sequencer.issue();
/// let second = sequencer.issue();
///
/// // The second response arrives first and is applied.
/// assert!(sequencer.accept(second));
/// // The first response arrives late and must be discarded.
/// assert!(!sequencer.accept(first));
/// ```
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    accepted: AtomicU64,
}

impl RequestSequencer {
    /// Creates a sequencer that has issued nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Most recently issued ticket, if any.
    pub fn latest_issued(&self) -> Option<RequestTicket> {
        match self.issued.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestTicket(n)),
        }
    }

    /// Returns `true` if no request has been issued after `ticket`.
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks `ticket` as applied unless a newer ticket already was.
    ///
    /// Returns `true` when the caller should apply the response.
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        let previous = self.accepted.fetch_max(ticket.0, Ordering::SeqCst);
        previous < ticket.0
    }
}
