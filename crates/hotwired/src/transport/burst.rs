//! Burst policy shared by the listener transports.
//!
//! One dispatch per wake cycle, newest payload wins. A datagram wake carries
//! a single payload, so every datagram is dispatched. A channel wake may
//! deliver several queued notifications; only the newest is dispatched and
//! the rest are discarded. Dispatching every queued notification would
//! change behaviour under bursts, so the collapse is kept explicit here.

/// Outcome of collapsing one wake cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Collapsed<T> {
    /// Payload selected for dispatch.
    pub(crate) newest: T,
    /// Payloads dropped in favour of `newest`.
    pub(crate) discarded: usize,
}

/// Keeps the newest payload of a burst, in delivery order.
///
/// Returns `None` for an empty burst.
pub(crate) fn collapse_burst<T>(burst: impl IntoIterator<Item = T>) -> Option<Collapsed<T>> {
    let mut collapsed: Option<Collapsed<T>> = None;
    for payload in burst {
        collapsed = Some(match collapsed {
            None => Collapsed {
                newest: payload,
                discarded: 0,
            },
            Some(previous) => Collapsed {
                newest: payload,
                discarded: previous.discarded + 1,
            },
        });
    }
    collapsed
}
