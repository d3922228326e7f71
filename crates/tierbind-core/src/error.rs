use thiserror::Error;

/// Errors that can occur during allocation, node binding, or residency queries.
///
/// Platform failures carry the originating errno as their [`std::io::Error`]
/// source. There are no retries and no fallback to a different node; the
/// allocator discards the whole region on any failure, so a partially bound
/// region is never observable.
#[derive(Debug, Error)]
pub enum Error {
    /// The placement map covers fewer pages than the region spans.
    #[error("placement map has {have} entries but the region spans {need} pages")]
    UndersizedPlacement {
        /// Entries in the caller's placement map
        have: usize,
        /// Pages in the rounded region
        need: usize,
    },
    /// A node id outside the addressable mask capacity was requested.
    #[error("node {node} is outside the supported range 0..{max}")]
    NodeOutOfRange {
        /// The requested node id
        node: usize,
        /// Mask capacity ([`MAX_NODES`](crate::memory::MAX_NODES))
        max: usize,
    },
    /// Reserving the anonymous virtual memory region failed.
    #[error("memory reservation failed: {0}")]
    ReservationFailed(#[source] std::io::Error),
    /// The kernel refused to bind a range to the requested node.
    #[error("node binding rejected: {0}")]
    PolicyRejected(#[source] std::io::Error),
    /// The batched residency query failed outright.
    #[error("residency query failed: {0}")]
    QueryFailed(#[source] std::io::Error),
}

/// Result type for tierbind operations.
pub type Result<T> = std::result::Result<T, Error>;
