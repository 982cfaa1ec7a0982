//! Error kinds per the error-handling contract: allocation failure,
//! clock unavailability, and invalid configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Could not allocate a buffer of the requested size. Recoverable by
    /// shrinking the working-set size list; fatal only when even the
    /// smallest configured size cannot be allocated.
    #[error("failed to allocate {requested_bytes} bytes for the chase buffer")]
    AllocationFailure { requested_bytes: usize },

    /// The host's monotonic clock could not be read. Always fatal.
    #[error("no usable monotonic clock on this host")]
    ClockUnavailable,

    /// Caller-supplied configuration that cannot be normalized by clamping.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
