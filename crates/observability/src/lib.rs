//! Log output for binaries and tests that drive the catalog and session crates.
//!
//! The domain crates only emit `tracing` events; installing a subscriber is
//! left to whoever embeds them, usually through [`init`].

pub mod tracing;

pub use self::tracing::{LOG_FORMAT_ENV, LogFormat, init_with};

/// Install the global subscriber, choosing the format from `ECMS_LOG_FORMAT`.
///
/// Only the first call in a process installs anything.
pub fn init() {
    tracing::init();
}
