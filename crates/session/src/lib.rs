//! Session context for the admin dashboard.
//!
//! The signed-in user and the store they are working on are held in an
//! explicit [`SessionContext`] passed to whatever needs them, created when a
//! session starts and consumed when it ends.

pub mod context;
pub mod credentials;
pub mod store;

pub use context::{SessionContext, User};
pub use credentials::{Credentials, MIN_PASSWORD_LEN};
pub use store::{Store, StoreDraft};
