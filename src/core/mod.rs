//! Core platform logic - storage facade, sessions and authentication.

/// Admin and student authentication
pub mod auth;
/// Telegram notification client
pub mod notify;
/// Storage facade over the persistent collections
pub mod platform;
/// Ephemeral per-session state
pub mod session;
/// Raw key-value persistence and collection keys
pub mod store;
/// Date formatting and input validation helpers
pub mod util;

pub use auth::{AuthOutcome, AuthService, Navigator, PasswordChangeError, Role, TracingNavigator};
pub use platform::{Platform, Stored};
pub use session::SessionStore;
pub use store::{CollectionKey, KvStore};
