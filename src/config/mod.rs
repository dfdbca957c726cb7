/// Database configuration and connection management
pub mod database;

/// Platform settings loading from platform.toml
pub mod platform;

pub use platform::{PlatformConfig, load_default_config};
