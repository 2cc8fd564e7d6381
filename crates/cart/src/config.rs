//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KBMV_CART_DIR` - Directory holding the durable cart slot. Unset or
//!   blank means the environment has no storage access and the store runs
//!   detached: reads are empty, writes are dropped, same-context
//!   notifications still fire.

use std::path::PathBuf;

/// Fixed, versionless key of the persisted cart slot.
///
/// Every context of one deployment reads and writes this single slot; there
/// is no schema version field, so an incompatible payload simply reads as
/// corrupt (and therefore empty) until the next write replaces it.
pub const CART_SLOT_KEY: &str = "kbmv-cart";

/// Cart store configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Directory holding the durable slot; `None` runs the store detached.
    pub state_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let state_dir = get_optional_env("KBMV_CART_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        Self { state_dir }
    }

    /// A config pinned to a concrete state directory.
    #[must_use]
    pub fn with_state_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: Some(dir.into()),
        }
    }

    /// A config for an environment without storage access.
    #[must_use]
    pub const fn detached() -> Self {
        Self { state_dir: None }
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
