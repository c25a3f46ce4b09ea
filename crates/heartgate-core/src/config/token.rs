//! Heartbeat token configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shared key used when nothing is configured.
pub const DEFAULT_SHARED_KEY: &str = "SHAREDKEY";

/// Heartbeat token cipher configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret shared with the backend that issues the first token of a session.
    #[serde(default = "default_shared_key")]
    pub shared_key: String,
}

impl TokenConfig {
    /// Whether the built-in development key is in use.
    pub fn uses_default_key(&self) -> bool {
        self.shared_key == DEFAULT_SHARED_KEY
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            shared_key: default_shared_key(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("shared_key", &"****")
            .finish()
    }
}

fn default_shared_key() -> String {
    DEFAULT_SHARED_KEY.to_string()
}
