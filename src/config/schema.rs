//! Configuration schema and defaults for the MediConnect client.
//!
//! Sections: `[server]`, `[notifications]`, `[chat]`, `[logging]`. Every
//! field has a built-in default, so a config file only needs the keys it
//! wants to change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps to `~/.mediconnect/config.toml` and `.mediconnect.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediConnectConfig {
    pub server: ServerConfig,
    pub notifications: NotificationConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend origin; every API path is joined onto it.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [notifications]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Seconds a notification stays visible.
    pub ttl_secs: u64,
    /// Maximum stacked notifications. `0` means no limit.
    pub max_stack: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 5,
            max_stack: 0,
        }
    }
}

impl NotificationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn cap(&self) -> Option<usize> {
        (self.max_stack > 0).then_some(self.max_stack)
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Mount the assistant widget after sign-in.
    pub enabled: bool,
    /// Opening assistant line. Empty means the built-in greeting.
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            greeting: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive: `"error"`, `"warn"`, `"info"`, `"debug"` or any
    /// `tracing` env-filter expression. `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated defaults
// ---------------------------------------------------------------------------

impl MediConnectConfig {
    /// Default config file content written by `config init`.
    pub fn default_toml() -> String {
        r#"# MediConnect client configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MEDICONNECT_*)
#   2. Project config (.mediconnect.toml in current directory)
#   3. User global config (~/.mediconnect/config.toml)
#   4. Built-in defaults

[server]
base_url = "http://localhost:8080"

[notifications]
ttl_secs = 5
max_stack = 0          # 0 = unlimited

[chat]
enabled = true
greeting = ""          # empty = built-in greeting

[logging]
level = "warn"         # error | warn | info | debug (RUST_LOG overrides)
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
