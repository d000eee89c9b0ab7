//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to its defaults so an empty file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reload::ReloadTrigger;

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// What gets served and how request paths map onto it.
    pub serve: ServeConfig,

    /// Live reload channel and watch policy.
    pub live_reload: LiveReloadConfig,

    /// HTML snippet injection tuning.
    pub injection: InjectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP address to bind to.
    pub host: String,

    /// TCP port. `0` lets the OS pick a free port.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` pair handed to the socket layer.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Served root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory exposed to clients. Canonicalized at startup.
    pub root: PathBuf,

    /// Document served for `/` and for any path ending in `/`.
    pub index_file: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index_file: "index.html".to_string(),
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Enable the websocket endpoint, the file watcher and HTML injection.
    pub enabled: bool,

    /// Websocket endpoint the injected snippet connects to.
    pub path: String,

    /// Which filesystem events trigger a reload.
    pub trigger: ReloadTrigger,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/__livereload".to_string(),
            trigger: ReloadTrigger::Modify,
        }
    }
}

/// Injection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Bytes held back while searching for `</body>` before a partial flush.
    pub high_water_mark: usize,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            high_water_mark: 32 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.serve.index_file, "index.html");
        assert!(config.live_reload.enabled);
        assert_eq!(config.live_reload.trigger, ReloadTrigger::Modify);
        assert_eq!(config.injection.high_water_mark, 32 * 1024);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 3000

            [live_reload]
            trigger = "any"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.live_reload.trigger, ReloadTrigger::Any);
        assert_eq!(config.live_reload.path, "/__livereload");
    }
}
