//! Client configuration.
//!
//! Everything is environment-driven with hard defaults; an invalid value
//! falls back to the default with a warning rather than failing startup.

use std::time::Duration;

use ink_core::EXPORT_INTERVAL_MS;
use url::Url;

/// Default inference endpoint (the service's well-known WebSocket route).
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/nn/ws";

/// Default frame-clock tick. Must be finer than the export interval; 16ms
/// matches a 60Hz display clock.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Configuration for a streaming session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the inference service.
    pub endpoint: Url,
    /// Minimum gap between exports in milliseconds.
    pub export_interval_ms: u64,
    /// Frame clock period; the export gate is polled once per tick.
    pub frame_interval: Duration,
}

impl ClientConfig {
    /// Build a config for the given endpoint with default timing.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            export_interval_ms: EXPORT_INTERVAL_MS,
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `INK_WS_URL`: inference endpoint (default `ws://localhost:8000/nn/ws`)
    /// - `INK_EXPORT_INTERVAL_MS`: export gap floor (default 150)
    /// - `INK_FRAME_INTERVAL_MS`: frame clock period (default 16)
    pub fn from_env() -> Self {
        let endpoint = std::env::var("INK_WS_URL")
            .ok()
            .and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Ignoring invalid INK_WS_URL {raw:?}: {e}");
                    None
                }
            })
            .unwrap_or_else(default_endpoint);

        let export_interval_ms = std::env::var("INK_EXPORT_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(EXPORT_INTERVAL_MS);

        let frame_interval_ms = std::env::var("INK_FRAME_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FRAME_INTERVAL_MS);

        Self {
            endpoint,
            export_interval_ms,
            frame_interval: Duration::from_millis(frame_interval_ms),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_endpoint())
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}
