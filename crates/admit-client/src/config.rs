//! Configuration for the chat client.

/// Configuration for the chat client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the durable REST API.
    pub api_url: String,
    /// URL of the live socket endpoint.
    pub live_url: String,
    /// Delay between reconnect attempts in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Consecutive failed attempts before the connection gives up.
    pub max_reconnect_attempts: u32,
    /// Request timeout for durable calls in milliseconds.
    pub request_timeout_ms: u64,
    /// Time-to-live for the cached notification feed in seconds.
    pub notification_ttl_secs: u64,
    /// Quiet period after the last keystroke before `typing:false` is sent.
    pub typing_quiet_ms: u64,
    /// Receiver-side window after which a typing flag is treated as stale.
    pub typing_stale_after_ms: u64,
    /// Capacity of the inbound event fan-out channel.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: "http://localhost:8080/api".to_string(),
            live_url: "ws://localhost:8080/live".to_string(),
            reconnect_delay_ms: 5000,
            max_reconnect_attempts: 5,
            request_timeout_ms: 30000,
            notification_ttl_secs: 120,
            typing_quiet_ms: 1000,
            typing_stale_after_ms: 5000,
            event_buffer: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.reconnect_delay_ms, 5000);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.notification_ttl_secs, 120);
        assert_eq!(config.typing_quiet_ms, 1000);
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            max_reconnect_attempts: 2,
            ..Default::default()
        };
        assert_eq!(config.max_reconnect_attempts, 2);
        assert_eq!(config.reconnect_delay_ms, 5000);
    }
}
