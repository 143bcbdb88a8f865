//! Network configuration

use std::time::Duration;

use crate::types::MIRROR_READ_TIMEOUT_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetConfig {
    /// How long the mirror waits for a frame before calling the link dead
    pub read_timeout: Duration,
    /// JSON-lines log of every handshake and frame, if set
    pub wire_log_path: Option<String>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(MIRROR_READ_TIMEOUT_MS),
            wire_log_path: None,
        }
    }
}

impl NetConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let read_timeout = env::var("NETRIS_READ_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(MIRROR_READ_TIMEOUT_MS));

        let wire_log_path = env::var("NETRIS_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            read_timeout,
            wire_log_path,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = NetConfig::default();
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert!(config.wire_log_path.is_none());
    }

    // One test owns both variables so parallel tests never race on them.
    #[test]
    fn test_net_config_from_env() {
        std::env::set_var("NETRIS_READ_TIMEOUT_MS", " 250 ");
        std::env::set_var("NETRIS_WIRE_LOG", " /tmp/netris-wire.jsonl ");
        let config = NetConfig::from_env();
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.wire_log_path.as_deref(), Some("/tmp/netris-wire.jsonl"));

        std::env::set_var("NETRIS_READ_TIMEOUT_MS", "0");
        std::env::set_var("NETRIS_WIRE_LOG", "   ");
        let config = NetConfig::from_env();
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert!(config.wire_log_path.is_none());

        std::env::set_var("NETRIS_READ_TIMEOUT_MS", "soon");
        assert_eq!(NetConfig::from_env().read_timeout, Duration::from_secs(5));

        std::env::remove_var("NETRIS_READ_TIMEOUT_MS");
        std::env::remove_var("NETRIS_WIRE_LOG");
        assert_eq!(NetConfig::from_env(), NetConfig::default());
    }
}
