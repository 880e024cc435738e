//! Configuration types for session reconnection

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for a [`Session`](crate::Session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier (auto-generated if None)
    pub session_id: Option<String>,

    /// Reconnect window in milliseconds (default: 15000ms)
    ///
    /// How long a disrupted session may stay `Reconnecting` before it is
    /// converted to `Disconnected`. The same window applies to each remote
    /// member's mirrored state.
    pub reconnect_window_ms: u64,

    /// Candidate gathering timeout in milliseconds (default: 5000ms)
    ///
    /// How long candidate gathering may run without producing a usable
    /// route before it is treated as a media-connectivity fault.
    pub ice_gathering_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            reconnect_window_ms: 15_000,
            ice_gathering_timeout_ms: 5_000,
        }
    }
}

impl SessionConfig {
    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `reconnect_window_ms` is zero or exceeds 10 minutes
    /// - `ice_gathering_timeout_ms` is zero or exceeds the reconnect window
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_window_ms == 0 {
            return Err(Error::InvalidConfig(
                "reconnect_window_ms must be greater than zero".to_string(),
            ));
        }

        if self.reconnect_window_ms > 600_000 {
            return Err(Error::InvalidConfig(format!(
                "reconnect_window_ms must not exceed 600000, got {}",
                self.reconnect_window_ms
            )));
        }

        if self.ice_gathering_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "ice_gathering_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.ice_gathering_timeout_ms > self.reconnect_window_ms {
            return Err(Error::InvalidConfig(format!(
                "ice_gathering_timeout_ms ({}) must not exceed reconnect_window_ms ({})",
                self.ice_gathering_timeout_ms, self.reconnect_window_ms
            )));
        }

        Ok(())
    }

    /// Reconnect window as a [`Duration`]
    pub fn reconnect_window(&self) -> Duration {
        Duration::from_millis(self.reconnect_window_ms)
    }

    /// Candidate gathering timeout as a [`Duration`]
    pub fn ice_gathering_timeout(&self) -> Duration {
        Duration::from_millis(self.ice_gathering_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconnect_window_ms, 15_000);
        assert_eq!(config.ice_gathering_timeout_ms, 5_000);
    }

    #[test]
    fn test_zero_reconnect_window_rejected() {
        let config = SessionConfig {
            reconnect_window_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_oversized_reconnect_window_rejected() {
        let config = SessionConfig {
            reconnect_window_ms: 900_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_gathering_timeout_rejected() {
        let config = SessionConfig {
            ice_gathering_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gathering_timeout_beyond_window_rejected() {
        let config = SessionConfig {
            reconnect_window_ms: 2_000,
            ice_gathering_timeout_ms: 3_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_accessors() {
        let config = SessionConfig {
            reconnect_window_ms: 1_500,
            ice_gathering_timeout_ms: 750,
            ..Default::default()
        };
        assert_eq!(config.reconnect_window(), Duration::from_millis(1_500));
        assert_eq!(config.ice_gathering_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = SessionConfig {
            session_id: Some("room-42".to_string()),
            reconnect_window_ms: 20_000,
            ice_gathering_timeout_ms: 4_000,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.session_id.as_deref(), Some("room-42"));
        assert_eq!(parsed.reconnect_window_ms, 20_000);
    }
}
