//! Configuration surface: a small constructor-plus-setters struct for
//! host/port/timeouts. No config-file/serde layer — the programmatic
//! surface is the entry point.

use std::time::Duration;

use thiserror::Error;

/// `connect_timeout` default.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
/// `handshake_timeout` default.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(2500);
/// `write_timeout` default.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(10_000);
/// `ack_wait_timeout` default.
pub const DEFAULT_ACK_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default ACK window, 5,000,000 bytes.
pub const DEFAULT_ACK_WINDOW: u32 = 5_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be zero or positive, got {1} ms")]
    NegativeTimeout(&'static str, i64),
}

/// Host/port plus the four session timeouts. `Duration` cannot
/// represent a negative value, so the "timeouts must be >= 0" invariant
/// only has teeth at the millisecond-count entry points below; setters
/// that already take a `Duration` can't violate it.
#[derive(Debug, Clone)]
pub struct RtmpPublisherConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub write_timeout: Duration,
    pub ack_wait_timeout: Duration,
}

impl RtmpPublisherConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            ack_wait_timeout: DEFAULT_ACK_WAIT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    pub fn with_handshake_timeout(mut self, d: Duration) -> Self {
        self.handshake_timeout = d;
        self
    }

    pub fn with_write_timeout(mut self, d: Duration) -> Self {
        self.write_timeout = d;
        self
    }

    pub fn with_ack_wait_timeout(mut self, d: Duration) -> Self {
        self.ack_wait_timeout = d;
        self
    }

    /// Convenience setter for callers that hold a raw millisecond count
    /// (e.g. parsed from a CLI flag or another language's binding);
    /// rejects negative values with `InvalidArgument`.
    pub fn with_connect_timeout_ms(mut self, ms: i64) -> Result<Self, ConfigError> {
        self.connect_timeout = duration_from_millis("connect_timeout", ms)?;
        Ok(self)
    }

    pub fn with_handshake_timeout_ms(mut self, ms: i64) -> Result<Self, ConfigError> {
        self.handshake_timeout = duration_from_millis("handshake_timeout", ms)?;
        Ok(self)
    }

    pub fn with_write_timeout_ms(mut self, ms: i64) -> Result<Self, ConfigError> {
        self.write_timeout = duration_from_millis("write_timeout", ms)?;
        Ok(self)
    }

    pub fn with_ack_wait_timeout_ms(mut self, ms: i64) -> Result<Self, ConfigError> {
        self.ack_wait_timeout = duration_from_millis("ack_wait_timeout", ms)?;
        Ok(self)
    }
}

fn duration_from_millis(name: &'static str, ms: i64) -> Result<Duration, ConfigError> {
    if ms < 0 {
        return Err(ConfigError::NegativeTimeout(name, ms));
    }
    Ok(Duration::from_millis(ms as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_uses_documented_defaults() {
        let config = RtmpPublisherConfig::new("localhost", 1935);
        assert_eq!(config.connect_timeout, Duration::from_millis(5000));
        assert_eq!(config.handshake_timeout, Duration::from_millis(2500));
        assert_eq!(config.write_timeout, Duration::from_millis(10_000));
        assert_eq!(config.ack_wait_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn rejects_negative_millisecond_timeout() {
        let err = RtmpPublisherConfig::new("localhost", 1935).with_connect_timeout_ms(-1).unwrap_err();
        assert_eq!(err, ConfigError::NegativeTimeout("connect_timeout", -1));
    }

    #[test]
    fn accepts_zero_millisecond_timeout() {
        let config = RtmpPublisherConfig::new("localhost", 1935).with_write_timeout_ms(0).unwrap();
        assert_eq!(config.write_timeout, Duration::ZERO);
    }
}
