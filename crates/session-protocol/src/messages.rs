use crate::state::ConnectionState;
use framing::Eol;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Line terminator used when splitting received text into lines
    pub eol: Eol,
    /// Baud rate for the next open
    pub baud: u32,
    /// Reopen automatically right after a device is selected
    pub auto_reopen: bool,
    /// Delay between reopen attempts after a failed open or lost
    /// connection. Zero disables retry entirely.
    pub reconnect_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            eol: Eol::Newline,
            baud: 115200,
            auto_reopen: false,
            reconnect_interval: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    /// Standard configuration at the given baud rate
    pub fn with_baud(baud: u32) -> Self {
        Self {
            baud,
            ..Self::default()
        }
    }
}

/// Outcome of a device selection request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A device was granted; carries the resolved chip name if known
    Selected { name: Option<String> },
    /// No previously granted device was available
    NoDevice,
}

/// Events from the session to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Connection state has changed
    StateChanged { state: ConnectionState },

    /// A device was selected; carries the resolved chip name if known
    DeviceSelected { name: Option<String> },

    /// The port opened and the read loop is running
    Opened,

    /// The port closed and all resources were released
    Closed,

    /// Raw bytes received from the port
    BinaryReceived { data: Vec<u8> },

    /// A complete decoded line of text
    LineReceived { line: String },

    /// Error occurred
    Error { message: String },
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.baud, 115200);
        assert_eq!(config.eol, Eol::Newline);
        assert!(!config.auto_reopen);
        assert_eq!(config.reconnect_interval, Duration::ZERO);
    }

    #[test]
    fn test_config_serialization() {
        let config = SessionConfig {
            eol: Eol::Delimiter("\r\n".into()),
            baud: 9600,
            auto_reopen: true,
            reconnect_interval: Duration::from_millis(500),
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_session_event_serialization() {
        let event = SessionEvent::StateChanged {
            state: ConnectionState::Open,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();

        match deserialized {
            SessionEvent::StateChanged { state } => {
                assert_eq!(state, ConnectionState::Open);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_line_event_serialization() {
        let event = SessionEvent::LineReceived {
            line: "OK".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();

        match deserialized {
            SessionEvent::LineReceived { line } => assert_eq!(line, "OK"),
            _ => panic!("Wrong variant"),
        }
    }
}
