//! Error Handling Guidelines
//!
//! All error messages should follow this format:
//!
//! 1. **What failed**: Describe the operation that failed
//! 2. **Why it failed**: Provide the root cause if known
//! 3. **What to do**: Suggest user action when possible

use core_types::TransportError;
use thiserror::Error;

/// Unified error type for session operations
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// The user dismissed the device picker or the platform denied access
    #[error("Device selection rejected: {0}")]
    SelectionRejected(String),

    /// The port could not be opened
    #[error("Failed to open serial port: {0}")]
    OpenFailed(String),

    /// The read loop terminated with a transport error
    #[error("Serial read failed: {0}")]
    ReadFailed(String),

    /// A queued write could not be delivered
    #[error("Serial write failed: {0}")]
    WriteFailed(String),

    /// The port did not confirm closure within the close timeout
    #[error("Close timed out: the port did not release within {0:?}")]
    CloseTimeout(std::time::Duration),

    /// State transition was rejected
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Communication channel closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Rejected => {
                SessionError::SelectionRejected("no device granted".into())
            }
            TransportError::OpenFailed(reason) => SessionError::OpenFailed(reason),
            TransportError::NotOpen => {
                SessionError::WriteFailed("port is not open".into())
            }
            TransportError::Io(reason) => SessionError::ReadFailed(reason),
        }
    }
}
