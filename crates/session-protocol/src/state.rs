/// # Connection State Machine
///
/// A single source of truth for session status. Every transition is
/// validated against the table below, which prevents races such as a
/// write landing on a port that is mid-teardown.
///
/// ## State Transition Diagram
///
/// ```text
///          ┌────────────┐
///     ┌───►│   Closed   │◄──────────────┐
///     │    └─────┬──────┘               │
///     │          │ open()               │ Close
///     │          ▼                      │ Complete
///     │    ┌────────────┐        ┌──────┴──────┐
///     │    │  Opening   │───────►│   Closing   │◄──┐
///     │    └─────┬──────┘ close()└─────────────┘   │
///     │          │ Port                            │
///     │   Open   │ Opens                      User │
///     │   Failed ▼                           close()
///     │    ┌────────────┐                          │
///     └────┤    Open    │──────────────────────────┘
///  Read    └────────────┘
///  Loop
///  Ended
/// ```
///
/// ## State Invariants
///
/// - **Closed**: No port open, no read loop, writer parked
/// - **Opening**: Port opening, waiting for the transport to confirm
/// - **Open**: Port open, read loop running, writer draining
/// - **Closing**: Port closing, waiting for read loop confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    /// No active connection, ready to open
    Closed,

    /// Initiating connection to port
    Opening,

    /// Successfully opened and operational
    Open,

    /// Tearing down the connection
    Closing,
}

impl ConnectionState {
    /// Is the session in a state where writes may be enqueued?
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Can the user trigger a close action?
    pub fn can_close(&self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Closed => "Disconnected",
            Self::Opening => "Connecting...",
            Self::Open => "Connected",
            Self::Closing => "Disconnecting...",
        }
    }

    /// Validate if transition to new_state is allowed from current state
    pub fn can_transition_to(&self, new_state: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, new_state) {
            // From Closed
            (Closed, Opening) => true, // User opens, or retry timer fires
            (Closed, Closed) => true,  // Idempotent (no-op)

            // From Opening
            (Opening, Open) => true,    // Port opened successfully
            (Opening, Closed) => true,  // Open failed
            (Opening, Closing) => true, // User cancels the open

            // From Open
            (Open, Closing) => true, // User close
            (Open, Closed) => true,  // Read loop ended (device unplugged)

            // From Closing
            (Closing, Closed) => true, // Close complete

            // All other transitions are invalid
            _ => false,
        }
    }

    /// Convert state to u8 value for atomic storage
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Closed => 0,
            ConnectionState::Opening => 1,
            ConnectionState::Open => 2,
            ConnectionState::Closing => 3,
        }
    }

    /// Convert u8 value back to state. Returns None if value is invalid.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConnectionState::Closed),
            1 => Some(ConnectionState::Opening),
            2 => Some(ConnectionState::Open),
            3 => Some(ConnectionState::Closing),
            _ => None,
        }
    }
}
