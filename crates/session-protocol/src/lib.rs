//! # Session Protocol
//!
//! Type-safe message definitions for the serial session engine.
//!
//! This crate defines the connection state machine, the event types
//! delivered to observers, and the session error taxonomy. It has zero
//! dependencies on any concrete transport, making it fully testable in
//! isolation.
//!
//! ## Message Flow
//!
//! ```text
//! Caller → SerialSession → session actor
//!                 ↓
//!           SessionEvent → observers
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod errors;
pub mod messages;
pub mod state;

pub use errors::SessionError;
pub use messages::{SelectOutcome, SessionConfig, SessionEvent};
pub use state::ConnectionState;
