//! # Session Core
//!
//! The serial session engine: a message-driven session actor owning the
//! connection state machine, a read loop that turns byte chunks into events
//! and lines, a batching write queue, and a cancellable retry timer.
//!
//! The public entry point is [`SerialSession`], which spawns the actor and
//! hands back an event receiver. Everything else is the machinery behind it.
//!
//! ```text
//! SerialSession ──SessionMessage──► SessionActor ──► read loop / drain task
//!        ▲                               │
//!        └───────── SessionEvent ◄───────┘
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod actor;
mod read_loop;
pub mod retry;
pub mod session;
pub mod session_actor;
mod shared;
pub mod write_queue;

pub use actor::{spawn_actor, Actor};
pub use retry::{spawn_retry, RetryHandle};
pub use session::SerialSession;
pub use session_actor::SessionMessage;
pub use write_queue::{spawn_drain, WriteSender};
