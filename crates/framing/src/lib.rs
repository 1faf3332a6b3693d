//! Byte-to-line framing for the serline session engine.
//!
//! Two stateful, allocation-light pieces sit between the raw transport and
//! the line observer:
//!
//! - [`Utf8Stream`] turns byte chunks into text, tolerating multi-byte
//!   sequences split across chunk boundaries.
//! - [`LineSplitter`] accumulates text and emits complete lines on a
//!   configurable end-of-line pattern.
//!
//! Both are reset on every fresh open so no stale partial data leaks into a
//! new session.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod lines;
pub mod utf8;

pub use lines::{Eol, LineSplitter};
pub use utf8::Utf8Stream;
