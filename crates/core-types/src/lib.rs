//! # Core Types
//!
//! Transport abstraction and device identity for the serline session engine.
//!
//! This crate defines the boundary between the session engine and the
//! environment that actually owns the serial hardware: the [`Transport`]
//! trait family (permission list, grant requests, open/close, chunked
//! read/write) and the pure vendor/product identity table.
//!
//! It has no dependency on the engine itself, so alternative transports can
//! be implemented out of tree.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod identity;
pub mod transport;

pub use identity::{chip_name, resolve};
pub use transport::{
    ChunkReader, ChunkWriter, DeviceHandle, DeviceInfo, Transport, TransportError,
};
