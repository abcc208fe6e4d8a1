//! Text-protocol client for the mod-host effect daemon.
//!
//! Commands are newline-terminated lines; the host answers with a single
//! line whose second whitespace token is the numeric result. This crate
//! owns the transport quirks (retry, timeout, NUL padding, parse) so the
//! orchestration layer only sees typed results.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::HostClient;
pub use error::NetError;
