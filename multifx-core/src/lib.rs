//! # multifx-core
//!
//! Patch orchestration and session control for the MultiFX pedalboard.
//!
//! A [`Session`] owns the external processes (jack server and effect
//! host), the protocol connection, and the authoritative in-memory
//! [`multifx_types::Chain`]. Chain mutations go through the session,
//! which issues the exact command sequence needed to move the host's
//! live audio graph from its current wiring to the new one.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod params;
pub mod patch;
pub mod paths;
pub mod session;

pub use backend::{HostBackend, TcpHost};
pub use config::Config;
pub use session::{LoadReport, Session, SessionError, SessionStatus};
