//! Host backend trait: a semantic-level abstraction over the effect host.
//!
//! `HostBackend` captures what the orchestrator *means* to do (add an
//! instance, link two ports, push a value) independently of how it's
//! done (text commands to mod-host over TCP). This is what lets the
//! wiring logic be unit-tested against a scripted host.

use std::time::Duration;

use multifx_net::{HostClient, NetError};
use multifx_types::InstanceNum;

use crate::config::Config;

/// Numeric result of a host command. `Ok` carries the host's result
/// code, which may still be a rejection (non-zero); transport, timeout,
/// and parse failures are `Err`.
pub type HostResult = Result<i32, NetError>;

pub trait HostBackend {
    fn add(&mut self, uri: &str, num: InstanceNum) -> HostResult;
    fn connect_ports(&mut self, a: &str, b: &str) -> HostResult;
    fn disconnect_ports(&mut self, a: &str, b: &str) -> HostResult;
    fn param_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult;
    fn patch_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult;
    fn bypass(&mut self, num: InstanceNum, on: bool) -> HostResult;
    fn remove(&mut self, num: InstanceNum) -> HostResult;
    fn quit(&mut self) -> HostResult;
}

/// Backend over a live TCP connection to mod-host.
pub struct TcpHost {
    client: HostClient,
}

impl TcpHost {
    pub fn new(client: HostClient) -> Self {
        Self { client }
    }

    /// Connect to a local host process using the session configuration.
    pub fn connect(config: &Config) -> Result<Self, NetError> {
        let client = HostClient::connect(
            "127.0.0.1",
            config.host_port(),
            config.connect_attempts(),
            config.connect_retry_delay(),
        )?;
        Ok(Self::new(client))
    }
}

impl HostBackend for TcpHost {
    fn add(&mut self, uri: &str, num: InstanceNum) -> HostResult {
        self.client.add(uri, num)
    }

    fn connect_ports(&mut self, a: &str, b: &str) -> HostResult {
        self.client.connect_ports(a, b)
    }

    fn disconnect_ports(&mut self, a: &str, b: &str) -> HostResult {
        self.client.disconnect_ports(a, b)
    }

    fn param_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult {
        self.client.param_set(num, symbol, value)
    }

    fn patch_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult {
        self.client.patch_set(num, symbol, value)
    }

    fn bypass(&mut self, num: InstanceNum, on: bool) -> HostResult {
        self.client.bypass(num, on)
    }

    fn remove(&mut self, num: InstanceNum) -> HostResult {
        self.client.remove(num)
    }

    fn quit(&mut self) -> HostResult {
        self.client.quit()
    }
}

/// Fixed delay helper used for coarse process stabilization waits.
pub(crate) fn settle(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
