use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use multifx_types::InstanceNum;

use crate::error::NetError;
use crate::protocol::parse_result;

/// Per-call response deadline. A hung host must not block the controller.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Fixed response buffer; mod-host replies are single short lines,
/// NUL-padded by some builds.
const RESPONSE_BUF: usize = 1024;

/// Persistent connection to the host process.
///
/// All commands are synchronous request/response on this one stream; the
/// protocol carries no request IDs, so callers must not interleave.
pub struct HostClient {
    stream: TcpStream,
}

impl HostClient {
    /// Connect with bounded retries, waiting `retry_delay` between
    /// attempts. The host needs a moment to open its port after spawn.
    pub fn connect(
        host: &str,
        port: u16,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, NetError> {
        let mut last = std::io::Error::new(std::io::ErrorKind::Other, "no attempt made");
        for attempt in 1..=max_attempts {
            match TcpStream::connect((host, port)) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(READ_TIMEOUT))
                        .map_err(NetError::Transport)?;
                    info!("connected to host at {}:{} (attempt {})", host, port, attempt);
                    return Ok(Self { stream });
                }
                Err(e) => {
                    warn!(
                        "host connect attempt {}/{} failed: {}",
                        attempt, max_attempts, e
                    );
                    last = e;
                    if attempt < max_attempts {
                        thread::sleep(retry_delay);
                    }
                }
            }
        }
        Err(NetError::ConnectionFailed {
            attempts: max_attempts,
            last,
        })
    }

    /// Send one command line and return the decoded response text with
    /// NUL padding stripped.
    pub fn send(&mut self, command: &str) -> Result<String, NetError> {
        debug!(target: "wire", "-> {}", command);
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\n")?;

        let mut buf = [0u8; RESPONSE_BUF];
        let n = self.stream.read(&mut buf)?;
        if n == 0 {
            return Err(NetError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "host closed the connection",
            )));
        }
        let text: String = String::from_utf8_lossy(&buf[..n])
            .chars()
            .filter(|&c| c != '\0')
            .collect();
        debug!(target: "wire", "<- {}", text.trim_end());
        Ok(text)
    }

    fn request(&mut self, command: &str) -> Result<i32, NetError> {
        let response = self.send(command)?;
        parse_result(&response)
    }

    /// `add <uri> <num>`: instantiate an effect. Success echoes `num`.
    pub fn add(&mut self, uri: &str, num: InstanceNum) -> Result<i32, NetError> {
        self.request(&format!("add {} {}", uri, num))
    }

    /// `connect <a> <b>`: link two jack ports.
    pub fn connect_ports(&mut self, a: &str, b: &str) -> Result<i32, NetError> {
        self.request(&format!("connect {} {}", a, b))
    }

    /// `disconnect <a> <b>`: unlink two jack ports.
    pub fn disconnect_ports(&mut self, a: &str, b: &str) -> Result<i32, NetError> {
        self.request(&format!("disconnect {} {}", a, b))
    }

    /// `param_set <num> <symbol> <value>`: set a control-port value.
    pub fn param_set(
        &mut self,
        num: InstanceNum,
        symbol: &str,
        value: f32,
    ) -> Result<i32, NetError> {
        self.request(&format!("param_set {} {} {}", num, symbol, value))
    }

    /// `patch_set <num> <symbol> <value>`: set an extended property.
    pub fn patch_set(
        &mut self,
        num: InstanceNum,
        symbol: &str,
        value: f32,
    ) -> Result<i32, NetError> {
        self.request(&format!("patch_set {} {} {}", num, symbol, value))
    }

    /// `bypass <num> <0|1>`: toggle processing for an instance.
    pub fn bypass(&mut self, num: InstanceNum, on: bool) -> Result<i32, NetError> {
        self.request(&format!("bypass {} {}", num, u8::from(on)))
    }

    /// `remove <num>`: destroy an instance and its port bindings.
    pub fn remove(&mut self, num: InstanceNum) -> Result<i32, NetError> {
        self.request(&format!("remove {}", num))
    }

    /// `quit`: ask the host process to exit.
    pub fn quit(&mut self) -> Result<i32, NetError> {
        self.request("quit")
    }
}
