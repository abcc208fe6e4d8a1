//! Session lifecycle: external processes, connection, and the safe
//! passthrough state between chain loads.

use std::fmt;
use std::io;
use std::process::{Child, Command, Stdio};

use log::{info, warn};

use multifx_net::NetError;
use multifx_types::{Chain, ChainError};

use crate::backend::{settle, HostBackend, TcpHost};
use crate::catalog::ProfileError;
use crate::config::Config;

/// Session-level state machine.
///
/// `Connected` is transient: the session enters passthrough wiring
/// immediately after a connection is established, and returns to it
/// whenever the chain is unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Stopped,
    Starting,
    Connected,
    Passthrough,
    ChainLoaded,
}

#[derive(Debug)]
pub enum SessionError {
    /// No host connection; establish one before mutating the chain.
    NotConnected,
    /// Session establishment failed; the caller must recover explicitly.
    Connect(NetError),
    /// A command whose result the operation depends on did not complete.
    Command(NetError),
    /// An external process could not be spawned.
    Spawn(io::Error),
    /// Model invariant violation (stale position); treat as a no-op.
    Chain(ChainError),
    /// The profile record could not be turned into a chain.
    Profile(ProfileError),
    /// The host refused to instantiate an effect.
    AddRejected { uri: String, code: i32 },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotConnected => write!(f, "not connected to the host process"),
            SessionError::Connect(e) => write!(f, "session connect failed: {}", e),
            SessionError::Command(e) => write!(f, "host command failed: {}", e),
            SessionError::Spawn(e) => write!(f, "failed to spawn process: {}", e),
            SessionError::Chain(e) => write!(f, "{}", e),
            SessionError::Profile(e) => write!(f, "{}", e),
            SessionError::AddRejected { uri, code } => {
                write!(f, "host refused to add {} (code {})", uri, code)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Connect(e) | SessionError::Command(e) => Some(e),
            SessionError::Spawn(e) => Some(e),
            SessionError::Chain(e) => Some(e),
            SessionError::Profile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ChainError> for SessionError {
    fn from(e: ChainError) -> Self {
        SessionError::Chain(e)
    }
}

impl From<ProfileError> for SessionError {
    fn from(e: ProfileError) -> Self {
        SessionError::Profile(e)
    }
}

/// Outcome of a bulk load.
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Instances the host actually created.
    pub added: usize,
    /// `(instance name, parameter name)` pairs whose initial push failed.
    pub failed_params: Vec<(String, String)>,
}

/// One live control session: the external processes, the protocol
/// connection, and the authoritative chain model.
///
/// All orchestration is synchronous and assumes exclusive access for
/// the duration of each operation; the protocol has no request IDs to
/// multiplex concurrent commands.
pub struct Session {
    pub(crate) config: Config,
    pub(crate) backend: Option<Box<dyn HostBackend>>,
    pub(crate) chain: Chain,
    pub(crate) status: SessionStatus,
    jack_process: Option<Child>,
    host_process: Option<Child>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            backend: None,
            chain: Chain::new(),
            status: SessionStatus::Stopped,
            jack_process: None,
            host_process: None,
        }
    }

    /// Build a session around an existing backend. This is the entry
    /// point for in-process use and tests; `connect` uses it too.
    pub fn with_backend(config: Config, backend: Box<dyn HostBackend>) -> Self {
        let mut session = Self::new(config);
        session.install_backend(backend);
        session
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Start the jack server on the primary hardware device. If it dies
    /// within the stabilization window, fall back to the dummy driver so
    /// the rest of the system can still run headless. Degrades silently
    /// rather than failing startup.
    pub fn start_audio_server(&mut self) {
        self.status = SessionStatus::Starting;

        let primary = self.spawn_jackd(&[
            "-d",
            "alsa",
            "-d",
            self.config.alsa_device(),
            "-r",
            &self.config.sample_rate().to_string(),
            "-p",
            &self.config.period().to_string(),
        ]);

        let mut child = match primary {
            Ok(child) => child,
            Err(e) => {
                warn!("could not launch jackd: {}", e);
                self.try_dummy_backend();
                return;
            }
        };

        settle(self.config.stabilize_delay());
        match child.try_wait() {
            Ok(Some(status)) => {
                warn!("jack server exited during startup ({}), falling back to dummy", status);
                self.try_dummy_backend();
            }
            Ok(None) => {
                info!("jack server started on {}", self.config.alsa_device());
                self.jack_process = Some(child);
            }
            Err(e) => {
                warn!("could not check jack server health: {}", e);
                self.jack_process = Some(child);
            }
        }
    }

    fn try_dummy_backend(&mut self) {
        let dummy = self.spawn_jackd(&[
            "-d",
            "dummy",
            "-r",
            &self.config.sample_rate().to_string(),
            "-p",
            &self.config.period().to_string(),
        ]);
        match dummy {
            Ok(child) => {
                info!("jack server running on the dummy driver");
                self.jack_process = Some(child);
            }
            Err(e) => warn!("dummy jack server failed too: {}", e),
        }
    }

    fn spawn_jackd(&self, args: &[&str]) -> io::Result<Child> {
        let mut cmd = Command::new(self.config.jackd_path());
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());
        detach(&mut cmd);
        cmd.spawn()
    }

    /// Launch a fresh host process on the configured port, terminating
    /// any stray instance first so the port is free.
    pub fn start_host_process(&mut self) -> Result<(), SessionError> {
        // Best-effort: a previous run may have left a host behind.
        let _ = Command::new("killall")
            .arg(self.config.host_command())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Some(mut old) = self.host_process.take() {
            let _ = old.kill();
            let _ = old.wait();
        }

        let mut cmd = Command::new(self.config.host_command());
        cmd.arg("-n")
            .arg("-p")
            .arg(self.config.host_port().to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);
        let child = cmd.spawn().map_err(SessionError::Spawn)?;
        info!(
            "started {} on port {}",
            self.config.host_command(),
            self.config.host_port()
        );
        self.host_process = Some(child);
        Ok(())
    }

    /// Establish the protocol connection and enter passthrough wiring.
    /// Failure here is fatal to the session and surfaced to the caller.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        let backend = TcpHost::connect(&self.config).map_err(SessionError::Connect)?;
        self.install_backend(Box::new(backend));
        Ok(())
    }

    pub(crate) fn install_backend(&mut self, backend: Box<dyn HostBackend>) {
        self.backend = Some(backend);
        self.status = SessionStatus::Connected;
        // Silence-safe default until a chain is loaded.
        self.patch_through();
        self.status = SessionStatus::Passthrough;
    }

    /// Destroy-and-rebuild: restart the host process and reconnect.
    /// Used for profile switches; the old graph (and every instance in
    /// it) dies with the old host process.
    pub fn reset_session(&mut self) -> Result<(), SessionError> {
        self.backend = None;
        self.chain = Chain::new();
        self.start_host_process()?;
        self.connect()
    }

    /// Check whether the host process died underneath us.
    /// Returns a diagnostic message if it did.
    pub fn check_host_health(&mut self) -> Option<String> {
        let child = self.host_process.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                self.host_process = None;
                self.backend = None;
                self.chain = Chain::new();
                self.status = SessionStatus::Stopped;
                Some(format!("host process exited ({})", status))
            }
            _ => None,
        }
    }

    /// Explicit shutdown: ask the host to quit, then reap the children.
    pub fn stop(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.quit() {
                warn!("quit command failed: {}", e);
            }
        }
        self.backend = None;
        for child in [self.host_process.take(), self.jack_process.take()].into_iter().flatten() {
            let mut child = child;
            let _ = child.kill();
            let _ = child.wait();
        }
        self.status = SessionStatus::Stopped;
    }
}

/// Detach a child from our process group so it outlives the controller.
#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}
