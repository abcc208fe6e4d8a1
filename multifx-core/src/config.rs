use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    audio: AudioSection,
    #[serde(default)]
    host: HostSection,
}

#[derive(Deserialize, Default)]
struct AudioSection {
    jackd: Option<String>,
    device: Option<String>,
    sample_rate: Option<u32>,
    period: Option<u32>,
}

#[derive(Deserialize, Default)]
struct HostSection {
    command: Option<String>,
    port: Option<u16>,
    connect_attempts: Option<u32>,
    connect_retry_ms: Option<u64>,
    param_settle_ms: Option<u64>,
    stabilize_ms: Option<u64>,
}

/// Runtime configuration: the embedded defaults overlaid with the user's
/// `~/.config/multifx/multifx.toml`, if present. A malformed user file is
/// ignored with a warning rather than failing startup.
pub struct Config {
    audio: AudioSection,
    host: HostSection,
}

fn merge_audio(base: &mut AudioSection, user: AudioSection) {
    if user.jackd.is_some() {
        base.jackd = user.jackd;
    }
    if user.device.is_some() {
        base.device = user.device;
    }
    if user.sample_rate.is_some() {
        base.sample_rate = user.sample_rate;
    }
    if user.period.is_some() {
        base.period = user.period;
    }
}

fn merge_host(base: &mut HostSection, user: HostSection) {
    if user.command.is_some() {
        base.command = user.command;
    }
    if user.port.is_some() {
        base.port = user.port;
    }
    if user.connect_attempts.is_some() {
        base.connect_attempts = user.connect_attempts;
    }
    if user.connect_retry_ms.is_some() {
        base.connect_retry_ms = user.connect_retry_ms;
    }
    if user.param_settle_ms.is_some() {
        base.param_settle_ms = user.param_settle_ms;
    }
    if user.stabilize_ms.is_some() {
        base.stabilize_ms = user.stabilize_ms;
    }
}

impl Default for Config {
    fn default() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("failed to parse embedded config.toml");
        Config {
            audio: base.audio,
            host: base.host,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(path) = crate::paths::user_config_file() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_audio(&mut config.audio, user.audio);
                            merge_host(&mut config.host, user.host);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    pub fn jackd_path(&self) -> &str {
        self.audio.jackd.as_deref().unwrap_or("/usr/bin/jackd")
    }

    pub fn alsa_device(&self) -> &str {
        self.audio.device.as_deref().unwrap_or("hw:0")
    }

    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate.unwrap_or(96_000)
    }

    pub fn period(&self) -> u32 {
        self.audio.period.unwrap_or(128)
    }

    pub fn host_command(&self) -> &str {
        self.host.command.as_deref().unwrap_or("mod-host")
    }

    pub fn host_port(&self) -> u16 {
        self.host.port.unwrap_or(multifx_net::protocol::DEFAULT_PORT)
    }

    pub fn connect_attempts(&self) -> u32 {
        self.host.connect_attempts.unwrap_or(5)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.host.connect_retry_ms.unwrap_or(1000))
    }

    pub fn param_settle(&self) -> Duration {
        Duration::from_millis(self.host.param_settle_ms.unwrap_or(100))
    }

    pub fn stabilize_delay(&self) -> Duration {
        Duration::from_millis(self.host.stabilize_ms.unwrap_or(2000))
    }

    /// Configuration for in-process tests: no settle delays, no retries.
    pub fn immediate() -> Self {
        let mut config = Config::default();
        config.host.param_settle_ms = Some(0);
        config.host.stabilize_ms = Some(0);
        config.host.connect_attempts = Some(1);
        config.host.connect_retry_ms = Some(0);
        config
    }
}
