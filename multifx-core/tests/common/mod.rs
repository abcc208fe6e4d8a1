//! Scripted host backend for orchestration tests.
//!
//! Records every command in wire form and answers with the host's
//! default success (echoed number for `add`, 0 otherwise) unless a
//! scripted result matches the command prefix.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use multifx_types::profile::{ParamRecord, PluginRecord, ProfileRecord};

use multifx_core::backend::{HostBackend, HostResult};
use multifx_core::{Config, Session};
use multifx_types::InstanceNum;

pub type CommandLog = Arc<Mutex<Vec<String>>>;

pub struct MockHost {
    log: CommandLog,
    scripted: Vec<(String, i32)>,
}

impl MockHost {
    pub fn new() -> (Self, CommandLog) {
        let log: CommandLog = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
                scripted: Vec::new(),
            },
            log,
        )
    }

    /// The next command starting with `prefix` answers `code` (once).
    pub fn script(&mut self, prefix: &str, code: i32) {
        self.scripted.push((prefix.to_string(), code));
    }

    fn respond(&mut self, command: String, default: i32) -> HostResult {
        self.log.lock().unwrap().push(command.clone());
        if let Some(i) = self
            .scripted
            .iter()
            .position(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            let (_, code) = self.scripted.remove(i);
            return Ok(code);
        }
        Ok(default)
    }
}

impl HostBackend for MockHost {
    fn add(&mut self, uri: &str, num: InstanceNum) -> HostResult {
        self.respond(format!("add {} {}", uri, num), num.get())
    }

    fn connect_ports(&mut self, a: &str, b: &str) -> HostResult {
        self.respond(format!("connect {} {}", a, b), 0)
    }

    fn disconnect_ports(&mut self, a: &str, b: &str) -> HostResult {
        self.respond(format!("disconnect {} {}", a, b), 0)
    }

    fn param_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult {
        self.respond(format!("param_set {} {} {}", num, symbol, value), 0)
    }

    fn patch_set(&mut self, num: InstanceNum, symbol: &str, value: f32) -> HostResult {
        self.respond(format!("patch_set {} {} {}", num, symbol, value), 0)
    }

    fn bypass(&mut self, num: InstanceNum, on: bool) -> HostResult {
        self.respond(format!("bypass {} {}", num, u8::from(on)), 0)
    }

    fn remove(&mut self, num: InstanceNum) -> HostResult {
        self.respond(format!("remove {}", num), 0)
    }

    fn quit(&mut self) -> HostResult {
        self.respond("quit".to_string(), 0)
    }
}

/// A connected session with the post-connect passthrough commands
/// already drained from the log.
pub fn connected_session() -> (Session, CommandLog) {
    let (mock, log) = MockHost::new();
    let session = Session::with_backend(Config::immediate(), Box::new(mock));
    drain(&log);
    (session, log)
}

pub fn connected_session_scripted(scripts: &[(&str, i32)]) -> (Session, CommandLog) {
    let (mut mock, log) = MockHost::new();
    for (prefix, code) in scripts {
        mock.script(prefix, *code);
    }
    let session = Session::with_backend(Config::immediate(), Box::new(mock));
    drain(&log);
    (session, log)
}

/// Take everything logged so far.
pub fn drain(log: &CommandLog) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

// ─── profile builders ───────────────────────────────────────────────

pub fn mono_plugin(name: &str) -> PluginRecord {
    PluginRecord {
        name: name.to_string(),
        uri: format!("http://example.org/{}", name),
        bypass: 0,
        channels: "mono".into(),
        inputs: vec!["in".into()],
        outputs: vec!["out".into()],
        parameters: vec![],
    }
}

pub fn stereo_plugin(name: &str) -> PluginRecord {
    PluginRecord {
        channels: "stereo".into(),
        inputs: vec!["in_l".into(), "in_r".into()],
        outputs: vec!["out_l".into(), "out_r".into()],
        ..mono_plugin(name)
    }
}

pub fn dial(name: &str, symbol: &str, min: f32, max: f32, value: f32) -> ParamRecord {
    ParamRecord {
        target: "lv2".into(),
        name: name.to_string(),
        symbol: Some(symbol.to_string()),
        mode: "dial".into(),
        min: Some(min),
        max: Some(max),
        value: Some(value),
        ..ParamRecord::default()
    }
}

pub fn profile(plugins: Vec<PluginRecord>) -> ProfileRecord {
    ProfileRecord { plugins }
}
