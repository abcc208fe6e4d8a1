//! Patch orchestration: translate chain-level intents into the exact
//! connect/disconnect sequence that moves the host's live graph from
//! its current wiring to the new one.
//!
//! Two rules hold everywhere: disconnect before connect at a shared
//! boundary, and when several boundaries change, handle them in chain
//! order. A failed command is logged with its edge context and the
//! sequence continues; one bad edge must not leave the rest of the
//! chain unwired.

use log::{error, info, warn};

use multifx_net::protocol::{
    describe_code, effect_port, OK, SYSTEM_CAPTURE_1, SYSTEM_CAPTURE_2, SYSTEM_PLAYBACK_1,
    SYSTEM_PLAYBACK_2,
};
use multifx_types::profile::ProfileRecord;
use multifx_types::{ChainError, EffectDescriptor, EffectInstance, Channels, InstanceNum};

use crate::catalog;
use crate::session::{LoadReport, Session, SessionError, SessionStatus};

/// One end of a signal-path boundary. Owns its port names so edge
/// computation never borrows the chain while commands are in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEnd {
    Capture,
    Playback,
    Effect {
        num: InstanceNum,
        channels: Channels,
        inputs: Vec<String>,
        outputs: Vec<String>,
    },
}

impl LinkEnd {
    pub fn effect(instance: &EffectInstance) -> Self {
        LinkEnd::Effect {
            num: instance.num(),
            channels: instance.channels(),
            inputs: instance.inputs().to_vec(),
            outputs: instance.outputs().to_vec(),
        }
    }

    /// Jack port feeding channel `ch` out of this end. Mono effects
    /// expose their single port on both channels.
    fn out_port(&self, ch: usize) -> String {
        match self {
            LinkEnd::Capture => [SYSTEM_CAPTURE_1, SYSTEM_CAPTURE_2][ch].to_string(),
            LinkEnd::Playback => [SYSTEM_PLAYBACK_1, SYSTEM_PLAYBACK_2][ch].to_string(),
            LinkEnd::Effect { num, channels, outputs, .. } => {
                effect_port(*num, named_port(outputs, *channels, ch, "out"))
            }
        }
    }

    /// Jack port receiving channel `ch` into this end.
    fn in_port(&self, ch: usize) -> String {
        match self {
            LinkEnd::Capture => [SYSTEM_CAPTURE_1, SYSTEM_CAPTURE_2][ch].to_string(),
            LinkEnd::Playback => [SYSTEM_PLAYBACK_1, SYSTEM_PLAYBACK_2][ch].to_string(),
            LinkEnd::Effect { num, channels, inputs, .. } => {
                effect_port(*num, named_port(inputs, *channels, ch, "in"))
            }
        }
    }
}

fn named_port<'a>(ports: &'a [String], channels: Channels, ch: usize, fallback: &'a str) -> &'a str {
    let index = match channels {
        Channels::Mono => 0,
        Channels::Stereo => ch,
    };
    ports
        .get(index)
        .or_else(|| ports.first())
        .map(String::as_str)
        .unwrap_or(fallback)
}

/// Port pairs realizing the boundary `src → dst` under the two-port
/// convention: one command per channel, collapsed to a single command
/// when both channels resolve to the same mono port pair.
pub fn edge_ports(src: &LinkEnd, dst: &LinkEnd) -> Vec<(String, String)> {
    let first = (src.out_port(0), dst.in_port(0));
    let second = (src.out_port(1), dst.in_port(1));
    if first == second {
        vec![first]
    } else {
        vec![first, second]
    }
}

impl Session {
    fn connect_edge(&mut self, src: &LinkEnd, dst: &LinkEnd) {
        let Some(backend) = self.backend.as_mut() else {
            warn!(target: "patch", "connect skipped: not connected");
            return;
        };
        for (a, b) in edge_ports(src, dst) {
            match backend.connect_ports(&a, &b) {
                Ok(OK) => {}
                Ok(code) => warn!(
                    target: "patch",
                    "host rejected connect {} -> {}: {}{}",
                    a, b, code, hint(code)
                ),
                Err(e) => warn!(target: "patch", "connect {} -> {} failed: {}", a, b, e),
            }
        }
    }

    fn disconnect_edge(&mut self, src: &LinkEnd, dst: &LinkEnd) {
        let Some(backend) = self.backend.as_mut() else {
            warn!(target: "patch", "disconnect skipped: not connected");
            return;
        };
        for (a, b) in edge_ports(src, dst) {
            match backend.disconnect_ports(&a, &b) {
                Ok(OK) => {}
                Ok(code) => warn!(
                    target: "patch",
                    "host rejected disconnect {} -> {}: {}{}",
                    a, b, code, hint(code)
                ),
                Err(e) => warn!(target: "patch", "disconnect {} -> {} failed: {}", a, b, e),
            }
        }
    }

    /// The end feeding into position `pos`: capture for the head of the
    /// chain, otherwise the preceding instance.
    fn upstream_of(&self, pos: usize) -> LinkEnd {
        match pos.checked_sub(1).and_then(|p| self.chain.get(p)) {
            Some(instance) => LinkEnd::effect(instance),
            None => LinkEnd::Capture,
        }
    }

    /// The end fed by position `pos`: playback for the tail of the
    /// chain, otherwise the following instance.
    fn downstream_of(&self, pos: usize) -> LinkEnd {
        match self.chain.get(pos + 1) {
            Some(instance) => LinkEnd::effect(instance),
            None => LinkEnd::Playback,
        }
    }

    /// Wire capture directly to playback. Safe default while no chain
    /// is loaded: silence comes from an unpowered board, not a mute.
    pub fn patch_through(&mut self) {
        self.connect_edge(&LinkEnd::Capture, &LinkEnd::Playback);
    }

    /// Undo the direct capture→playback wiring.
    pub fn unpatch_through(&mut self) {
        self.disconnect_edge(&LinkEnd::Capture, &LinkEnd::Playback);
    }

    /// Bulk load: build the chain a profile describes, instantiate every
    /// effect on the host, wire the full path, and push saved bypass
    /// flags and parameter values. A chain that is already loaded is
    /// torn down first so the new board starts from an empty host graph.
    pub fn load_profile(&mut self, record: &ProfileRecord) -> Result<LoadReport, SessionError> {
        if self.backend.is_none() {
            return Err(SessionError::NotConnected);
        }
        let chain = catalog::chain_from_profile(record)?;

        if self.status == SessionStatus::ChainLoaded {
            self.unload_chain();
        }
        // Leave passthrough before the first instance is wired in.
        if self.status == SessionStatus::Passthrough && !chain.is_empty() {
            self.unpatch_through();
        }
        self.chain = chain;

        let added = self.instantiate_chain();
        self.wire_chain();
        self.push_bypasses();
        let failed_params = self.verify_parameters();

        self.status = if self.chain.is_empty() {
            if self.status != SessionStatus::Passthrough {
                self.patch_through();
            }
            SessionStatus::Passthrough
        } else {
            SessionStatus::ChainLoaded
        };
        Ok(LoadReport { added, failed_params })
    }

    /// Remove every live instance so the next board loads into an empty
    /// host graph. Instance numbering restarts with the new chain; the
    /// host tears down each removed instance's port bindings itself.
    fn unload_chain(&mut self) {
        let live: Vec<(InstanceNum, String)> = self
            .chain
            .iter()
            .map(|i| (i.num(), i.name().to_string()))
            .collect();
        if let Some(backend) = self.backend.as_mut() {
            for (num, name) in live {
                match backend.remove(num) {
                    Ok(OK) => {}
                    Ok(code) => warn!("host rejected remove of {} ({}): {}", name, num, code),
                    Err(e) => warn!("remove of {} ({}) failed: {}", name, num, e),
                }
            }
        }
        self.chain.clear();
        self.status = SessionStatus::Connected;
    }

    /// Ask the host to create every instance in the chain. Stops at the
    /// first failure and truncates the model so it never lists an
    /// instance the host refused; wiring stays best-effort for the rest.
    fn instantiate_chain(&mut self) -> usize {
        let plugins: Vec<(String, String, InstanceNum)> = self
            .chain
            .iter()
            .map(|i| (i.uri().to_string(), i.name().to_string(), i.num()))
            .collect();
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };
        let mut added = 0;
        for (uri, name, num) in plugins {
            match backend.add(&uri, num) {
                Ok(code) if code == num.get() => {
                    info!("added {} as instance {}", name, num);
                    added += 1;
                }
                Ok(code) => {
                    error!(
                        "adding {} as instance {} failed: host returned {}{}",
                        name, num, code, hint(code)
                    );
                    break;
                }
                Err(e) => {
                    error!("adding {} as instance {} failed: {}", name, num, e);
                    break;
                }
            }
        }
        self.chain.truncate(added);
        added
    }

    /// Connect capture → chain → playback in chain order. The host
    /// graph starts empty after instantiation, so no disconnects are
    /// needed. An empty chain wires passthrough instead.
    fn wire_chain(&mut self) {
        if self.chain.is_empty() {
            return;
        }
        let mut ends = vec![LinkEnd::Capture];
        ends.extend(self.chain.iter().map(LinkEnd::effect));
        ends.push(LinkEnd::Playback);
        for pair in ends.windows(2) {
            self.connect_edge(&pair[0], &pair[1]);
        }
    }

    fn push_bypasses(&mut self) {
        let wanted: Vec<(InstanceNum, String)> = self
            .chain
            .iter()
            .filter(|i| i.bypass)
            .map(|i| (i.num(), i.name().to_string()))
            .collect();
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        for (num, name) in wanted {
            match backend.bypass(num, true) {
                Ok(OK) => {}
                Ok(code) => warn!("host rejected bypass for {} ({}): {}", name, num, code),
                Err(e) => warn!("bypass for {} ({}) failed: {}", name, num, e),
            }
        }
    }

    /// Append a catalog effect at the end of the chain. Exactly one
    /// boundary is re-wired: old-last → playback becomes old-last → new
    /// → playback (capture stands in for old-last on an empty chain).
    pub fn add_plugin_end(&mut self, desc: &EffectDescriptor) -> Result<(), SessionError> {
        let num = self.chain.next_num();
        {
            let backend = self.backend.as_mut().ok_or(SessionError::NotConnected)?;
            match backend.add(&desc.uri, num) {
                Ok(code) if code == num.get() => {}
                Ok(code) => {
                    error!(
                        "adding {} as instance {} failed: host returned {}{}",
                        desc.name, num, code, hint(code)
                    );
                    return Err(SessionError::AddRejected { uri: desc.uri.clone(), code });
                }
                Err(e) => {
                    error!("adding {} as instance {} failed: {}", desc.name, num, e);
                    return Err(SessionError::Command(e));
                }
            }
        }

        let old_last = match self.chain.instances().last() {
            Some(instance) => LinkEnd::effect(instance),
            None => LinkEnd::Capture,
        };
        let num = self.chain.append(desc, false);
        let new_end = LinkEnd::Effect {
            num,
            channels: desc.channels,
            inputs: desc.inputs.clone(),
            outputs: desc.outputs.clone(),
        };

        self.disconnect_edge(&old_last, &LinkEnd::Playback);
        self.connect_edge(&old_last, &new_end);
        self.connect_edge(&new_end, &LinkEnd::Playback);

        self.sync_instance(self.chain.len() - 1);
        self.status = SessionStatus::ChainLoaded;
        Ok(())
    }

    /// Remove the instance at `position` and close the gap. Removing
    /// the host instance tears down its own port bindings, so only the
    /// surviving neighbor pair needs a connect.
    pub fn remove_at(&mut self, position: usize) -> Result<(), SessionError> {
        if self.backend.is_none() {
            return Err(SessionError::NotConnected);
        }
        if self.chain.is_empty() {
            return Err(ChainError::Empty.into());
        }
        let num = self
            .chain
            .get(position)
            .ok_or(ChainError::OutOfRange { index: position, len: self.chain.len() })?
            .num();

        if let Some(backend) = self.backend.as_mut() {
            match backend.remove(num) {
                Ok(OK) => {}
                Ok(code) => warn!("host rejected remove of instance {}: {}", num, code),
                Err(e) => warn!("remove of instance {} failed: {}", num, e),
            }
        }
        let removed = self.chain.remove(position)?;
        info!("removed {} (instance {})", removed.name(), removed.num());

        if self.chain.is_empty() {
            self.patch_through();
            self.status = SessionStatus::Passthrough;
            return Ok(());
        }
        let src = self.upstream_of(position);
        let dst = match self.chain.get(position) {
            Some(instance) => LinkEnd::effect(instance),
            None => LinkEnd::Playback,
        };
        self.connect_edge(&src, &dst);
        Ok(())
    }

    /// Swap the instances at `position` and `position + 1`, re-wiring
    /// the two or three boundaries that touch the pair. The endpoint
    /// variants fall out of which neighbors exist.
    pub fn swap_adjacent(&mut self, position: usize) -> Result<(), SessionError> {
        if self.backend.is_none() {
            return Err(SessionError::NotConnected);
        }
        let (Some(first), Some(second)) = (self.chain.get(position), self.chain.get(position + 1))
        else {
            return Err(ChainError::OutOfRange {
                index: position + 1,
                len: self.chain.len(),
            }
            .into());
        };
        let a = LinkEnd::effect(first);
        let b = LinkEnd::effect(second);
        let prev = self.upstream_of(position);
        let next = self.downstream_of(position + 1);

        // Tear down in chain order, then rebuild in swapped order.
        self.disconnect_edge(&prev, &a);
        self.disconnect_edge(&a, &b);
        self.disconnect_edge(&b, &next);

        self.chain.swap_adjacent(position)?;

        self.connect_edge(&prev, &b);
        self.connect_edge(&b, &a);
        self.connect_edge(&a, &next);
        Ok(())
    }

    /// Flip the bypass flag at `position` and push it. The model keeps
    /// the new flag even if the push fails; the host catches up on the
    /// next resync.
    pub fn set_bypass(&mut self, position: usize, bypassed: bool) -> Result<(), SessionError> {
        if self.backend.is_none() {
            return Err(SessionError::NotConnected);
        }
        let len = self.chain.len();
        let instance = self
            .chain
            .get_mut(position)
            .ok_or(ChainError::OutOfRange { index: position, len })?;
        instance.bypass = bypassed;
        let num = instance.num();
        let name = instance.name().to_string();

        if let Some(backend) = self.backend.as_mut() {
            match backend.bypass(num, bypassed) {
                Ok(OK) => {}
                Ok(code) => warn!("host rejected bypass for {} ({}): {}", name, num, code),
                Err(e) => warn!("bypass for {} ({}) failed: {}", name, num, e),
            }
        }
        Ok(())
    }
}

fn hint(code: i32) -> String {
    match describe_code(code) {
        Some(text) => format!(" ({})", text),
        None => String::new(),
    }
}
