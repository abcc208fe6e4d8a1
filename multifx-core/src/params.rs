//! Parameter sync: push model values to host-resident instances and
//! reconcile after a bulk load.
//!
//! Host-side instances come up at their built-in defaults, not the
//! profile's saved values, so every load is followed by a full push.
//! The local model is optimistic: a failed push keeps the local value
//! and the host stays stale until the next full resync.

use log::warn;

use multifx_net::protocol::OK;
use multifx_types::{ChainError, InstanceNum, ParamTarget, Parameter};

use crate::backend::{settle, HostBackend, HostResult};
use crate::session::{Session, SessionError};

/// Push one parameter with the verb its target requires.
pub(crate) fn push_parameter(
    backend: &mut dyn HostBackend,
    num: InstanceNum,
    param: &Parameter,
) -> HostResult {
    match param.target {
        ParamTarget::Lv2 => backend.param_set(num, &param.symbol, param.value),
        ParamTarget::Patch => backend.patch_set(num, &param.symbol, param.value),
    }
}

impl Session {
    /// Push every parameter of every instance and collect the failures
    /// as `(instance name, parameter name)` pairs. Never stops early; a
    /// short pause between commands keeps the host's serial command
    /// parser from being overrun.
    pub fn verify_parameters(&mut self) -> Vec<(String, String)> {
        let pause = self.config.param_settle();
        let mut failed = Vec::new();
        let Some(backend) = self.backend.as_mut() else {
            warn!("parameter sync skipped: not connected");
            return failed;
        };
        for instance in self.chain.iter() {
            for param in instance.parameters() {
                match push_parameter(backend.as_mut(), instance.num(), param) {
                    Ok(OK) => {}
                    Ok(code) => {
                        warn!(
                            "host rejected {} {} = {} on instance {}: {}",
                            instance.name(),
                            param.name,
                            param.value,
                            instance.num(),
                            code
                        );
                        failed.push((instance.name().to_string(), param.name.clone()));
                    }
                    Err(e) => {
                        warn!(
                            "pushing {} {} on instance {} failed: {}",
                            instance.name(),
                            param.name,
                            instance.num(),
                            e
                        );
                        failed.push((instance.name().to_string(), param.name.clone()));
                    }
                }
                settle(pause);
            }
        }
        failed
    }

    /// Push every parameter of the instance at `position` (used right
    /// after an instance is added to a live chain).
    pub(crate) fn sync_instance(&mut self, position: usize) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let Some(instance) = self.chain.get(position) else {
            return;
        };
        for param in instance.parameters() {
            match push_parameter(backend.as_mut(), instance.num(), param) {
                Ok(OK) => {}
                Ok(code) => warn!(
                    "host rejected {} {} = {} on instance {}: {}",
                    instance.name(),
                    param.name,
                    param.value,
                    instance.num(),
                    code
                ),
                Err(e) => warn!(
                    "pushing {} {} on instance {} failed: {}",
                    instance.name(),
                    param.name,
                    instance.num(),
                    e
                ),
            }
        }
    }

    /// Set a parameter to `value` (clamped, rounded to two decimals)
    /// and push it. Returns the stored value.
    pub fn change_parameter(
        &mut self,
        position: usize,
        index: usize,
        value: f32,
    ) -> Result<f32, SessionError> {
        let len = self.chain.len();
        let instance = self
            .chain
            .get_mut(position)
            .ok_or(ChainError::OutOfRange { index: position, len })?;
        let params = instance.parameters_mut();
        let count = params.len();
        let param = params
            .get_mut(index)
            .ok_or(ChainError::OutOfRange { index, len: count })?;
        let stored = param.set_value(value);
        let pushed = param.clone();
        let num = instance.num();
        let name = instance.name().to_string();

        if let Some(backend) = self.backend.as_mut() {
            match push_parameter(backend.as_mut(), num, &pushed) {
                Ok(OK) => {}
                Ok(code) => warn!(
                    "host rejected {} {} = {}: {}",
                    name, pushed.name, pushed.value, code
                ),
                Err(e) => warn!("pushing {} {} failed: {}", name, pushed.name, e),
            }
        }
        Ok(stored)
    }

    /// Nudge a parameter up by its derived step.
    pub fn increment_parameter(
        &mut self,
        position: usize,
        index: usize,
    ) -> Result<f32, SessionError> {
        let target = self.stepped_value(position, index, 1.0)?;
        self.change_parameter(position, index, target)
    }

    /// Nudge a parameter down by its derived step.
    pub fn decrement_parameter(
        &mut self,
        position: usize,
        index: usize,
    ) -> Result<f32, SessionError> {
        let target = self.stepped_value(position, index, -1.0)?;
        self.change_parameter(position, index, target)
    }

    fn stepped_value(
        &self,
        position: usize,
        index: usize,
        direction: f32,
    ) -> Result<f32, SessionError> {
        let len = self.chain.len();
        let instance = self
            .chain
            .get(position)
            .ok_or(ChainError::OutOfRange { index: position, len })?;
        let count = instance.parameters().len();
        let param = instance
            .parameters()
            .get(index)
            .ok_or(ChainError::OutOfRange { index, len: count })?;
        Ok(param.value + direction * param.step())
    }
}
