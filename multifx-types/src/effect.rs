use serde::{Deserialize, Serialize};

use crate::{InstanceNum, Parameter};

/// Channel arity of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    Mono,
    Stereo,
}

/// Static catalog definition of an effect type.
///
/// Loaded from the plugin catalog or a profile; immutable once in the
/// catalog. `parameters` carry the descriptor-declared current values,
/// which become the starting values of each new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub name: String,
    /// Catalog identifier (LV2 URI).
    pub uri: String,
    pub channels: Channels,
    /// Logical input port names, in channel order.
    pub inputs: Vec<String>,
    /// Logical output port names, in channel order.
    pub outputs: Vec<String>,
    pub parameters: Vec<Parameter>,
}

/// A live member of the chain.
///
/// Owns a deep copy of its descriptor data: two instances of the same
/// effect never share parameter state. The chain position is not stored
/// here; it is the instance's index in the `Chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    desc: EffectDescriptor,
    num: InstanceNum,
    pub bypass: bool,
}

impl EffectInstance {
    pub fn new(desc: EffectDescriptor, num: InstanceNum, bypass: bool) -> Self {
        Self { desc, num, bypass }
    }

    pub fn num(&self) -> InstanceNum {
        self.num
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn uri(&self) -> &str {
        &self.desc.uri
    }

    pub fn channels(&self) -> Channels {
        self.desc.channels
    }

    pub fn inputs(&self) -> &[String] {
        &self.desc.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.desc.outputs
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.desc.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [Parameter] {
        &mut self.desc.parameters
    }

    pub fn descriptor(&self) -> &EffectDescriptor {
        &self.desc
    }
}
