//! # multifx-types
//!
//! Shared type definitions for the MultiFX pedalboard controller.
//! This crate contains the pure data model (parameters, effects, the
//! signal chain, and the on-disk profile shape) used by multifx-net and
//! multifx-core. No I/O happens here.

mod chain;
mod effect;
mod param;
pub mod profile;

pub use chain::{Chain, ChainError};
pub use effect::{Channels, EffectDescriptor, EffectInstance};
pub use param::{ParamKind, ParamTarget, Parameter};

/// Host-assigned instance number for a live effect.
///
/// Stable for the lifetime of the instance, independent of its chain
/// position. Distinct from the position on purpose: reordering the chain
/// never changes an instance number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct InstanceNum(i32);

impl InstanceNum {
    pub fn new(num: i32) -> Self {
        Self(num)
    }
    pub fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for InstanceNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
