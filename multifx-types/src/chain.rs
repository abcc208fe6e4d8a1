use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EffectDescriptor, EffectInstance, InstanceNum};

/// A model-invariant violation: the requested position does not exist.
///
/// These mostly originate from stale UI selections (a remove issued while
/// the chain is mid-transition), so callers treat them as a no-op rather
/// than a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    OutOfRange { index: usize, len: usize },
    Empty,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::OutOfRange { index, len } => {
                write!(f, "chain position {} out of range (len {})", index, len)
            }
            ChainError::Empty => write!(f, "chain is empty"),
        }
    }
}

impl std::error::Error for ChainError {}

/// The ordered signal chain, input to output.
///
/// Position is the index into the instance list. Host instance numbers
/// come from a counter that only moves forward, so a number is never
/// reused within a session no matter how the chain is reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    instances: Vec<EffectInstance>,
    next_num: i32,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&EffectInstance> {
        self.instances.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut EffectInstance> {
        self.instances.get_mut(position)
    }

    pub fn instances(&self) -> &[EffectInstance] {
        &self.instances
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EffectInstance> {
        self.instances.iter()
    }

    /// The number the next appended instance will receive.
    pub fn next_num(&self) -> InstanceNum {
        InstanceNum::new(self.next_num)
    }

    /// Append an instance cloned from a descriptor, assigning the next
    /// host instance number. Returns the assigned number.
    pub fn append(&mut self, desc: &EffectDescriptor, bypass: bool) -> InstanceNum {
        let num = InstanceNum::new(self.next_num);
        self.next_num += 1;
        self.instances
            .push(EffectInstance::new(desc.clone(), num, bypass));
        num
    }

    /// Remove and return the instance at `position`.
    pub fn remove(&mut self, position: usize) -> Result<EffectInstance, ChainError> {
        if position >= self.instances.len() {
            return Err(ChainError::OutOfRange {
                index: position,
                len: self.instances.len(),
            });
        }
        Ok(self.instances.remove(position))
    }

    /// Swap the instances at `position` and `position + 1`.
    pub fn swap_adjacent(&mut self, position: usize) -> Result<(), ChainError> {
        if position + 1 >= self.instances.len() {
            return Err(ChainError::OutOfRange {
                index: position + 1,
                len: self.instances.len(),
            });
        }
        self.instances.swap(position, position + 1);
        Ok(())
    }

    /// Drop every instance but keep the number counter moving forward.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Keep only the first `len` instances. Used when a bulk load stops
    /// early so the model never lists instances the host refused.
    pub fn truncate(&mut self, len: usize) {
        self.instances.truncate(len);
    }

    pub fn names(&self) -> Vec<&str> {
        self.instances.iter().map(|i| i.name()).collect()
    }
}
