use std::collections::HashMap;

use crate::error::AssembleError;

/// Byte-string label name to resolved address. A `HashMap` is a free choice
/// per spec.md §9 — nothing about sizing, hashing, or collision strategy is
/// load-bearing, only the semantics (unique definition, resolvable by the
/// time patching runs).
#[derive(Default)]
pub struct LabelMap {
    defined: HashMap<Vec<u8>, u32>,
}

impl LabelMap {
    pub fn new() -> LabelMap {
        LabelMap {
            defined: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: &[u8], addr: u32, line: usize) -> Result<(), AssembleError> {
        if self.defined.contains_key(name) {
            return Err(AssembleError::DuplicateLabel {
                line,
                label: name.to_vec(),
            });
        }
        self.defined.insert(name.to_vec(), addr);
        Ok(())
    }

    pub fn resolve(&self, name: &[u8], line: usize) -> Result<u32, AssembleError> {
        self.defined
            .get(name)
            .copied()
            .ok_or_else(|| AssembleError::UndefinedLabel {
                line,
                label: name.to_vec(),
            })
    }

    pub fn get(&self, name: &[u8]) -> Option<u32> {
        self.defined.get(name).copied()
    }
}

/// A label reference that could not be resolved at emission time (forward
/// reference); recorded for the patch pass once the whole source has been
/// walked and every label is known.
pub struct PendingLabel {
    pub cell_addr: u32,
    pub label: Vec<u8>,
    pub line: usize,
}
