mod protocol;

use crate::config::{HierarchyConfig, InclusionPolicyConfig, LevelConfig, ReplacementPolicyConfig};
use crate::trace::{AccessKind, TraceEntry};

/// Builds a configuration from (size, assoc) pairs, levels processor-side
/// first
pub fn config(
    block_size: u32,
    levels: &[(u32, u32)],
    policy: ReplacementPolicyConfig,
    inclusion: InclusionPolicyConfig,
) -> HierarchyConfig {
    HierarchyConfig {
        block_size,
        levels: levels
            .iter()
            .map(|&(size, assoc)| LevelConfig {
                size,
                assoc,
                name: None,
            })
            .collect(),
        replacement_policy: policy,
        inclusion,
    }
}

/// Builds a trace from (kind, address) shorthand
pub fn trace(entries: &[(AccessKind, u32)]) -> Vec<TraceEntry> {
    entries
        .iter()
        .map(|&(kind, address)| TraceEntry { kind, address })
        .collect()
}

pub const R: AccessKind = AccessKind::Read;
pub const W: AccessKind = AccessKind::Write;
