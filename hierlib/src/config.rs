use std::error::Error;
use std::fmt;

use serde::Deserialize;

/// A hierarchy configuration, usually resulting from parsing JSON
///
/// Levels are listed processor-side first. A level with size 0 is treated as
/// absent and omitted from the built hierarchy.
#[derive(Debug, Deserialize)]
pub struct HierarchyConfig {
    pub block_size: u32,
    pub levels: Vec<LevelConfig>,
    #[serde(default)]
    pub replacement_policy: ReplacementPolicyConfig,
    #[serde(default)]
    pub inclusion: InclusionPolicyConfig,
}

/// A configuration for a single cache level
#[derive(Debug, Deserialize)]
pub struct LevelConfig {
    pub size: u32,
    pub assoc: u32,
    pub name: Option<String>,
}

/// The replacement policy - lru, fifo, or optimal. Defaults to lru.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(alias = "lru")]
    Lru,
    #[serde(alias = "fifo")]
    Fifo,
    #[serde(alias = "optimal")]
    Optimal,
}

impl Default for ReplacementPolicyConfig {
    fn default() -> Self {
        ReplacementPolicyConfig::Lru
    }
}

impl fmt::Display for ReplacementPolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicyConfig::Lru => write!(f, "LRU"),
            ReplacementPolicyConfig::Fifo => write!(f, "FIFO"),
            ReplacementPolicyConfig::Optimal => write!(f, "Optimal"),
        }
    }
}

/// The inclusion policy between adjacent levels. Defaults to non-inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum InclusionPolicyConfig {
    #[serde(alias = "non-inclusive", alias = "noninclusive")]
    NonInclusive,
    #[serde(alias = "inclusive")]
    Inclusive,
}

impl Default for InclusionPolicyConfig {
    fn default() -> Self {
        InclusionPolicyConfig::NonInclusive
    }
}

impl fmt::Display for InclusionPolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InclusionPolicyConfig::NonInclusive => write!(f, "non-inclusive"),
            InclusionPolicyConfig::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// A configuration the hierarchy refuses to build
///
/// All of these are fatal before any replay starts; the simulation never
/// fails mid-run over its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    BlockSizeNotPowerOfTwo { block_size: u32 },
    SizeNotPowerOfTwo { level: String, size: u32 },
    AssocNotPowerOfTwo { level: String, assoc: u32 },
    BadGeometry { level: String, size: u32, block_size: u32, assoc: u32 },
    NoLevels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BlockSizeNotPowerOfTwo { block_size } => {
                write!(f, "block size {block_size} is not a positive power of two")
            }
            ConfigError::SizeNotPowerOfTwo { level, size } => {
                write!(f, "{level} size {size} is not a positive power of two")
            }
            ConfigError::AssocNotPowerOfTwo { level, assoc } => {
                write!(f, "{level} associativity {assoc} is not a positive power of two")
            }
            ConfigError::BadGeometry {
                level,
                size,
                block_size,
                assoc,
            } => {
                write!(
                    f,
                    "{level} size {size} does not hold a whole number of sets of {assoc} blocks of {block_size} bytes"
                )
            }
            ConfigError::NoLevels => {
                write!(f, "the configuration contains no level with a non-zero size")
            }
        }
    }
}

impl Error for ConfigError {}
