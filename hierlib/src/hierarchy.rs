use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::{CacheLevel, Line, MainMemory};
use crate::config::{ConfigError, HierarchyConfig, InclusionPolicyConfig};
use crate::observer::{AccessObserver, NullObserver};
use crate::trace::{AccessKind, TraceEntry};

/// An ordered chain of cache levels terminated by main memory
///
/// The hierarchy owns every level and addresses them by index; level 0 is the
/// innermost (processor-side) cache and `levels.len()` stands for main
/// memory. All cross-level behaviour - miss recursion, write-backs on dirty
/// eviction, inclusion cascades - is driven here, so no level holds a pointer
/// to its neighbours.
///
/// It supports calling run multiple times, and will update the time taken to
/// simulate and the statistics accordingly
pub struct Hierarchy {
    levels: Vec<CacheLevel>,
    memory: MainMemory,
    inclusion: InclusionPolicyConfig,
    observer: Box<dyn AccessObserver>,
    simulation_time: Duration,
    replayed: usize,
}

/// The result of a hierarchy simulation. Can be serialised to the output
/// format.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HierarchyReport {
    pub caches: Vec<LevelReport>,
    pub memory_traffic: u64,
}

/// The result for an individual level
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelReport {
    pub name: String,
    pub reads: u64,
    pub read_misses: u64,
    pub writes: u64,
    pub write_misses: u64,
    pub write_backs: u64,
    pub miss_rate: f64,
}

/// The final resident blocks of one level, set by set, with dirty flags
pub struct LevelContents {
    pub name: String,
    pub sets: Vec<Vec<(u32, bool)>>,
}

impl Hierarchy {
    /// Builds a hierarchy from a configuration, with no event output
    ///
    /// One level is built per non-zero-size entry, in order, named from the
    /// configuration or `L1`, `L2`, ... when unnamed. For the optimal policy
    /// the trace is consulted to precompute each level's per-set lookahead
    /// lists, which is why construction already needs the trace.
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing
    /// JSON
    /// * `trace`: The full input trace
    ///
    /// returns: Result<Hierarchy, ConfigError>
    pub fn new(config: &HierarchyConfig, trace: &[TraceEntry]) -> Result<Self, ConfigError> {
        Self::with_observer(config, trace, Box::new(NullObserver))
    }

    /// Builds a hierarchy whose events are reported to the given observer
    pub fn with_observer(
        config: &HierarchyConfig,
        trace: &[TraceEntry],
        observer: Box<dyn AccessObserver>,
    ) -> Result<Self, ConfigError> {
        if !config.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo {
                block_size: config.block_size,
            });
        }
        let mut levels = Vec::new();
        for (position, level) in config.levels.iter().enumerate().filter(|(_, level)| level.size > 0) {
            let name = match &level.name {
                Some(name) => name.clone(),
                None => format!("L{}", position + 1),
            };
            levels.push(CacheLevel::new(
                name,
                config.block_size,
                level.size,
                level.assoc,
                config.replacement_policy,
                trace,
            )?);
        }
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        Ok(Self {
            levels,
            memory: MainMemory::new(config.block_size),
            inclusion: config.inclusion,
            observer,
            simulation_time: Duration::new(0, 0),
            replayed: 0,
        })
    }

    /// Replays a trace, strictly in order
    ///
    /// Fully deterministic given the trace and the configuration. Statistics
    /// accumulate across calls.
    pub fn run(&mut self, trace: &[TraceEntry]) {
        let start = Instant::now();
        for entry in trace {
            let position = self.replayed;
            match entry.kind {
                AccessKind::Read => {
                    self.read_at(0, entry.address, position);
                }
                AccessKind::Write => self.write_at(0, entry.address, position),
            }
            self.replayed += 1;
        }
        self.simulation_time += start.elapsed();
    }

    /// Serves a read at the given level, recursing outward on a miss
    ///
    /// Returns an owned copy of the resident line. A fetched block that was
    /// dirty in the outer level stays dirty in the local copy.
    fn read_at(&mut self, idx: usize, raw: u32, position: usize) -> Line {
        if idx == self.levels.len() {
            return self.memory.read(raw);
        }
        match self.levels[idx].access(raw, AccessKind::Read, self.observer.as_mut()) {
            Some(line) => line,
            None => {
                let fetched = self.read_at(idx + 1, raw, position);
                self.fill_at(idx, raw, fetched.is_dirty(), position)
            }
        }
    }

    /// Serves a write at the given level
    ///
    /// A miss write-allocates: the block is fetched from the next level and
    /// installed locally, dirty
    fn write_at(&mut self, idx: usize, raw: u32, position: usize) {
        if idx == self.levels.len() {
            self.memory.write(raw);
            return;
        }
        match self.levels[idx].access(raw, AccessKind::Write, self.observer.as_mut()) {
            Some(_) => {}
            None => {
                self.read_at(idx + 1, raw, position);
                self.fill_at(idx, raw, true, position);
            }
        }
    }

    /// Installs a block at the given level and resolves the eviction it may
    /// cause
    ///
    /// The order is fixed: install and select the victim, write the victim
    /// back to the next level if it was dirty, then (under the inclusive
    /// policy) invalidate the victim's block in every inner level so no block
    /// survives inside without a copy out here
    fn fill_at(&mut self, idx: usize, raw: u32, dirty: bool, position: usize) -> Line {
        let (line, victim) = self.levels[idx].install(raw, dirty, position, self.observer.as_mut());
        if let Some(victim) = victim {
            if victim.dirty {
                self.levels[idx].record_write_back();
                self.write_at(idx + 1, victim.block, position);
            }
            if self.inclusion == InclusionPolicyConfig::Inclusive {
                for inner in (0..idx).rev() {
                    self.levels[inner].invalidate(victim.block);
                }
            }
        }
        line
    }

    /// Gets the wall-clock execution time for replay
    pub fn simulation_time(&self) -> &Duration {
        &self.simulation_time
    }

    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Summarises the simulation: per-level counters plus the total traffic
    /// that reached main memory
    pub fn report(&self) -> HierarchyReport {
        HierarchyReport {
            caches: self
                .levels
                .iter()
                .map(|level| {
                    let stats = level.stats();
                    LevelReport {
                        name: level.name().to_string(),
                        reads: stats.reads,
                        read_misses: stats.read_misses,
                        writes: stats.writes,
                        write_misses: stats.write_misses,
                        write_backs: stats.write_backs,
                        miss_rate: level.miss_rate(),
                    }
                })
                .collect(),
            memory_traffic: self.memory.traffic(),
        }
    }

    /// The final resident blocks of every level, for the contents dump
    pub fn contents(&self) -> Vec<LevelContents> {
        self.levels
            .iter()
            .map(|level| LevelContents {
                name: level.name().to_string(),
                sets: level.contents(),
            })
            .collect()
    }
}
