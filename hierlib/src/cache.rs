use crate::address::Address;
use crate::config::{ConfigError, ReplacementPolicyConfig};
use crate::observer::AccessObserver;
use crate::replacement_policies::{FifoState, LruState, OptimalState, PolicyState, ReplacementPolicy};
use crate::trace::{AccessKind, TraceEntry};

/// One storage slot within a set, holding the metadata of at most one block
///
/// Vacated lines are cleared, not destroyed; a line lives for the whole
/// simulation and is exclusively owned by its set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    occupied: bool,
    dirty: bool,
    tag: u32,
    block: u32,
}

impl Line {
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Installs a block into this line. The line starts clean.
    pub fn occupy(&mut self, tag: u32, block: u32) {
        self.occupied = true;
        self.dirty = false;
        self.tag = tag;
        self.block = block;
    }

    pub fn vacate(&mut self) {
        *self = Self::default();
    }
}

/// The prior contents of a line displaced by an eviction, captured before the
/// incoming block overwrites it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    pub block: u32,
    pub dirty: bool,
}

/// A fixed-capacity collection of lines sharing one set index, plus the
/// bookkeeping the active replacement policy needs
pub struct Set {
    lines: Vec<Line>,
    policy: PolicyState,
}

impl Set {
    fn new(assoc: usize, kind: ReplacementPolicyConfig) -> Self {
        let policy = match kind {
            ReplacementPolicyConfig::Fifo => PolicyState::Fifo(FifoState::new(assoc)),
            ReplacementPolicyConfig::Lru => PolicyState::Lru(LruState::new(assoc)),
            ReplacementPolicyConfig::Optimal => PolicyState::Optimal(OptimalState::new()),
        };
        Self {
            lines: vec![Line::default(); assoc],
            policy,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Finds the occupied line holding the address's tag, if any
    pub fn search(&self, addr: &Address) -> Option<usize> {
        let mut hit = None;
        for (way, line) in self.lines.iter().enumerate() {
            if line.occupied && line.tag == addr.tag {
                debug_assert!(
                    hit.is_none(),
                    "duplicate resident tag {:#x} in set {}",
                    addr.tag,
                    addr.set_index
                );
                if hit.is_none() {
                    hit = Some(way);
                }
            }
        }
        hit
    }

    fn first_free(&self) -> Option<usize> {
        self.lines.iter().position(|line| !line.occupied)
    }

    /// Installs a block, evicting per the active policy if the set is full
    ///
    /// The victim's block identity and dirty state are captured before the
    /// overwrite so the caller can decide on a write-back
    ///
    /// # Arguments
    ///
    /// * `addr`: The decoded address of the incoming block
    /// * `dirty`: Whether the installed line starts dirty
    /// * `position`: The index of the current entry in the input trace
    ///
    /// returns: (usize, Option<Victim>), the filled way and the victim if one
    /// was displaced
    pub fn install(&mut self, addr: &Address, dirty: bool, position: usize) -> (usize, Option<Victim>) {
        let (way, victim) = match self.first_free() {
            Some(way) => {
                self.policy.on_fill(way);
                (way, None)
            }
            None => {
                let way = self.policy.select_victim(&self.lines, position);
                let displaced = &self.lines[way];
                debug_assert!(displaced.occupied, "selected victim in an unoccupied way");
                let victim = Victim {
                    block: displaced.block,
                    dirty: displaced.dirty,
                };
                (way, Some(victim))
            }
        };
        self.lines[way].occupy(addr.tag, addr.block);
        if dirty {
            self.lines[way].mark_dirty();
        }
        (way, victim)
    }

    /// Refreshes policy bookkeeping for a hit on the given way
    pub fn touch(&mut self, way: usize) {
        self.policy.on_touch(way);
    }

    pub fn mark_dirty(&mut self, way: usize) {
        self.lines[way].mark_dirty();
    }

    pub fn line(&self, way: usize) -> Line {
        self.lines[way]
    }

    /// Vacates the line matching the address, if resident. No write-back;
    /// invalidation means the block no longer needs to live here, not that
    /// its data must be flushed.
    pub fn invalidate(&mut self, addr: &Address) -> bool {
        match self.search(addr) {
            Some(way) => {
                self.lines[way].vacate();
                self.policy.on_invalidate(way);
                true
            }
            None => false,
        }
    }

    fn push_future(&mut self, position: usize, block: u32) {
        if let PolicyState::Optimal(state) = &mut self.policy {
            state.push_future(position, block);
        }
    }
}

/// Per-level access statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub reads: u64,
    pub read_misses: u64,
    pub writes: u64,
    pub write_misses: u64,
    pub write_backs: u64,
    pub accesses: u64,
}

/// One level of the hierarchy: a geometry, its sets, and its statistics
///
/// A level only serves local hits and installs; the recursion into
/// neighbouring levels on misses, write-backs, and inclusion cascades is
/// driven by the hierarchy, so levels stay independently testable
pub struct CacheLevel {
    name: String,
    block_size: u32,
    size: u32,
    assoc: u32,
    num_sets: u32,
    sets: Vec<Set>,
    stats: LevelStats,
}

impl CacheLevel {
    /// Creates a cache level, refusing invalid geometry
    ///
    /// Sizes, associativity, and block size must be positive powers of two
    /// and `size / (block_size * assoc)` must be a whole number of sets. For
    /// the optimal policy the whole input trace is decoded under this
    /// geometry to precompute each set's future-access list.
    ///
    /// # Arguments
    ///
    /// * `name`: The level's display name, e.g. "L1"
    /// * `block_size`: Block size in bytes
    /// * `size`: Total capacity in bytes
    /// * `assoc`: Lines per set
    /// * `policy`: The replacement policy for every set of this level
    /// * `trace`: The full input trace, only consulted for the optimal policy
    ///
    /// returns: Result<CacheLevel, ConfigError>
    pub fn new(
        name: impl Into<String>,
        block_size: u32,
        size: u32,
        assoc: u32,
        policy: ReplacementPolicyConfig,
        trace: &[TraceEntry],
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if !block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo { block_size });
        }
        if !size.is_power_of_two() {
            return Err(ConfigError::SizeNotPowerOfTwo { level: name, size });
        }
        if !assoc.is_power_of_two() {
            return Err(ConfigError::AssocNotPowerOfTwo { level: name, assoc });
        }
        let line_bytes = block_size * assoc;
        if size % line_bytes != 0 || size / line_bytes == 0 {
            return Err(ConfigError::BadGeometry {
                level: name,
                size,
                block_size,
                assoc,
            });
        }
        let num_sets = size / line_bytes;
        let mut sets: Vec<Set> = (0..num_sets).map(|_| Set::new(assoc as usize, policy)).collect();
        if let ReplacementPolicyConfig::Optimal = policy {
            for (position, entry) in trace.iter().enumerate() {
                let addr = Address::decode(entry.address, block_size, num_sets);
                sets[addr.set_index as usize].push_future(position, addr.block);
            }
        }
        Ok(Self {
            name,
            block_size,
            size,
            assoc,
            num_sets,
            sets,
            stats: LevelStats::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn assoc(&self) -> u32 {
        self.assoc
    }

    pub fn num_sets(&self) -> u32 {
        self.num_sets
    }

    pub fn stats(&self) -> &LevelStats {
        &self.stats
    }

    pub fn decode(&self, raw: u32) -> Address {
        Address::decode(raw, self.block_size, self.num_sets)
    }

    /// Serves one logical access locally
    ///
    /// Counts the access and the read/write, then searches the owning set.
    /// A hit refreshes policy bookkeeping (and marks the line dirty for a
    /// write) and returns an owned copy of the line; a miss counts the
    /// read/write miss and returns None, leaving the fill to the caller.
    pub fn access(
        &mut self,
        raw: u32,
        kind: AccessKind,
        observer: &mut dyn AccessObserver,
    ) -> Option<Line> {
        let addr = self.decode(raw);
        self.stats.accesses += 1;
        match kind {
            AccessKind::Read => self.stats.reads += 1,
            AccessKind::Write => self.stats.writes += 1,
        }
        observer.on_access(&self.name, kind, &addr);
        let set = &mut self.sets[addr.set_index as usize];
        match set.search(&addr) {
            Some(way) => {
                observer.on_hit(&self.name);
                set.touch(way);
                if kind == AccessKind::Write {
                    set.mark_dirty(way);
                    observer.on_dirty(&self.name);
                }
                Some(set.line(way))
            }
            None => {
                observer.on_miss(&self.name);
                match kind {
                    AccessKind::Read => self.stats.read_misses += 1,
                    AccessKind::Write => self.stats.write_misses += 1,
                }
                None
            }
        }
    }

    /// Installs a block without counting a logical access. Used for fills.
    ///
    /// `position` is the index of the trace entry being replayed; the
    /// optimal policy scans its lookahead list from there
    pub fn install(
        &mut self,
        raw: u32,
        dirty: bool,
        position: usize,
        observer: &mut dyn AccessObserver,
    ) -> (Line, Option<Victim>) {
        let addr = self.decode(raw);
        let set = &mut self.sets[addr.set_index as usize];
        let (way, victim) = set.install(&addr, dirty, position);
        observer.on_victim(&self.name, victim.as_ref());
        (set.line(way), victim)
    }

    /// Vacates the line holding the address's block, if resident
    pub fn invalidate(&mut self, raw: u32) -> bool {
        let addr = self.decode(raw);
        self.sets[addr.set_index as usize].invalidate(&addr)
    }

    pub fn record_write_back(&mut self) {
        self.stats.write_backs += 1;
    }

    /// Fraction of accesses that missed, 0 before any access
    pub fn miss_rate(&self) -> f64 {
        if self.stats.accesses == 0 {
            return 0.0;
        }
        (self.stats.read_misses + self.stats.write_misses) as f64 / self.stats.accesses as f64
    }

    /// The resident blocks of each set with their dirty flags, for the final
    /// contents dump
    pub fn contents(&self) -> Vec<Vec<(u32, bool)>> {
        self.sets
            .iter()
            .map(|set| {
                set.lines()
                    .iter()
                    .filter(|line| line.is_occupied())
                    .map(|line| (line.block(), line.is_dirty()))
                    .collect()
            })
            .collect()
    }
}

/// The terminal pseudo-level. Infinite and exact: reads always hit with a
/// fresh clean block, writes always land, nothing is ever evicted.
pub struct MainMemory {
    block_size: u32,
    reads: u64,
    writes: u64,
}

impl MainMemory {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size,
            reads: 0,
            writes: 0,
        }
    }

    /// Materialises the block holding the address
    pub fn read(&mut self, raw: u32) -> Line {
        self.reads += 1;
        let block = Address::block_of(raw, self.block_size);
        let mut line = Line::default();
        line.occupy(block >> self.block_size.trailing_zeros(), block);
        line
    }

    pub fn write(&mut self, _raw: u32) {
        self.writes += 1;
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Total accesses reaching main memory
    pub fn traffic(&self) -> u64 {
        self.reads + self.writes
    }
}
