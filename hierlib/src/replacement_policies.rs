use std::collections::VecDeque;

use crate::cache::Line;

/// A generic trait for implementing new replacement policies. Each set holds
/// one policy state value, dispatched through this trait.
///
/// The trait methods take way (slot) indices local to the owning set
pub trait ReplacementPolicy {
    /// Updates the policy when a resident line is hit
    ///
    /// Not applicable for some policies, a default which does nothing is
    /// provided
    fn on_touch(&mut self, _way: usize) {}

    /// Updates the policy when a previously free way is filled
    fn on_fill(&mut self, _way: usize) {}

    /// Updates the policy when a resident way is invalidated
    fn on_invalidate(&mut self, _way: usize) {}

    /// Selects the way to evict. Only called when the set is full.
    ///
    /// Implementations should assume that when this method returns, the
    /// chosen way is immediately overwritten with the incoming block, and
    /// must perform their own refill bookkeeping for it
    ///
    /// # Arguments
    ///
    /// * `lines`: The set's lines, indexed by way
    /// * `position`: The index of the current entry in the input trace
    ///
    /// returns: usize
    fn select_victim(&mut self, lines: &[Line], position: usize) -> usize;
}

/// First-in first-out replacement
///
/// The queue holds the ways of resident lines in insertion order, so the
/// front is always the earliest-inserted still-resident line. On eviction the
/// replaced way is re-enqueued at the back; on invalidation the vacated way
/// leaves the queue and rejoins it when refilled.
pub struct FifoState {
    order: VecDeque<usize>,
}

impl FifoState {
    pub fn new(assoc: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(assoc),
        }
    }
}

impl ReplacementPolicy for FifoState {
    fn on_fill(&mut self, way: usize) {
        self.order.push_back(way);
    }

    fn on_invalidate(&mut self, way: usize) {
        self.order.retain(|&w| w != way);
    }

    fn select_victim(&mut self, lines: &[Line], _position: usize) -> usize {
        debug_assert_eq!(self.order.len(), lines.len(), "FIFO queue out of sync with residency");
        let way = self.order.pop_front().expect("victim requested for an empty set");
        self.order.push_back(way);
        way
    }
}

/// Least recently used replacement
///
/// Each way carries the value of a monotonically increasing logical clock at
/// its last use. Tracking the clock means we already know the stamp a line
/// should get, saving comparisons when refreshing on a hit.
pub struct LruState {
    stamps: Vec<u64>,
    clock: u64,
}

impl LruState {
    pub fn new(assoc: usize) -> Self {
        Self {
            stamps: vec![0; assoc],
            clock: 0,
        }
    }

    fn stamp(&mut self, way: usize) {
        self.stamps[way] = self.clock;
        self.clock += 1;
    }
}

impl ReplacementPolicy for LruState {
    fn on_touch(&mut self, way: usize) {
        self.stamp(way);
    }

    fn on_fill(&mut self, way: usize) {
        self.stamp(way);
    }

    fn select_victim(&mut self, lines: &[Line], _position: usize) -> usize {
        // Smallest stamp wins, ties to the lowest way
        let mut victim = 0;
        let mut min_stamp = u64::MAX;
        for (way, &stamp) in self.stamps.iter().enumerate().take(lines.len()) {
            if stamp < min_stamp {
                min_stamp = stamp;
                victim = way;
            }
        }
        self.stamp(victim);
        victim
    }
}

/// One upcoming access to a set: where it sits in the whole input trace, and
/// the block it touches
struct FutureRef {
    position: usize,
    block: u32,
}

/// Lookahead-optimal (Belady) replacement
///
/// `future` is this set's slice of the whole input trace, as block
/// identities paired with their trace positions, computed once at level
/// construction. `start` marks the first entry the replay has not yet moved
/// past; victim scans begin there, never in already-replayed history, and
/// the pointer only ever moves forward as the replay position advances.
pub struct OptimalState {
    future: Vec<FutureRef>,
    start: usize,
}

impl OptimalState {
    pub fn new() -> Self {
        Self {
            future: Vec::new(),
            start: 0,
        }
    }

    /// Appends one upcoming block identity with its trace position. Used
    /// while precomputing the per-set trace, before any replay.
    pub fn push_future(&mut self, position: usize, block: u32) {
        debug_assert!(
            self.future.last().map_or(true, |last| last.position < position),
            "future trace positions must be strictly increasing"
        );
        self.future.push(FutureRef { position, block });
    }
}

impl Default for OptimalState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for OptimalState {
    fn select_victim(&mut self, lines: &[Line], position: usize) -> usize {
        // Re-sync to the replay position: everything before it has already
        // happened and must not influence the decision. `position` is
        // monotone across calls, so the pointer advances amortised-linearly
        // over the whole trace.
        while self.start < self.future.len() && self.future[self.start].position < position {
            self.start += 1;
        }
        // Every resident way starts "unused"; each future access that matches
        // a still-unused way's block removes it. The last way standing is
        // either reused furthest in the future or never reused.
        let mut unused: Vec<usize> = (0..lines.len()).collect();
        let mut scan = self.start;
        while scan < self.future.len() && unused.len() > 1 {
            let block = self.future[scan].block;
            if let Some(pos) = unused.iter().position(|&way| lines[way].block() == block) {
                unused.remove(pos);
            }
            scan += 1;
        }
        // Trace exhausted with several candidates left: tie, lowest way wins.
        // `unused` stays in ascending way order so the front is the answer
        // either way.
        *unused.first().expect("victim requested for an empty set")
    }
}

/// Closed variant over the provided policy states
///
/// Using trait objects here would mean a virtual dispatch per access, which
/// is opaque to the compiler. Branching on a closed enum lets it see the
/// concrete types and inline the policy bookkeeping into the set operations.
pub enum PolicyState {
    Fifo(FifoState),
    Lru(LruState),
    Optimal(OptimalState),
}

impl ReplacementPolicy for PolicyState {
    fn on_touch(&mut self, way: usize) {
        match self {
            PolicyState::Fifo(p) => p.on_touch(way),
            PolicyState::Lru(p) => p.on_touch(way),
            PolicyState::Optimal(p) => p.on_touch(way),
        }
    }

    fn on_fill(&mut self, way: usize) {
        match self {
            PolicyState::Fifo(p) => p.on_fill(way),
            PolicyState::Lru(p) => p.on_fill(way),
            PolicyState::Optimal(p) => p.on_fill(way),
        }
    }

    fn on_invalidate(&mut self, way: usize) {
        match self {
            PolicyState::Fifo(p) => p.on_invalidate(way),
            PolicyState::Lru(p) => p.on_invalidate(way),
            PolicyState::Optimal(p) => p.on_invalidate(way),
        }
    }

    fn select_victim(&mut self, lines: &[Line], position: usize) -> usize {
        match self {
            PolicyState::Fifo(p) => p.select_victim(lines, position),
            PolicyState::Lru(p) => p.select_victim(lines, position),
            PolicyState::Optimal(p) => p.select_victim(lines, position),
        }
    }
}
