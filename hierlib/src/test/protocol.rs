use crate::config::InclusionPolicyConfig::{Inclusive, NonInclusive};
use crate::config::ReplacementPolicyConfig::Lru;
use crate::config::{ConfigError, HierarchyConfig, LevelConfig};
use crate::hierarchy::Hierarchy;
use crate::test::{config, trace, R, W};

#[test]
fn dirty_eviction_writes_back_exactly_once() {
    // L1: 2 direct-mapped sets, so 0x0 and 0x8 collide; L2: 4 sets
    let config = config(4, &[(8, 1), (16, 1)], Lru, NonInclusive);
    let entries = trace(&[(W, 0x0), (W, 0x8)]);
    let mut hierarchy = Hierarchy::new(&config, &entries).unwrap();
    hierarchy.run(&entries);
    let report = hierarchy.report();
    let l1 = &report.caches[0];
    let l2 = &report.caches[1];
    // The second write displaces the dirty block 0x0: one write-back at L1,
    // one write landing at L2 (which still holds the block from the fill)
    assert_eq!(l1.writes, 2);
    assert_eq!(l1.write_misses, 2);
    assert_eq!(l1.write_backs, 1);
    assert_eq!(l2.writes, 1);
    assert_eq!(l2.write_misses, 0);
    assert_eq!(l2.reads, 2);
    assert_eq!(l2.read_misses, 2);
    assert_eq!(report.memory_traffic, 2);
}

#[test]
fn dirty_state_carries_forward_on_refetch() {
    let config = config(4, &[(8, 1), (16, 1)], Lru, NonInclusive);
    let entries = trace(&[(W, 0x0), (W, 0x8), (R, 0x0)]);
    let mut hierarchy = Hierarchy::new(&config, &entries).unwrap();
    hierarchy.run(&entries);
    // Block 0x0 was written back dirty to L2, then refetched by the read; the
    // L1 copy must still be dirty even though the access was a read
    let contents = hierarchy.contents();
    assert_eq!(contents[0].sets[0], vec![(0x0, true)]);
    assert_eq!(contents[1].sets[0], vec![(0x0, true)]);
    let report = hierarchy.report();
    assert_eq!(report.caches[0].write_backs, 2);
    assert_eq!(report.caches[0].read_misses, 1);
}

#[test]
fn inclusive_eviction_invalidates_inner_copies() {
    // L2 is smaller than L1: a single direct-mapped pair of sets, so it
    // evicts constantly while L1 alone never would
    let config = config(4, &[(16, 4), (8, 1)], Lru, Inclusive);
    let entries = trace(&[(R, 0x0), (R, 0x8), (R, 0x0)]);
    let mut hierarchy = Hierarchy::new(&config, &entries).unwrap();
    hierarchy.run(&entries);
    let report = hierarchy.report();
    // L2's eviction of 0x0 removed the L1 copy, so the final read misses in
    // both levels
    assert_eq!(report.caches[0].reads, 3);
    assert_eq!(report.caches[0].read_misses, 3);
    assert_eq!(report.caches[1].read_misses, 3);
    assert_eq!(report.memory_traffic, 3);
}

#[test]
fn non_inclusive_eviction_leaves_inner_levels_alone() {
    let config = config(4, &[(16, 4), (8, 1)], Lru, NonInclusive);
    let entries = trace(&[(R, 0x0), (R, 0x8), (R, 0x0)]);
    let mut hierarchy = Hierarchy::new(&config, &entries).unwrap();
    hierarchy.run(&entries);
    let report = hierarchy.report();
    // Same sequence, but L1 keeps 0x0 through L2's eviction and hits
    assert_eq!(report.caches[0].reads, 3);
    assert_eq!(report.caches[0].read_misses, 2);
    assert_eq!(report.caches[1].read_misses, 2);
    assert_eq!(report.memory_traffic, 2);
}

#[test]
fn invalidation_discards_dirty_inner_copies_without_write_back() {
    let config = config(4, &[(16, 4), (8, 1)], Lru, Inclusive);
    let entries = trace(&[(W, 0x0), (R, 0x8), (R, 0x0)]);
    let mut hierarchy = Hierarchy::new(&config, &entries).unwrap();
    hierarchy.run(&entries);
    let report = hierarchy.report();
    // L2 evicted the clean outer copy of 0x0 and invalidated the dirty L1
    // copy; invalidation never flushes, so no write-back and no memory write
    assert_eq!(report.caches[0].write_backs, 0);
    assert_eq!(report.caches[0].read_misses, 2);
    assert_eq!(report.caches[0].write_misses, 1);
    assert_eq!(report.memory_traffic, 3);
}

#[test]
fn zero_size_levels_are_omitted_but_keep_their_position_names() {
    let config = HierarchyConfig {
        block_size: 4,
        levels: vec![
            LevelConfig { size: 0, assoc: 1, name: None },
            LevelConfig { size: 16, assoc: 1, name: None },
        ],
        replacement_policy: Lru,
        inclusion: NonInclusive,
    };
    let hierarchy = Hierarchy::new(&config, &[]).unwrap();
    assert_eq!(hierarchy.levels().len(), 1);
    assert_eq!(hierarchy.levels()[0].name(), "L2");
}

#[test]
fn invalid_configurations_fail_before_replay() {
    let bad_block = config(6, &[(16, 1)], Lru, NonInclusive);
    assert_eq!(
        Hierarchy::new(&bad_block, &[]).err(),
        Some(ConfigError::BlockSizeNotPowerOfTwo { block_size: 6 })
    );

    let bad_size = config(4, &[(24, 1)], Lru, NonInclusive);
    assert!(matches!(
        Hierarchy::new(&bad_size, &[]).err(),
        Some(ConfigError::SizeNotPowerOfTwo { size: 24, .. })
    ));

    let bad_assoc = config(4, &[(16, 3)], Lru, NonInclusive);
    assert!(matches!(
        Hierarchy::new(&bad_assoc, &[]).err(),
        Some(ConfigError::AssocNotPowerOfTwo { assoc: 3, .. })
    ));

    // 16 bytes cannot hold even one set of 8 blocks of 4 bytes
    let bad_geometry = config(4, &[(16, 8)], Lru, NonInclusive);
    assert!(matches!(
        Hierarchy::new(&bad_geometry, &[]).err(),
        Some(ConfigError::BadGeometry { .. })
    ));

    let empty = config(4, &[(0, 1)], Lru, NonInclusive);
    assert_eq!(Hierarchy::new(&empty, &[]).err(), Some(ConfigError::NoLevels));
}
