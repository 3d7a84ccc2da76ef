//! The consistent hash ring for murmur-ring
//!
//! This determines which shard a key lies on.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Included, Unbounded};

pub mod builder;
pub mod store;

pub use builder::{LabelScheme, RingBuilder};

/// The consistent hash ring mapping virtual node positions to shards
///
/// Positions are signed 32 bit hashes ordered as signed integers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ring {
    /// The ring detailing which shard owns each position
    ring: BTreeMap<i32, u32>,
}

impl Ring {
    /// Place a virtual node on the ring
    ///
    /// If this position is already taken the previous owner is replaced.
    ///
    /// # Arguments
    ///
    /// * `position` - The hash of this virtual node
    /// * `shard` - The shard that owns it
    pub(crate) fn insert(&mut self, position: i32, shard: u32) -> Option<u32> {
        self.ring.insert(position, shard)
    }

    /// Get the shard for a position on the ring
    ///
    /// Returns the shard at the first position at or after `hash`, wrapping
    /// around to the lowest position if `hash` is past every position.
    ///
    /// # Arguments
    ///
    /// * `hash` - The position to look for
    #[must_use]
    pub fn find_shard(&self, hash: i32) -> Option<u32> {
        // walk forward from our hash then wrap around to the front
        self.ring
            .range((Included(hash), Unbounded))
            .next()
            .or_else(|| self.ring.range((Unbounded, Excluded(hash))).next())
            .map(|(_, shard)| *shard)
    }

    /// The number of virtual nodes on this ring
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether this ring has no virtual nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Iterate over every position and its shard in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.ring.iter().map(|(position, shard)| (*position, *shard))
    }

    /// Count how many virtual nodes each shard owns
    #[must_use]
    pub fn vnodes_per_shard(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for shard in self.ring.values() {
            *counts.entry(*shard).or_insert(0) += 1;
        }
        counts
    }

    /// The distinct shards this ring routes to
    #[must_use]
    pub fn shards(&self) -> BTreeSet<u32> {
        self.ring.values().copied().collect()
    }
}

impl FromIterator<(i32, u32)> for Ring {
    /// Build a ring from positions, later duplicates replacing earlier ones
    fn from_iter<I: IntoIterator<Item = (i32, u32)>>(iter: I) -> Self {
        Ring {
            ring: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Ring {
        Ring::from_iter([(-100, 0), (0, 1), (250, 2)])
    }

    #[test]
    fn test_empty_ring_has_no_shard() {
        assert_eq!(Ring::default().find_shard(5), None);
        assert!(Ring::default().is_empty());
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        let ring = ring();
        assert_eq!(ring.find_shard(-100), Some(0));
        assert_eq!(ring.find_shard(0), Some(1));
        assert_eq!(ring.find_shard(250), Some(2));
    }

    #[test]
    fn test_walks_to_next_position() {
        let ring = ring();
        assert_eq!(ring.find_shard(i32::MIN), Some(0));
        assert_eq!(ring.find_shard(-99), Some(1));
        assert_eq!(ring.find_shard(1), Some(2));
    }

    #[test]
    fn test_wraps_past_the_largest_position() {
        let ring = ring();
        assert_eq!(ring.find_shard(251), Some(0));
        assert_eq!(ring.find_shard(i32::MAX), Some(0));
    }

    #[test]
    fn test_ordering_is_signed() {
        // a negative position sorts before every positive one
        let ring = Ring::from_iter([(i32::MIN, 3), (i32::MAX, 4)]);
        assert_eq!(ring.iter().next(), Some((i32::MIN, 3)));
        assert_eq!(ring.find_shard(-1), Some(4));
    }

    #[test]
    fn test_later_duplicates_win() {
        let ring = Ring::from_iter([(10, 0), (10, 1)]);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.find_shard(10), Some(1));
    }

    #[test]
    fn test_vnode_and_shard_counts() {
        let ring = Ring::from_iter([(1, 0), (2, 0), (3, 2)]);
        let counts = ring.vnodes_per_shard();
        assert_eq!(counts.get(&0), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(ring.shards(), BTreeSet::from([0, 2]));
    }
}
