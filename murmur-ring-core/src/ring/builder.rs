//! Builds a ring from scratch by hashing weighted virtual nodes

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::Ring;
use crate::hash::Murmur3;
use crate::weights::Weights;

/// The default number of virtual nodes per unit of shard weight
pub const DEFAULT_VIRTUAL_BUCKET_TIMES: u32 = 160;

/// How virtual node labels are generated
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelScheme {
    /// Every label is `SHARD-{shard}-NODE-{node}`
    #[default]
    Canonical,
    /// Each label extends the previous one for the same shard
    ///
    /// This yields `SHARD-0-NODE-0`, `SHARD-0-NODE-0-NODE-1`, and so on, which
    /// is what rings built by the legacy JVM partitioner used.
    Chained,
}

impl LabelScheme {
    /// Generate each label for a single shards virtual nodes in order
    ///
    /// Labels are handed to `visit` one at a time and only a single label
    /// buffer is ever held.
    ///
    /// # Arguments
    ///
    /// * `shard` - The shard to generate labels for
    /// * `count` - The number of virtual nodes this shard gets
    /// * `visit` - Called with each label
    pub(crate) fn for_each_label<F: FnMut(&str)>(self, shard: u32, count: u64, mut visit: F) {
        let mut label = String::new();
        for node in 0..count {
            match self {
                LabelScheme::Canonical => {
                    label.clear();
                    let _ = write!(label, "SHARD-{shard}-NODE-{node}");
                }
                LabelScheme::Chained => {
                    // keep growing a single label for this shard
                    if node == 0 {
                        let _ = write!(label, "SHARD-{shard}");
                    }
                    let _ = write!(label, "-NODE-{node}");
                }
            }
            visit(&label);
        }
    }
}

/// Builds a [`Ring`] from the ring parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingBuilder {
    /// The hasher to place virtual nodes with
    hasher: Murmur3,
    /// The number of shards to place
    shards: u32,
    /// The virtual nodes per unit of weight
    multiplier: u32,
    /// How to label virtual nodes
    scheme: LabelScheme,
}

impl RingBuilder {
    /// Create a new ring builder
    ///
    /// # Arguments
    ///
    /// * `seed` - The murmur seed to hash virtual nodes with
    /// * `shards` - The number of shards to place on the ring
    /// * `multiplier` - The number of virtual nodes per unit of weight
    #[must_use]
    pub fn new(seed: i32, shards: u32, multiplier: u32) -> Self {
        RingBuilder {
            hasher: Murmur3::new(seed),
            shards,
            multiplier,
            scheme: LabelScheme::default(),
        }
    }

    /// Set how virtual nodes are labeled
    ///
    /// # Arguments
    ///
    /// * `scheme` - The label scheme to use
    #[must_use]
    pub fn label_scheme(mut self, scheme: LabelScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Build a ring
    ///
    /// Shards are placed in ascending order and each shards virtual nodes in
    /// ascending order. If two labels hash to the same position the one
    /// placed later owns it.
    ///
    /// # Arguments
    ///
    /// * `weights` - The weight of each shard
    #[instrument(
        name = "RingBuilder::build",
        skip_all,
        fields(shards = self.shards, multiplier = self.multiplier, scheme = ?self.scheme)
    )]
    #[must_use]
    pub fn build(&self, weights: &Weights) -> Ring {
        let mut ring = Ring::default();
        // track how many virtual nodes got overwritten
        let mut collisions = 0usize;
        for shard in 0..self.shards {
            // get the number of virtual nodes this shard gets
            let vnodes = u64::from(self.multiplier) * u64::from(weights.get(shard));
            self.scheme.for_each_label(shard, vnodes, |label| {
                // hash this label onto the ring
                let position = self.hasher.hash_chars(label);
                if let Some(previous) = ring.insert(position, shard) {
                    debug!(position, previous, shard, "virtual node collision");
                    collisions += 1;
                }
            });
        }
        debug!(vnodes = ring.len(), collisions, "built ring");
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect the labels a scheme generates for a shard
    fn labels(scheme: LabelScheme, shard: u32, count: u64) -> Vec<String> {
        let mut labels = Vec::new();
        scheme.for_each_label(shard, count, |label| labels.push(label.to_owned()));
        labels
    }

    #[test]
    fn test_deterministic_build() {
        let weights = Weights::from_iter([(2, 3)]);
        let first = RingBuilder::new(0, 4, 160).build(&weights);
        let second = RingBuilder::new(0, 4, 160).build(&weights);
        assert_eq!(first, second);
        assert!(first.iter().eq(second.iter()));
    }

    #[test]
    fn test_matches_reference_positions() {
        // positions computed independently for seed 0, 3 shards, 4 nodes each
        let ring = RingBuilder::new(0, 3, 4).build(&Weights::default());
        let expected = vec![
            (-1_711_177_021, 0),
            (-1_682_694_392, 1),
            (-1_506_812_115, 2),
            (-1_480_950_290, 2),
            (-880_637_439, 1),
            (-72_006_758, 0),
            (-33_802_706, 2),
            (333_513_817, 2),
            (1_520_276_335, 1),
            (1_570_025_557, 0),
            (1_745_988_202, 0),
            (2_090_114_717, 1),
        ];
        assert_eq!(ring.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_vnode_count_follows_weight() {
        let weights = Weights::from_iter([(1, 3)]);
        let ring = RingBuilder::new(0, 3, 8).build(&weights);
        let counts = ring.vnodes_per_shard();
        assert_eq!(ring.len(), 40);
        assert_eq!(counts.get(&0), Some(&8));
        assert_eq!(counts.get(&1), Some(&24));
        assert_eq!(counts.get(&2), Some(&8));
    }

    #[test]
    fn test_invalid_weight_counts_as_one() {
        let weights = Weights::from_iter([(0, 0), (1, -7)]);
        let ring = RingBuilder::new(0, 2, 8).build(&weights);
        let counts = ring.vnodes_per_shard();
        assert_eq!(counts.get(&0), Some(&8));
        assert_eq!(counts.get(&1), Some(&8));
    }

    #[test]
    fn test_zero_shards_or_multiplier_is_empty() {
        assert!(RingBuilder::new(0, 0, 160)
            .build(&Weights::default())
            .is_empty());
        let weights = Weights::from_iter([(0, 5)]);
        assert!(RingBuilder::new(0, 3, 0).build(&weights).is_empty());
    }

    #[test]
    fn test_collisions_are_won_by_the_later_shard() {
        // SHARD-11-NODE-1974 and SHARD-75-NODE-499 share a position under seed 0
        let weights = Weights::from_iter([(11, 2000), (75, 2000)]);
        let ring = RingBuilder::new(0, 76, 1).build(&weights);
        assert_eq!(ring.len(), 4073);
        assert_eq!(ring.find_shard(-1_813_722_333), Some(75));
        let counts = ring.vnodes_per_shard();
        assert_eq!(counts.get(&11), Some(&1999));
        assert_eq!(counts.get(&75), Some(&2000));
    }

    #[test]
    fn test_seed_changes_the_ring() {
        let weights = Weights::default();
        let zero = RingBuilder::new(0, 3, 16).build(&weights);
        let other = RingBuilder::new(99, 3, 16).build(&weights);
        assert_ne!(zero, other);
    }

    #[test]
    fn test_canonical_labels() {
        let labels = labels(LabelScheme::Canonical, 4, 3);
        assert_eq!(
            labels,
            vec!["SHARD-4-NODE-0", "SHARD-4-NODE-1", "SHARD-4-NODE-2"]
        );
    }

    #[test]
    fn test_chained_labels_extend_each_other() {
        let labels = labels(LabelScheme::Chained, 0, 3);
        assert_eq!(
            labels,
            vec![
                "SHARD-0-NODE-0",
                "SHARD-0-NODE-0-NODE-1",
                "SHARD-0-NODE-0-NODE-1-NODE-2",
            ]
        );
    }

    #[test]
    fn test_chained_scheme_shares_only_first_positions() {
        let weights = Weights::default();
        let canonical = RingBuilder::new(0, 2, 4).build(&weights);
        let chained = RingBuilder::new(0, 2, 4)
            .label_scheme(LabelScheme::Chained)
            .build(&weights);
        assert_eq!(chained.len(), 8);
        // the first label of every shard is the same in both schemes
        let hasher = Murmur3::new(0);
        for shard in 0..2 {
            let position = hasher.hash_chars(&format!("SHARD-{shard}-NODE-0"));
            assert_eq!(canonical.find_shard(position), Some(shard));
            assert_eq!(chained.find_shard(position), Some(shard));
        }
        assert_ne!(canonical, chained);
    }

    #[test]
    fn test_chained_matches_reference_positions() {
        // positions computed independently for seed 0, 2 shards, 4 chained nodes each
        let ring = RingBuilder::new(0, 2, 4)
            .label_scheme(LabelScheme::Chained)
            .build(&Weights::default());
        let expected = vec![
            (-1_711_177_021, 0),
            (-880_637_439, 1),
            (-788_019_661, 1),
            (450_739_710, 1),
            (999_922_443, 0),
            (1_024_545_989, 1),
            (1_542_099_937, 0),
            (1_756_943_855, 0),
        ];
        assert_eq!(ring.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_chained_build_at_high_weight() {
        // shard 1 ends on a 14897 character label
        let weights = Weights::from_iter([(1, 10)]);
        let ring = RingBuilder::new(0, 2, 160)
            .label_scheme(LabelScheme::Chained)
            .build(&weights);
        assert_eq!(ring.len(), 1760);
        let counts = ring.vnodes_per_shard();
        assert_eq!(counts.get(&0), Some(&160));
        assert_eq!(counts.get(&1), Some(&1600));
        assert_eq!(ring.find_shard(1_403_703_083), Some(1));
        let mut last = String::new();
        LabelScheme::Chained.for_each_label(1, 1600, |label| {
            last.clear();
            last.push_str(label);
        });
        assert_eq!(last.len(), 14_897);
        assert_eq!(Murmur3::new(0).hash_chars(&last), 1_403_703_083);
    }
}
