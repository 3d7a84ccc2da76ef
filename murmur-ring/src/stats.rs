//! Reports how a ring spreads virtual nodes and keys across its shards

use std::collections::BTreeMap;

use murmur_ring_core::Partitioner;
use owo_colors::OwoColorize;

/// How far a sampled share may drift from its virtual node share before we flag it
const DRIFT_WARN: f64 = 0.02;

/// The spread of a single shard
#[derive(Debug, Clone, PartialEq)]
pub struct ShardStats {
    /// The shard these stats are for
    pub shard: u32,
    /// The number of virtual nodes this shard owns
    pub vnodes: usize,
    /// The share of all virtual nodes this shard owns
    pub vnode_share: f64,
    /// The number of sampled keys routed to this shard
    pub keys: u64,
    /// The share of sampled keys routed to this shard
    pub key_share: f64,
}

/// Route a set of generated keys and collect per shard stats
///
/// # Arguments
///
/// * `partitioner` - An initialized partitioner to sample
/// * `samples` - The number of keys to route
pub fn collect(partitioner: &Partitioner, samples: u64) -> Vec<ShardStats> {
    // count our virtual nodes
    let vnodes = partitioner
        .ring()
        .map(|ring| ring.vnodes_per_shard())
        .unwrap_or_default();
    let total_vnodes = vnodes.values().sum::<usize>().max(1);
    // route our sampled keys
    let mut keys = BTreeMap::<u32, u64>::new();
    for i in 0..samples {
        let shard = partitioner.calculate(&format!("sample-{i}"));
        *keys.entry(shard).or_default() += 1;
    }
    let total_keys = samples.max(1);
    vnodes
        .iter()
        .map(|(shard, count)| {
            let routed = keys.get(shard).copied().unwrap_or_default();
            ShardStats {
                shard: *shard,
                vnodes: *count,
                vnode_share: *count as f64 / total_vnodes as f64,
                keys: routed,
                key_share: routed as f64 / total_keys as f64,
            }
        })
        .collect()
}

/// Describe the settings a partitioner was started with and where its ring came from
///
/// A loaded ring may not match these settings so they are shown next to the stats.
///
/// # Arguments
///
/// * `partitioner` - The partitioner to describe
pub fn header(partitioner: &Partitioner) -> String {
    let conf = partitioner.conf();
    let source = match partitioner.source() {
        Some(source) => format!("{source:?}"),
        None => "Uninitialized".to_owned(),
    };
    format!(
        "seed {} | {} shards configured | {} vnodes per weight | {:?} labels | ring {source}",
        conf.seed, conf.shards, conf.virtual_bucket_times, conf.label_scheme
    )
}

/// Print our stats with shares that drifted too far highlighted
///
/// # Arguments
///
/// * `stats` - The stats to print
pub fn print(stats: &[ShardStats]) {
    println!("{:>6} {:>8} {:>8} {:>10} {:>8}", "shard", "vnodes", "share", "keys", "share");
    for stat in stats {
        // get how far our sampled share is from our expected share
        let drift = (stat.key_share - stat.vnode_share).abs();
        let key_share = format!("{:.2}%", stat.key_share * 100.0);
        let key_share = if drift > DRIFT_WARN {
            key_share.bright_red().to_string()
        } else {
            key_share.bright_green().to_string()
        };
        println!(
            "{:>6} {:>8} {:>7.2}% {:>10} {:>8}",
            stat.shard,
            stat.vnodes,
            stat.vnode_share * 100.0,
            stat.keys,
            key_share
        );
    }
}
