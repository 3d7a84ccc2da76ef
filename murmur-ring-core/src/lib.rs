//! Weighted consistent hashing for routing keys to a fixed set of shards
//!
//! Keys are placed on a ring of seeded MurmurHash3 positions where every shard
//! owns `virtual_bucket_times * weight` virtual nodes. A built ring can be
//! persisted as a flat `position=shard` file and reloaded verbatim.

pub mod conf;
pub mod errors;
pub mod hash;
pub mod partitioner;
mod properties;
pub mod ring;
pub mod trace;
pub mod weights;

pub use conf::{Conf, RingConf};
pub use errors::{InitError, RingError};
pub use hash::{Murmur3, RingKey};
pub use partitioner::{Partitioner, RingSource};
pub use ring::{LabelScheme, Ring, RingBuilder};
pub use weights::Weights;
