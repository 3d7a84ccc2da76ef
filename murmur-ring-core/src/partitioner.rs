//! The partitioner routing keys to shards over a murmur hash ring
//!
//! A partitioner starts out uninitialized. [`Partitioner::init`] either loads
//! a persisted ring or builds a fresh one (saving it if a path is set), after
//! which the ring never changes and [`Partitioner::calculate`] can be called
//! from any number of threads without locking.

use std::sync::{Mutex, OnceLock};

use tracing::{info, instrument, warn};

use crate::conf::RingConf;
use crate::errors::{InitError, RingError};
use crate::hash::{Murmur3, RingKey};
use crate::ring::{store, Ring};

/// Where a partitioners ring came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingSource {
    /// The ring was loaded from a persisted ring file
    Loaded,
    /// The ring was built and not persisted
    Built,
    /// The ring was built and then persisted
    BuiltAndSaved,
}

/// Routes keys to shards with weighted consistent hashing
#[derive(Debug)]
pub struct Partitioner {
    /// The settings to build or load our ring with
    conf: RingConf,
    /// The hasher to place keys with
    hasher: Murmur3,
    /// Our ring once we have initialized
    ring: OnceLock<Ring>,
    /// Where our ring came from once we have initialized
    source: OnceLock<RingSource>,
    /// Serializes initialization
    init_lock: Mutex<()>,
}

impl Partitioner {
    /// Create a new uninitialized partitioner
    ///
    /// # Arguments
    ///
    /// * `conf` - The ring settings to use
    #[must_use]
    pub fn new(conf: RingConf) -> Self {
        Partitioner {
            hasher: Murmur3::new(conf.seed),
            conf,
            ring: OnceLock::new(),
            source: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Create a partitioner and initialize it
    ///
    /// # Arguments
    ///
    /// * `conf` - The ring settings to use
    pub fn start(conf: RingConf) -> Result<Self, InitError> {
        let partitioner = Self::new(conf);
        partitioner.init()?;
        Ok(partitioner)
    }

    /// Load or build our ring
    ///
    /// This only does work the first time it succeeds; calling it again once
    /// the partitioner is ready does nothing. On failure the partitioner
    /// stays uninitialized.
    #[instrument(name = "Partitioner::init", skip(self), err(Debug))]
    pub fn init(&self) -> Result<RingSource, InitError> {
        // only one caller may initialize at a time
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // another caller may have finished while we waited
        if let Some(source) = self.source.get() {
            return Ok(*source);
        }
        let (ring, source) = self.load_or_build()?;
        // a ring with no positions can never answer a lookup
        if ring.is_empty() {
            return Err(RingError::EmptyRing.into());
        }
        info!(
            vnodes = ring.len(),
            shards = ring.shards().len(),
            ?source,
            "ring ready"
        );
        // we hold the init lock so neither of these can already be set
        let _ = self.ring.set(ring);
        let _ = self.source.set(source);
        Ok(source)
    }

    /// Load a persisted ring if we have one or build and persist a new one
    fn load_or_build(&self) -> Result<(Ring, RingSource), RingError> {
        let path = self.conf.bucket_map_path();
        // a persisted ring overrides every build setting
        if let Some(path) = path.filter(|path| store::is_usable(path)) {
            let ring = store::load(path)?;
            self.check_drift(&ring);
            return Ok((ring, RingSource::Loaded));
        }
        // our weights are only needed for this build
        let weights = self.conf.weights()?;
        let ring = self.conf.builder().build(&weights);
        match path {
            Some(path) if !ring.is_empty() => {
                store::save(path, &ring)?;
                Ok((ring, RingSource::BuiltAndSaved))
            }
            _ => Ok((ring, RingSource::Built)),
        }
    }

    /// Warn if a loaded ring does not match our configured shard count
    ///
    /// # Arguments
    ///
    /// * `ring` - The loaded ring to check
    fn check_drift(&self, ring: &Ring) {
        let shards = ring.shards();
        let configured = self.conf.shards;
        let out_of_range = shards.iter().filter(|shard| **shard >= configured).count();
        if out_of_range > 0 || shards.len() != configured as usize {
            warn!(
                loaded = shards.len(),
                configured,
                out_of_range,
                "persisted ring does not match configured shard count; using persisted ring"
            );
        }
    }

    /// Whether this partitioner has a ring and can route keys
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ring.get().is_some()
    }

    /// Where our ring came from if we are initialized
    #[must_use]
    pub fn source(&self) -> Option<RingSource> {
        self.source.get().copied()
    }

    /// Get our ring if we are initialized
    #[must_use]
    pub fn ring(&self) -> Option<&Ring> {
        self.ring.get()
    }

    /// Get the settings this partitioner was created with
    #[must_use]
    pub fn conf(&self) -> &RingConf {
        &self.conf
    }

    /// Get the shard a key belongs to
    ///
    /// # Arguments
    ///
    /// * `key` - The key to route
    ///
    /// # Panics
    ///
    /// Panics if this partitioner has not been initialized.
    #[must_use]
    pub fn calculate<K: RingKey + ?Sized>(&self, key: &K) -> u32 {
        let Some(ring) = self.ring.get() else {
            panic!("Partitioner::calculate called before Partitioner::init succeeded");
        };
        // init never accepts an empty ring
        ring.find_shard(key.ring_hash(&self.hasher))
            .unwrap_or_else(|| panic!("Partitioner ring has no virtual nodes"))
    }
}
