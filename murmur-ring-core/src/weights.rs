//! Per shard weights controlling how many virtual nodes each shard gets

use std::collections::HashMap;
use std::path::Path;

use tracing::{instrument, warn};

use crate::errors::RingError;
use crate::properties;

/// The weight of any shard without an explicit valid weight
pub const DEFAULT_WEIGHT: u32 = 1;

/// A map of shard index to weight
///
/// This only lives as long as a build does and is never kept on a ring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Weights {
    /// The explicitly set weights
    weights: HashMap<u32, u32>,
}

impl Weights {
    /// Set the weight for a shard
    ///
    /// Weights that are not positive fall back to [`DEFAULT_WEIGHT`].
    ///
    /// # Arguments
    ///
    /// * `shard` - The shard to set a weight for
    /// * `weight` - The requested weight
    pub fn set(&mut self, shard: u32, weight: i64) {
        let weight = if weight > 0 {
            u32::try_from(weight).unwrap_or(u32::MAX)
        } else {
            DEFAULT_WEIGHT
        };
        self.weights.insert(shard, weight);
    }

    /// Get the weight for a shard
    ///
    /// # Arguments
    ///
    /// * `shard` - The shard to get a weight for
    #[must_use]
    pub fn get(&self, shard: u32) -> u32 {
        self.weights.get(&shard).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// The number of shards with an explicit weight
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no shard has an explicit weight
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Parse weights from the contents of a `shard=weight` file
    ///
    /// # Arguments
    ///
    /// * `path` - The path these contents came from
    /// * `contents` - The file contents to parse
    pub fn parse(path: &Path, contents: &str) -> Result<Self, RingError> {
        let mut weights = Weights::default();
        for pair in properties::parse(path, contents)? {
            // shard indexes must be real integers
            let shard = pair
                .key
                .parse::<u32>()
                .map_err(|source| RingError::InvalidNumber {
                    path: path.to_path_buf(),
                    line: pair.line,
                    value: pair.key.to_owned(),
                    source,
                })?;
            // weights that don't parse are treated as the default
            let weight = match pair.value.parse::<i64>() {
                Ok(weight) if weight > 0 => weight,
                _ => {
                    warn!(
                        shard,
                        value = pair.value,
                        line = pair.line,
                        "invalid shard weight; using default of 1"
                    );
                    i64::from(DEFAULT_WEIGHT)
                }
            };
            weights.set(shard, weight);
        }
        Ok(weights)
    }

    /// Load weights from a `shard=weight` file
    ///
    /// # Arguments
    ///
    /// * `path` - The file to load
    #[instrument(name = "Weights::from_file", err(Debug))]
    pub fn from_file(path: &Path) -> Result<Self, RingError> {
        let contents = properties::read(path)?;
        Self::parse(path, &contents)
    }
}

impl FromIterator<(u32, i64)> for Weights {
    fn from_iter<I: IntoIterator<Item = (u32, i64)>>(iter: I) -> Self {
        let mut weights = Weights::default();
        for (shard, weight) in iter {
            weights.set(shard, weight);
        }
        weights
    }
}
