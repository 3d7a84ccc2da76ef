//! The config for a murmur hash ring

use std::path::{Path, PathBuf};

use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::errors::RingError;
use crate::ring::builder::DEFAULT_VIRTUAL_BUCKET_TIMES;
use crate::ring::{LabelScheme, RingBuilder};
use crate::weights::Weights;

/// The prefix for env vars that override our config file
const ENV_PREFIX: &str = "murmur_ring";

/// Help serde default the number of shards
fn default_shards() -> u32 {
    1
}

/// Help serde default the number of virtual nodes per unit of weight
fn default_virtual_bucket_times() -> u32 {
    DEFAULT_VIRTUAL_BUCKET_TIMES
}

/// The settings used to build or load a ring
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RingConf {
    /// The murmur seed to hash with
    #[serde(default)]
    pub seed: i32,
    /// The number of shards to spread keys across
    #[serde(default = "default_shards")]
    pub shards: u32,
    /// The number of virtual nodes per unit of shard weight
    #[serde(default = "default_virtual_bucket_times")]
    pub virtual_bucket_times: u32,
    /// A `shard=weight` file to load shard weights from
    #[serde(default)]
    pub weight_map_file: Option<PathBuf>,
    /// Where to persist the built ring and reload it from
    #[serde(default)]
    pub bucket_map_path: Option<PathBuf>,
    /// How to label virtual nodes
    #[serde(default)]
    pub label_scheme: LabelScheme,
}

impl Default for RingConf {
    /// Builds a default ring config
    fn default() -> Self {
        RingConf {
            seed: 0,
            shards: default_shards(),
            virtual_bucket_times: default_virtual_bucket_times(),
            weight_map_file: None,
            bucket_map_path: None,
            label_scheme: LabelScheme::default(),
        }
    }
}

impl RingConf {
    /// Get the path to persist our ring at if one was configured
    #[must_use]
    pub fn bucket_map_path(&self) -> Option<&Path> {
        self.bucket_map_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Load the shard weights for this ring
    pub fn weights(&self) -> Result<Weights, RingError> {
        match self
            .weight_map_file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
        {
            Some(path) => Weights::from_file(path),
            None => Ok(Weights::default()),
        }
    }

    /// Get a ring builder for these settings
    #[must_use]
    pub fn builder(&self) -> RingBuilder {
        RingBuilder::new(self.seed, self.shards, self.virtual_bucket_times)
            .label_scheme(self.label_scheme)
    }
}

/// The different levels to log tracing info at
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum TraceLevel {
    /// Log everything include high verbosity low priority info
    Trace,
    /// Log low priority debug infomation and up
    Debug,
    /// Log standard priority information and up
    #[default]
    Info,
    /// Log only warning and Errors
    Warn,
    /// Log only errors
    Error,
    /// Do not log anything
    Off,
}

impl TraceLevel {
    /// Convert this [`TraceLevel`] to a [`LevelFilter`]
    #[must_use]
    pub fn to_filter(&self) -> LevelFilter {
        match self {
            TraceLevel::Trace => LevelFilter::TRACE,
            TraceLevel::Debug => LevelFilter::DEBUG,
            TraceLevel::Info => LevelFilter::INFO,
            TraceLevel::Warn => LevelFilter::WARN,
            TraceLevel::Error => LevelFilter::ERROR,
            TraceLevel::Off => LevelFilter::OFF,
        }
    }
}

/// The tracing settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tracing {
    /// The level to log traces at
    #[serde(default)]
    pub level: TraceLevel,
}

/// The config for a murmur hash ring
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Conf {
    /// The ring settings to use
    #[serde(default)]
    pub ring: RingConf,
    /// The tracing settings to use
    #[serde(default)]
    pub tracing: Tracing,
}

impl Conf {
    /// Build a config from our environment and a config file
    ///
    /// # Arguments
    ///
    /// * `path` - The config file to load, if it exists
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::with_env_prefix(path, ENV_PREFIX)
    }

    /// Build a config from a config file and env vars with a specific prefix
    ///
    /// # Arguments
    ///
    /// * `path` - The config file to load, if it exists
    /// * `prefix` - The prefix env vars must have to override settings
    pub fn with_env_prefix(path: &str, prefix: &str) -> Result<Self, ConfigError> {
        // build our config sources
        let conf = Config::builder()
            // start with the settings in our config file
            .add_source(config::File::with_name(path).required(false))
            // overlay our env vars on top
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        conf.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let conf = Conf::default();
        assert_eq!(conf.ring.seed, 0);
        assert_eq!(conf.ring.shards, 1);
        assert_eq!(conf.ring.virtual_bucket_times, 160);
        assert_eq!(conf.ring.label_scheme, LabelScheme::Canonical);
        assert_eq!(conf.tracing.level.to_filter(), LevelFilter::INFO);
        assert!(conf.ring.bucket_map_path().is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        let conf = Conf::with_env_prefix(path.to_str().unwrap(), "murmur_ring_missing_test")
            .unwrap();
        assert_eq!(conf, Conf::default());
    }

    #[test]
    fn test_loads_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.yml");
        let yaml = "ring:\n  seed: -3\n  shards: 5\n  virtual_bucket_times: 40\n  label_scheme: Chained\n  bucket_map_path: /tmp/ring.properties\ntracing:\n  level: Debug\n";
        std::fs::write(&path, yaml).unwrap();
        let conf = Conf::with_env_prefix(path.to_str().unwrap(), "murmur_ring_yaml_test")
            .unwrap();
        assert_eq!(conf.ring.seed, -3);
        assert_eq!(conf.ring.shards, 5);
        assert_eq!(conf.ring.virtual_bucket_times, 40);
        assert_eq!(conf.ring.label_scheme, LabelScheme::Chained);
        assert_eq!(
            conf.ring.bucket_map_path(),
            Some(Path::new("/tmp/ring.properties"))
        );
        assert_eq!(conf.tracing.level, TraceLevel::Debug);
    }

    #[test]
    fn test_serialized_conf_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("written.yml");
        let mut conf = Conf::default();
        conf.ring.shards = 12;
        conf.ring.weight_map_file = Some(dir.path().join("weights.properties"));
        std::fs::write(&path, serde_yaml::to_string(&conf).unwrap()).unwrap();
        let loaded = Conf::with_env_prefix(path.to_str().unwrap(), "murmur_ring_written_test")
            .unwrap();
        assert_eq!(loaded, conf);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.yml");
        std::fs::write(&path, "ring:\n  shards: 2\n").unwrap();
        std::env::set_var("MURMUR_RING_ENV_TEST_RING__SHARDS", "9");
        let conf = Conf::with_env_prefix(path.to_str().unwrap(), "murmur_ring_env_test")
            .unwrap();
        std::env::remove_var("MURMUR_RING_ENV_TEST_RING__SHARDS");
        assert_eq!(conf.ring.shards, 9);
    }

    #[test]
    fn test_empty_paths_count_as_unset() {
        let conf = RingConf {
            bucket_map_path: Some(PathBuf::new()),
            weight_map_file: Some(PathBuf::new()),
            ..RingConf::default()
        };
        assert!(conf.bucket_map_path().is_none());
        assert!(conf.weights().unwrap().is_empty());
    }
}
