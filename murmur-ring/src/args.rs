//! The command line args for murmur-ring

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Route keys to shards with a weighted murmur hash ring
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// The path to the config file for murmur-ring
    #[clap(short, long, default_value = "murmur-ring.yml", global = true)]
    pub conf: String,
    /// The action to take
    #[command(subcommand)]
    pub command: Command,
}

/// The actions murmur-ring can take
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the shard each key routes to
    Route {
        /// The keys to route
        #[clap(required = true)]
        keys: Vec<String>,
    },
    /// Build a fresh ring from the config and save it
    Build {
        /// Where to write the ring
        #[clap(short, long)]
        out: PathBuf,
    },
    /// Show how the ring spreads virtual nodes and keys across shards
    Stats {
        /// The number of generated keys to route
        #[clap(short, long, default_value_t = 100_000)]
        samples: u64,
    },
}
