use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use murmur_ring_core::ring::store;
use murmur_ring_core::{trace, Conf, Partitioner, RingConf, RingError};
use owo_colors::OwoColorize;
use tracing::info;

mod args;
mod errors;
mod stats;

use args::{Args, Command};
use errors::Errors;

/// Print the shard for each key
///
/// # Arguments
///
/// * `conf` - The ring settings to route with
/// * `keys` - The keys to route
fn route(conf: RingConf, keys: &[String]) -> Result<(), Errors> {
    let partitioner = Partitioner::start(conf)?;
    for key in keys {
        println!("{key} -> {}", partitioner.calculate(key));
    }
    Ok(())
}

/// Build a fresh ring and write it out
///
/// Any ring already persisted at the configured path is ignored.
///
/// # Arguments
///
/// * `conf` - The ring settings to build with
/// * `out` - Where to write the ring
fn build(conf: &RingConf, out: &Path) -> Result<(), Errors> {
    // our weights are only needed for this build
    let weights = conf.weights()?;
    let ring = conf.builder().build(&weights);
    if ring.is_empty() {
        return Err(RingError::EmptyRing.into());
    }
    store::save(out, &ring)?;
    info!(vnodes = ring.len(), path = %out.display(), "wrote ring");
    println!("wrote {} virtual nodes to {}", ring.len(), out.display());
    Ok(())
}

/// Print how our ring spreads keys
///
/// # Arguments
///
/// * `conf` - The ring settings to use
/// * `samples` - The number of keys to sample
fn stats(conf: RingConf, samples: u64) -> Result<(), Errors> {
    let partitioner = Partitioner::start(conf)?;
    println!("{}", stats::header(&partitioner));
    let collected = stats::collect(&partitioner, samples);
    stats::print(&collected);
    Ok(())
}

/// Run the command we were asked to run
///
/// # Arguments
///
/// * `args` - Our command line args
fn run(args: Args) -> Result<(), Errors> {
    // load our config
    let conf = Conf::new(&args.conf).map_err(RingError::from)?;
    // setup tracing
    if let Err(error) = trace::setup(&conf) {
        eprintln!("failed to setup tracing: {error}");
    }
    match args.command {
        Command::Route { keys } => route(conf.ring, &keys),
        Command::Build { out } => build(&conf.ring, &out),
        Command::Stats { samples } => stats(conf.ring, samples),
    }
}

fn main() -> ExitCode {
    // get our command line args
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", format!("error: {error}").bright_red());
            ExitCode::FAILURE
        }
    }
}
