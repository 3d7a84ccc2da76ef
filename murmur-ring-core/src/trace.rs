//! Enables trace logging for murmur-ring to some sink

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{Layer, Registry};

use super::conf::{Conf, Tracing};

/// Setup local tracing to stderr
fn setup_local(conf: &Tracing) -> impl Layer<Registry> {
    tracing_subscriber::fmt::layer()
        // keep stdout free for command output
        .with_writer(std::io::stderr)
        .with_filter(conf.level.to_filter())
}

/// Setup basic tracing
///
/// This fails if a global subscriber was already installed.
///
/// # Arguments
///
/// * `conf` - The config to pull tracing settings from
pub fn setup(conf: &Conf) -> Result<(), TryInitError> {
    // setup our local tracer
    let local = setup_local(&conf.tracing);
    // setup our registry
    tracing_subscriber::registry().with(local).try_init()
}
