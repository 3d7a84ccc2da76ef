//! The errors that can be returned from the murmur-ring command line

use std::fmt;

use murmur_ring_core::{InitError, RingError};

/// The errors that can be returned from the murmur-ring command line
#[derive(Debug)]
pub enum Errors {
    /// Building, loading, or saving a ring failed
    Ring(RingError),
    /// A partitioner failed to initialize
    Init(InitError),
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Errors::Ring(error) => write!(f, "{error}"),
            Errors::Init(error) => write!(f, "{error}"),
        }
    }
}

impl From<RingError> for Errors {
    /// Convert this error to our error type
    ///
    /// # Arguments
    ///
    /// * `error` - The error to convert
    fn from(error: RingError) -> Self {
        Errors::Ring(error)
    }
}

impl From<InitError> for Errors {
    /// Convert this error to our error type
    ///
    /// # Arguments
    ///
    /// * `error` - The error to convert
    fn from(error: InitError) -> Self {
        Errors::Init(error)
    }
}
