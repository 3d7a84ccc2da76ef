//! Any errors that can be encountered when building or loading a ring

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

/// Any errors that can be encountered when building, loading, or saving a ring
#[derive(Debug)]
pub enum RingError {
    /// An IO error tied to a specific file
    FileIO {
        /// The error we hit
        source: std::io::Error,
        /// What we were doing when it happened
        op: &'static str,
        /// The file we were working on
        path: PathBuf,
    },
    /// An config parsing error
    Config(config::ConfigError),
    /// A line in a ring or weight file that is not a `key=value` pair
    Malformed {
        /// The file this line came from
        path: PathBuf,
        /// The 1 based line number
        line: usize,
        /// The offending line
        content: String,
    },
    /// A ring or weight file entry whose integers could not be parsed
    InvalidNumber {
        /// The file this entry came from
        path: PathBuf,
        /// The 1 based line number
        line: usize,
        /// The text we failed to parse
        value: String,
        /// Why parsing failed
        source: ParseIntError,
    },
    /// A ring with no virtual nodes cannot route anything
    EmptyRing,
}

impl fmt::Display for RingError {
    /// Write a human readable version of this error
    ///
    /// # Arguments
    ///
    /// * `f` - The formatter to write too
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::FileIO { source, op, path } => {
                write!(f, "failed to {op} {}: {source}", path.display())
            }
            RingError::Config(error) => write!(f, "config error: {error}"),
            RingError::Malformed {
                path,
                line,
                content,
            } => write!(
                f,
                "{}:{line}: expected a key=value pair but found {content:?}",
                path.display()
            ),
            RingError::InvalidNumber {
                path,
                line,
                value,
                source,
            } => write!(
                f,
                "{}:{line}: {value:?} is not a valid integer: {source}",
                path.display()
            ),
            RingError::EmptyRing => write!(f, "ring has no virtual nodes"),
        }
    }
}

impl std::error::Error for RingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RingError::FileIO { source, .. } => Some(source),
            RingError::Config(error) => Some(error),
            RingError::InvalidNumber { source, .. } => Some(source),
            RingError::Malformed { .. } | RingError::EmptyRing => None,
        }
    }
}

impl From<config::ConfigError> for RingError {
    /// Convert this error to our error type
    ///
    /// # Arguments
    ///
    /// * `error` - The error to convert
    fn from(error: config::ConfigError) -> Self {
        RingError::Config(error)
    }
}

/// Initializing a partitioner failed
///
/// Every failure during init is wrapped in this so callers only have to
/// handle a single kind of startup error.
#[derive(Debug)]
pub struct InitError {
    /// The error that stopped initialization
    pub source: RingError,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to initialize murmur hash ring: {}", self.source)
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<RingError> for InitError {
    /// Wrap a ring error as an init failure
    ///
    /// # Arguments
    ///
    /// * `source` - The error to wrap
    fn from(source: RingError) -> Self {
        InitError { source }
    }
}
