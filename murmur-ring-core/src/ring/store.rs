//! Persists rings as flat `position=shard` text files
//!
//! A persisted ring is authoritative: loading one never looks at the seed,
//! shard count, or weights it was built with.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::Ring;
use crate::errors::RingError;
use crate::properties;

/// Check if a persisted ring exists at this path and has data in it
///
/// # Arguments
///
/// * `path` - The path to check
#[must_use]
pub fn is_usable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// Get the temp path to write a ring to before moving it into place
///
/// # Arguments
///
/// * `path` - The final path for this ring
fn temp_path(path: &Path) -> PathBuf {
    // add a temp suffix to our file name
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push("-temp");
    path.with_file_name(name)
}

/// Wrap an io error with the file and operation it came from
///
/// # Arguments
///
/// * `op` - What we were doing
/// * `path` - The file we were working on
fn file_error<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> RingError + 'a {
    move |source| RingError::FileIO {
        source,
        op,
        path: path.to_path_buf(),
    }
}

/// Write a ring to disk
///
/// # Arguments
///
/// * `path` - The path to write this ring to
/// * `ring` - The ring to write
#[instrument(name = "store::save", skip(ring), fields(vnodes = ring.len()), err(Debug))]
pub fn save(path: &Path, ring: &Ring) -> Result<(), RingError> {
    // make sure our parent directory exists
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_error("create directory", parent))?;
    }
    let temp = temp_path(path);
    // write every position to our temp file
    let file = File::create(&temp).map_err(file_error("create", &temp))?;
    let mut writer = BufWriter::new(file);
    for (position, shard) in ring.iter() {
        writeln!(writer, "{position}={shard}").map_err(file_error("write", &temp))?;
    }
    // make sure our data is on disk before we swap it in
    let file = writer
        .into_inner()
        .map_err(|error| file_error("flush", &temp)(error.into_error()))?;
    file.sync_all().map_err(file_error("sync", &temp))?;
    fs::rename(&temp, path).map_err(file_error("rename", path))?;
    debug!("saved ring");
    Ok(())
}

/// Parse a ring from the contents of a ring file
///
/// # Arguments
///
/// * `path` - The path these contents came from
/// * `contents` - The contents to parse
pub fn parse(path: &Path, contents: &str) -> Result<Ring, RingError> {
    let mut ring = Ring::default();
    for pair in properties::parse(path, contents)? {
        // build a parse error for this pair
        let invalid = |value: &str, source| RingError::InvalidNumber {
            path: path.to_path_buf(),
            line: pair.line,
            value: value.to_owned(),
            source,
        };
        let position = pair
            .key
            .parse::<i32>()
            .map_err(|source| invalid(pair.key, source))?;
        let shard = pair
            .value
            .parse::<u32>()
            .map_err(|source| invalid(pair.value, source))?;
        ring.insert(position, shard);
    }
    Ok(ring)
}

/// Load a ring from disk
///
/// # Arguments
///
/// * `path` - The ring file to load
#[instrument(name = "store::load", err(Debug))]
pub fn load(path: &Path) -> Result<Ring, RingError> {
    let contents = properties::read(path)?;
    let ring = parse(path, &contents)?;
    debug!(vnodes = ring.len(), "loaded ring");
    Ok(ring)
}
