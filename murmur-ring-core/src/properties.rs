//! Reads the flat `key=value` text files used for weights and persisted rings

use std::path::Path;

use crate::errors::RingError;

/// The header a JVM properties listing writes before its entries
const LISTING_HEADER: &str = "-- listing properties --";

/// A single `key=value` pair from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<'a> {
    /// The 1 based line this pair was on
    pub line: usize,
    /// The trimmed key
    pub key: &'a str,
    /// The trimmed value
    pub value: &'a str,
}

/// Check if a line carries no data
///
/// # Arguments
///
/// * `line` - The trimmed line to check
fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('!') || line == LISTING_HEADER
}

/// Split the contents of a properties file into its pairs
///
/// Blank lines, `#`/`!` comments, and listing headers are skipped. Keys and
/// values are split on the first `=` or `:`.
///
/// # Arguments
///
/// * `path` - The path these contents came from
/// * `contents` - The contents to split
pub fn parse<'a>(path: &Path, contents: &'a str) -> Result<Vec<Pair<'a>>, RingError> {
    let mut pairs = Vec::new();
    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if is_skippable(line) {
            continue;
        }
        // find the first separator in this line
        let Some(split) = line.find(['=', ':']) else {
            return Err(RingError::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                content: raw.to_owned(),
            });
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if key.is_empty() {
            return Err(RingError::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                content: raw.to_owned(),
            });
        }
        pairs.push(Pair {
            line: index + 1,
            key,
            value,
        });
    }
    Ok(pairs)
}

/// Read a whole properties file into memory
///
/// # Arguments
///
/// * `path` - The file to read
pub fn read(path: &Path) -> Result<String, RingError> {
    std::fs::read_to_string(path).map_err(|source| RingError::FileIO {
        source,
        op: "read",
        path: path.to_path_buf(),
    })
}
