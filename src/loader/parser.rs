use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// This function reads a file from `file_path`, attempts to parse it
/// as JSON, and returns an instance of `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read_to_string(file_path.as_ref()).map_err(Error::IoError)?;

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

/// Reads a job script as text.
///
/// Scripts are not required to be valid UTF-8; invalid sequences are
/// replaced so the parser can still flag the offending lines as non-ASCII.
pub fn read_script_file(file_path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(file_path.as_ref())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
