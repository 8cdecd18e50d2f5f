//! Environment variable utilities for the RTMHA parameter tools
//!
//! This module provides utilities for handling environment variables,
//! particularly `RTMHA_PARAMS_DIR`, which points to the directory holding
//! persisted session records, and `RTMHA_NUM_BANDS`, which carries the band
//! count of the active filterbank.

use crate::constants::{DEFAULT_SESSION_FILE, ENV_NUM_BANDS, ENV_PARAMS_DIR};
use std::env;
use std::path::PathBuf;

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "RTMHA_PARAMS_DIR environment variable is not set. Please set it to the directory holding session parameter files (e.g., export RTMHA_PARAMS_DIR=/path/to/params)"
    )]
    ParamsDirNotSet,

    #[error("RTMHA_PARAMS_DIR points to a file, not a directory: {0}")]
    ParamsDirNotADirectory(PathBuf),

    #[error("Failed to create parameter directory: {0}")]
    ParamsDirCreationFailed(std::io::Error),

    #[error("RTMHA_NUM_BANDS must be a positive integer, got {0:?}")]
    InvalidNumBands(String),
}

/// Resolve the parameter directory from a raw variable value, creating it if necessary
///
/// `get_params_dir` calls this with the value of `RTMHA_PARAMS_DIR`; it is
/// split out so callers holding their own configuration can reuse it.
pub fn resolve_params_dir(value: Option<String>) -> Result<PathBuf, EnvError> {
    let raw = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(EnvError::ParamsDirNotSet)?;
    let path = PathBuf::from(raw);

    if path.exists() {
        if !path.is_dir() {
            return Err(EnvError::ParamsDirNotADirectory(path));
        }
    } else {
        std::fs::create_dir_all(&path).map_err(EnvError::ParamsDirCreationFailed)?;
    }

    Ok(path)
}

/// Get the parameter directory from `RTMHA_PARAMS_DIR`
///
/// # Errors
///
/// Returns an error if:
/// - RTMHA_PARAMS_DIR is not set
/// - RTMHA_PARAMS_DIR points to an existing file
/// - the directory does not exist and cannot be created
///
/// # Example
///
/// ```no_run
/// use rtmha_env::env_utils::get_params_dir;
///
/// let dir = get_params_dir()?;
/// println!("Parameter directory: {}", dir.display());
/// # Ok::<(), rtmha_env::env_utils::EnvError>(())
/// ```
pub fn get_params_dir() -> Result<PathBuf, EnvError> {
    resolve_params_dir(env::var(ENV_PARAMS_DIR).ok())
}

/// Get the path of the default session record inside the parameter directory
pub fn get_session_file() -> Result<PathBuf, EnvError> {
    Ok(get_params_dir()?.join(DEFAULT_SESSION_FILE))
}

/// Parse a band count from a raw variable value
///
/// An unset variable yields `fallback`. Zero, negative or non-numeric values
/// are rejected rather than replaced, so a typo never silently changes the
/// band layout.
pub fn parse_num_bands(value: Option<String>, fallback: usize) -> Result<usize, EnvError> {
    match value {
        None => Ok(fallback),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(EnvError::InvalidNumBands(raw)),
        },
    }
}

/// Get the band count from `RTMHA_NUM_BANDS`, or `fallback` when unset
pub fn get_num_bands(fallback: usize) -> Result<usize, EnvError> {
    parse_num_bands(env::var(ENV_NUM_BANDS).ok(), fallback)
}
