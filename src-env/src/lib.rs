//! Environment configuration for the RTMHA parameter tools
//!
//! Resolves where session parameter files live and which band count the
//! active filterbank uses, from environment variables.

pub mod constants;
pub mod env_utils;

pub use env_utils::{EnvError, get_num_bands, get_params_dir, get_session_file};
