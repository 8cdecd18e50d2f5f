/// Directory holding persisted session parameter files
pub const ENV_PARAMS_DIR: &str = "RTMHA_PARAMS_DIR";

/// Band count of the active filterbank configuration
pub const ENV_NUM_BANDS: &str = "RTMHA_NUM_BANDS";

/// File name used for the session record inside the parameter directory
pub const DEFAULT_SESSION_FILE: &str = "session.json";
