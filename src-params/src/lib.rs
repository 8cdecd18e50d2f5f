//! Parameter contract of the RTMHA multiband hearing-aid engine
//!
//! Every tunable value the DSP pipeline reads lives in one flat
//! [`ParameterRecord`]: per-band WDRC curves, feedback cancellation and
//! beamformer coefficients, noise management, and file playback/recording
//! controls. The record is seeded from the [`defaults`] catalog, updated
//! field by field or as a whole by the configuration layer, encoded to JSON
//! or YAML for clients and persistence, and handed to the engine through
//! [`SharedParameters`].

pub mod bands;
pub mod codec;
pub mod defaults;
pub mod errors;
pub mod fields;
pub mod handoff;
pub mod record;
pub mod selectors;
pub mod store;
pub mod watcher;

pub use bands::BandVector;
pub use codec::{
    Format, decode_json, decode_yaml, encode_json, encode_yaml, from_value, to_value,
};
pub use errors::{ParamError, ParamResult};
pub use fields::{FIELDS, FieldKind, FieldSpec, FieldValue, field_spec};
pub use handoff::SharedParameters;
pub use record::{ParameterRecord, PendingSignals};
pub use selectors::{AdaptiveFilterType, NoiseEstimationType, SelectorKind, SpectralType};
pub use watcher::{ParamWatcher, WatchEvent};
