// ============================================================================
// Field Table - names, kinds and bounds of every record field
// ============================================================================

use crate::selectors::SelectorKind;
use std::fmt;

/// Semantic type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// On/off switch, 0/1 on the wire
    Flag,
    /// One-shot command, 0/1 on the wire, cleared by the engine once acted on
    Signal,
    /// Plain boolean on the wire
    Bool,
    Float,
    /// Non-negative integer
    Int,
    Selector(SelectorKind),
    Text,
    /// One float per filterbank band
    Bands,
}

impl FieldKind {
    /// Human-readable description of the accepted values, used in errors
    pub fn expected(self) -> &'static str {
        match self {
            FieldKind::Flag | FieldKind::Signal => "a flag (0, 1 or a boolean)",
            FieldKind::Bool => "a boolean",
            FieldKind::Float => "a number",
            FieldKind::Int => "an integer",
            FieldKind::Selector(_) => "an integer selector",
            FieldKind::Text => "a string",
            FieldKind::Bands => "an array of numbers",
        }
    }
}

/// Description of one record field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, identical on the wire and in memory
    pub name: &'static str,
    pub kind: FieldKind,
    /// Inclusive bounds for numeric fields (each band entry for band vectors)
    pub range: Option<(f64, f64)>,
    pub description: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            range: None,
            description,
        }
    }

    const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    const fn non_negative(self) -> Self {
        self.with_range(0.0, f64::INFINITY)
    }

    const fn unit_interval(self) -> Self {
        self.with_range(0.0, 1.0)
    }
}

use FieldKind::*;

const ADAPTIVE: FieldKind = Selector(SelectorKind::AdaptiveFilter);

/// Every record field, in encoding order
pub static FIELDS: [FieldSpec; 54] = [
    FieldSpec::new("en_ha", Flag, "Hearing-aid processing on; off passes audio through"),
    FieldSpec::new("rear_mics", Flag, "Rear microphones on"),
    FieldSpec::new("aligned", Bool, "Filterbank channel alignment"),
    FieldSpec::new("gain", Float, "Global gain in dB"),
    FieldSpec::new("g50", Bands, "Gain at 50 dB SPL input, per band"),
    FieldSpec::new("g80", Bands, "Gain at 80 dB SPL input, per band"),
    FieldSpec::new("knee_low", Bands, "Lower kneepoint in dB SPL, per band"),
    FieldSpec::new("mpo_band", Bands, "Maximum power output (upper kneepoint), per band"),
    FieldSpec::new("attack", Bands, "WDRC attack time in msec, per band").non_negative(),
    FieldSpec::new("release", Bands, "WDRC release time in msec, per band").non_negative(),
    FieldSpec::new("global_mpo", Float, "Global maximum power output"),
    FieldSpec::new(
        "noise_estimation_type",
        Selector(SelectorKind::NoiseEstimation),
        "Noise estimation technique",
    ),
    FieldSpec::new("spectral_type", Selector(SelectorKind::Spectral), "Spectral subtraction type"),
    FieldSpec::new("spectral_subtraction", Float, "Spectral subtraction amount").non_negative(),
    FieldSpec::new("freping", Flag, "Frequency-dependent processing on"),
    FieldSpec::new("freping_alpha", Bands, "Freping smoothing coefficient, per band")
        .unit_interval(),
    FieldSpec::new("afc", Flag, "Adaptive feedback cancellation on"),
    FieldSpec::new("afc_reset", Signal, "Reset the AFC taps to their defaults"),
    FieldSpec::new("afc_type", ADAPTIVE, "AFC adaptation algorithm"),
    FieldSpec::new("afc_delay", Float, "AFC delay in msec").non_negative(),
    FieldSpec::new("afc_mu", Float, "AFC step size").non_negative(),
    FieldSpec::new("afc_rho", Float, "AFC forgetting factor").unit_interval(),
    FieldSpec::new("afc_power_estimate", Float, "AFC power estimate").non_negative(),
    FieldSpec::new("afc_delta", Float, "AFC IPNLMS regularization"),
    FieldSpec::new("afc_alpha", Float, "AFC IPNLMS proportionality"),
    FieldSpec::new("afc_beta", Float, "AFC IPNLMS beta"),
    FieldSpec::new("afc_p", Float, "AFC SLMS sparsity exponent"),
    FieldSpec::new("afc_c", Float, "AFC SLMS regularization"),
    FieldSpec::new("bf", Flag, "Beamformer on"),
    FieldSpec::new("bf_type", ADAPTIVE, "Beamformer adaptation algorithm"),
    FieldSpec::new("bf_mu", Float, "Beamformer step size").non_negative(),
    FieldSpec::new("bf_rho", Float, "Beamformer forgetting factor").unit_interval(),
    FieldSpec::new("bf_delta", Float, "Beamformer IPNLMS regularization"),
    FieldSpec::new("bf_c", Float, "Beamformer SLMS regularization"),
    FieldSpec::new("bf_power_estimate", Float, "Beamformer power estimate").non_negative(),
    FieldSpec::new("bf_p", Float, "Beamformer SLMS sparsity exponent"),
    FieldSpec::new("bf_alpha", Float, "Beamformer IPNLMS proportionality"),
    FieldSpec::new("bf_beta", Float, "Beamformer IPNLMS beta"),
    FieldSpec::new("bf_fir_length", Int, "Beamformer FIR filter length in taps")
        .with_range(1.0, u32::MAX as f64),
    FieldSpec::new("bf_delay_len", Int, "Beamformer delay line length in samples")
        .with_range(1.0, u32::MAX as f64),
    FieldSpec::new("bf_nc_on_off", Flag, "Beamformer noise canceller on"),
    FieldSpec::new("bf_amc_on_off", Flag, "Automatic mic combination on"),
    FieldSpec::new("nc_thr", Float, "Noise canceller threshold"),
    FieldSpec::new("amc_thr", Float, "Automatic mic combination threshold"),
    FieldSpec::new("amc_forgetting_factor", Float, "Automatic mic combination forgetting factor")
        .unit_interval(),
    FieldSpec::new("alpha", Float, "File playback mixing coefficient"),
    FieldSpec::new("audio_filename", Text, "Audio file to play"),
    FieldSpec::new("audio_reset", Signal, "Rewind the playback file"),
    FieldSpec::new("audio_play", Signal, "Start file playback"),
    FieldSpec::new("audio_repeat", Signal, "Loop file playback"),
    FieldSpec::new("audio_recordfile", Text, "File to record into"),
    FieldSpec::new("record_start", Signal, "Start recording"),
    FieldSpec::new("record_stop", Signal, "Stop recording"),
    FieldSpec::new("record_length", Float, "Recording length in seconds").non_negative(),
];

/// Look up a field by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Dynamically typed field value, used by field-level updates
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Text(String),
    Bands(Vec<f32>),
}

impl FieldValue {
    /// Get as float; integers are widened
    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as flag; accepts booleans and the integers 0 and 1
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            FieldValue::Int(0) => Some(false),
            FieldValue::Int(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bands(&self) -> Option<&[f32]> {
        match self {
            FieldValue::Bands(v) => Some(v),
            _ => None,
        }
    }

    /// Convert a JSON value, returning `None` for shapes no field accepts
    /// (null, objects, arrays with non-numeric entries)
    pub fn from_json(value: &serde_json::Value) -> Option<FieldValue> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Int(i)),
                None => n.as_f64().map(|f| FieldValue::Float(f as f32)),
            },
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()
                .map(FieldValue::Bands),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Vec<f32>> for FieldValue {
    fn from(v: Vec<f32>) -> Self {
        FieldValue::Bands(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{:?}", v),
            FieldValue::Bands(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
