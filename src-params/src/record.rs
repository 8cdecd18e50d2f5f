// ============================================================================
// Parameter Record - the configuration shared by client and engine
// ============================================================================

use crate::bands::{BandVector, check_len};
use crate::defaults::{self, afc, bf, file_io, freping, global, noise, peak_detect, wdrc};
use crate::errors::{ParamError, ParamResult};
use crate::fields::{FIELDS, FieldKind, FieldSpec, FieldValue, field_spec};
use crate::selectors::{AdaptiveFilterType, NoiseEstimationType, SelectorKind, SpectralType};
use serde::{Serialize, Serializer};

/// Flags and signals travel as 0/1, the representation client parsers expect
fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i32(i32::from(*value))
}

/// Current parameter values for one engine session
///
/// Field order is the encoding order. Band vectors always hold exactly
/// [`band_count`](ParameterRecord::band_count) entries, index `i` being band
/// `i` of the filterbank in ascending frequency.
///
/// Scalars are public for direct reads by the engine. Writes coming from a
/// client should go through [`set`](ParameterRecord::set) or
/// [`apply`](ParameterRecord::apply), which type- and range-check values;
/// [`validate`](ParameterRecord::validate) re-checks a record that was
/// modified directly.
///
/// Algorithm-specific AFC and beamformer terms are always present, whether
/// or not the selected algorithm reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    #[serde(skip)]
    band_count: usize,

    #[serde(serialize_with = "serialize_flag")]
    pub en_ha: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub rear_mics: bool,
    pub aligned: bool,
    pub gain: f32,

    // Amplification
    pub g50: BandVector,
    pub g80: BandVector,
    pub knee_low: BandVector,
    pub mpo_band: BandVector,
    pub attack: BandVector,
    pub release: BandVector,
    pub global_mpo: f32,

    // Noise management
    pub noise_estimation_type: NoiseEstimationType,
    pub spectral_type: SpectralType,
    pub spectral_subtraction: f32,

    // Freping
    #[serde(serialize_with = "serialize_flag")]
    pub freping: bool,
    pub freping_alpha: BandVector,

    // Adaptive feedback cancellation
    #[serde(serialize_with = "serialize_flag")]
    pub afc: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub afc_reset: bool,
    pub afc_type: AdaptiveFilterType,
    pub afc_delay: f32,
    pub afc_mu: f32,
    pub afc_rho: f32,
    pub afc_power_estimate: f32,
    pub afc_delta: f32,
    pub afc_alpha: f32,
    pub afc_beta: f32,
    pub afc_p: f32,
    pub afc_c: f32,

    // Beamformer
    #[serde(serialize_with = "serialize_flag")]
    pub bf: bool,
    pub bf_type: AdaptiveFilterType,
    pub bf_mu: f32,
    pub bf_rho: f32,
    pub bf_delta: f32,
    pub bf_c: f32,
    pub bf_power_estimate: f32,
    pub bf_p: f32,
    pub bf_alpha: f32,
    pub bf_beta: f32,
    pub bf_fir_length: u32,
    pub bf_delay_len: u32,
    #[serde(serialize_with = "serialize_flag")]
    pub bf_nc_on_off: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub bf_amc_on_off: bool,
    pub nc_thr: f32,
    pub amc_thr: f32,
    pub amc_forgetting_factor: f32,

    // File I/O
    pub alpha: f32,
    pub audio_filename: String,
    #[serde(serialize_with = "serialize_flag")]
    pub audio_reset: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub audio_play: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub audio_repeat: bool,
    pub audio_recordfile: String,
    #[serde(serialize_with = "serialize_flag")]
    pub record_start: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub record_stop: bool,
    pub record_length: f32,
}

/// One-shot commands carried by a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSignals {
    pub afc_reset: bool,
    pub audio_reset: bool,
    pub audio_play: bool,
    pub audio_repeat: bool,
    pub record_start: bool,
    pub record_stop: bool,
}

impl PendingSignals {
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    /// Names of the raised signals, in encoding order
    pub fn names(&self) -> Vec<&'static str> {
        [
            ("afc_reset", self.afc_reset),
            ("audio_reset", self.audio_reset),
            ("audio_play", self.audio_play),
            ("audio_repeat", self.audio_repeat),
            ("record_start", self.record_start),
            ("record_stop", self.record_stop),
        ]
        .into_iter()
        .filter_map(|(name, raised)| raised.then_some(name))
        .collect()
    }

    /// Signals raised in either set
    pub fn union(&self, other: &PendingSignals) -> PendingSignals {
        PendingSignals {
            afc_reset: self.afc_reset || other.afc_reset,
            audio_reset: self.audio_reset || other.audio_reset,
            audio_play: self.audio_play || other.audio_play,
            audio_repeat: self.audio_repeat || other.audio_repeat,
            record_start: self.record_start || other.record_start,
            record_stop: self.record_stop || other.record_stop,
        }
    }

    /// Signals raised here but not in `previous` (0 to 1 transitions)
    pub fn raised_since(&self, previous: &PendingSignals) -> PendingSignals {
        PendingSignals {
            afc_reset: self.afc_reset && !previous.afc_reset,
            audio_reset: self.audio_reset && !previous.audio_reset,
            audio_play: self.audio_play && !previous.audio_play,
            audio_repeat: self.audio_repeat && !previous.audio_repeat,
            record_start: self.record_start && !previous.record_start,
            record_stop: self.record_stop && !previous.record_stop,
        }
    }
}

impl Default for ParameterRecord {
    /// Default record for the ten-band filterbank
    fn default() -> Self {
        Self::seeded(global::NUM_BANDS)
    }
}

impl ParameterRecord {
    /// Create a record with every field at its catalog default
    ///
    /// # Arguments
    /// * `band_count` - Band count of the active filterbank, fixed for the session
    ///
    /// # Errors
    /// `InvalidConfiguration` when `band_count` is zero.
    pub fn new(band_count: usize) -> ParamResult<Self> {
        if band_count == 0 {
            return Err(ParamError::InvalidConfiguration(
                "band count must be positive".to_string(),
            ));
        }
        Ok(Self::seeded(band_count))
    }

    fn seeded(n: usize) -> Self {
        Self {
            band_count: n,
            en_ha: global::EN_HA,
            rear_mics: global::REAR_MIC,
            aligned: defaults::ALIGNED,
            gain: noise::ATTENUATION,
            g50: BandVector::filled(n, wdrc::G50),
            g80: BandVector::filled(n, wdrc::G80),
            knee_low: BandVector::filled(n, wdrc::KNEE_LOW),
            mpo_band: BandVector::filled(n, wdrc::KNEE_HIGH),
            attack: BandVector::filled(n, peak_detect::ATTACK_TIME),
            release: BandVector::filled(n, peak_detect::RELEASE_TIME),
            global_mpo: wdrc::GLOBAL_MPO,
            noise_estimation_type: noise::NOISE_ESTIMATION,
            spectral_type: noise::SPECTRAL_TYPE,
            spectral_subtraction: noise::SPECTRAL_SUB,
            freping: freping::ON_OFF,
            freping_alpha: BandVector::filled(n, freping::ALPHA),
            afc: afc::ON_OFF,
            afc_reset: afc::RESET,
            afc_type: afc::TYPE,
            afc_delay: afc::DELAY,
            afc_mu: afc::MU,
            afc_rho: afc::RHO,
            afc_power_estimate: afc::PE,
            afc_delta: afc::DELTA,
            afc_alpha: afc::ALPHA,
            afc_beta: afc::BETA,
            afc_p: afc::P,
            afc_c: afc::C,
            bf: bf::ON_OFF,
            bf_type: bf::TYPE,
            bf_mu: bf::MU,
            bf_rho: bf::RHO,
            bf_delta: bf::DELTA,
            bf_c: bf::C,
            bf_power_estimate: bf::PW,
            bf_p: bf::P,
            bf_alpha: bf::ALPHA,
            bf_beta: bf::BETA,
            bf_fir_length: bf::FIR_LENGTH,
            bf_delay_len: bf::DELAY_LEN,
            bf_nc_on_off: bf::NC_ON_OFF,
            bf_amc_on_off: bf::AMC_ON_OFF,
            nc_thr: bf::NC_THR,
            amc_thr: bf::AMC_THR,
            amc_forgetting_factor: bf::AMC_FORGETTING_FACTOR,
            alpha: file_io::ALPHA,
            audio_filename: file_io::AUDIO_FILENAME.to_string(),
            audio_reset: file_io::AUDIO_RESET,
            audio_play: file_io::AUDIO_PLAY,
            audio_repeat: file_io::AUDIO_REPEAT,
            audio_recordfile: file_io::AUDIO_RECORDFILE.to_string(),
            record_start: file_io::RECORD_START,
            record_stop: file_io::RECORD_STOP,
            record_length: file_io::RECORD_LENGTH,
        }
    }

    /// Band count of the session this record belongs to
    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Read a field by name
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "en_ha" => FieldValue::Bool(self.en_ha),
            "rear_mics" => FieldValue::Bool(self.rear_mics),
            "aligned" => FieldValue::Bool(self.aligned),
            "gain" => FieldValue::Float(self.gain),
            "g50" => FieldValue::Bands(self.g50.to_vec()),
            "g80" => FieldValue::Bands(self.g80.to_vec()),
            "knee_low" => FieldValue::Bands(self.knee_low.to_vec()),
            "mpo_band" => FieldValue::Bands(self.mpo_band.to_vec()),
            "attack" => FieldValue::Bands(self.attack.to_vec()),
            "release" => FieldValue::Bands(self.release.to_vec()),
            "global_mpo" => FieldValue::Float(self.global_mpo),
            "noise_estimation_type" => FieldValue::Int(self.noise_estimation_type.code().into()),
            "spectral_type" => FieldValue::Int(self.spectral_type.code().into()),
            "spectral_subtraction" => FieldValue::Float(self.spectral_subtraction),
            "freping" => FieldValue::Bool(self.freping),
            "freping_alpha" => FieldValue::Bands(self.freping_alpha.to_vec()),
            "afc" => FieldValue::Bool(self.afc),
            "afc_reset" => FieldValue::Bool(self.afc_reset),
            "afc_type" => FieldValue::Int(self.afc_type.code().into()),
            "afc_delay" => FieldValue::Float(self.afc_delay),
            "afc_mu" => FieldValue::Float(self.afc_mu),
            "afc_rho" => FieldValue::Float(self.afc_rho),
            "afc_power_estimate" => FieldValue::Float(self.afc_power_estimate),
            "afc_delta" => FieldValue::Float(self.afc_delta),
            "afc_alpha" => FieldValue::Float(self.afc_alpha),
            "afc_beta" => FieldValue::Float(self.afc_beta),
            "afc_p" => FieldValue::Float(self.afc_p),
            "afc_c" => FieldValue::Float(self.afc_c),
            "bf" => FieldValue::Bool(self.bf),
            "bf_type" => FieldValue::Int(self.bf_type.code().into()),
            "bf_mu" => FieldValue::Float(self.bf_mu),
            "bf_rho" => FieldValue::Float(self.bf_rho),
            "bf_delta" => FieldValue::Float(self.bf_delta),
            "bf_c" => FieldValue::Float(self.bf_c),
            "bf_power_estimate" => FieldValue::Float(self.bf_power_estimate),
            "bf_p" => FieldValue::Float(self.bf_p),
            "bf_alpha" => FieldValue::Float(self.bf_alpha),
            "bf_beta" => FieldValue::Float(self.bf_beta),
            "bf_fir_length" => FieldValue::Int(self.bf_fir_length.into()),
            "bf_delay_len" => FieldValue::Int(self.bf_delay_len.into()),
            "bf_nc_on_off" => FieldValue::Bool(self.bf_nc_on_off),
            "bf_amc_on_off" => FieldValue::Bool(self.bf_amc_on_off),
            "nc_thr" => FieldValue::Float(self.nc_thr),
            "amc_thr" => FieldValue::Float(self.amc_thr),
            "amc_forgetting_factor" => FieldValue::Float(self.amc_forgetting_factor),
            "alpha" => FieldValue::Float(self.alpha),
            "audio_filename" => FieldValue::Text(self.audio_filename.clone()),
            "audio_reset" => FieldValue::Bool(self.audio_reset),
            "audio_play" => FieldValue::Bool(self.audio_play),
            "audio_repeat" => FieldValue::Bool(self.audio_repeat),
            "audio_recordfile" => FieldValue::Text(self.audio_recordfile.clone()),
            "record_start" => FieldValue::Bool(self.record_start),
            "record_stop" => FieldValue::Bool(self.record_stop),
            "record_length" => FieldValue::Float(self.record_length),
            _ => return None,
        };
        Some(value)
    }

    /// Update one field
    ///
    /// The value is checked against the field's kind, range and, for band
    /// vectors, the session band count before anything is written. On error
    /// the record is unchanged.
    pub fn set(&mut self, name: &str, value: FieldValue) -> ParamResult<()> {
        let spec = field_spec(name).ok_or_else(|| ParamError::UnknownField(name.to_string()))?;
        let n = self.band_count;
        let field = spec.name;

        match field {
            "en_ha" => self.en_ha = read_flag(spec, &value)?,
            "rear_mics" => self.rear_mics = read_flag(spec, &value)?,
            "aligned" => self.aligned = read_bool(spec, &value)?,
            "gain" => self.gain = read_float(spec, &value)?,
            "g50" => self.g50.assign(field, read_bands(spec, &value, n)?)?,
            "g80" => self.g80.assign(field, read_bands(spec, &value, n)?)?,
            "knee_low" => self.knee_low.assign(field, read_bands(spec, &value, n)?)?,
            "mpo_band" => self.mpo_band.assign(field, read_bands(spec, &value, n)?)?,
            "attack" => self.attack.assign(field, read_bands(spec, &value, n)?)?,
            "release" => self.release.assign(field, read_bands(spec, &value, n)?)?,
            "global_mpo" => self.global_mpo = read_float(spec, &value)?,
            "noise_estimation_type" => {
                self.noise_estimation_type =
                    NoiseEstimationType::from_code(field, read_code(spec, &value)?)?
            }
            "spectral_type" => {
                self.spectral_type = SpectralType::from_code(field, read_code(spec, &value)?)?
            }
            "spectral_subtraction" => self.spectral_subtraction = read_float(spec, &value)?,
            "freping" => self.freping = read_flag(spec, &value)?,
            "freping_alpha" => self.freping_alpha.assign(field, read_bands(spec, &value, n)?)?,
            "afc" => self.afc = read_flag(spec, &value)?,
            "afc_reset" => self.afc_reset = read_flag(spec, &value)?,
            "afc_type" => {
                self.afc_type = AdaptiveFilterType::from_code(field, read_code(spec, &value)?)?
            }
            "afc_delay" => self.afc_delay = read_float(spec, &value)?,
            "afc_mu" => self.afc_mu = read_float(spec, &value)?,
            "afc_rho" => self.afc_rho = read_float(spec, &value)?,
            "afc_power_estimate" => self.afc_power_estimate = read_float(spec, &value)?,
            "afc_delta" => self.afc_delta = read_float(spec, &value)?,
            "afc_alpha" => self.afc_alpha = read_float(spec, &value)?,
            "afc_beta" => self.afc_beta = read_float(spec, &value)?,
            "afc_p" => self.afc_p = read_float(spec, &value)?,
            "afc_c" => self.afc_c = read_float(spec, &value)?,
            "bf" => self.bf = read_flag(spec, &value)?,
            "bf_type" => {
                self.bf_type = AdaptiveFilterType::from_code(field, read_code(spec, &value)?)?
            }
            "bf_mu" => self.bf_mu = read_float(spec, &value)?,
            "bf_rho" => self.bf_rho = read_float(spec, &value)?,
            "bf_delta" => self.bf_delta = read_float(spec, &value)?,
            "bf_c" => self.bf_c = read_float(spec, &value)?,
            "bf_power_estimate" => self.bf_power_estimate = read_float(spec, &value)?,
            "bf_p" => self.bf_p = read_float(spec, &value)?,
            "bf_alpha" => self.bf_alpha = read_float(spec, &value)?,
            "bf_beta" => self.bf_beta = read_float(spec, &value)?,
            "bf_fir_length" => self.bf_fir_length = read_int(spec, &value)?,
            "bf_delay_len" => self.bf_delay_len = read_int(spec, &value)?,
            "bf_nc_on_off" => self.bf_nc_on_off = read_flag(spec, &value)?,
            "bf_amc_on_off" => self.bf_amc_on_off = read_flag(spec, &value)?,
            "nc_thr" => self.nc_thr = read_float(spec, &value)?,
            "amc_thr" => self.amc_thr = read_float(spec, &value)?,
            "amc_forgetting_factor" => self.amc_forgetting_factor = read_float(spec, &value)?,
            "alpha" => self.alpha = read_float(spec, &value)?,
            "audio_filename" => self.audio_filename = read_text(spec, &value)?,
            "audio_reset" => self.audio_reset = read_flag(spec, &value)?,
            "audio_play" => self.audio_play = read_flag(spec, &value)?,
            "audio_repeat" => self.audio_repeat = read_flag(spec, &value)?,
            "audio_recordfile" => self.audio_recordfile = read_text(spec, &value)?,
            "record_start" => self.record_start = read_flag(spec, &value)?,
            "record_stop" => self.record_stop = read_flag(spec, &value)?,
            "record_length" => self.record_length = read_float(spec, &value)?,
            other => return Err(ParamError::UnknownField(other.to_string())),
        }

        log::debug!("Parameter {} set to {}", field, value);
        Ok(())
    }

    /// Update one field from a JSON value
    pub fn set_json(&mut self, name: &str, value: &serde_json::Value) -> ParamResult<()> {
        let spec = field_spec(name).ok_or_else(|| ParamError::UnknownField(name.to_string()))?;
        let value = FieldValue::from_json(value).ok_or(ParamError::TypeMismatch {
            field: spec.name,
            expected: spec.kind.expected(),
        })?;
        self.set(name, value)
    }

    /// Apply a batch of field updates, all or nothing
    ///
    /// Updates are applied in order to a scratch copy; the record is replaced
    /// only if every update succeeds.
    pub fn apply<I, S>(&mut self, updates: I) -> ParamResult<()>
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: AsRef<str>,
    {
        let mut scratch = self.clone();
        for (name, value) in updates {
            scratch.set(name.as_ref(), value)?;
        }
        *self = scratch;
        Ok(())
    }

    /// Replace the whole record, all or nothing
    ///
    /// `other` is validated against this record's band count before any
    /// field is committed.
    pub fn replace(&mut self, other: ParameterRecord) -> ParamResult<()> {
        other.validate_for(self.band_count)?;
        let band_count = self.band_count;
        *self = other;
        self.band_count = band_count;
        Ok(())
    }

    /// Check every field against its kind, range and the band count
    pub fn validate(&self) -> ParamResult<()> {
        self.validate_for(self.band_count)
    }

    fn validate_for(&self, band_count: usize) -> ParamResult<()> {
        if band_count == 0 {
            return Err(ParamError::InvalidConfiguration(
                "band count must be positive".to_string(),
            ));
        }
        for spec in FIELDS.iter() {
            let value = self
                .get(spec.name)
                .ok_or_else(|| ParamError::UnknownField(spec.name.to_string()))?;
            check_field(spec, &value, band_count)?;
        }
        Ok(())
    }

    /// One-shot commands currently raised
    pub fn pending_signals(&self) -> PendingSignals {
        PendingSignals {
            afc_reset: self.afc_reset,
            audio_reset: self.audio_reset,
            audio_play: self.audio_play,
            audio_repeat: self.audio_repeat,
            record_start: self.record_start,
            record_stop: self.record_stop,
        }
    }

    /// Lower every one-shot command
    pub fn clear_signals(&mut self) {
        self.afc_reset = false;
        self.audio_reset = false;
        self.audio_play = false;
        self.audio_repeat = false;
        self.record_start = false;
        self.record_stop = false;
    }

    /// Set exactly the one-shot commands raised in `signals`
    pub fn set_signals(&mut self, signals: PendingSignals) {
        self.afc_reset = signals.afc_reset;
        self.audio_reset = signals.audio_reset;
        self.audio_play = signals.audio_play;
        self.audio_repeat = signals.audio_repeat;
        self.record_start = signals.record_start;
        self.record_stop = signals.record_stop;
    }

    /// Bands whose MPO exceeds the global MPO
    ///
    /// The global MPO is applied after the per-band limit, so such bands are
    /// physically inconsistent. The record does not reject them; the engine
    /// or the client decides what to do.
    pub fn mpo_violations(&self) -> Vec<usize> {
        self.mpo_band
            .iter()
            .enumerate()
            .filter(|(_, mpo)| **mpo > self.global_mpo)
            .map(|(band, _)| band)
            .collect()
    }
}

// ============================================================================
// Value checks
// ============================================================================

fn mismatch(spec: &FieldSpec) -> ParamError {
    ParamError::TypeMismatch {
        field: spec.name,
        expected: spec.kind.expected(),
    }
}

fn check_range(spec: &FieldSpec, value: f64) -> ParamResult<()> {
    let (min, max) = spec.range.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
    if !value.is_finite() || value < min || value > max {
        return Err(ParamError::OutOfRange {
            field: spec.name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn read_flag(spec: &FieldSpec, value: &FieldValue) -> ParamResult<bool> {
    value.as_flag().ok_or_else(|| mismatch(spec))
}

fn read_bool(spec: &FieldSpec, value: &FieldValue) -> ParamResult<bool> {
    match value {
        FieldValue::Bool(b) => Ok(*b),
        _ => Err(mismatch(spec)),
    }
}

fn read_float(spec: &FieldSpec, value: &FieldValue) -> ParamResult<f32> {
    let v = value.as_float().ok_or_else(|| mismatch(spec))?;
    check_range(spec, f64::from(v))?;
    Ok(v)
}

fn read_int(spec: &FieldSpec, value: &FieldValue) -> ParamResult<u32> {
    let v = value.as_int().ok_or_else(|| mismatch(spec))?;
    let (min, max) = spec.range.unwrap_or((0.0, f64::from(u32::MAX)));
    u32::try_from(v)
        .ok()
        .filter(|x| f64::from(*x) >= min && f64::from(*x) <= max)
        .ok_or(ParamError::OutOfRange {
            field: spec.name,
            value: v as f64,
            min,
            max,
        })
}

fn read_code(spec: &FieldSpec, value: &FieldValue) -> ParamResult<i64> {
    value.as_int().ok_or_else(|| mismatch(spec))
}

fn read_text(spec: &FieldSpec, value: &FieldValue) -> ParamResult<String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| mismatch(spec))
}

fn read_bands<'a>(
    spec: &FieldSpec,
    value: &'a FieldValue,
    band_count: usize,
) -> ParamResult<&'a [f32]> {
    let values = value.as_bands().ok_or_else(|| mismatch(spec))?;
    check_len(spec.name, band_count, values.len())?;
    for v in values {
        check_range(spec, f64::from(*v))?;
    }
    Ok(values)
}

fn check_field(spec: &FieldSpec, value: &FieldValue, band_count: usize) -> ParamResult<()> {
    match spec.kind {
        FieldKind::Flag | FieldKind::Signal => read_flag(spec, value).map(drop),
        FieldKind::Bool => read_bool(spec, value).map(drop),
        FieldKind::Float => read_float(spec, value).map(drop),
        FieldKind::Int => read_int(spec, value).map(drop),
        FieldKind::Text => read_text(spec, value).map(drop),
        FieldKind::Bands => read_bands(spec, value, band_count).map(drop),
        FieldKind::Selector(kind) => {
            let code = read_code(spec, value)?;
            match kind {
                SelectorKind::AdaptiveFilter => {
                    AdaptiveFilterType::from_code(spec.name, code).map(drop)
                }
                SelectorKind::NoiseEstimation => {
                    NoiseEstimationType::from_code(spec.name, code).map(drop)
                }
                SelectorKind::Spectral => SpectralType::from_code(spec.name, code).map(drop),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_broadcasts_defaults() {
        for n in [1, 4, 10, 32] {
            let record = ParameterRecord::new(n).unwrap();
            assert_eq!(record.band_count(), n);
            for (values, expected) in [
                (&record.g50, wdrc::G50),
                (&record.g80, wdrc::G80),
                (&record.knee_low, wdrc::KNEE_LOW),
                (&record.mpo_band, wdrc::KNEE_HIGH),
                (&record.attack, peak_detect::ATTACK_TIME),
                (&record.release, peak_detect::RELEASE_TIME),
                (&record.freping_alpha, freping::ALPHA),
            ] {
                assert_eq!(values.len(), n);
                assert!(values.iter().all(|&v| v == expected));
            }
        }
    }

    #[test]
    fn test_new_scalars_match_catalog() {
        let r = ParameterRecord::new(10).unwrap();

        assert_eq!(r.en_ha, global::EN_HA);
        assert_eq!(r.rear_mics, global::REAR_MIC);
        assert_eq!(r.aligned, defaults::ALIGNED);
        assert_eq!(r.gain, noise::ATTENUATION);
        assert_eq!(r.global_mpo, wdrc::GLOBAL_MPO);

        assert_eq!(r.noise_estimation_type, noise::NOISE_ESTIMATION);
        assert_eq!(r.spectral_type, noise::SPECTRAL_TYPE);
        assert_eq!(r.spectral_subtraction, noise::SPECTRAL_SUB);
        assert_eq!(r.freping, freping::ON_OFF);

        assert_eq!(r.afc, afc::ON_OFF);
        assert_eq!(r.afc_reset, afc::RESET);
        assert_eq!(r.afc_type, afc::TYPE);
        assert_eq!(i32::from(r.afc_type), global::AFC);
        assert_eq!(r.afc_delay, afc::DELAY);
        assert_eq!(r.afc_mu, afc::MU);
        assert_eq!(r.afc_rho, afc::RHO);
        assert_eq!(r.afc_power_estimate, afc::PE);
        assert_eq!(r.afc_delta, afc::DELTA);
        assert_eq!(r.afc_alpha, afc::ALPHA);
        assert_eq!(r.afc_beta, afc::BETA);
        assert_eq!(r.afc_p, afc::P);
        assert_eq!(r.afc_c, afc::C);

        assert_eq!(r.bf, bf::ON_OFF);
        assert_eq!(r.bf_type, bf::TYPE);
        assert_eq!(r.bf_mu, bf::MU);
        assert_eq!(r.bf_rho, bf::RHO);
        assert_eq!(r.bf_delta, bf::DELTA);
        assert_eq!(r.bf_c, bf::C);
        assert_eq!(r.bf_power_estimate, bf::PW);
        assert_eq!(r.bf_p, bf::P);
        assert_eq!(r.bf_alpha, bf::ALPHA);
        assert_eq!(r.bf_beta, bf::BETA);
        assert_eq!(r.bf_fir_length, bf::FIR_LENGTH);
        assert_eq!(r.bf_delay_len, bf::DELAY_LEN);
        assert_eq!(r.bf_nc_on_off, bf::NC_ON_OFF);
        assert_eq!(r.bf_amc_on_off, bf::AMC_ON_OFF);
        assert_eq!(r.nc_thr, bf::NC_THR);
        assert_eq!(r.amc_thr, bf::AMC_THR);
        assert_eq!(r.amc_forgetting_factor, bf::AMC_FORGETTING_FACTOR);

        assert_eq!(r.alpha, file_io::ALPHA);
        assert_eq!(r.audio_filename, file_io::AUDIO_FILENAME);
        assert_eq!(r.audio_reset, file_io::AUDIO_RESET);
        assert_eq!(r.audio_play, file_io::AUDIO_PLAY);
        assert_eq!(r.audio_repeat, file_io::AUDIO_REPEAT);
        assert_eq!(r.audio_recordfile, file_io::AUDIO_RECORDFILE);
        assert_eq!(r.record_start, file_io::RECORD_START);
        assert_eq!(r.record_stop, file_io::RECORD_STOP);
        assert_eq!(r.record_length, file_io::RECORD_LENGTH);

        assert!(r.pending_signals().is_empty());
        r.validate().unwrap();
    }

    #[test]
    fn test_zero_bands_rejected() {
        assert!(matches!(
            ParameterRecord::new(0),
            Err(ParamError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_default_uses_ten_bands() {
        assert_eq!(ParameterRecord::default().band_count(), 10);
        assert_eq!(ParameterRecord::default(), ParameterRecord::new(10).unwrap());
    }

    #[test]
    fn test_every_field_is_readable() {
        let record = ParameterRecord::new(3).unwrap();
        for spec in FIELDS.iter() {
            assert!(record.get(spec.name).is_some(), "missing getter for {}", spec.name);
        }
        assert!(record.get("num_bands").is_none());
    }

    #[test]
    fn test_every_field_round_trips_through_set() {
        let mut record = ParameterRecord::new(3).unwrap();
        let reference = record.clone();
        for spec in FIELDS.iter() {
            let value = reference.get(spec.name).unwrap();
            record.set(spec.name, value).unwrap();
        }
        assert_eq!(record, reference);
    }

    #[test]
    fn test_set_scalars() {
        let mut record = ParameterRecord::new(10).unwrap();
        record.set("gain", FieldValue::Float(-3.5)).unwrap();
        record.set("global_mpo", FieldValue::Int(110)).unwrap();
        record.set("en_ha", FieldValue::Int(0)).unwrap();
        record.set("rear_mics", FieldValue::Bool(true)).unwrap();
        record.set("afc_type", FieldValue::Int(-1)).unwrap();
        record.set("bf_type", FieldValue::Int(2)).unwrap();
        record.set("bf_fir_length", FieldValue::Int(128)).unwrap();
        record
            .set("audio_filename", FieldValue::from("/tmp/speech.wav"))
            .unwrap();

        assert_eq!(record.gain, -3.5);
        assert_eq!(record.global_mpo, 110.0);
        assert!(!record.en_ha);
        assert!(record.rear_mics);
        assert_eq!(record.afc_type, AdaptiveFilterType::PassThrough);
        assert_eq!(record.bf_type, AdaptiveFilterType::Ipnlms);
        assert_eq!(record.bf_fir_length, 128);
        assert_eq!(record.audio_filename, "/tmp/speech.wav");
    }

    #[test]
    fn test_set_vector_length_mismatch_leaves_record_unchanged() {
        let mut record = ParameterRecord::new(10).unwrap();
        let before = record.clone();
        let err = record
            .set("g50", FieldValue::Bands(vec![1.0; 9]))
            .unwrap_err();
        assert!(matches!(
            err,
            ParamError::LengthMismatch {
                field: "g50",
                expected: 10,
                actual: 9
            }
        ));
        assert_eq!(record, before);
    }

    #[test]
    fn test_set_unknown_selector_leaves_record_unchanged() {
        let mut record = ParameterRecord::new(10).unwrap();
        let before = record.clone();
        for code in [-2, 4, 42] {
            let err = record.set("afc_type", FieldValue::Int(code)).unwrap_err();
            assert!(matches!(
                err,
                ParamError::UnknownSelector { field: "afc_type", .. }
            ));
        }
        assert!(record.set("spectral_type", FieldValue::Int(2)).is_err());
        assert!(record.set("noise_estimation_type", FieldValue::Int(-1)).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_set_type_and_range_errors() {
        let mut record = ParameterRecord::new(4).unwrap();
        let before = record.clone();

        assert!(matches!(
            record.set("gain", FieldValue::from("loud")),
            Err(ParamError::TypeMismatch { field: "gain", .. })
        ));
        assert!(matches!(
            record.set("gain", FieldValue::Float(f32::NAN)),
            Err(ParamError::OutOfRange { field: "gain", .. })
        ));
        assert!(matches!(
            record.set("afc_rho", FieldValue::Float(1.5)),
            Err(ParamError::OutOfRange { field: "afc_rho", .. })
        ));
        assert!(matches!(
            record.set("attack", FieldValue::Bands(vec![5.0, -1.0, 5.0, 5.0])),
            Err(ParamError::OutOfRange { field: "attack", .. })
        ));
        assert!(matches!(
            record.set("bf_fir_length", FieldValue::Int(0)),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            record.set("en_ha", FieldValue::Int(2)),
            Err(ParamError::TypeMismatch { field: "en_ha", .. })
        ));
        assert!(matches!(
            record.set("aligned", FieldValue::Int(1)),
            Err(ParamError::TypeMismatch { field: "aligned", .. })
        ));
        assert!(matches!(
            record.set("num_bands", FieldValue::Int(4)),
            Err(ParamError::UnknownField(_))
        ));
        assert_eq!(record, before);
    }

    #[test]
    fn test_set_json() {
        let mut record = ParameterRecord::new(2).unwrap();
        record
            .set_json("knee_low", &serde_json::json!([40, 50.5]))
            .unwrap();
        record.set_json("afc", &serde_json::json!(false)).unwrap();
        assert_eq!(record.knee_low.as_slice(), &[40.0, 50.5]);
        assert!(!record.afc);
        assert!(matches!(
            record.set_json("afc_mu", &serde_json::json!(null)),
            Err(ParamError::TypeMismatch { field: "afc_mu", .. })
        ));
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut record = ParameterRecord::new(3).unwrap();
        let before = record.clone();

        let result = record.apply(vec![
            ("gain", FieldValue::Float(0.0)),
            ("g80", FieldValue::Bands(vec![1.0, 2.0])),
        ]);
        assert!(result.is_err());
        assert_eq!(record, before);

        record
            .apply(vec![
                ("gain", FieldValue::Float(0.0)),
                ("g80", FieldValue::Bands(vec![1.0, 2.0, 3.0])),
            ])
            .unwrap();
        assert_eq!(record.gain, 0.0);
        assert_eq!(record.g80.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_replace_validates_before_commit() {
        let mut record = ParameterRecord::new(10).unwrap();
        let before = record.clone();

        let other_session = ParameterRecord::new(6).unwrap();
        assert!(matches!(
            record.replace(other_session),
            Err(ParamError::LengthMismatch { expected: 10, actual: 6, .. })
        ));
        assert_eq!(record, before);

        let mut bad = ParameterRecord::new(10).unwrap();
        bad.gain = 3.0;
        bad.amc_forgetting_factor = 2.0;
        assert!(record.replace(bad).is_err());
        assert_eq!(record, before);

        let mut good = ParameterRecord::new(10).unwrap();
        good.gain = 3.0;
        good.g50[0] = 10.0;
        record.replace(good.clone()).unwrap();
        assert_eq!(record, good);
    }

    #[test]
    fn test_validate_catches_direct_writes() {
        let mut record = ParameterRecord::new(10).unwrap();
        record.g50 = BandVector::filled(4, 0.0);
        assert!(matches!(
            record.validate(),
            Err(ParamError::LengthMismatch { field: "g50", .. })
        ));

        let mut record = ParameterRecord::new(10).unwrap();
        record.record_length = f32::INFINITY;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_signals() {
        let mut record = ParameterRecord::new(10).unwrap();
        record.set("record_start", FieldValue::Int(1)).unwrap();
        record.set("afc_reset", FieldValue::Bool(true)).unwrap();

        let signals = record.pending_signals();
        assert!(signals.record_start);
        assert!(signals.afc_reset);
        assert_eq!(signals.names(), vec!["afc_reset", "record_start"]);

        record.clear_signals();
        assert!(record.pending_signals().is_empty());
    }

    #[test]
    fn test_signal_edges_and_union() {
        let previous = PendingSignals {
            record_start: true,
            audio_play: true,
            ..Default::default()
        };
        let current = PendingSignals {
            record_start: true,
            record_stop: true,
            ..Default::default()
        };

        let raised = current.raised_since(&previous);
        assert_eq!(raised.names(), vec!["record_stop"]);

        let merged = raised.union(&previous);
        assert_eq!(merged.names(), vec!["audio_play", "record_start", "record_stop"]);

        let mut record = ParameterRecord::new(2).unwrap();
        record.set_signals(merged);
        assert_eq!(record.pending_signals(), merged);
        record.set_signals(PendingSignals::default());
        assert!(record.pending_signals().is_empty());
    }

    #[test]
    fn test_mpo_violations() {
        let mut record = ParameterRecord::new(4).unwrap();
        assert!(record.mpo_violations().is_empty());
        record.global_mpo = 100.0;
        record.mpo_band.assign("mpo_band", &[90.0, 100.0, 105.0, 120.0]).unwrap();
        assert_eq!(record.mpo_violations(), vec![2, 3]);
    }
}
