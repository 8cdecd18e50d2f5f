// ============================================================================
// Defaults Catalog
// ============================================================================
//
// Default values for the ten-band multirate setup. Every field of
// `ParameterRecord` is seeded from exactly one constant here; band vectors
// broadcast the scalar default to the session band count.

use crate::selectors::{AdaptiveFilterType, NoiseEstimationType, SpectralType};

/// Filterbank channel alignment
pub const ALIGNED: bool = true;

/// Session-wide settings
pub mod global {
    pub const NUM_CHANNEL: u32 = 2;
    pub const EN_HA: bool = true;
    /// AFC group code carried by the multirate setup; also the `afc_type` seed
    pub const AFC: i32 = 3;
    pub const REAR_MIC: bool = false;
    pub const SAMP_FREQ: u32 = 48000;
    /// Band count of the ten-band multirate filterbank
    pub const NUM_BANDS: usize = 10;
}

/// Peak detector
pub mod peak_detect {
    /// Attack time in msec
    pub const ATTACK_TIME: f32 = 5.0;
    /// Release time in msec
    pub const RELEASE_TIME: f32 = 20.0;
}

/// Wide dynamic range compression
pub mod wdrc {
    pub const G50: f32 = 0.0;
    pub const G80: f32 = 0.0;
    /// Lower kneepoint in dB SPL, same value for all bands
    pub const KNEE_LOW: f32 = 45.0;
    /// Upper kneepoint in dB SPL, seeds the per-band MPO
    pub const KNEE_HIGH: f32 = 120.0;
    pub const GLOBAL_MPO: f32 = 120.0;
}

/// Noise management
pub mod noise {
    use super::{NoiseEstimationType, SpectralType};

    pub const NOISE_ESTIMATION: NoiseEstimationType = NoiseEstimationType::Disabled;
    pub const SPECTRAL_SUB: f32 = 0.0;
    pub const SPECTRAL_TYPE: SpectralType = SpectralType::Disabled;
    /// Output attenuation in dB, seeds the global gain
    pub const ATTENUATION: f32 = -20.0;
}

/// Frequency-dependent processing
pub mod freping {
    pub const ON_OFF: bool = false;
    pub const ALPHA: f32 = 0.0;
}

/// Adaptive feedback cancellation
pub mod afc {
    use super::AdaptiveFilterType;

    pub const ON_OFF: bool = true;
    /// Reset the AFC taps; a one-shot signal
    pub const RESET: bool = false;
    /// The multirate header seeds `afc_type` with the whole AFC group, which
    /// is not an algorithm code. Code 3 (SLMS, matching `global::AFC`) is the
    /// chosen default.
    pub const TYPE: AdaptiveFilterType = AdaptiveFilterType::Slms;
    /// Delay in msec for 32 kHz before the band-limiting filter (150 samples)
    pub const DELAY: f32 = 4.6875;
    /// Step size
    pub const MU: f32 = 0.005;
    /// Forgetting factor
    pub const RHO: f32 = 0.9;
    /// Power estimate
    pub const PE: f32 = 0.0;
    // IPNLMS
    pub const DELTA: f32 = 1e-6;
    pub const ALPHA: f32 = 0.0;
    pub const BETA: f32 = 5.0;
    // SLMS
    pub const P: f32 = 1.5;
    pub const C: f32 = 1e-6;
}

/// Beamformer
pub mod bf {
    use super::AdaptiveFilterType;

    pub const ON_OFF: bool = false;
    pub const TYPE: AdaptiveFilterType = AdaptiveFilterType::Slms;
    pub const MU: f32 = 0.01;
    pub const RHO: f32 = 0.985;
    pub const DELTA: f32 = 1e-6;
    pub const C: f32 = 1e-3;
    pub const PW: f32 = 0.0;
    pub const P: f32 = 1.3;
    pub const ALPHA: f32 = 0.0;
    pub const BETA: f32 = 150.0;
    pub const FIR_LENGTH: u32 = 319;
    pub const DELAY_LEN: u32 = 160;
    /// Noise canceller
    pub const NC_ON_OFF: bool = false;
    /// Automatic mic combination
    pub const AMC_ON_OFF: bool = false;
    pub const NC_THR: f32 = 1.0;
    pub const AMC_THR: f32 = 2.0;
    pub const AMC_FORGETTING_FACTOR: f32 = 0.8;
}

/// File-based audio playback and recording
pub mod file_io {
    pub const ALPHA: f32 = 0.0;
    pub const AUDIO_FILENAME: &str = "";
    pub const AUDIO_RECORDFILE: &str = "sample.wav";
    /// Recording length in seconds
    pub const RECORD_LENGTH: f32 = 5.0;
    pub const AUDIO_RESET: bool = false;
    pub const AUDIO_PLAY: bool = false;
    pub const AUDIO_REPEAT: bool = false;
    pub const RECORD_START: bool = false;
    pub const RECORD_STOP: bool = false;
}
