// ============================================================================
// Algorithm Selectors
// ============================================================================
//
// Small integer enumerations indexing algorithm tables owned by the DSP
// engine. On the wire they are plain integers.

use crate::errors::{ParamError, ParamResult};
use serde::Serialize;
use std::fmt;

/// Adaptation algorithm used by the feedback canceller and the beamformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
pub enum AdaptiveFilterType {
    /// Filter output forced to zero, input passed through untouched
    PassThrough,
    /// Keep the current taps, stop adapting
    StopAdaptation,
    /// Filtered-x LMS
    Fxlms,
    /// Improved proportionate normalized LMS (uses delta, alpha, beta)
    Ipnlms,
    /// Sparsity-promoting LMS (uses p, c)
    Slms,
}

impl AdaptiveFilterType {
    pub const ALL: [AdaptiveFilterType; 5] = [
        AdaptiveFilterType::PassThrough,
        AdaptiveFilterType::StopAdaptation,
        AdaptiveFilterType::Fxlms,
        AdaptiveFilterType::Ipnlms,
        AdaptiveFilterType::Slms,
    ];

    pub fn code(self) -> i32 {
        match self {
            AdaptiveFilterType::PassThrough => -1,
            AdaptiveFilterType::StopAdaptation => 0,
            AdaptiveFilterType::Fxlms => 1,
            AdaptiveFilterType::Ipnlms => 2,
            AdaptiveFilterType::Slms => 3,
        }
    }

    /// Look up the algorithm for a wire code, reporting `field` on failure
    pub fn from_code(field: &'static str, code: i64) -> ParamResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| i64::from(t.code()) == code)
            .ok_or(ParamError::UnknownSelector { field, value: code })
    }

    /// Whether the taps are being updated at all
    pub fn adapts(self) -> bool {
        matches!(
            self,
            AdaptiveFilterType::Fxlms | AdaptiveFilterType::Ipnlms | AdaptiveFilterType::Slms
        )
    }

    /// Whether `delta`, `alpha` and `beta` affect the algorithm
    pub fn uses_proportionate_terms(self) -> bool {
        self == AdaptiveFilterType::Ipnlms
    }

    /// Whether `p` and `c` affect the algorithm
    pub fn uses_sparsity_terms(self) -> bool {
        self == AdaptiveFilterType::Slms
    }
}

impl From<AdaptiveFilterType> for i32 {
    fn from(value: AdaptiveFilterType) -> Self {
        value.code()
    }
}

impl fmt::Display for AdaptiveFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdaptiveFilterType::PassThrough => "pass-through",
            AdaptiveFilterType::StopAdaptation => "stop adaptation",
            AdaptiveFilterType::Fxlms => "FXLMS",
            AdaptiveFilterType::Ipnlms => "IPNLMS",
            AdaptiveFilterType::Slms => "SLMS",
        };
        write!(f, "{}", name)
    }
}

/// Noise power estimator feeding spectral subtraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
pub enum NoiseEstimationType {
    Disabled,
    Arslan,
    HirschEhrlicher,
    CohenBerdugo,
}

impl NoiseEstimationType {
    pub const ALL: [NoiseEstimationType; 4] = [
        NoiseEstimationType::Disabled,
        NoiseEstimationType::Arslan,
        NoiseEstimationType::HirschEhrlicher,
        NoiseEstimationType::CohenBerdugo,
    ];

    pub fn code(self) -> i32 {
        match self {
            NoiseEstimationType::Disabled => 0,
            NoiseEstimationType::Arslan => 1,
            NoiseEstimationType::HirschEhrlicher => 2,
            NoiseEstimationType::CohenBerdugo => 3,
        }
    }

    pub fn from_code(field: &'static str, code: i64) -> ParamResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| i64::from(t.code()) == code)
            .ok_or(ParamError::UnknownSelector { field, value: code })
    }
}

impl From<NoiseEstimationType> for i32 {
    fn from(value: NoiseEstimationType) -> Self {
        value.code()
    }
}

/// Spectral subtraction variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
pub enum SpectralType {
    Disabled,
    PowerSubtraction,
}

impl SpectralType {
    pub const ALL: [SpectralType; 2] = [SpectralType::Disabled, SpectralType::PowerSubtraction];

    pub fn code(self) -> i32 {
        match self {
            SpectralType::Disabled => 0,
            SpectralType::PowerSubtraction => 1,
        }
    }

    pub fn from_code(field: &'static str, code: i64) -> ParamResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| i64::from(t.code()) == code)
            .ok_or(ParamError::UnknownSelector { field, value: code })
    }
}

impl From<SpectralType> for i32 {
    fn from(value: SpectralType) -> Self {
        value.code()
    }
}

/// Which enumeration a selector field draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    AdaptiveFilter,
    NoiseEstimation,
    Spectral,
}

impl SelectorKind {
    /// Valid wire codes, in ascending order
    pub fn codes(self) -> Vec<i32> {
        match self {
            SelectorKind::AdaptiveFilter => {
                AdaptiveFilterType::ALL.iter().map(|t| t.code()).collect()
            }
            SelectorKind::NoiseEstimation => {
                NoiseEstimationType::ALL.iter().map(|t| t.code()).collect()
            }
            SelectorKind::Spectral => SpectralType::ALL.iter().map(|t| t.code()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_filter_codes() {
        for t in AdaptiveFilterType::ALL {
            assert_eq!(AdaptiveFilterType::from_code("afc_type", t.code() as i64).unwrap(), t);
        }
        assert_eq!(AdaptiveFilterType::PassThrough.code(), -1);
        assert_eq!(AdaptiveFilterType::Slms.code(), 3);
    }

    #[test]
    fn test_unknown_codes_are_rejected() {
        for code in [-2, 4, 100] {
            match AdaptiveFilterType::from_code("afc_type", code) {
                Err(ParamError::UnknownSelector { field, value }) => {
                    assert_eq!(field, "afc_type");
                    assert_eq!(value, code);
                }
                other => panic!("Expected UnknownSelector, got {:?}", other),
            }
        }
        assert!(NoiseEstimationType::from_code("noise_estimation_type", 4).is_err());
        assert!(SpectralType::from_code("spectral_type", -1).is_err());
    }

    #[test]
    fn test_algorithm_specific_terms() {
        assert!(AdaptiveFilterType::Ipnlms.uses_proportionate_terms());
        assert!(!AdaptiveFilterType::Ipnlms.uses_sparsity_terms());
        assert!(AdaptiveFilterType::Slms.uses_sparsity_terms());
        assert!(!AdaptiveFilterType::StopAdaptation.adapts());
        assert!(!AdaptiveFilterType::PassThrough.adapts());
        assert!(AdaptiveFilterType::Fxlms.adapts());
    }

    #[test]
    fn test_selector_kind_codes() {
        assert_eq!(SelectorKind::AdaptiveFilter.codes(), vec![-1, 0, 1, 2, 3]);
        assert_eq!(SelectorKind::NoiseEstimation.codes(), vec![0, 1, 2, 3]);
        assert_eq!(SelectorKind::Spectral.codes(), vec![0, 1]);
    }
}
