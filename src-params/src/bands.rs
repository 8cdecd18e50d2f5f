// ============================================================================
// Band Vector - per-band values with a length fixed at creation
// ============================================================================

use crate::errors::{ParamError, ParamResult};
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// Per-band values indexed by filterbank band, ascending frequency
///
/// The length is fixed when the vector is created. Individual entries can be
/// written through `DerefMut`, which exposes a slice and therefore cannot
/// change the length; whole-vector replacement goes through [`assign`].
///
/// [`assign`]: BandVector::assign
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandVector(Vec<f32>);

impl BandVector {
    /// Create a vector of `bands` entries, all equal to `value`
    pub fn filled(bands: usize, value: f32) -> Self {
        Self(vec![value; bands])
    }

    /// Replace every entry, keeping the length
    ///
    /// Fails with `LengthMismatch` when `values` has a different length; the
    /// vector is left untouched in that case.
    pub fn assign(&mut self, field: &'static str, values: &[f32]) -> ParamResult<()> {
        check_len(field, self.0.len(), values.len())?;
        self.0.copy_from_slice(values);
        Ok(())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.clone()
    }
}

impl Deref for BandVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl DerefMut for BandVector {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }
}

/// Check a band vector length against the session band count
pub fn check_len(field: &'static str, expected: usize, actual: usize) -> ParamResult<()> {
    if expected != actual {
        return Err(ParamError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
