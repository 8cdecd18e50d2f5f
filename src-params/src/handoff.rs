// ============================================================================
// Parameter Handoff - publishing records to the real-time engine
// ============================================================================
//
// Writers serialize on a mutex, mutate a private copy, validate it and swap
// it in. The engine reads the published record through a lock-free snapshot
// and therefore never waits on a writer and never sees a half-applied update.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{ParamError, ParamResult};
use crate::fields::FieldValue;
use crate::record::{ParameterRecord, PendingSignals};

struct Inner {
    published: ArcSwap<ParameterRecord>,
    writer: Mutex<()>,
    generation: AtomicU64,
}

/// Shared handle to the record the engine processes with
///
/// Cloning the handle shares the same published record.
///
/// # Example
/// ```
/// use rtmha_params::{ParameterRecord, SharedParameters, FieldValue};
///
/// let shared = SharedParameters::new(ParameterRecord::new(10).unwrap()).unwrap();
/// shared.set("gain", FieldValue::Float(-6.0)).unwrap();
///
/// // Audio thread, between processing blocks
/// let params = shared.snapshot();
/// assert_eq!(params.gain, -6.0);
/// ```
#[derive(Clone)]
pub struct SharedParameters {
    inner: Arc<Inner>,
}

impl SharedParameters {
    /// Publish an initial record; it must pass validation
    pub fn new(record: ParameterRecord) -> ParamResult<Self> {
        record.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                published: ArcSwap::from_pointee(record),
                writer: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Current record, as last published
    ///
    /// Never blocks. The returned record stays valid and unchanged for as
    /// long as the caller holds it, even if newer records are published.
    pub fn snapshot(&self) -> Arc<ParameterRecord> {
        self.inner.published.load_full()
    }

    /// Number of records published since creation
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Band count of the session
    pub fn band_count(&self) -> usize {
        self.inner.published.load().band_count()
    }

    /// Mutate a copy of the current record and publish it
    ///
    /// The copy is discarded if `f` fails, if it no longer validates, or if
    /// `f` swapped in a record for a different band count.
    pub fn update<F>(&self, f: F) -> ParamResult<Arc<ParameterRecord>>
    where
        F: FnOnce(&mut ParameterRecord) -> ParamResult<()>,
    {
        let _guard = self.inner.writer.lock();

        let current = self.inner.published.load_full();
        let mut next = ParameterRecord::clone(&current);
        f(&mut next)?;

        if next.band_count() != current.band_count() {
            return Err(ParamError::InvalidConfiguration(format!(
                "band count changed from {} to {} during update",
                current.band_count(),
                next.band_count()
            )));
        }
        next.validate()?;

        Ok(self.publish(next))
    }

    /// Update one field
    pub fn set(&self, name: &str, value: FieldValue) -> ParamResult<Arc<ParameterRecord>> {
        self.update(|record| record.set(name, value))
    }

    /// Replace the whole record
    pub fn replace(&self, record: ParameterRecord) -> ParamResult<Arc<ParameterRecord>> {
        self.update(|current| current.replace(record))
    }

    /// Replace the whole record, merging one-shot signals instead of copying them
    ///
    /// Signals already pending in the published record stay pending, and
    /// `raised` is added to them. The signal fields of `record` itself are
    /// ignored, so a record that still carries an already consumed command
    /// does not fire it again.
    pub fn replace_merging_signals(
        &self,
        record: ParameterRecord,
        raised: PendingSignals,
    ) -> ParamResult<Arc<ParameterRecord>> {
        self.update(|current| {
            let pending = current.pending_signals().union(&raised);
            current.replace(record)?;
            current.set_signals(pending);
            Ok(())
        })
    }

    /// Consume the pending one-shot signals
    ///
    /// Called by the engine at a block boundary. Signals are read and cleared
    /// under the writer lock, so a signal raised any number of times before
    /// a consume is returned exactly once.
    pub fn take_signals(&self) -> PendingSignals {
        let _guard = self.inner.writer.lock();

        let current = self.inner.published.load_full();
        let signals = current.pending_signals();
        if !signals.is_empty() {
            let mut next = ParameterRecord::clone(&current);
            next.clear_signals();
            self.publish(next);
            log::debug!("Consumed signals: {:?}", signals.names());
        }
        signals
    }

    // Caller must hold the writer lock
    fn publish(&self, record: ParameterRecord) -> Arc<ParameterRecord> {
        let record = Arc::new(record);
        self.inner.published.store(Arc::clone(&record));
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("Published parameter record generation {}", generation);
        record
    }
}
