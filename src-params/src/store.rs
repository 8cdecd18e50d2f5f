// ============================================================================
// Record Persistence
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::codec::Format;
use crate::errors::ParamResult;
use crate::record::ParameterRecord;

/// Write a record to `path`, in the format given by its extension
///
/// The record is written to a temporary file next to `path` and renamed over
/// it, so a concurrent reader (or the file watcher) sees either the old or
/// the new file, never a partial one.
pub fn save(path: &Path, record: &ParameterRecord) -> ParamResult<()> {
    let format = Format::from_path(path)?;
    let text = format.encode(record)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(text.as_bytes())?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    log::info!("Saved parameter record to {:?}", path);
    Ok(())
}

/// Read a record for a session of `band_count` bands from `path`
pub fn load(path: &Path, band_count: usize) -> ParamResult<ParameterRecord> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path)?;
    let record = format.decode(&text, band_count)?;
    log::debug!("Loaded parameter record from {:?}", path);
    Ok(record)
}

/// Change one field of a persisted record and save it back
///
/// One-shot signals read from the file are dropped before the change is
/// applied: they were raised by an earlier edit and already handed to the
/// engine, so only a signal named by this edit is written out as raised.
pub fn update_field(
    path: &Path,
    band_count: usize,
    name: &str,
    value: &serde_json::Value,
) -> ParamResult<ParameterRecord> {
    let mut record = load(path, band_count)?;
    record.clear_signals();
    record.set_json(name, value)?;
    save(path, &record)?;
    Ok(record)
}
