// ============================================================================
// Parameter File Watcher - hot reload of a persisted record
// ============================================================================
//
// Watches the directory holding a session file and republishes the record
// through `SharedParameters` whenever the file is written. The directory is
// watched rather than the file itself because saves replace the file by
// renaming a temporary over it.
//
// One-shot signals in the file are edge-triggered: a reload raises a signal
// only when it goes from 0 in the previously loaded file to 1 in the new
// one, and never lowers a signal the engine has not consumed yet.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

use crate::errors::{ParamError, ParamResult};
use crate::handoff::SharedParameters;
use crate::record::PendingSignals;
use crate::store;

/// Quiet period used to coalesce the bursts of events a single save produces
const SETTLE_TIME: Duration = Duration::from_millis(50);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a reload attempt
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The file was loaded and published
    Reloaded { path: PathBuf, generation: u64 },
    /// The file could not be loaded or did not validate; the published record is unchanged
    Rejected { path: PathBuf, reason: String },
}

/// Watcher handle; stops the watcher thread on drop
pub struct ParamWatcher {
    event_rx: Receiver<WatchEvent>,
    shutdown_tx: Option<Sender<()>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl ParamWatcher {
    /// Start watching `path` and publish every valid version of it to `shared`
    ///
    /// The file itself does not need to exist yet, but its directory does.
    pub fn spawn(path: PathBuf, shared: SharedParameters) -> ParamResult<Self> {
        let (change_tx, change_rx) = channel();
        let file_watcher = setup_file_watcher(&path, change_tx)?;

        // Signals already in the file were raised before we started watching
        let file_signals = store::load(&path, shared.band_count())
            .map(|record| record.pending_signals())
            .unwrap_or_default();

        let (event_tx, event_rx) = channel();
        let (shutdown_tx, shutdown_rx) = channel();

        let thread_handle = thread::Builder::new()
            .name("param-watcher".to_string())
            .spawn(move || {
                // Dropping the notify watcher stops the event stream
                let _file_watcher = file_watcher;
                run_param_watcher(path, shared, file_signals, change_rx, event_tx, shutdown_rx);
            })?;

        Ok(Self {
            event_rx,
            shutdown_tx: Some(shutdown_tx),
            thread_handle: Some(thread_handle),
        })
    }

    /// Try to receive a reload event (non-blocking)
    pub fn try_recv(&self) -> Option<WatchEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a reload event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stop the watcher thread and wait for it to exit
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.thread_handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for ParamWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_param_watcher(
    path: PathBuf,
    shared: SharedParameters,
    mut file_signals: PendingSignals,
    change_rx: Receiver<()>,
    event_tx: Sender<WatchEvent>,
    shutdown_rx: Receiver<()>,
) {
    log::info!("Watching parameter file {:?}", path);

    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(std::sync::mpsc::TryRecvError::Disconnected) => break,
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
        }

        match change_rx.recv_timeout(POLL_INTERVAL) {
            Ok(()) => {
                // Drain the rest of the burst before reading the file
                while change_rx.recv_timeout(SETTLE_TIME).is_ok() {}
                let event = reload(&path, &shared, &mut file_signals);
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("Stopped watching {:?}", path);
}

/// Load `path` and publish it; `file_signals` tracks the signals of the last
/// file that was published
fn reload(path: &Path, shared: &SharedParameters, file_signals: &mut PendingSignals) -> WatchEvent {
    let result = store::load(path, shared.band_count()).and_then(|record| {
        let loaded = record.pending_signals();
        let raised = loaded.raised_since(&*file_signals);
        shared.replace_merging_signals(record, raised)?;
        Ok((loaded, raised))
    });
    match result {
        Ok((loaded, raised)) => {
            *file_signals = loaded;
            if !raised.is_empty() {
                log::debug!("Signals raised by {:?}: {:?}", path, raised.names());
            }
            let generation = shared.generation();
            log::info!("Reloaded {:?} (generation {})", path, generation);
            WatchEvent::Reloaded {
                path: path.to_path_buf(),
                generation,
            }
        }
        Err(e) => {
            log::warn!("Rejected {:?}: {}", path, e);
            WatchEvent::Rejected {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

fn setup_file_watcher(path: &Path, change_tx: Sender<()>) -> ParamResult<RecommendedWatcher> {
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| ParamError::InvalidConfiguration(format!("Invalid watch path {:?}", path)))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if relevant {
                    change_tx.send(()).ok();
                }
            }
            Err(e) => log::warn!("Watch error: {}", e),
        },
        Config::default(),
    )
    .map_err(|e| ParamError::Io(std::io::Error::other(e.to_string())))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| ParamError::Io(std::io::Error::other(e.to_string())))?;

    Ok(watcher)
}
