//! Filesystem watching with debouncing and per-source event batching.
//!
//! One [`SourceWatcher`] watches one enabled, `auto_reindex` source. Events
//! coalesce into a pending set and flush as a [`FileChangeBatch`] tagged
//! with the owning `source_id` after the quiescence window elapses with no
//! further events for that source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::error::WatcherError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

#[derive(Debug, Clone)]
pub struct FileChangeBatch {
    pub source_id: i64,
    pub events: Vec<FileChangeEvent>,
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub max_batch_size: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(3),
            max_batch_size: 500,
        }
    }
}

struct PendingEntry {
    event: FileChangeEvent,
    seen_at: Instant,
}

/// Watches one source root and emits debounced, batched change events on a
/// broadcast channel. Several `SourceWatcher`s can share one `notify`
/// backend in a future revision; for now each owns its own.
pub struct SourceWatcher {
    source_id: i64,
    config: WatcherConfig,
    watcher: Option<RecommendedWatcher>,
    sender: broadcast::Sender<FileChangeBatch>,
    pending: Arc<Mutex<HashMap<PathBuf, PendingEntry>>>,
}

impl SourceWatcher {
    pub fn new(source_id: i64, config: WatcherConfig) -> Self {
        let (sender, _) = broadcast::channel(128);
        Self {
            source_id,
            config,
            watcher: None,
            sender,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileChangeBatch> {
        self.sender.subscribe()
    }

    pub fn watch(&mut self, root: &Path) -> Result<(), WatcherError> {
        if !root.exists() {
            return Err(WatcherError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(WatcherError::InvalidPath(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let pending = self.pending.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => record_event(&pending, event),
                Err(e) => error!("file watcher error: {e}"),
            },
            Config::default(),
        )
        .map_err(|e| WatcherError::Notify(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| WatcherError::Notify(e.to_string()))?;

        self.watcher = Some(watcher);
        info!(source_id = self.source_id, root = %root.display(), "watching source for changes");
        Ok(())
    }

    pub fn unwatch(&mut self, root: &Path) -> Result<(), WatcherError> {
        let Some(watcher) = self.watcher.as_mut() else {
            return Ok(());
        };
        watcher
            .unwatch(root)
            .map_err(|e| WatcherError::Notify(e.to_string()))?;
        info!(source_id = self.source_id, root = %root.display(), "stopped watching source");
        Ok(())
    }

    /// Flushes events whose debounce window has elapsed into a batch on the
    /// broadcast channel. Call this periodically (e.g. every second) from a
    /// tokio interval; on shutdown, stop calling it and let in-flight
    /// consumers drain their current batch — no new ones are produced.
    pub fn flush_ready(&self) {
        let now = Instant::now();
        let mut pending = self.pending.lock();

        let ready: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.seen_at) >= self.config.debounce)
            .map(|(path, _)| path.clone())
            .take(self.config.max_batch_size)
            .collect();

        if ready.is_empty() {
            return;
        }

        let events: Vec<FileChangeEvent> = ready
            .iter()
            .filter_map(|path| pending.remove(path).map(|e| e.event))
            .collect();

        let count = events.len();
        let batch = FileChangeBatch {
            source_id: self.source_id,
            events,
        };
        if let Err(e) = self.sender.send(batch) {
            warn!(source_id = self.source_id, "no subscriber for change batch: {e}");
        } else {
            debug!(source_id = self.source_id, count, "flushed file change batch");
        }
    }
}

fn record_event(pending: &Arc<Mutex<HashMap<PathBuf, PendingEntry>>>, event: notify::Event) {
    let change = match event.kind {
        notify::EventKind::Create(_) => FileChangeEvent::Created,
        notify::EventKind::Modify(_) => FileChangeEvent::Modified,
        notify::EventKind::Remove(_) => FileChangeEvent::Deleted,
        _ => return,
    };

    let mut pending = pending.lock();
    let now = Instant::now();
    for path in event.paths {
        pending.insert(
            path.clone(),
            PendingEntry {
                event: change(path),
                seen_at: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_rejects_nonexistent_path() {
        let mut watcher = SourceWatcher::new(1, WatcherConfig::default());
        let err = watcher.watch(Path::new("/definitely/not/real")).unwrap_err();
        assert!(matches!(err, WatcherError::NotFound(_)));
    }

    #[test]
    fn watch_rejects_file_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let mut watcher = SourceWatcher::new(1, WatcherConfig::default());
        let err = watcher.watch(&file).unwrap_err();
        assert!(matches!(err, WatcherError::InvalidPath(_)));
    }

    #[test]
    fn flush_ready_is_a_no_op_with_nothing_pending() {
        let watcher = SourceWatcher::new(1, WatcherConfig::default());
        watcher.flush_ready();
    }

    #[test]
    fn events_below_debounce_window_are_not_flushed() {
        let watcher = SourceWatcher::new(
            1,
            WatcherConfig {
                debounce: Duration::from_secs(60),
                max_batch_size: 10,
            },
        );
        record_event(
            &watcher.pending,
            notify::Event::new(notify::EventKind::Create(notify::event::CreateKind::File))
                .add_path(PathBuf::from("/tmp/a")),
        );
        let mut rx = watcher.subscribe();
        watcher.flush_ready();
        assert!(rx.try_recv().is_err(), "nothing should flush before the debounce window elapses");
    }
}
