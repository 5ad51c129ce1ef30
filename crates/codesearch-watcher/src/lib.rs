//! Change detector and file watcher (spec §4.6).
//!
//! Two independent concerns live here: [`change_detection`] decides whether
//! a freshly scanned file record differs enough from the stored one to
//! warrant re-indexing; [`watcher`] and [`state`] implement the reactive
//! side — debounced filesystem events driving a per-source
//! Idle/Pending/Running state machine.

pub mod change_detection;
pub mod error;
pub mod state;
pub mod watcher;

pub use change_detection::needs_reindex;
pub use error::WatcherError;
pub use state::{SourceWatch, WatchState};
pub use watcher::{FileChangeBatch, FileChangeEvent, SourceWatcher, WatcherConfig};
