//! `codesearch serve` (§10.5, §5): the only subcommand that starts the HTTP
//! listener. Also starts one debounced filesystem watcher per enabled,
//! `auto_reindex` source, each driven by its own `SourceWatch` state machine
//! (Idle/Pending/Running) so sources reindex independently and in parallel,
//! subject to a global concurrency cap.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use codesearch_core::entities::{Source, SourceFilter};
use codesearch_watcher::{FileChangeBatch, SourceWatch, SourceWatcher, WatcherConfig as FsWatcherConfig};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ServerResult;
use crate::http::ApiServer;
use crate::AppContext;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured HTTP port
    #[arg(long)]
    pub port: Option<u16>,
}

/// Drains a watcher's broadcast channel into `watch`'s state machine for as
/// long as the channel stays open. Runs alongside the tick loop below so an
/// event arriving mid-pass is recorded immediately, not lost until the next
/// tick.
async fn record_events(mut rx: Receiver<FileChangeBatch>, watch: Arc<Mutex<SourceWatch>>) {
    loop {
        match rx.recv().await {
            Ok(_batch) => watch.lock().await.record_event(),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// One source's half of the supervisor: flushes the watcher's debounce
/// window every tick and, once `watch` is `Pending`, acquires a permit from
/// the shared concurrency cap before running an incremental reindex.
async fn run_source_supervisor(
    ctx: AppContext,
    source: Source,
    watcher: SourceWatcher,
    semaphore: Arc<Semaphore>,
) {
    let watch = Arc::new(Mutex::new(SourceWatch::default()));
    let receiver = tokio::spawn(record_events(watcher.subscribe(), Arc::clone(&watch)));

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        watcher.flush_ready();

        let should_run = watch.lock().await.try_start_pass();
        if !should_run {
            continue;
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        info!(source_id = source.source_id, "filesystem changes settled, triggering incremental reindex");
        if let Err(e) = ctx
            .indexing_service
            .reindex_source(&source, Vec::new(), Vec::new(), false)
            .await
        {
            error!(source_id = source.source_id, error = %e, "auto-reindex pass failed");
        }
        drop(permit);
        watch.lock().await.finish_pass();
    }
    receiver.abort();
}

pub async fn run(ctx: AppContext, args: ServeArgs) -> ServerResult<()> {
    let port = args.port.unwrap_or(ctx.config.port);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let sources = ctx
        .registry
        .list(SourceFilter { enabled_only: true, kind: None })
        .await?;

    let watcher_config = FsWatcherConfig {
        debounce: Duration::from_millis(ctx.config.watcher.debounce_ms),
        max_batch_size: ctx.config.watcher.max_batch_size,
    };

    let mut watched = Vec::new();
    for source in sources.into_iter().filter(|s| s.auto_reindex) {
        let mut watcher = SourceWatcher::new(source.source_id, watcher_config.clone());
        match watcher.watch(&source.path) {
            Ok(()) => {
                info!(source_id = source.source_id, path = %source.path.display(), "auto-reindex watcher started");
                watched.push((source, watcher));
            }
            Err(e) => {
                warn!(source_id = source.source_id, error = %e, "could not start filesystem watcher; auto-reindex disabled for this source");
            }
        }
    }

    let semaphore = Arc::new(Semaphore::new(ctx.config.watcher.max_concurrent_reindexes.max(1)));
    let watch_handles: Vec<JoinHandle<()>> = watched
        .into_iter()
        .map(|(source, watcher)| {
            let ctx = ctx.clone();
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(run_source_supervisor(ctx, source, watcher, semaphore))
        })
        .collect();

    info!(%addr, "starting HTTP listener");
    let server = ApiServer::new(ctx.into_state());

    tokio::select! {
        result = server.run(addr) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
            Ok(())
        }
    }?;

    for handle in watch_handles {
        handle.abort();
    }
    Ok(())
}
