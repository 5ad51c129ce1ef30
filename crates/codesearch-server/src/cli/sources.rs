//! `codesearch sources` (§6): list/add/update/remove/reindex registered
//! sources, against the same [`codesearch_registry::SourceRegistry`] the
//! HTTP `/sources` routes use.

use clap::{Args, Subcommand};
use codesearch_core::entities::{NewSourceOptions, SourceChanges, SourceFilter};
use codesearch_registry::discover_subdirectories;

use crate::error::ServerResult;
use crate::AppContext;

#[derive(Subcommand, Debug)]
pub enum SourcesCommand {
    /// List registered sources
    List {
        /// Only list enabled sources
        #[arg(long)]
        enabled_only: bool,
    },

    /// Register a new repository or directory
    Add(AddArgs),

    /// Update a registered source's settings
    Update(UpdateArgs),

    /// Unregister a source (does not delete its files on disk)
    Remove {
        #[arg(value_name = "SOURCE_ID")]
        source_id: i64,
    },

    /// Re-scan a source and refresh both indexes
    Reindex {
        #[arg(value_name = "SOURCE_ID")]
        source_id: i64,

        /// Re-index every file, ignoring the stored mtime/hash
        #[arg(long)]
        force_full: bool,
    },

    /// List the immediate, discoverable subdirectories of a source's root
    Discover {
        #[arg(value_name = "SOURCE_ID")]
        source_id: i64,

        #[arg(long, default_value_t = 2)]
        max_depth: u32,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(value_name = "PATH")]
    pub path: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value_t = 0)]
    pub priority: i32,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub auto_reindex: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(value_name = "SOURCE_ID")]
    pub source_id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub enabled: Option<bool>,

    #[arg(long)]
    pub auto_reindex: Option<bool>,

    #[arg(long)]
    pub priority: Option<i32>,

    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn run(ctx: AppContext, action: SourcesCommand) -> ServerResult<()> {
    match action {
        SourcesCommand::List { enabled_only } => {
            let sources = ctx
                .registry
                .list(SourceFilter { enabled_only, kind: None })
                .await?;
            println!("{}", serde_json::to_string_pretty(&sources).unwrap());
        }
        SourcesCommand::Add(args) => {
            let options = NewSourceOptions {
                priority: args.priority,
                notes: args.notes,
                auto_reindex: args.auto_reindex,
            };
            let source = ctx
                .registry
                .register(&args.path, &args.name, options)
                .await?;
            println!("{}", serde_json::to_string_pretty(&source).unwrap());
        }
        SourcesCommand::Update(args) => {
            let changes = SourceChanges {
                name: args.name,
                enabled: args.enabled,
                auto_reindex: args.auto_reindex,
                priority: args.priority,
                notes: args.notes.map(Some),
            };
            let source = ctx.registry.update(args.source_id, changes).await?;
            println!("{}", serde_json::to_string_pretty(&source).unwrap());
        }
        SourcesCommand::Remove { source_id } => {
            ctx.registry.remove(source_id).await?;
            println!("removed source {source_id}");
        }
        SourcesCommand::Reindex { source_id, force_full } => {
            let source = ctx.registry.get(source_id).await?;
            let summary = ctx
                .indexing_service
                .reindex_source(&source, Vec::new(), Vec::new(), force_full)
                .await?;
            println!(
                "scanned {}, reindexed {}, removed {}{}",
                summary.files_scanned,
                summary.files_reindexed,
                summary.files_removed,
                if summary.scan_failed { " (scan reported zero files)" } else { "" }
            );
        }
        SourcesCommand::Discover { source_id, max_depth } => {
            let source = ctx.registry.get(source_id).await?;
            let entries = discover_subdirectories(&source.path, max_depth);
            for entry in entries {
                println!(
                    "{}{}",
                    entry.path.display(),
                    if entry.is_repository { "  [repository]" } else { "" }
                );
            }
        }
    }
    Ok(())
}
