//! Command-line surface (§6): one binary, one `clap` derive tree. Each
//! subcommand group performs a one-shot operation against the same
//! `AppContext` the HTTP surface shares; only `serve` starts the listener.

pub mod agent;
pub mod search;
pub mod serve;
pub mod sources;

use clap::{Parser, Subcommand};

use crate::error::ServerResult;
use crate::AppContext;

#[derive(Parser, Debug)]
#[command(name = "codesearch")]
#[command(bin_name = "codesearch")]
#[command(about = "Hybrid code search: lexical + semantic retrieval over registered sources")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search query against one or more registered sources
    Search(search::SearchArgs),

    /// Manage registered repositories and directories
    Sources {
        #[command(subcommand)]
        action: sources::SourcesCommand,
    },

    /// Run and inspect agent skills and workflows
    Agent {
        #[command(subcommand)]
        action: agent::AgentCommand,
    },

    /// Start the HTTP listener and the auto-reindex watcher supervisor
    Serve(serve::ServeArgs),
}

pub async fn dispatch(cli: Cli, ctx: AppContext) -> ServerResult<()> {
    match cli.command {
        Commands::Search(args) => search::run(ctx, args).await,
        Commands::Sources { action } => sources::run(ctx, action).await,
        Commands::Agent { action } => agent::run(ctx, action).await,
        Commands::Serve(args) => serve::run(ctx, args).await,
    }
}
