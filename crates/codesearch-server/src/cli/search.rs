//! `codesearch search` (§6): a one-shot query against the same hybrid
//! engine the HTTP `/search/*` routes call, printed as JSON to stdout.

use clap::Args;
use codesearch_search::{SearchFilters, SearchMode, SearchQuery};
use serde::Serialize;

use crate::error::{ServerError, ServerResult};
use crate::AppContext;

#[derive(Debug, Serialize)]
struct HitBody {
    doc_id: String,
    path: String,
    source: String,
    score: f64,
    snippet: Option<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Retrieval mode
    #[arg(long, value_enum, default_value = "hybrid")]
    pub mode: ModeArg,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Minimum score to include a result
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Restrict to these repository names (repeatable)
    #[arg(long = "repository")]
    pub repositories: Vec<String>,

    /// Restrict to these directory source ids (repeatable)
    #[arg(long = "directory")]
    pub directories: Vec<i64>,

    /// Restrict to paths under this folder prefix
    #[arg(long)]
    pub folder: Option<String>,

    /// Restrict to these file extensions (repeatable)
    #[arg(long = "extension")]
    pub extensions: Vec<String>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Keyword,
    Semantic,
    Hybrid,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Keyword => SearchMode::Keyword,
            ModeArg::Semantic => SearchMode::Semantic,
            ModeArg::Hybrid => SearchMode::Hybrid,
        }
    }
}

pub async fn run(ctx: AppContext, args: SearchArgs) -> ServerResult<()> {
    if args.query.trim().is_empty() {
        return Err(ServerError::InvalidInput("query must not be empty".to_string()));
    }

    let query = SearchQuery {
        text: args.query,
        mode: args.mode.into(),
        limit: args.limit.unwrap_or(ctx.config.search.default_limit as usize),
        min_score: args.min_score.unwrap_or(0.0),
        filters: SearchFilters {
            repositories: args.repositories,
            directory_source_ids: args.directories,
            folder_prefix: args.folder,
            extensions: args.extensions,
        },
    };

    let response = ctx.search_engine.search(&query).await?;
    if response.degraded {
        eprintln!("warning: one retrieval mode failed; results are partial");
    }
    let hits: Vec<HitBody> = response
        .hits
        .into_iter()
        .map(|hit| HitBody {
            doc_id: hit.doc_id,
            path: hit.path,
            source: hit.source_name,
            score: hit.score,
            snippet: hit.snippet,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&hits).unwrap());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_arg_converts_to_the_matching_search_mode() {
        assert_eq!(SearchMode::from(ModeArg::Keyword), SearchMode::Keyword);
        assert_eq!(SearchMode::from(ModeArg::Semantic), SearchMode::Semantic);
        assert_eq!(SearchMode::from(ModeArg::Hybrid), SearchMode::Hybrid);
    }
}
