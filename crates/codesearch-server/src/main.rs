//! Binary entry point: parse arguments, load configuration, build the
//! component context, dispatch the CLI, and translate any error into the
//! process exit code table from §7.

use clap::Parser;
use codesearch_config::{init_logging, ConfigManager};
use codesearch_server::cli::{dispatch, Cli};
use codesearch_server::init_context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let data_dir = std::env::var("CODESEARCH_DATA_DIR").unwrap_or_else(|_| "./.codesearch".to_string());
    let manager = ConfigManager::new(&data_dir);
    let config = match manager.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    let ctx = match init_context(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("startup failed: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = dispatch(cli, ctx).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
