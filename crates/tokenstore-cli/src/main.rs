use anyhow::Result;
use clap::Parser;

use tokenstore_cli::cli::{Cli, Commands};
use tokenstore_cli::config::loader;
use tokenstore_cli::output::print_error;
use tokenstore_cli::{commands, observability};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = loader::load_config(cli.config.as_deref())?;
    observability::init_tracing_with_level(&config.logging.level);

    match &cli.command {
        Commands::Init => commands::store::init(&config).await?,
        Commands::Get(args) => commands::store::get(&config, args.kind, &args.key).await?,
        Commands::Remove(args) => commands::store::remove(&config, args.kind, &args.key).await?,
        Commands::Config => commands::config::show(&config)?,
    }

    Ok(())
}
