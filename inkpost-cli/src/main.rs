use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "inkpost",
    author,
    version,
    about = "A small personal blog: posts, comments, accounts and a contact form"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the blog HTTP server
    Serve(commands::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; settings may come from the environment or flags.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
    }
    Ok(())
}
