pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tenanthub-api")]
#[command(about = "TenantHub API - multi-tenant SaaS backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create the super-admin tenant and its first administrator")]
    Bootstrap(commands::bootstrap::BootstrapArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Bootstrap(args)) => commands::bootstrap::handle(args).await,
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
    }
}
