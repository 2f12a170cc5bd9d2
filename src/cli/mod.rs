pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - operator tooling for the portfolio server and its CMS")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rename document types in the CMS (one transaction per document)")]
    Migrate(commands::migrate::MigrateArgs),

    #[command(about = "Fetch content from the CMS or a running server")]
    Fetch {
        #[command(subcommand)]
        cmd: commands::fetch::FetchCommands,

        #[arg(long, global = true, help = "Fetch through this server's /api endpoints instead of the CMS")]
        server: Option<String>,
    },

    #[command(about = "Trigger cache revalidation on a running server")]
    Revalidate(commands::revalidate::RevalidateArgs),

    #[command(about = "Issue a session token signed with SESSION_SECRET")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate(args) => commands::migrate::handle(args, output_format).await,
        Commands::Fetch { cmd, server } => commands::fetch::handle(cmd, server, output_format).await,
        Commands::Revalidate(args) => commands::revalidate::handle(args, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format).await,
    }
}
