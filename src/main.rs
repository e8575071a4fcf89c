mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use diarist::config::DiaristConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diarist", version, about = "Write a diary, then ask it questions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save a diary note (appended if the date already has an entry)
    Write {
        /// Date of the entry as YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Note text. Read from stdin when omitted.
        text: Option<String>,
    },
    /// Ask a question answered from your most relevant entries
    Ask {
        /// The question, in any language the embedding model supports
        question: String,
    },
    /// List stored entries
    Entries,
    /// Check the diary file, embedding model, and language model server
    Doctor,
    /// Start the MCP server
    Serve {
        /// `stdio` or `http`. Defaults to the configured transport.
        #[arg(long)]
        transport: Option<String>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.diarist/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = DiaristConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC and CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Write { date, text } => {
            cli::write::write(&config, date.as_deref(), text)?;
        }
        Command::Ask { question } => {
            cli::ask::ask(&config, &question).await?;
        }
        Command::Entries => {
            cli::entries::entries(&config)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config).await?;
        }
        Command::Serve { transport } => {
            let transport = transport.unwrap_or_else(|| config.server.transport.clone());
            match transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "http" => server::serve_http(config).await?,
                other => anyhow::bail!("unknown transport: {other}. Supported: stdio, http"),
            }
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
