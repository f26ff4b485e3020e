//! Shopping Portal CLI - terminal shell for the shopping backend.
//!
//! # Usage
//!
//! ```bash
//! # Interactive shell (default)
//! portal
//! portal --api-url http://localhost:8080 shell
//!
//! # Register without opening a shell
//! portal signup -u alice -p secret
//! ```
//!
//! # Commands
//!
//! - `shell` - Read commands from stdin until `quit` or end of input
//! - `signup` - Register a new user
//!
//! # Environment Variables
//!
//! - `SHOP_API_URL` - Backend base URL, overridden by `--api-url`
//! - `RUST_LOG` - Log filter (default: `shopping_portal_client=info`), logs go
//!   to stderr

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use shopping_portal_client::{App, ClientConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "portal")]
#[command(author, version, about = "Shopping Portal terminal client")]
struct Cli {
    /// Backend base URL (overrides `SHOP_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell
    Shell,
    /// Register a new user
    Signup {
        /// Username to register
        #[arg(short, long)]
        username: String,

        /// Password for the new user
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopping_portal_client=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match cli.api_url.as_deref() {
        Some(url) => ClientConfig::with_api_url(url)?,
        None => ClientConfig::from_env()?,
    };
    tracing::debug!(api_url = %config.api_url, "Using backend");

    let mut app = App::from_config(&config);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => commands::shell::run_stdin(&mut app).await?,
        Commands::Signup { username, password } => {
            commands::signup::register(&app, &username, password).await?;
        }
    }
    Ok(())
}
