//! Haven gateway entry point.
//!
//! Binary name: `haven`
//!
//! Parses CLI arguments, initializes the database and backends, then
//! either starts the signaling gateway or runs a management command.

mod hub;
mod http;
mod state;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use haven_infra::config::{load_config, resolve_data_dir};
use haven_types::identity::Role;
use state::AppState;

#[derive(Parser)]
#[command(name = "haven", about = "Real-time counseling session gateway")]
struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the signaling gateway and REST API.
    Serve {
        /// Bind host; overrides config.toml.
        #[arg(long)]
        host: Option<String>,
        /// Bind port; overrides config.toml.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Access-token management.
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Mint an access token for a participant. The token is printed
    /// once and only its hash is stored.
    Create {
        /// Participant id the token authenticates as.
        #[arg(long)]
        subject_id: i64,
        /// ROLE_USER or ROLE_COUNSELOR.
        #[arg(long, default_value = "ROLE_USER")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,haven=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = resolve_data_dir();
    let config = load_config(&data_dir).await;
    let state = AppState::init(&config, data_dir).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, "haven gateway listening");
            println!("Haven gateway listening on http://{addr}");
            println!("Press Ctrl+C to stop");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\nServer stopped.");
        }

        Commands::Token { command } => match command {
            TokenCommands::Create { subject_id, role } => {
                let role = role
                    .parse::<Role>()
                    .map_err(|e| anyhow::anyhow!(e))?;
                let token = state.tokens.mint(subject_id, role).await?;
                println!("Access token (save this -- it won't be shown again):");
                println!("{token}");
            }
        },
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
