//! Account backend - HTTP API and migration CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_service_lib::{run_migrations, MigrateAction};
use gateway_lib::config::{database_from_env, AppConfig};

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "User management backend with token authentication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides SERVER_HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateCommand,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateCommand {
    /// Apply all pending migrations
    Up,
    /// Roll back the last migration
    Down,
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

impl From<MigrateCommand> for MigrateAction {
    fn from(cmd: MigrateCommand) -> Self {
        match cmd {
            MigrateCommand::Up => MigrateAction::Up,
            MigrateCommand::Down => MigrateAction::Down,
            MigrateCommand::Status => MigrateAction::Status,
            MigrateCommand::Fresh => MigrateAction::Fresh,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = AppConfig::from_env()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            gateway_lib::run_server(config).await?;
        }
        Commands::Migrate { action } => {
            run_migrations(&database_from_env().url, action.into()).await?;
        }
    }

    Ok(())
}
