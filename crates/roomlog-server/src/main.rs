mod auth;
mod config;

use std::sync::Arc;

use axum::{Router, middleware};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use roomlog_db::Database;
use roomlog_search::{LinkBuilder, SearchEngine, handler};

use crate::auth::{AccessList, hash_password, require_basic_auth};
use crate::config::{BuildInfo, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "roomlog", about = "Message search over a local room log", disable_version_flag = true)]
struct Cli {
    /// Print version information and exit
    #[arg(short = 'v', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password for use in ACCESS_LIST
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let build = BuildInfo::current();

    if cli.version {
        println!("{}", build.description());
        return Ok(());
    }
    if let Some(Command::HashPassword { password }) = cli.command {
        let hashed = hash_password(&password);
        println!("Hashed password: {hashed}");
        println!();
        println!("Use this in your ACCESS_LIST environment variable like:");
        println!("ACCESS_LIST=username:{hashed}");
        return Ok(());
    }

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomlog_server=debug,roomlog_search=debug,roomlog_db=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        version = %build.version,
        commit = %build.commit,
        built_at = ?build.built_at,
        "Initializing {}",
        build.description()
    );

    let db = Arc::new(Database::open(&config.db_path)?);
    info!("Opened event store at {}", config.db_path.display());

    let engine = SearchEngine::from_database(db, LinkBuilder::new(config.link_base.clone()))
        .with_deadline(config.query_timeout);

    let app = app(engine, config.access_list.clone());

    let addr = config.addr()?;
    info!(
        users = config.access_list.len(),
        "Roomlog listening on {}", addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn app(engine: SearchEngine, access: AccessList) -> Router {
    handler::router(Arc::new(engine))
        .layer(middleware::from_fn_with_state(Arc::new(access), require_basic_auth))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
