use std::{net::SocketAddr, sync::Arc};

use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};

use hub_items as hub;

#[derive(Parser)]
#[command(name = "hub-items", about = "Hub item records and remote file mirroring", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the item routes (default)
    Serve,
    /// Download a remote file and store it attached to a record
    Mirror(MirrorArgs),
}

#[derive(Args)]
struct MirrorArgs {
    #[arg(help = "Absolute http(s) URL of the file")]
    url: String,
    #[arg(long, default_value = hub::models::HUB_ITEM_DOCTYPE, help = "Doctype that owns the stored file")]
    owner_type: String,
    #[arg(long, help = "Name of the owning record")]
    owner_id: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = hub::config::load_config()?;
    hub::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_config = hub::db::DbConfig::from(&cfg);
    let db_pool = hub::db::establish_connection_with_config(&db_config).await?;
    if cfg.auto_migrate {
        hub::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(db_arc, cfg).await,
        Commands::Mirror(args) => mirror(db_arc, &cfg, args).await,
    }
}

async fn serve(
    db: Arc<hub::db::DbPool>,
    cfg: hub::config::HubConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    let app = hub::router(hub::AppState::new(db, cfg));

    info!("hub-items listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn mirror(
    db: Arc<hub::db::DbPool>,
    cfg: &hub::config::HubConfig,
    args: MirrorArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mirror = hub::services::RemoteFileMirror::with_defaults(db, cfg)?;

    match mirror
        .mirror(&args.url, &args.owner_type, &args.owner_id)
        .await?
    {
        Some(file) => println!("{}", file.file_url),
        None => warn!(url = %args.url, "Nothing to mirror: not an http(s) URL"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
