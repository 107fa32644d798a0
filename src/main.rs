use crossdb::config::Config;
use crossdb::entities::UserProxy;
use crossdb::field::CrossDatabaseField;
use crossdb::foreign::StoreRegistry;
use crossdb::server::router::{CrossDbState, crossdb_router};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_toml();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        local_database_url = %cfg.local.database_url,
        local_uuid_storage = ?cfg.local.uuid_storage,
        stores = ?cfg.stores.keys().collect::<Vec<_>>(),
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
    );

    let db = crossdb::db::spawn(&cfg.local).await;
    let registry = StoreRegistry::connect_all(&cfg.stores).await?;
    let user_proxy =
        CrossDatabaseField::<UserProxy>::from_config("user_proxy", &registry, &cfg.fields.user_proxy)
            .await?;
    info!(field = ?user_proxy.descriptor(), "reference field bound");

    let admin_key: Arc<str> = Arc::from(cfg.basic.admin_key.as_str());
    let state = CrossDbState::new(db, user_proxy, admin_key);
    let app = crossdb_router(state);

    let addr = cfg.basic.listen_socket();
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.close_all().await;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
