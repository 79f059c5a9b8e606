pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

use crate::{
    config::get_config,
    router::create_router,
    state::{build_app_state, AppState},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Serves the application on an already-bound listener.
pub async fn run(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// The library's main entry point.
///
/// Sets up logging and configuration, bootstraps the schema index, then binds
/// the TCP listener and calls `run`. The port is bound only after the index is
/// ready, so no request is ever served without schema context.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = get_config(None)?;
    info!(
        schema_sql_path = %config.schema_sql_path,
        index = %config.pinecone_index,
        namespace = %config.pinecone_namespace,
        model = %config.openai_model,
        top_k = config.top_k,
        "Server configuration loaded"
    );
    let port = config.port;

    let app_state = build_app_state(config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    run(listener, app_state).await
}
