use std::net::SocketAddr;

use api::application::todo_service::TodoServiceImpl;
use api::config::{AppConfig, Backend};
use api::domain::repository::TodoRepository;
use api::http::routing::{self, todos};
use api::infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    match config.backend {
        Backend::Memory { seed } => {
            tracing::info!(seeded = seed.len(), "using in-memory store");
            serve(InMemoryTodoRepository::seeded(seed), config.addr).await
        }
        Backend::Sqlite { url } => {
            tracing::info!(%url, "using sqlite store");
            serve(SqliteTodoRepository::connect(&url).await?, config.addr).await
        }
    }
}

async fn serve<R: TodoRepository + Clone>(repo: R, addr: SocketAddr) -> anyhow::Result<()> {
    repo.init().await?;
    let service = TodoServiceImpl::new(repo);
    let router = routing::app(todos::router(todos::AppState { service }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => { signal.recv().await; }
            Err(err) => {
                tracing::warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown");
}
