mod api;
mod middleware;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use inboxintel_core::ScoringPolicy;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = inboxintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let policy = match config.policy_path.as_deref() {
        Some(path) => load_policy(path)?,
        None => ScoringPolicy::default(),
    };

    let app = build_app(AppState {
        policy: Arc::new(policy),
        max_campaigns: config.max_campaigns,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        env = %config.env,
        addr = %config.bind_addr,
        max_campaigns = config.max_campaigns,
        "inboxintel-server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn load_policy(path: &Path) -> anyhow::Result<ScoringPolicy> {
    let policy = inboxintel_core::load_policy(path)
        .with_context(|| format!("loading scoring policy from {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded scoring policy");
    Ok(policy)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
