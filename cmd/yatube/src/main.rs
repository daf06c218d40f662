//! # Yatube server
//!
//! Assembles the application from configuration and the compiled-in
//! adapters, then serves both HTTP surfaces until Ctrl-C / SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{build_router, AppState, CookiePolicy};
use auth_adapters::{Argon2Hasher, JwtConfig, JwtTokenService};
use configs::{LogFormat, LogSettings, Settings};
use services::{AccountService, Repositories};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    if settings.uses_dev_secret() {
        warn!("auth.jwt_secret is the built-in development value; set YATUBE__AUTH__JWT_SECRET");
    }

    let repos = open_store(&settings).await?;

    let tokens = JwtTokenService::new(&JwtConfig {
        secret: settings.auth.jwt_secret.clone(),
        access_ttl: chrono::Duration::minutes(settings.auth.access_ttl_minutes),
        refresh_ttl: chrono::Duration::days(settings.auth.refresh_ttl_days),
    });
    let accounts = AccountService::new(&repos, Arc::new(Argon2Hasher::new()), Arc::new(tokens));
    let cookie = CookiePolicy {
        secure: settings.auth.secure_cookies,
        max_age: settings.auth.access_ttl_minutes * 60,
    };
    let state = AppState::new(&repos, accounts, cookie);
    let app = build_router(state, &settings.server.media_root);

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, media_root = %settings.server.media_root, "yatube listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(feature = "db-postgres")]
async fn open_store(settings: &Settings) -> anyhow::Result<Repositories> {
    use secrecy::ExposeSecret;
    use storage_adapters::PgStore;

    let store = PgStore::connect(settings.database.url.expose_secret(), settings.database.max_connections)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("running migrations")?;
    info!(max_connections = settings.database.max_connections, "postgres ready");
    Ok(Repositories::from_store(Arc::new(store)))
}

#[cfg(not(feature = "db-postgres"))]
async fn open_store(_settings: &Settings) -> anyhow::Result<Repositories> {
    warn!("built without db-postgres; data lives in memory and is lost on exit");
    Ok(Repositories::from_store(Arc::new(storage_adapters::MemoryStore::new())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
