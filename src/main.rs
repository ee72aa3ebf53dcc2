use std::net::SocketAddr;

use anyhow::Context;
use mimalloc::MiMalloc;
use studyhall::config::AppConfig;
use studyhall::{db, routes, services, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// mimalloc as global allocator.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyhall=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    db::migrate(&pool).await.context("Failed to run migrations")?;
    services::catalog::seed_bundled(&pool)
        .await
        .context("Failed to seed course catalog")?;

    let redis = redis::Client::open(config.redis_url.as_str()).context("Invalid REDIS_URL")?;

    let host: std::net::IpAddr = config.host.parse().context("Invalid BACKEND_HOST")?;
    let addr = SocketAddr::from((host, config.port));

    let state = AppState {
        db: pool,
        config,
        redis,
    };

    let app = routes::app(state).context("Failed to build router")?;

    tracing::info!(host = %addr, "Starting studyhall API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
