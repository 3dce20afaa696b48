//! Shopfront - storefront and back-office service.

use anyhow::Result;
use shopfront::config::Config;
use shopfront::images::ImageStore;
use shopfront::notify::Notifier;
use shopfront::{http, AppState};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, notifications disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState {
        db,
        notifier: Notifier::new(nats),
        images: ImageStore::new(&config.media_root),
    };
    let app = http::router(state);

    tracing::info!("shopfront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app)
        .await?;
    Ok(())
}
