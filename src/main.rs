use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use atlas_api::models::AppState;
use atlas_api::{routes, CountryStorage, RefreshService, StatusStorage, ThreadRngFactor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atlas_api=debug,tower_http=debug".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!().run(&pool).await.context("migration failed")?;

    let cache_dir =
        PathBuf::from(std::env::var("CACHE_DIR").unwrap_or_else(|_| "cache".to_string()));
    let countries = CountryStorage::new(pool.clone());
    let status = StatusStorage::new(pool.clone());
    let refresher = RefreshService::new(
        countries.clone(),
        status.clone(),
        Arc::new(ThreadRngFactor),
        cache_dir.clone(),
    );
    let state = AppState::new(countries, status, refresher, cache_dir);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("Server is running on port {port}");
    axum::serve(listener, routes::init(state)).await?;
    Ok(())
}
