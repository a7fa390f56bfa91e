//! OpenSASE Storefront - cart, wishlist and promotion service

use anyhow::Result;
use opensase_storefront::api::{router, AppState};
use opensase_storefront::{open_storage, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = StorefrontConfig::from_env()?;
    let storage = open_storage(&config)?;
    let app = router(AppState::new(storage));

    tracing::info!("OpenSASE Storefront listening on {}", config.addr());
    axum::serve(tokio::net::TcpListener::bind(config.addr()).await?, app).await?;
    Ok(())
}
