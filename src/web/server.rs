use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::api::{self, AppState};
use crate::config::settings::Config;
use crate::console::CommandRegistry;

pub async fn start_server(config: Config, port: u16) -> Result<()> {
    let state = Arc::new(AppState {
        config,
        registry: CommandRegistry::standard(),
    });
    let app = api::routes(state).layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("listening on {}", addr);
    println!("parsec API running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
