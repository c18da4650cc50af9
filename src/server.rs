use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::history::{AddressHistoryResponse, HistoryParams, HistoryProxy};
use crate::query::{self, ExplorerView, QueryKind};

/// Build the HTTP API around a history proxy
pub fn build_router(proxy: Arc<HistoryProxy>) -> Router {
    let api = Router::new()
        .route("/explorer/txlist", get(txlist))
        .route("/classify", get(classify))
        .with_state(proxy);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    if config.explorer.api_key.is_none() {
        warn!(
            "{} is not set; history requests will fail until it is",
            crate::config::API_KEY_ENV
        );
    }

    let proxy = HistoryProxy::etherscan(config.explorer.clone())
        .context("Failed to build explorer client")?;
    let router = build_router(Arc::new(proxy));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

async fn txlist(
    State(proxy): State<Arc<HistoryProxy>>,
    Query(params): Query<HistoryParams>,
) -> (StatusCode, Json<AddressHistoryResponse>) {
    let result = proxy.fetch_address_history(&params).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => StatusCode::from_u16(e.status()).unwrap_or(StatusCode::BAD_GATEWAY),
    };
    (status, Json(AddressHistoryResponse::from(result)))
}

#[derive(Debug, Deserialize)]
struct ClassifyParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Classification {
    pub kind: QueryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ExplorerView>,
    pub hint: String,
}

async fn classify(Query(params): Query<ClassifyParams>) -> Json<Classification> {
    let kind = query::classify(&params.q);
    Json(Classification {
        kind,
        view: kind.view(),
        hint: query::hint_for(&params.q).to_string(),
    })
}
