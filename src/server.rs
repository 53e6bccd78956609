//! The items API over HTTP — the same contract the stub simulates, served
//! for real so remote sessions can point at it.
//!
//! Every mutation answers with the full list as the new authoritative
//! snapshot; injected or store failures answer 400 with an error body.
//! Reads stall for the configured latency but never injected-fail.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, extract::State};
use tokio::net::TcpListener;

use crate::fault::FaultInjector;
use crate::item::Item;
use crate::store::Store;
use crate::wire::{AddBody, EditBody, ErrorBody, IdBody, Snapshot};

/// Everything a handler needs: the injected store, the simulated latency,
/// and the fault plan for mutations.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub latency: Duration,
    pub faults: Arc<FaultInjector>,
}

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult = std::result::Result<Json<Snapshot>, ApiError>;

fn rejected(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error }))
}

fn snapshot(items: Vec<Item>) -> Json<Snapshot> {
    Json(Snapshot { items })
}

async fn simulate_mutation(state: &AppState) -> std::result::Result<(), ApiError> {
    tokio::time::sleep(state.latency).await;
    if state.faults.should_fail() {
        return Err(rejected("injected server error".to_string()));
    }
    Ok(())
}

async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult {
    tokio::time::sleep(state.latency).await;
    let items = state.store.list().await.map_err(|e| rejected(e.to_string()))?;
    Ok(snapshot(items))
}

async fn add_item(State(state): State<Arc<AppState>>, Json(body): Json<AddBody>) -> ApiResult {
    simulate_mutation(&state).await?;
    let items = state
        .store
        .add(&body.text)
        .await
        .map_err(|e| rejected(e.to_string()))?;
    Ok(snapshot(items))
}

async fn toggle_item(State(state): State<Arc<AppState>>, Json(body): Json<IdBody>) -> ApiResult {
    simulate_mutation(&state).await?;
    let items = state
        .store
        .toggle(body.id)
        .await
        .map_err(|e| rejected(e.to_string()))?;
    Ok(snapshot(items))
}

async fn edit_item(State(state): State<Arc<AppState>>, Json(body): Json<EditBody>) -> ApiResult {
    simulate_mutation(&state).await?;
    let items = state
        .store
        .update(body.id, &body.text)
        .await
        .map_err(|e| rejected(e.to_string()))?;
    Ok(snapshot(items))
}

async fn delete_item(State(state): State<Arc<AppState>>, Json(body): Json<IdBody>) -> ApiResult {
    simulate_mutation(&state).await?;
    let items = state
        .store
        .delete(body.id)
        .await
        .map_err(|e| rejected(e.to_string()))?;
    Ok(snapshot(items))
}

/// Build the router. Exposed separately so tests can serve it on an
/// ephemeral port.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/items",
            get(list_items)
                .post(add_item)
                .patch(toggle_item)
                .put(edit_item)
                .delete(delete_item),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    println!("serving items on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}
