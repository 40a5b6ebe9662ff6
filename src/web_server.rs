// File: src/web_server.rs
// JSON-RPC over HTTP with optional dataset hot reload

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use notify::{Event, RecursiveMode, Watcher};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::data_models::AppConfig;
use crate::data_store::DataStore;
use crate::dispatcher::MethodRegistry;
use crate::error::{RpcError, codes};

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<MethodRegistry>,
    /// Swapped wholesale on reload; requests hold their own `Arc` snapshot
    pub store: Arc<RwLock<Arc<DataStore>>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: DataStore) -> Self {
        Self {
            config,
            registry: Arc::new(MethodRegistry::new()),
            store: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    pub async fn snapshot(&self) -> Arc<DataStore> {
        self.store.read().await.clone()
    }

    pub async fn replace_store(&self, store: DataStore) {
        *self.store.write().await = Arc::new(store);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RpcVersion {
    V1,
    V2,
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    method: String,
    #[serde(default)]
    params: Value,
}

/// Build the router serving JSON-RPC on `POST /`
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/", post(rpc_endpoint))
        .with_state(state);

    if enable_cors {
        app = app.layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            ),
        );
    }
    app
}

/// Serve until SIGINT/SIGTERM
pub async fn run_rpc_server(config: &AppConfig, store: DataStore) -> Result<()> {
    let state = AppState::new(config.clone(), store);
    let app = build_router(state.clone(), config.enable_cors);
    let addr = SocketAddr::new(config.bind, config.port);

    if config.watch_dataset {
        let watch_state = state.clone();
        tokio::spawn(async move {
            start_dataset_watcher(watch_state).await;
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, methods = state.registry.len(), "JSON-RPC server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
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
                error!("failed to listen for SIGTERM: {}", e);
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

/// Single requests and batches share this endpoint
async fn rpc_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("unparseable request body: {}", e);
            let err = RpcError::new(codes::PARSE_ERROR, format!("Parse error: {e}"));
            return Json(reply(RpcVersion::V1, Value::Null, Err(err))).into_response();
        }
    };

    let store = state.snapshot().await;

    match payload {
        Value::Array(batch) => {
            if batch.is_empty() {
                let err = RpcError::invalid_request("Invalid request: empty batch");
                return Json(reply(RpcVersion::V2, Value::Null, Err(err))).into_response();
            }
            let replies: Vec<Value> = batch
                .into_iter()
                .filter_map(|request| process_request(&state.registry, &store, request))
                .collect();
            if replies.is_empty() {
                StatusCode::NO_CONTENT.into_response()
            } else {
                Json(replies).into_response()
            }
        }
        request => match process_request(&state.registry, &store, request) {
            Some(reply) => Json(reply).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
    }
}

/// Answer one request object. Notifications (no id) get no reply.
fn process_request(registry: &MethodRegistry, store: &DataStore, request: Value) -> Option<Value> {
    let version = match request.get("jsonrpc").and_then(Value::as_str) {
        Some("2.0") => RpcVersion::V2,
        _ => RpcVersion::V1,
    };
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    let request = match serde_json::from_value::<JsonRpcRequest>(request) {
        Ok(request) if !request.method.is_empty() => request,
        _ => {
            let err = RpcError::invalid_request("Invalid request: malformed");
            return Some(reply(version, id, Err(err)));
        }
    };

    // An explicit null id is handled like a missing one
    if id.is_null() {
        debug!(method = %request.method, "ignoring notification");
        return None;
    }

    let params = match request.params {
        Value::Array(params) => params,
        Value::Null => Vec::new(),
        _ => {
            let err = RpcError::invalid_request("Invalid request: params must be an array");
            return Some(reply(version, id, Err(err)));
        }
    };

    let outcome = registry.dispatch(store, &request.method, &params);
    match &outcome {
        Ok(_) => debug!(method = %request.method, "request served"),
        Err(err) => debug!(method = %request.method, code = err.code, message = %err.message, "request failed"),
    }
    Some(reply(version, id, outcome))
}

/// 2.0 replies carry either `result` or `error`; 1.0 replies carry both
fn reply(version: RpcVersion, id: Value, outcome: Result<Value, RpcError>) -> Value {
    match (version, outcome) {
        (RpcVersion::V2, Ok(result)) => json!({ "jsonrpc": "2.0", "result": result, "id": id }),
        (RpcVersion::V2, Err(err)) => json!({ "jsonrpc": "2.0", "error": err, "id": id }),
        (RpcVersion::V1, Ok(result)) => json!({ "result": result, "error": Value::Null, "id": id }),
        (RpcVersion::V1, Err(err)) => json!({ "result": Value::Null, "error": err, "id": id }),
    }
}

/// Rebuild the store whenever the dataset file changes
async fn start_dataset_watcher(state: AppState) {
    let dataset_path = state.config.dataset_path.clone();
    let Some(file_name) = dataset_path.file_name().map(|name| name.to_os_string()) else {
        warn!(path = %dataset_path.display(), "dataset path has no file name, hot reload disabled");
        return;
    };
    let watch_dir = watch_directory(&dataset_path);

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    // Editors often replace the file, so the directory is watched instead
    let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                let touches_dataset = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if touches_dataset {
                    if let Err(e) = tx.blocking_send(()) {
                        warn!("failed to forward dataset change: {}", e);
                    }
                }
            }
            Err(e) => warn!("dataset watch error: {:?}", e),
        }
    });

    let mut watcher = match watcher {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("failed to create dataset watcher: {}", e);
            return;
        }
    };
    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        error!(dir = %watch_dir.display(), "failed to start dataset watcher: {}", e);
        return;
    }
    info!(path = %dataset_path.display(), "watching dataset for changes");

    let mut debounce_handle: Option<tokio::task::JoinHandle<()>> = None;

    while rx.recv().await.is_some() {
        if let Some(handle) = debounce_handle.take() {
            handle.abort();
        }

        let reload_state = state.clone();
        debounce_handle = Some(tokio::spawn(async move {
            // Wait for writes to complete
            tokio::time::sleep(RELOAD_DEBOUNCE).await;
            reload_dataset(&reload_state).await;
        }));
    }

    drop(watcher);
}

/// Build a fresh store off the runtime and swap it in. A failed reload keeps
/// the previous snapshot serving.
pub async fn reload_dataset(state: &AppState) {
    let path = state.config.dataset_path.clone();
    let loaded = tokio::task::spawn_blocking(move || DataStore::load(&path)).await;
    match loaded {
        Ok(Ok(store)) => {
            state.replace_store(store).await;
            info!("dataset reloaded");
        }
        Ok(Err(e)) => warn!("dataset reload failed, keeping previous data: {:#}", e),
        Err(e) => error!("dataset reload task failed: {}", e),
    }
}

fn watch_directory(dataset_path: &Path) -> PathBuf {
    match dataset_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
