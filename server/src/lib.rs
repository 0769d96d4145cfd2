//! Gridgate Server - HTTP gateway for CRUD over tabular collections.
//!
//! This crate exposes the gridgate-engine dispatcher through a single
//! query-parameter driven endpoint, backed by an in-memory row store
//! with optional JSON snapshot persistence.

pub mod auth;
pub mod config;
pub mod encoder;
pub mod error;
pub mod handlers;
pub mod persist;
pub mod routes;

use crate::config::Config;
use axum::Router;
use gridgate_engine::{Dispatcher, MemoryStore, SchemaRegistry};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<MemoryStore>>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state for a config, loading the store snapshot if one is
    /// configured.
    pub fn new(config: Config) -> Self {
        let store = match config.store_path.as_deref() {
            Some(path) => persist::load_store(path),
            None => MemoryStore::new(),
        };

        Self {
            store: Arc::new(Mutex::new(store)),
            dispatcher: Arc::new(Dispatcher::new(SchemaRegistry::defaults())),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
