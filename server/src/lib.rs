//! HTTP task service.
//!
//! Exposes list/get/create/update/delete/stats over a [`TaskStore`]. Every
//! response is a JSON [`Envelope`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::ServiceError;
pub use model::{Task, TaskStats};
pub use store::{MemoryStore, StoreError, TaskStore};

pub type SharedStore = Arc<dyn TaskStore>;

/// Router over a fresh in-memory store.
pub fn app() -> Router {
    router(Arc::new(MemoryStore::default()))
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(routes::list_tasks).post(routes::create_task),
        )
        .route("/api/tasks/stats/summary", get(routes::task_stats))
        .route(
            "/api/tasks/{id}",
            get(routes::get_task)
                .put(routes::update_task)
                .delete(routes::delete_task),
        )
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
