//! Static file serving under `/app` and its visit counter.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use tower_http::services::ServeDir;
use tracing::debug;

/// Count of requests served from `/app`. Shared by every clone.
#[derive(Clone, Default)]
pub struct Metrics {
    file_server_hits: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    fn record_hit(&self) -> u64 {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the file server.
pub async fn count_hits(State(metrics): State<Metrics>, request: Request, next: Next) -> Response {
    let hits = metrics.record_hit();
    debug!(hits, path = %request.uri().path(), "File server hit");
    next.run(request).await
}

/// Router serving `root` as static files, meant to be nested at `/app`.
pub fn file_server(root: &Path, metrics: Metrics) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn_with_state(metrics, count_hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_shared_between_clones() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        assert_eq!(clone.record_hit(), 1);
        assert_eq!(metrics.record_hit(), 2);
        assert_eq!(metrics.hits(), 2);

        clone.reset();
        assert_eq!(metrics.hits(), 0);
    }
}
