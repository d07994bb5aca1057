use log::{error, info};
use prometheus::{Encoder, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Liveness and metrics endpoints for hosting platforms.
pub struct HealthServer {
    registry: Arc<Registry>,
}

impl HealthServer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(health_check);

        let registry = self.registry.clone();
        let metrics = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .map(move || render_metrics(&registry));

        health.or(metrics)
    }

    pub async fn start(self, port: u16) {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        info!("Starting health server on {}", addr);
        warp::serve(self.routes()).run(addr).await;
    }
}

fn health_check() -> warp::reply::Json {
    warp::reply::json(&serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn render_metrics(registry: &Registry) -> warp::reply::WithStatus<String> {
    let mut buffer = Vec::new();
    match TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        Ok(()) => warp::reply::with_status(
            String::from_utf8_lossy(&buffer).into_owned(),
            StatusCode::OK,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            warp::reply::with_status(
                "Failed to encode metrics".to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}
