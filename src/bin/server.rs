//! Sectional analysis HTTP server

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use rc_section::io::{run_request, AnalysisReport, AnalysisRequest};

const PORT: u16 = 8086;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<AnalysisReport>,
}

impl AnalysisResponse {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            results: None,
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn analyze(Json(request): Json<AnalysisRequest>) -> impl IntoResponse {
    // sweeps are CPU bound
    let outcome = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        run_request(&request).map(|mut report| {
            report.metadata.computation_time = Some(start.elapsed().as_secs_f64());
            report
        })
    })
    .await;

    match outcome {
        Ok(Ok(report)) => (
            StatusCode::OK,
            Json(AnalysisResponse {
                success: true,
                error: None,
                results: Some(report),
            }),
        ),
        Ok(Err(e)) => {
            log::warn!("analysis rejected: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(AnalysisResponse::failed(e.to_string())),
            )
        }
        Err(e) => {
            log::error!("analysis task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalysisResponse::failed(format!("analysis task failed: {}", e))),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/analyze", post(analyze))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], PORT));
    println!("Section analysis server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Analysis:     POST /api/v1/analyze");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
