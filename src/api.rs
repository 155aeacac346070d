//! # API Server Module
//!
//! ## Purpose
//! Thin REST surface over the screening pipeline. Supplies the core with a
//! scenario string and returns the structured result or a typed error; all
//! engineering substance lives in the pipeline modules.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with scenario text (JSON body)
//! - **Output**: JSON `ScreeningResult`, or structured error responses
//! - **Endpoints**: `/screen`, `/health`, `/stats`
//!
//! ## Key Features
//! - Recoverable backend failures map to 503, unusable backend output to
//!   502; the client may retry either
//! - CORS allowlist for local development frontends
//! - Request identifiers and timings in structured logs

use crate::errors::ScreenerError;
use crate::parser::ScreeningResult;
use crate::utils::Timer;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// REST server over the shared application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Screening request payload
#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    pub scenario: String,
}

/// Screening response payload
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    #[serde(flatten)]
    pub result: ScreeningResult,
    pub query_time_ms: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub articles_indexed: usize,
    pub cases_indexed: usize,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Bind the server and return its driver future.
    /// The returned `Server` is `Send`, so the caller may spawn it onto a
    /// separate task or await it in place.
    pub fn bind(self) -> crate::errors::Result<Server> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );

        tracing::info!("Starting API server on {}", bind_addr);

        let app_state = self.app_state;
        let server = HttpServer::new(move || {
            let cors = if app_state.config.server.enable_cors {
                let mut cors = Cors::default()
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials();
                for origin in &app_state.config.server.allowed_origins {
                    cors = cors.allowed_origin(origin);
                }
                cors
            } else {
                Cors::default()
            };

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(app_state.clone()))
                .route("/screen", web::post().to(screen_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| ScreenerError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        Ok(server)
    }
}

/// Screening endpoint handler
async fn screen_handler(
    app_state: web::Data<crate::AppState>,
    request: web::Json<ScreenRequest>,
) -> ActixResult<HttpResponse> {
    let timer = Timer::new("screen_request");
    let request_id = Uuid::new_v4();

    if request.scenario.chars().count() > app_state.config.server.max_scenario_chars {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Scenario too long",
            "max_chars": app_state.config.server.max_scenario_chars,
        })));
    }

    tracing::info!(%request_id, chars = request.scenario.len(), "Screening request received");

    match app_state.engine.screen(&request.scenario).await {
        Ok(result) => {
            let response = ScreenResponse {
                result,
                query_time_ms: timer.stop(),
            };
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            tracing::error!(%request_id, category = e.category(), "Screening failed: {}", e);
            let body = serde_json::json!({
                "error": e.category(),
                "message": e.to_string(),
                "retryable": e.is_recoverable(),
            });
            let response = match e {
                ScreenerError::ReasoningUnavailable { .. } => {
                    HttpResponse::ServiceUnavailable().json(body)
                }
                ScreenerError::MalformedReasoningOutput { .. } => {
                    HttpResponse::BadGateway().json(body)
                }
                ScreenerError::InvalidApiRequest { .. } => HttpResponse::BadRequest().json(body),
                _ => HttpResponse::InternalServerError().json(body),
            };
            Ok(response)
        }
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        articles_indexed: app_state.engine.article_count(),
        cases_indexed: app_state.engine.case_count(),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let response = serde_json::json!({
        "articles_indexed": app_state.engine.article_count(),
        "cases_indexed": app_state.engine.case_count(),
        "embedding_dimension": app_state.config.embedding.dimension,
        "retrieval": {
            "min_similarity": app_state.config.retrieval.min_similarity,
            "top_k_articles": app_state.config.retrieval.top_k_articles,
            "top_k_cases": app_state.config.retrieval.top_k_cases,
        },
        "started_at": app_state.started_at.to_rfc3339(),
    });
    Ok(HttpResponse::Ok().json(response))
}
