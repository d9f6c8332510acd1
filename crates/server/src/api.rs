//! HTTP API: predictions, history, dashboard, model info, health and metrics

use crate::validation::{validate_form, FieldError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use predictor_lib::{
    health::ServiceHealth,
    history::{HistoryError, PredictionRecord, PredictionStore, DEFAULT_PAGE_SIZE},
    models::HouseAttributes,
    observability::StructuredLogger,
    predictor::PricePredictor,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Header carrying the pre-authenticated caller identity
pub const USER_HEADER: &str = "x-user-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn PricePredictor>,
    pub store: Arc<PredictionStore>,
    pub health: Arc<ServiceHealth>,
    pub logger: StructuredLogger,
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        predictor: Arc<dyn PricePredictor>,
        health: Arc<ServiceHealth>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            predictor,
            store: Arc::new(PredictionStore::new()),
            health,
            logger,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// API error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or empty x-user-id header")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("invalid prediction form")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::Unprocessable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::Validation(errors) => json!({ "error": self.to_string(), "details": errors }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::NotFound(_) => ApiError::NotFound(e.to_string()),
            HistoryError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
        }
    }
}

/// Caller identity taken from the `x-user-id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| UserId(v.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

/// Response for a stored prediction
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: PredictionRecord,
    /// Set when the price came from a degraded path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

/// Liveness: always 200 while the process answers; degradation is in the body
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health.report(state.predictor.as_ref()))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health.readiness();

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        ApiError::Internal("failed to encode metrics".to_string())
    })?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn model_info(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state
        .predictor
        .model_info()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no trained model is loaded".to_string()))
}

async fn create_prediction(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(attributes): Json<HouseAttributes>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_form(&attributes);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let result = state.predictor.predict_price(&attributes);
    state.logger.log_prediction(
        &user_id,
        result.price(),
        result.source(),
        result.diagnostic(),
    );

    let Some(price) = result.price() else {
        let diagnostic = result.diagnostic().unwrap_or("prediction failed");
        return Err(ApiError::Unprocessable(diagnostic.to_string()));
    };

    let record = state
        .store
        .record(&user_id, attributes, price, result.source());

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            prediction: record,
            diagnostic: result.diagnostic().map(str::to_string),
        }),
    ))
}

async fn list_predictions(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1);
    Json(state.store.page(&user_id, page, state.page_size))
}

async fn get_prediction(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.get(&user_id, id)?))
}

async fn delete_prediction(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete(&user_id, id)?;
    info!(user_id = %user_id, id, "Prediction deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> impl IntoResponse {
    Json(state.store.dashboard(&user_id))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/model", get(model_info))
        .route(
            "/api/v1/predictions",
            get(list_predictions).post(create_prediction),
        )
        .route(
            "/api/v1/predictions/:id",
            delete(delete_prediction).get(get_prediction),
        )
        .route("/api/v1/dashboard", get(dashboard))
        .with_state(state)
}

/// Start the API server; returns once `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
