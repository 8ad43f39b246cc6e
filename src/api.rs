//! HTTP API.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | health check |
//! | `GET /models` | list registered models |
//! | `PUT /models` | register a model |
//! | `DELETE /models?model=NAME` | remove a model |
//! | `POST /answer?model=NAME` | answer a question and log it |
//! | `GET /answer?start=S&end=E&model=NAME` | query the answer log |

mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tracing::{error, info, warn};

use crate::{AnswerRecord, AnswerRouter, AnswerStore, ModelRegistry, ModelSpec, ServiceError};

pub use types::{AddModelRequest, AnswerRequest, ErrorResponse, ModelParam, RangeParams};

/// Health check body, kept identical to the original service's.
pub const HEALTH_TEXT: &str = "<p>Hello, World!</p>";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub router: AnswerRouter,
    pub store: Arc<AnswerStore>,
}

impl AppState {
    pub fn new(router: AnswerRouter, store: Arc<AnswerStore>) -> Self {
        Self {
            registry: Arc::clone(router.registry()),
            router,
            store,
        }
    }
}

/// Builds the router with all routes attached to `state`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route(
            "/models",
            get(list_models_handler)
                .put(add_model_handler)
                .delete(delete_model_handler),
        )
        .route("/answer", get(list_answers_handler).post(answer_handler))
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation(_)
            | ServiceError::NotFound(_)
            | ServiceError::Protected(_) => StatusCode::BAD_REQUEST,
            ServiceError::EngineInit { .. } | ServiceError::Inference(_) => StatusCode::BAD_GATEWAY,
            ServiceError::EngineTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Storage(_) | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Unwraps a JSON body, turning decode failures into validation errors.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServiceError::Validation(rejection.body_text()))
}

async fn health_handler() -> Html<&'static str> {
    Html(HEALTH_TEXT)
}

async fn list_models_handler(State(state): State<AppState>) -> Json<Vec<ModelSpec>> {
    Json(state.registry.list())
}

async fn add_model_handler(
    State(state): State<AppState>,
    body: Result<Json<AddModelRequest>, JsonRejection>,
) -> Result<Json<Vec<ModelSpec>>, ServiceError> {
    let spec = json_body(body)?.into_spec()?;

    let registry = Arc::clone(&state.registry);
    tokio::task::spawn_blocking(move || registry.add(spec)).await??;

    Ok(Json(state.registry.list()))
}

async fn delete_model_handler(
    State(state): State<AppState>,
    Query(params): Query<ModelParam>,
) -> Result<Json<Vec<ModelSpec>>, ServiceError> {
    let name = params.model.ok_or_else(|| ServiceError::missing("model"))?;
    state.registry.delete(&name)?;
    Ok(Json(state.registry.list()))
}

async fn answer_handler(
    State(state): State<AppState>,
    Query(params): Query<ModelParam>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerRecord>, ServiceError> {
    let (question, context) = json_body(body)?.into_parts()?;

    let routed = state
        .router
        .answer(params.model.as_deref(), question.clone(), context.clone())
        .await?;
    let record = AnswerRecord::now(question, context, routed.answer, routed.model_name);

    let store = Arc::clone(&state.store);
    let logged = record.clone();
    tokio::task::spawn_blocking(move || store.append(&logged)).await??;

    Ok(Json(record))
}

async fn list_answers_handler(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<AnswerRecord>>, ServiceError> {
    let start = params.start()?;
    let end = params.end()?;
    let model = params.model;

    let store = Arc::clone(&state.store);
    let records =
        tokio::task::spawn_blocking(move || store.query(start, end, model.as_deref())).await??;

    Ok(Json(records))
}
