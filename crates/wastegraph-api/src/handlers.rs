//! HTTP request handlers for the graph service.
//!
//! Thin mapping between axum extractors, the service and the JSON bodies in
//! [`crate::dto`].

use crate::dto::*;
use crate::service::{current_timestamp, GraphService, PathQuery, ServiceError};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router as AxumRouter,
};
use std::sync::Arc;
use tracing::error;
use wastegraph_domain::{Constraint, ConstraintOverrides, Edge, GraphDocument, NewConstraint, Node};
use wastegraph_store::{SqliteStore, StoreError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Graph operations over the single store handle
    pub service: Arc<GraphService<SqliteStore>>,
}

impl AppState {
    /// Wrap a store
    pub fn new(store: SqliteStore, history_limit: usize) -> Self {
        Self {
            service: Arc::new(GraphService::new(store, history_limit)),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or rejected request (400)
    BadRequest(String),
    /// Target entity missing (404)
    NotFound(String),
    /// Entity already exists (409)
    Conflict(String),
    /// Internal server error (500)
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::InvalidInput(_) | ServiceError::Graph(_) => ApiError::BadRequest(message),
            ServiceError::NotFound(_) => ApiError::NotFound(message),
            ServiceError::Store(StoreError::InvalidInput(_))
            | ServiceError::Store(StoreError::InvalidReference(_)) => ApiError::BadRequest(message),
            ServiceError::Store(StoreError::Duplicate(_)) => ApiError::Conflict(message),
            ServiceError::Store(_) | ServiceError::LockPoisoned => ApiError::InternalError(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// JSON request body; malformed or incomplete bodies are answered with 400
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// GET /health
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(state.service.size()?.into()))
}

/// GET /graph
async fn get_graph(State(state): State<AppState>) -> ApiResult<Json<GraphDocument>> {
    Ok(Json(state.service.graph()?))
}

/// DELETE /graph
async fn clear_graph(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    state.service.clear_graph()?;
    Ok(Json(MessageResponse::new("Graph cleared")))
}

/// POST /graph/node
async fn create_node(
    State(state): State<AppState>,
    ApiJson(node): ApiJson<Node>,
) -> ApiResult<(StatusCode, Json<Node>)> {
    let node = state.service.create_node(node)?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// GET /node/{id}
async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Node>> {
    Ok(Json(state.service.get_node(&id)?))
}

/// DELETE /node/{id}
async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete_node(&id)?;
    Ok(Json(MessageResponse::new(format!("Node {} deleted", id))))
}

/// DELETE /node/{id}/smart
async fn smart_delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SmartDeleteResponse>> {
    Ok(Json(state.service.smart_delete_node(&id)?.into()))
}

/// POST /graph/edge
async fn create_edge(
    State(state): State<AppState>,
    ApiJson(edge): ApiJson<Edge>,
) -> ApiResult<(StatusCode, Json<Edge>)> {
    let edge = state.service.upsert_edge(edge)?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// DELETE /edge/{source}/{target}
async fn delete_edge(
    State(state): State<AppState>,
    Path((source, target)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete_edge(&source, &target)?;
    Ok(Json(MessageResponse::new(format!(
        "Edge {}-{} deleted",
        source, target
    ))))
}

/// PUT /edge/{source}/{target}/constraint
async fn set_edge_constraint(
    State(state): State<AppState>,
    Path((source, target)): Path<(String, String)>,
    ApiJson(request): ApiJson<EdgeConstraintRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .set_edge_constraint(&source, &target, request.constraint_value)?;
    Ok(Json(MessageResponse::new(format!(
        "Constraint of edge {}-{} set to {}",
        source, target, request.constraint_value
    ))))
}

fn views(constraints: Vec<Constraint>) -> Vec<ConstraintView> {
    let now = current_timestamp();
    constraints
        .into_iter()
        .map(|c| ConstraintView::at(c, now))
        .collect()
}

/// GET /constraints
async fn list_valid_constraints(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ConstraintView>>> {
    Ok(Json(views(state.service.valid_constraints()?)))
}

/// GET /constraints/all
async fn list_all_constraints(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ConstraintView>>> {
    Ok(Json(views(state.service.all_constraints()?)))
}

/// POST /constraints
async fn create_constraint(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewConstraint>,
) -> ApiResult<(StatusCode, Json<ConstraintView>)> {
    let created = state.service.create_constraint(request)?;
    let view = ConstraintView::at(created, current_timestamp());
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /constraints/{id}/toggle
///
/// An empty body activates. Any other body must be a JSON `ToggleRequest`,
/// whatever content type the client declared.
async fn toggle_constraint(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ToggleRequest::default()
    } else {
        serde_json::from_slice::<ToggleRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid toggle body: {}", e)))?
    };
    let active = request.is_active;
    state.service.set_constraint_active(id, active)?;
    let state_name = if active { "activated" } else { "deactivated" };
    Ok(Json(MessageResponse::new(format!(
        "Constraint {} {}",
        id, state_name
    ))))
}

/// GET /constraints/edge/{source}/{target}
async fn edge_constraints(
    State(state): State<AppState>,
    Path((source, target)): Path<(String, String)>,
) -> ApiResult<Json<EdgeConstraintsResponse>> {
    let (total, constraints) = state.service.edge_constraints(&source, &target)?;
    Ok(Json(EdgeConstraintsResponse {
        source,
        target,
        total_constraint: total,
        constraints: views(constraints),
    }))
}

/// GET /algo/dijkstra
async fn dijkstra(
    State(state): State<AppState>,
    Query(params): Query<DijkstraParams>,
) -> ApiResult<Json<PathResponse>> {
    let (source, destination) = match (params.src, params.dst) {
        (Some(src), Some(dst)) => (src, dst),
        _ => {
            return Err(ApiError::BadRequest(
                "Query parameters 'src' and 'dst' are required".to_string(),
            ))
        }
    };

    let overrides = match params.constraints.as_deref() {
        None | Some("") => ConstraintOverrides::new(),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            ApiError::BadRequest(format!("Invalid 'constraints' JSON: {}", e))
        })?,
    };

    let query = PathQuery {
        source,
        destination,
        overrides,
        save_to_history: params.save.unwrap_or(true),
        user_notes: params.notes,
    };

    Ok(Json(state.service.find_shortest_path(query)?.into()))
}

/// GET /algo/coloring
async fn coloring(State(state): State<AppState>) -> ApiResult<Json<ColoringResponse>> {
    Ok(Json(state.service.color_graph()?.into()))
}

/// GET /history/paths
async fn path_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<PathHistoryView>>> {
    let history = state.service.path_history(params.limit)?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// GET /history/paths/{id}/replay
async fn replay_path(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ReplayResponse>> {
    Ok(Json(state.service.replay(id)?.into()))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/graph", get(get_graph).delete(clear_graph))
        .route("/graph/node", post(create_node))
        .route("/graph/edge", post(create_edge))
        .route("/node/:id", get(get_node).delete(delete_node))
        .route("/node/:id/smart", delete(smart_delete_node))
        .route("/edge/:source/:target", delete(delete_edge))
        .route("/edge/:source/:target/constraint", put(set_edge_constraint))
        .route(
            "/constraints",
            get(list_valid_constraints).post(create_constraint),
        )
        .route("/constraints/all", get(list_all_constraints))
        .route("/constraints/:id/toggle", put(toggle_constraint))
        .route("/constraints/edge/:source/:target", get(edge_constraints))
        .route("/algo/dijkstra", get(dijkstra))
        .route("/algo/coloring", get(coloring))
        .route("/history/paths", get(path_history))
        .route("/history/paths/:id/replay", get(replay_path))
        .with_state(state)
}
