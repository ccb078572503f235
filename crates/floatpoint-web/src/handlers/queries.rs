//! Query history for the authenticated caller.
//!
//! Unlike prediction, these endpoints are strictly scoped: no verified
//! identity means 401, never an anonymous fallback.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use floatpoint_store::{identity::parse_bearer, IdentityContext};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::handlers::{authorization, json_error};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

async fn caller(state: &SharedState, headers: &HeaderMap) -> Result<IdentityContext, Response> {
    let token = authorization(headers)
        .and_then(parse_bearer)
        .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "Authorization header required"))?;
    state.identity.verify(token).await.map_err(|e| {
        debug!("History request rejected: {e}");
        json_error(StatusCode::UNAUTHORIZED, "Invalid or expired token")
    })
}

/// Row ids are uuids or integers.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// GET /api/queries - Most recent query rows, newest first
pub async fn list_queries(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let user = match caller(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_ref() else {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch query history");
    };

    match store.list_queries(&user.user_id, state.history_limit).await {
        Ok(queries) => {
            let count = queries.len();
            Json(json!({ "success": true, "queries": queries, "count": count })).into_response()
        }
        Err(e) => {
            error!(user_id = %user.user_id, "Error fetching queries: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch query history")
        }
    }
}

/// DELETE /api/queries?id=<id> - Delete one of the caller's rows
pub async fn delete_query(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
) -> Response {
    let user = match caller(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let Some(id) = params.id.filter(|id| !id.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Query ID required");
    };
    if !is_valid_id(&id) {
        return json_error(StatusCode::BAD_REQUEST, "Invalid query ID");
    }
    let Some(store) = state.store.as_ref() else {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete query");
    };

    match store.delete_query(&user.user_id, &id).await {
        Ok(true) => Json(json!({ "success": true, "message": "Query deleted successfully" })).into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "Query not found"),
        Err(e) => {
            error!(user_id = %user.user_id, %id, "Error deleting query: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete query")
        }
    }
}
