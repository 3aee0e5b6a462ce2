//! Care-plan tagging handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;
use serde_json::Value;

use carelog::TaggedPlan;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response listing one entry per tagged clause.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub careplan_icf: Vec<TaggedPlan>,
}

/// POST /api/tag_icf - Abstract and ICF-label each clause of a care plan.
pub async fn tag_icf(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TagResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let careplan = body
        .get("careplan")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("'careplan' must be a non-empty string".to_string()))?;

    let careplan_icf = state.tagger.tag(careplan).await?;
    Ok(Json(TagResponse { careplan_icf }))
}
