use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use putaway_warehouse::ItemSubmission;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn create_decision(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ItemSubmission>, JsonRejection>,
) -> axum::response::Response {
    let Json(submission) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text());
        }
    };

    let item_id = submission.id.clone();
    match services.engine.decide(submission).await {
        Ok(recorded) => {
            tracing::info!(
                item_id = %item_id,
                entry_id = %recorded.entry_id,
                source = ?recorded.decision.source,
                "decision created"
            );
            (StatusCode::CREATED, Json(dto::RecordedDecisionDto::from(&recorded))).into_response()
        }
        Err(e) => errors::engine_error_to_response(e),
    }
}
