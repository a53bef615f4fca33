use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use putaway_core::ZoneId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn list_entries(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.audit().entries() {
        Ok(entries) => {
            let body: Vec<dto::AuditEntryDto> = entries.iter().map(dto::AuditEntryDto::from).collect();
            Json(body).into_response()
        }
        Err(e) => errors::audit_error_to_response(e),
    }
}

pub async fn get_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(entry_id): Path<String>,
) -> axum::response::Response {
    let entry_id = match errors::parse_entry_id(&entry_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.engine.audit().get(entry_id) {
        Ok(Some(entry)) => Json(dto::AuditEntryDto::from(&entry)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("audit entry {entry_id} not found")),
        Err(e) => errors::audit_error_to_response(e),
    }
}

pub async fn override_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(entry_id): Path<String>,
    body: Result<Json<dto::OverrideRequest>, JsonRejection>,
) -> axum::response::Response {
    let entry_id = match errors::parse_entry_id(&entry_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text());
        }
    };
    let zone: ZoneId = match body.zone_id.parse() {
        Ok(z) => z,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", format!("{e}")),
    };

    match services.engine.override_decision(entry_id, zone, &body.operator, &body.reason) {
        Ok(entry) => (StatusCode::CREATED, Json(dto::AuditEntryDto::from(&entry))).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
