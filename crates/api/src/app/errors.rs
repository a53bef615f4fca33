use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use putaway_core::AuditEntryId;
use putaway_infra::{AuditError, EngineError};

pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Validation(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        EngineError::EntryNotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("audit entry {id} not found"))
        }
        EngineError::Audit(e) => audit_error_to_response(e),
        EngineError::Config(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "config_error", e.to_string()),
        EngineError::Cancelled => json_error(StatusCode::SERVICE_UNAVAILABLE, "cancelled", "decision cancelled"),
        EngineError::TaskFailed(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "task_failed", msg),
    }
}

pub fn audit_error_to_response(err: AuditError) -> axum::response::Response {
    match err {
        AuditError::EntryNotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("audit entry {id} not found"))
        }
        AuditError::InvalidOverride(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        other => {
            tracing::error!(error = %other, "audit log failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "audit_error", other.to_string())
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_entry_id(raw: &str) -> Result<AuditEntryId, axum::response::Response> {
    raw.parse::<AuditEntryId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid audit entry id '{raw}'")))
}
