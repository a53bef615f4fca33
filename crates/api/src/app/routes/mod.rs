use axum::{
    routing::{get, post},
    Router,
};

pub mod audit;
pub mod decisions;
pub mod system;
pub mod zones;

/// Router for the decision, catalog and audit endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/zones", get(zones::list_zones))
        .route("/presets", get(zones::list_presets))
        .route("/decisions", post(decisions::create_decision))
        .route("/audit", get(audit::list_entries))
        .route("/audit/:entry_id", get(audit::get_entry))
        .route("/audit/:entry_id/override", post(audit::override_entry))
}
