use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use putaway_warehouse::PRODUCT_PRESETS;

use crate::app::dto;
use crate::app::services::AppServices;

pub async fn list_zones(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let zones: Vec<dto::ZoneDto> = services.engine.catalog().zones().iter().map(dto::ZoneDto::from).collect();
    Json(zones)
}

pub async fn list_presets() -> impl IntoResponse {
    let presets: Vec<dto::PresetDto> = PRODUCT_PRESETS.iter().map(dto::PresetDto::from).collect();
    Json(presets)
}
