use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{BookingError, HotelId, RoomTypeId};
use std::sync::Arc;
use uuid::Uuid;

use crate::materializer::{MaterializeReport, Materializer};
use crate::search::{AvailabilitySearch, HotelAvailability, SearchFilters};

#[derive(Clone)]
pub struct AppState {
    pub materializer: Arc<Materializer>,
    pub search: Arc<AvailabilitySearch>,
    pub horizon_days: u32,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Comma-separated hotel ids.
    pub hotel_ids: Option<String>,
    pub max_price: Option<BigDecimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaterializeRequest {
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(e: BookingError) -> ApiError {
    if matches!(e, BookingError::Storage(_)) {
        tracing::error!("Request failed: {}", e);
    }
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            kind: e.kind(),
        }),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/availability", get(search_availability))
        .route("/room-types/:room_type_id/inventory", post(materialize_inventory))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn parse_hotel_ids(raw: &str) -> Result<Vec<HotelId>, BookingError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HotelId>()
                .map_err(|e| BookingError::Validation(format!("invalid hotel id {s:?}: {e}")))
        })
        .collect()
}

pub async fn search_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<HotelAvailability>>, ApiError> {
    let hotel_ids = query
        .hotel_ids
        .as_deref()
        .map(parse_hotel_ids)
        .transpose()
        .map_err(error_response)?;
    let filters = SearchFilters {
        hotel_ids,
        max_price: query.max_price,
    };

    state
        .search
        .search(query.check_in, query.check_out, &filters)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn materialize_inventory(
    State(state): State<AppState>,
    Path(room_type_id): Path<Uuid>,
    request: Option<Json<MaterializeRequest>>,
) -> Result<Json<MaterializeReport>, ApiError> {
    let horizon_days = request
        .and_then(|Json(r)| r.horizon_days)
        .unwrap_or(state.horizon_days);

    let report = state
        .materializer
        .materialize_room_type(RoomTypeId::from_uuid(room_type_id), horizon_days)
        .await
        .map_err(error_response)?;
    tracing::info!(
        "Materialized {} days for room type {}",
        report.inserted,
        report.room_type_id
    );
    Ok(Json(report))
}

pub async fn health_check() -> &'static str {
    "OK"
}
